//! Application-level consumer credential shared by every owner.

// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Consumer key/secret pair identifying this application to the provider.
///
/// The credential is process-wide configuration: it is never stored per owner and never
/// changes after the broker is constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsumerCredential {
	/// Public consumer key, sent as `oauth_consumer_key`.
	pub key: String,
	/// Consumer secret, used only as the first half of the signing key.
	pub secret: TokenSecret,
}
impl ConsumerCredential {
	/// Builds a credential, rejecting blank halves.
	pub fn new(
		key: impl Into<String>,
		secret: impl Into<TokenSecret>,
	) -> Result<Self, ConfigError> {
		let key = key.into();
		let secret = secret.into();

		if key.trim().is_empty() || secret.is_blank() {
			return Err(ConfigError::MissingConsumerCredentials);
		}

		Ok(Self { key, secret })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn blank_halves_are_rejected() {
		assert!(matches!(
			ConsumerCredential::new("", "secret"),
			Err(ConfigError::MissingConsumerCredentials)
		));
		assert!(matches!(
			ConsumerCredential::new("key", " "),
			Err(ConfigError::MissingConsumerCredentials)
		));

		let consumer =
			ConsumerCredential::new("key", "secret").expect("Consumer fixture should be valid.");

		assert!(!format!("{consumer:?}").contains("\"secret\""));
	}
}
