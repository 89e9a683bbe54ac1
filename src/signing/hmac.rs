//! HMAC-SHA1 signer (RFC 5849 §3.4.2).

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha1::Sha1;
// self
use crate::{auth::TokenSecret, error::ConfigError, signing::encode::percent_encode};

type HmacSha1 = Hmac<Sha1>;

/// Builds `enc(consumer_secret)&enc(token_secret)`, using an empty token secret when absent.
pub fn signing_key(consumer_secret: &TokenSecret, token_secret: Option<&TokenSecret>) -> String {
	format!(
		"{}&{}",
		percent_encode(consumer_secret.expose()),
		percent_encode(token_secret.map(TokenSecret::expose).unwrap_or_default())
	)
}

/// Signs `base_string` with `key` and returns the base64 (padded, standard alphabet) digest.
pub fn sign(key: &str, base_string: &str) -> Result<String, ConfigError> {
	let mut mac =
		HmacSha1::new_from_slice(key.as_bytes()).map_err(|_| ConfigError::InvalidSigningKey)?;

	mac.update(base_string.as_bytes());

	Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
