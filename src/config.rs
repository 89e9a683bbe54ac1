//! Process configuration read once at startup.
//!
//! Variables are namespaced by a caller-chosen prefix, so `from_env("DISCOGS")` reads
//! `DISCOGS_CONSUMER_KEY`, `DISCOGS_CONSUMER_SECRET`, `DISCOGS_CALLBACK`, `DISCOGS_USER_AGENT`,
//! and `DISCOGS_STORE_PATH`. Only the consumer credential is required.

// std
use std::{env, path::PathBuf};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ConsumerCredential, RequestToken, TokenSecret},
	error::ConfigError,
	provider::ProviderDescriptorBuilder,
	store::{FileStore, MemoryStore, StoreError, TokenStore},
};
#[cfg(feature = "reqwest")] use crate::flows::ReqwestBroker;

/// Prefix used by the Discogs deployment.
pub const DEFAULT_ENV_PREFIX: &str = "DISCOGS";

const REQUEST_TOKENS_FILE: &str = "request_tokens.json";
const ACCESS_TOKENS_FILE: &str = "access_tokens.json";

/// Broker settings resolved from the environment or any other key/value source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrokerConfig {
	/// Consumer key issued by the provider.
	pub consumer_key: String,
	/// Consumer secret issued by the provider.
	pub consumer_secret: TokenSecret,
	/// `oauth_callback` override.
	pub callback: Option<String>,
	/// `User-Agent` override.
	pub user_agent: Option<String>,
	/// Directory for JSON token tables; tokens stay in memory when unset.
	pub store_path: Option<PathBuf>,
}
impl BrokerConfig {
	/// Reads `{prefix}_*` variables from the process environment.
	pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
		Self::from_lookup(prefix, |name| env::var(name).ok())
	}

	/// Reads `{prefix}_*` keys through `lookup`. Blank values count as unset.
	pub fn from_lookup<F>(prefix: &str, lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let raw = |suffix: &str| {
			lookup(&format!("{prefix}_{suffix}")).filter(|value| !value.trim().is_empty())
		};
		let read = |suffix: &str| raw(suffix).map(|value| value.trim().to_owned());
		let consumer_key = read("CONSUMER_KEY").ok_or(ConfigError::MissingConsumerCredentials)?;
		// Secrets are signing key material; surrounding whitespace is part of the value.
		let consumer_secret =
			raw("CONSUMER_SECRET").ok_or(ConfigError::MissingConsumerCredentials)?;

		Ok(Self {
			consumer_key,
			consumer_secret: TokenSecret::new(consumer_secret),
			callback: read("CALLBACK"),
			user_agent: read("USER_AGENT"),
			store_path: read("STORE_PATH").map(PathBuf::from),
		})
	}

	/// Consumer credential for the broker.
	pub fn consumer(&self) -> Result<ConsumerCredential, ConfigError> {
		ConsumerCredential::new(&self.consumer_key, self.consumer_secret.clone())
	}

	/// Applies the callback and `User-Agent` overrides to a descriptor builder.
	pub fn apply_to(&self, builder: ProviderDescriptorBuilder) -> ProviderDescriptorBuilder {
		let mut builder = builder;

		if let Some(callback) = &self.callback {
			builder = builder.callback(callback);
		}
		if let Some(user_agent) = &self.user_agent {
			builder = builder.user_agent(user_agent);
		}

		builder
	}

	/// Opens the token tables: JSON files under `store_path`, or in-memory maps.
	pub fn open_stores(&self) -> Result<BrokerStores, StoreError> {
		match &self.store_path {
			Some(dir) => Ok(BrokerStores {
				request_tokens: Arc::new(FileStore::<RequestToken>::open(
					dir.join(REQUEST_TOKENS_FILE),
				)?),
				access_tokens: Arc::new(FileStore::<AccessToken>::open(
					dir.join(ACCESS_TOKENS_FILE),
				)?),
			}),
			None => Ok(BrokerStores {
				request_tokens: Arc::new(MemoryStore::<RequestToken>::default()),
				access_tokens: Arc::new(MemoryStore::<AccessToken>::default()),
			}),
		}
	}

	/// Builds a reqwest-backed broker from this configuration and a descriptor builder.
	#[cfg(feature = "reqwest")]
	pub fn build_broker(&self, builder: ProviderDescriptorBuilder) -> Result<ReqwestBroker> {
		let descriptor = self.apply_to(builder).build().map_err(ConfigError::from)?;
		let stores = self.open_stores()?;

		let broker = ReqwestBroker::new(
			stores.request_tokens,
			stores.access_tokens,
			descriptor,
			self.consumer()?,
		)?;

		Ok(broker)
	}
}

/// Token tables handed to a broker.
#[derive(Clone)]
pub struct BrokerStores {
	/// Pending request tokens.
	pub request_tokens: Arc<dyn TokenStore<RequestToken>>,
	/// Durable access tokens.
	pub access_tokens: Arc<dyn TokenStore<AccessToken>>,
}
impl Debug for BrokerStores {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("BrokerStores(..)")
	}
}
