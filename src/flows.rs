//! Three-legged flow orchestration and the signed API proxy.
//!
//! [`Broker`] walks an owner through the OAuth 1.0a dance:
//!
//! 1. [`Broker::request_token`] obtains a temporary credential and the authorize URL;
//! 2. [`Broker::exchange_access_token`] trades the authorized credential plus verifier for a
//!    durable access token and records the remote identity;
//! 3. [`Broker::proxy`] signs arbitrary API calls with that access token.
//!
//! Nothing is held in memory between legs. Each leg rebuilds the owner's [`FlowState`] from the
//! stores, so a flow survives process restarts as long as the stores do.

pub mod access_token;
mod common;
pub mod identity;
pub mod proxy;
pub mod request_token;
pub mod state;

pub(crate) use common::decode_json;
pub use access_token::*;
pub use identity::*;
pub use proxy::*;
pub use request_token::*;
pub use state::*;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ConsumerCredential, OwnerId, RequestToken},
	http::ProviderHttpClient,
	provider::ProviderDescriptor,
	signing::{NonceSource, SystemNonceSource},
	store::TokenStore,
};
#[cfg(feature = "reqwest")] use crate::{error::ConfigError, http::ReqwestHttpClient};

#[cfg(feature = "reqwest")]
/// Broker specialized for the crate's default reqwest transport.
pub type ReqwestBroker = Broker<ReqwestHttpClient>;

/// Coordinates OAuth 1.0a flows against a single provider descriptor.
///
/// The broker owns the HTTP client, both token tables, the provider descriptor, and the
/// consumer credential so the individual legs only deal with leg-specific logic.
pub struct Broker<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// HTTP client used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Table of pending request tokens, one per owner.
	pub request_tokens: Arc<dyn TokenStore<RequestToken>>,
	/// Table of durable access tokens, one per owner.
	pub access_tokens: Arc<dyn TokenStore<AccessToken>>,
	/// Provider endpoints, callback, and `User-Agent`.
	pub descriptor: ProviderDescriptor,
	/// Application credential used to sign every call.
	pub consumer: ConsumerCredential,
	/// Source of nonces and timestamps.
	pub nonce_source: Arc<dyn NonceSource>,
	flow_guards: Arc<Mutex<HashMap<OwnerId, Arc<AsyncMutex<()>>>>>,
}
impl<C> Broker<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Creates a broker that reuses the caller-provided transport.
	pub fn with_http_client(
		request_tokens: Arc<dyn TokenStore<RequestToken>>,
		access_tokens: Arc<dyn TokenStore<AccessToken>>,
		descriptor: ProviderDescriptor,
		consumer: ConsumerCredential,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			request_tokens,
			access_tokens,
			descriptor,
			consumer,
			nonce_source: Arc::new(SystemNonceSource),
			flow_guards: Default::default(),
		}
	}

	/// Replaces the nonce/timestamp source, e.g. with a fixed one to reproduce signatures.
	pub fn with_nonce_source(mut self, nonce_source: Arc<dyn NonceSource>) -> Self {
		self.nonce_source = nonce_source;

		self
	}
}
#[cfg(feature = "reqwest")]
impl Broker<ReqwestHttpClient> {
	/// Creates a new broker backed by a reqwest transport that never follows redirects.
	pub fn new(
		request_tokens: Arc<dyn TokenStore<RequestToken>>,
		access_tokens: Arc<dyn TokenStore<AccessToken>>,
		descriptor: ProviderDescriptor,
		consumer: ConsumerCredential,
	) -> Result<Self, ConfigError> {
		Ok(Self::with_http_client(
			request_tokens,
			access_tokens,
			descriptor,
			consumer,
			ReqwestHttpClient::without_redirects()?,
		))
	}
}
impl<C> Clone for Broker<C>
where
	C: ?Sized + ProviderHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			request_tokens: self.request_tokens.clone(),
			access_tokens: self.access_tokens.clone(),
			descriptor: self.descriptor.clone(),
			consumer: self.consumer.clone(),
			nonce_source: self.nonce_source.clone(),
			flow_guards: self.flow_guards.clone(),
		}
	}
}
impl<C> Debug for Broker<C>
where
	C: ?Sized + ProviderHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("provider", &self.descriptor.name)
			.field("consumer_key", &self.consumer.key)
			.finish()
	}
}
