//! Broker-level error types shared across signing, flows, providers, and stores.

// self
use crate::{_prelude::*, provider::ProviderEndpoint};

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
///
/// Every variant maps onto an HTTP status via [`Error::status_code`] so outer layers can
/// surface failures without re-classifying them.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure (persisting or deleting a token row).
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Caller credentials are absent or could not be verified.
	#[error("Missing or invalid credentials: {reason}.")]
	MissingCredentials {
		/// Human-readable reason string.
		reason: String,
	},
	/// A required request field is absent.
	#[error("Missing parameters: {reason}.")]
	MissingParameters {
		/// Human-readable reason string.
		reason: String,
	},
	/// A request field is present but malformed.
	#[error("Invalid parameters: {reason}.")]
	InvalidParameters {
		/// Human-readable reason string.
		reason: String,
	},
	/// No stored request token matches the callback; the flow must restart.
	#[error("No matching request token found. Please restart the OAuth flow.")]
	NoMatchingRequestToken,
	/// Provider answered with a non-success status.
	#[error("Provider rejected the {endpoint} call with status {status}.")]
	UpstreamRejected {
		/// Endpoint that rejected the call.
		endpoint: ProviderEndpoint,
		/// HTTP status returned upstream.
		status: u16,
		/// Raw upstream body kept for diagnostics.
		body: String,
	},
	/// Provider answered successfully but omitted required fields.
	#[error("Invalid response from the {endpoint} endpoint: {reason}.")]
	InvalidProviderResponse {
		/// Endpoint that produced the response.
		endpoint: ProviderEndpoint,
		/// Human-readable reason string.
		reason: String,
	},
	/// Proxy call attempted for an owner without an access token.
	#[error("Provider account is not connected.")]
	AccountNotConnected,
}
impl Error {
	/// HTTP status code that best represents this failure.
	pub fn status_code(&self) -> u16 {
		match self {
			Self::MissingCredentials { .. } | Self::AccountNotConnected => 401,
			Self::MissingParameters { .. }
			| Self::InvalidParameters { .. }
			| Self::NoMatchingRequestToken => 400,
			Self::UpstreamRejected { status, .. } => *status,
			Self::Transport(_) => 502,
			Self::Storage(_) | Self::Config(_) | Self::InvalidProviderResponse { .. } => 500,
		}
	}

	/// Diagnostic detail suitable for a response `details` field, when one exists.
	pub fn details(&self) -> Option<String> {
		match self {
			Self::UpstreamRejected { body, .. } => Some(body.clone()),
			Self::Storage(e) => Some(e.to_string()),
			Self::Transport(e) => e.source().map(ToString::to_string),
			_ => None,
		}
	}
}

/// Configuration and validation failures raised by the broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Consumer key or secret is not configured.
	#[error("Consumer credentials are not configured.")]
	MissingConsumerCredentials,
	/// URL handed to the signer cannot be normalized into a base string URL.
	#[error("URL `{url}` cannot be used for signing: {reason}.")]
	InvalidSigningUrl {
		/// Offending URL.
		url: String,
		/// Why normalization failed.
		reason: &'static str,
	},
	/// HMAC key could not be initialized.
	#[error("Signing key is invalid.")]
	InvalidSigningKey,
	/// Provider descriptor failed validation.
	#[error(transparent)]
	InvalidDescriptor(#[from] crate::provider::ProviderDescriptorError),
	/// HTTP method could not be handed to the transport.
	#[error("HTTP method `{method}` is not supported by the transport.")]
	InvalidMethod {
		/// Offending method string.
		method: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
