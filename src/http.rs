//! Transport primitives for signed provider calls.
//!
//! The module exposes [`ProviderHttpClient`] alongside the owned [`ProviderRequest`] and
//! [`ProviderResponse`] shapes so downstream crates can plug in custom HTTP stacks. The broker
//! hands the transport a fully signed request and expects the raw status, content type, and
//! body back; classifying non-success statuses stays with the flows.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")]
use reqwest::{
	Method,
	header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
};
// self
use crate::{_prelude::*, signing::SignedRequest};
#[cfg(feature = "reqwest")] use crate::error::{ConfigError, TransportError};

/// Content type used for signed form bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
/// Content type used for proxied API calls and the fallback for relayed responses.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Boxed future returned by [`ProviderHttpClient::execute`].
pub type HttpFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of delivering signed provider calls.
///
/// The trait acts as the broker's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so they can be shared across broker instances behind an `Arc`.
/// Any HTTP status counts as a response; only failures to obtain one (DNS, TCP, TLS, body
/// read) should surface as errors, typically [`crate::error::TransportError`].
pub trait ProviderHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and returns the provider's raw response.
	fn execute(&self, request: ProviderRequest) -> HttpFuture<'_, ProviderResponse>;
}

/// Owned, already-signed outbound request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderRequest {
	/// Uppercased HTTP method.
	pub method: String,
	/// Target URL, query included.
	pub url: Url,
	/// `Authorization: OAuth ...` header value.
	pub authorization: String,
	/// `User-Agent` header value.
	pub user_agent: String,
	/// `Content-Type` header value, if any.
	pub content_type: Option<String>,
	/// Request body, if any.
	pub body: Option<String>,
}
impl ProviderRequest {
	/// Builds a request from a signature, sending any signed extras as a form body.
	pub fn from_signed(signed: SignedRequest, user_agent: impl Into<String>) -> Self {
		let body = signed.form_body();
		let content_type = body.as_ref().map(|_| FORM_CONTENT_TYPE.to_owned());

		Self {
			method: signed.method,
			url: signed.url,
			authorization: signed.authorization,
			user_agent: user_agent.into(),
			content_type,
			body,
		}
	}

	/// Overrides the `Content-Type` header.
	pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
		self.content_type = Some(content_type.into());

		self
	}
}

/// Raw provider response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderResponse {
	/// HTTP status code.
	pub status: u16,
	/// `Content-Type` header value, when the provider sent one.
	pub content_type: Option<String>,
	/// Body bytes, unmodified.
	pub body: Vec<u8>,
}
impl ProviderResponse {
	/// Whether the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Body decoded as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// OAuth 1.0a endpoints answer directly, so any custom [`ReqwestClient`] handed to
/// [`ReqwestHttpClient::with_client`] should keep redirect following disabled; a redirected
/// call would carry a signature computed for the wrong URL.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client that never follows redirects.
	pub fn without_redirects() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ProviderHttpClient for ReqwestHttpClient {
	fn execute(&self, request: ProviderRequest) -> HttpFuture<'_, ProviderResponse> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = Method::from_bytes(request.method.as_bytes())
				.map_err(|_| ConfigError::InvalidMethod { method: request.method.clone() })?;
			let mut builder = client
				.request(method, request.url)
				.header(AUTHORIZATION, request.authorization)
				.header(USER_AGENT, request.user_agent);

			if let Some(content_type) = request.content_type {
				builder = builder.header(CONTENT_TYPE, content_type);
			}
			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let content_type = response
				.headers()
				.get(CONTENT_TYPE)
				.and_then(|value| value.to_str().ok())
				.map(ToOwned::to_owned);
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(ProviderResponse { status, content_type, body })
		})
	}
}
