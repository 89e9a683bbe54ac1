//! Signed API proxy for connected owners.

// self
use crate::{
	_prelude::*,
	auth::OwnerId,
	flows::Broker,
	http::{JSON_CONTENT_TYPE, ProviderHttpClient},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	signing::SigningContext,
};

const DEFAULT_METHOD: &str = "GET";

/// API call to forward on behalf of an owner.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRequest {
	/// HTTP method; `GET` when absent.
	#[serde(default)]
	pub method: Option<String>,
	/// API path starting with `/`, optionally carrying its own query.
	pub path: String,
	/// Raw query string appended to the path.
	#[serde(default)]
	pub query: Option<String>,
}
impl ProxyRequest {
	/// Creates a `GET` request for `path`.
	pub fn new(path: impl Into<String>) -> Self {
		Self { method: None, path: path.into(), query: None }
	}

	/// Sets the HTTP method.
	pub fn with_method(mut self, method: impl Into<String>) -> Self {
		self.method = Some(method.into());

		self
	}

	/// Sets the raw query string.
	pub fn with_query(mut self, query: impl Into<String>) -> Self {
		self.query = Some(query.into());

		self
	}

	/// Uppercased method, defaulting to `GET`; only ASCII letters are accepted.
	pub fn normalized_method(&self) -> Result<String> {
		let method = self.method.as_deref().map(str::trim).filter(|m| !m.is_empty());

		match method {
			None => Ok(DEFAULT_METHOD.to_owned()),
			Some(method) if method.bytes().all(|b| b.is_ascii_alphabetic()) =>
				Ok(method.to_ascii_uppercase()),
			Some(method) => Err(Error::InvalidParameters {
				reason: format!("`{method}` is not a valid HTTP method"),
			}),
		}
	}

	fn validated_path(&self) -> Result<&str> {
		if self.path.is_empty() {
			return Err(Error::MissingParameters { reason: "Missing path parameter".into() });
		}
		if !self.path.starts_with('/') {
			return Err(Error::InvalidParameters {
				reason: format!("path `{}` must start with `/`", self.path),
			});
		}

		Ok(&self.path)
	}
}

/// Provider response relayed verbatim to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyResponse {
	/// Upstream status, relayed even when it is not a success.
	pub status: u16,
	/// Upstream content type, `application/json` when absent.
	pub content_type: String,
	/// Upstream body bytes.
	pub body: Vec<u8>,
}

impl<C> Broker<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Signs `request` with the owner's access token and forwards it to the provider API.
	pub async fn proxy(&self, owner: &OwnerId, request: ProxyRequest) -> Result<ProxyResponse> {
		const KIND: FlowKind = FlowKind::Proxy;

		let span = FlowSpan::new(KIND, "proxy");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let access =
					self.access_tokens.fetch(owner).await?.ok_or(Error::AccountNotConnected)?;
				let path = request.validated_path()?;
				let method = request.normalized_method()?;
				let url = self.descriptor.api_url(path, request.query.as_deref()).map_err(|e| {
					Error::InvalidParameters { reason: format!("path cannot be joined: {e}") }
				})?;

				if url.origin() != self.descriptor.endpoints.api_base.origin() {
					return Err(Error::InvalidParameters {
						reason: format!("path `{path}` leaves the API host"),
					});
				}

				let context = SigningContext::new(&method, &url, &self.consumer)
					.with_token(&access.token, &access.token_secret);
				let response = self.send_signed(context, Some(JSON_CONTENT_TYPE)).await?;

				Ok(ProxyResponse {
					status: response.status,
					content_type: response
						.content_type
						.unwrap_or_else(|| JSON_CONTENT_TYPE.to_owned()),
					body: response.body,
				})
			})
			.await;

		obs::record_flow_result(KIND, &result);

		result
	}
}
