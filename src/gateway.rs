//! HTTP-facing operations that wrap a [`Broker`] behind bearer-token authentication.
//!
//! The gateway is framework-agnostic: each operation takes the raw `Authorization` header value
//! and the raw request body, and returns a [`GatewayResponse`] that any server can write out.
//! Failures render as `{"error": ..., "details": ...}` with the status from
//! [`Error::status_code`].

pub mod verifier;

pub use verifier::*;

// self
use crate::{
	_prelude::*,
	auth::OwnerId,
	flows::{Broker, ProxyRequest, VerifierCallback},
	http::{JSON_CONTENT_TYPE, ProviderHttpClient},
};

/// Framework-neutral HTTP response produced by [`Gateway`] operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayResponse {
	/// HTTP status code.
	pub status: u16,
	/// `Content-Type` header value.
	pub content_type: String,
	/// Body bytes.
	pub body: Vec<u8>,
}
impl GatewayResponse {
	/// JSON response with `status`.
	pub fn json(status: u16, value: &serde_json::Value) -> Self {
		Self {
			status,
			content_type: JSON_CONTENT_TYPE.to_owned(),
			body: value.to_string().into_bytes(),
		}
	}

	/// Error response carrying the message and optional details.
	pub fn from_error(error: &Error) -> Self {
		let mut body = serde_json::json!({ "error": error.to_string() });

		if let Some(details) = error.details() {
			body["details"] = serde_json::Value::String(details);
		}

		Self::json(error.status_code(), &body)
	}

	/// Body decoded as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}
impl From<Result<GatewayResponse>> for GatewayResponse {
	fn from(result: Result<GatewayResponse>) -> Self {
		result.unwrap_or_else(|e| Self::from_error(&e))
	}
}

#[derive(Debug, Default, Deserialize)]
struct AccessTokenBody {
	#[serde(default)]
	oauth_token: Option<String>,
	#[serde(default)]
	oauth_verifier: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiProxyBody {
	#[serde(default)]
	method: Option<String>,
	#[serde(default)]
	path: Option<String>,
	#[serde(default)]
	query: Option<String>,
}

/// Bearer-authenticated entry points for the three broker operations.
pub struct Gateway<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Broker that performs the flows.
	pub broker: Broker<C>,
	verifier: Arc<dyn IdentityVerifier>,
}
impl<C> Gateway<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Wraps `broker`, resolving callers with `verifier`.
	pub fn new(broker: Broker<C>, verifier: Arc<dyn IdentityVerifier>) -> Self {
		Self { broker, verifier }
	}

	/// `POST /request-token`: starts the flow and returns `{"authorize_url": ...}`.
	pub async fn request_token(&self, authorization: Option<&str>) -> GatewayResponse {
		self.try_request_token(authorization).await.into()
	}

	/// `POST /access-token`: exchanges `{oauth_token, oauth_verifier}` and returns
	/// `{"discogs_username": ...}`.
	pub async fn access_token(&self, authorization: Option<&str>, body: &[u8]) -> GatewayResponse {
		self.try_access_token(authorization, body).await.into()
	}

	/// `POST /api-proxy`: forwards `{method?, path, query?}` and relays the upstream response.
	pub async fn api_proxy(&self, authorization: Option<&str>, body: &[u8]) -> GatewayResponse {
		self.try_api_proxy(authorization, body).await.into()
	}

	async fn try_request_token(&self, authorization: Option<&str>) -> Result<GatewayResponse> {
		let owner = self.authenticate(authorization).await?;
		let redirect = self.broker.request_token(&owner).await?;

		Ok(GatewayResponse::json(
			200,
			&serde_json::json!({ "authorize_url": redirect.authorize_url.as_str() }),
		))
	}

	async fn try_access_token(
		&self,
		authorization: Option<&str>,
		body: &[u8],
	) -> Result<GatewayResponse> {
		let owner = self.authenticate(authorization).await?;
		let body: AccessTokenBody = parse_body(body)?;
		let callback = match (body.oauth_token, body.oauth_verifier) {
			(Some(token), Some(verifier)) => VerifierCallback::new(token, verifier),
			_ =>
				return Err(Error::MissingParameters {
					reason: "oauth_token and oauth_verifier are required".into(),
				}),
		};
		let account = self.broker.exchange_access_token(&owner, callback).await?;

		Ok(GatewayResponse::json(
			200,
			&serde_json::json!({ "discogs_username": account.remote_username }),
		))
	}

	async fn try_api_proxy(
		&self,
		authorization: Option<&str>,
		body: &[u8],
	) -> Result<GatewayResponse> {
		let owner = self.authenticate(authorization).await?;
		let body: ApiProxyBody = parse_body(body)?;
		let path = body
			.path
			.filter(|p| !p.is_empty())
			.ok_or_else(|| Error::MissingParameters { reason: "Missing path parameter".into() })?;
		let request = ProxyRequest { method: body.method, path, query: body.query };
		let response = self.broker.proxy(&owner, request).await?;

		Ok(GatewayResponse {
			status: response.status,
			content_type: response.content_type,
			body: response.body,
		})
	}

	async fn authenticate(&self, authorization: Option<&str>) -> Result<OwnerId> {
		let token = bearer_token(authorization)?;

		self.verifier.verify(token).await
	}
}
impl<C> Debug for Gateway<C>
where
	C: ?Sized + ProviderHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway").field("broker", &self.broker).finish()
	}
}

fn parse_body<T>(body: &[u8]) -> Result<T>
where
	T: Default + serde::de::DeserializeOwned,
{
	if body.iter().all(u8::is_ascii_whitespace) {
		return Ok(T::default());
	}

	crate::flows::decode_json(body).map_err(|reason| Error::InvalidParameters { reason })
}
