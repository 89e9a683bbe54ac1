//! Provider descriptor data structures and helpers shared by all flows.

/// Builder API for assembling provider descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::_prelude::*;

/// Default callback identifier for out-of-band (non-redirect) authorization.
pub const OUT_OF_BAND_CALLBACK: &str = "oob";
/// Default `User-Agent` sent to providers.
pub const DEFAULT_USER_AGENT: &str = concat!("oauth1-broker/", env!("CARGO_PKG_VERSION"));

/// Provider endpoints the broker talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderEndpoint {
	/// Temporary credential request endpoint.
	RequestToken,
	/// User authorization page.
	Authorize,
	/// Token exchange endpoint.
	AccessToken,
	/// Identity endpoint returning the connected account.
	Identity,
	/// General REST API reached through the proxy.
	Api,
}
impl ProviderEndpoint {
	/// Returns a stable label suitable for messages and span fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProviderEndpoint::RequestToken => "request_token",
			ProviderEndpoint::Authorize => "authorize",
			ProviderEndpoint::AccessToken => "access_token",
			ProviderEndpoint::Identity => "identity",
			ProviderEndpoint::Api => "api",
		}
	}
}
impl Display for ProviderEndpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Endpoint that issues temporary request tokens.
	pub request_token: Url,
	/// Page the resource owner visits to authorize the request token.
	pub authorize: Url,
	/// Endpoint that exchanges an authorized request token for an access token.
	pub access_token: Url,
	/// Endpoint that reports the identity behind an access token.
	pub identity: Url,
	/// Base URL that proxied API paths are appended to.
	pub api_base: Url,
}

/// Immutable provider descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Human-readable provider name used in logs and `Debug` output.
	pub name: String,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// `oauth_callback` value sent with every request-token call.
	pub callback: String,
	/// Fixed client identifier sent in the `User-Agent` header.
	pub user_agent: String,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provider called `name`.
	pub fn builder(name: impl Into<String>) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(name)
	}

	/// Descriptor for the Discogs OAuth 1.0a endpoints and REST API.
	pub fn discogs() -> Result<Self, ProviderDescriptorError> {
		Self::discogs_builder()?.build()
	}

	/// Builder pre-seeded with the Discogs endpoints so callers can override the callback or
	/// `User-Agent` before building.
	pub fn discogs_builder() -> Result<ProviderDescriptorBuilder, ProviderDescriptorError> {
		let builder = Self::builder("discogs")
			.request_token_endpoint(parse_endpoint(
				ProviderEndpoint::RequestToken,
				"https://api.discogs.com/oauth/request_token",
			)?)
			.authorize_endpoint(parse_endpoint(
				ProviderEndpoint::Authorize,
				"https://discogs.com/oauth/authorize",
			)?)
			.access_token_endpoint(parse_endpoint(
				ProviderEndpoint::AccessToken,
				"https://api.discogs.com/oauth/access_token",
			)?)
			.identity_endpoint(parse_endpoint(
				ProviderEndpoint::Identity,
				"https://api.discogs.com/oauth/identity",
			)?)
			.api_base(parse_endpoint(ProviderEndpoint::Api, "https://api.discogs.com")?);

		Ok(builder)
	}

	/// Returns the URL for `endpoint`.
	pub fn endpoint(&self, endpoint: ProviderEndpoint) -> &Url {
		match endpoint {
			ProviderEndpoint::RequestToken => &self.endpoints.request_token,
			ProviderEndpoint::Authorize => &self.endpoints.authorize,
			ProviderEndpoint::AccessToken => &self.endpoints.access_token,
			ProviderEndpoint::Identity => &self.endpoints.identity,
			ProviderEndpoint::Api => &self.endpoints.api_base,
		}
	}

	/// Authorize page URL carrying the freshly issued request token.
	pub fn authorize_url(&self, request_token: &str) -> Url {
		let mut url = self.endpoints.authorize.clone();

		url.query_pairs_mut().append_pair("oauth_token", request_token);

		url
	}

	/// Joins an API path (which must start with `/`) and optional raw query onto the API base.
	pub fn api_url(&self, path: &str, query: Option<&str>) -> Result<Url, url::ParseError> {
		let base = self.endpoints.api_base.as_str().trim_end_matches('/');
		let mut target = format!("{base}{path}");

		if let Some(query) = query.filter(|q| !q.is_empty()) {
			let separator = if target.contains('?') { '&' } else { '?' };

			target.push(separator);
			target.push_str(query.trim_start_matches('?'));
		}

		Url::parse(&target)
	}
}

fn parse_endpoint(endpoint: ProviderEndpoint, raw: &str) -> Result<Url, ProviderDescriptorError> {
	Url::parse(raw).map_err(|source| ProviderDescriptorError::InvalidEndpoint {
		endpoint: endpoint.as_str(),
		source,
	})
}
