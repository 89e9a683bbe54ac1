// self
use crate::{
	_prelude::*,
	provider::{
		DEFAULT_USER_AGENT, OUT_OF_BAND_CALLBACK, ProviderDescriptor, ProviderEndpoint,
		ProviderEndpoints,
	},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ProviderDescriptorError {
	/// A required endpoint was never configured.
	#[error("Missing {endpoint} endpoint.")]
	MissingEndpoint {
		/// Which endpoint is missing.
		endpoint: &'static str,
	},
	/// A preset endpoint failed to parse.
	#[error("The {endpoint} endpoint is not a valid URL.")]
	InvalidEndpoint {
		/// Which endpoint failed to parse.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoints must use HTTPS (plain HTTP is only accepted for loopback hosts).
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// The `oauth_callback` value is blank.
	#[error("Callback must not be blank.")]
	BlankCallback,
	/// The `User-Agent` value is blank.
	#[error("User-Agent must not be blank.")]
	BlankUserAgent,
	/// The provider name is blank.
	#[error("Provider name must not be blank.")]
	BlankName,
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Name of the provider being described.
	pub name: String,
	/// Request-token endpoint.
	pub request_token_endpoint: Option<Url>,
	/// Authorize page.
	pub authorize_endpoint: Option<Url>,
	/// Access-token endpoint.
	pub access_token_endpoint: Option<Url>,
	/// Identity endpoint.
	pub identity_endpoint: Option<Url>,
	/// REST API base URL.
	pub api_base: Option<Url>,
	/// `oauth_callback` value (defaults to `oob`).
	pub callback: String,
	/// `User-Agent` header value.
	pub user_agent: String,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder for the provider called `name`.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			request_token_endpoint: None,
			authorize_endpoint: None,
			access_token_endpoint: None,
			identity_endpoint: None,
			api_base: None,
			callback: OUT_OF_BAND_CALLBACK.into(),
			user_agent: DEFAULT_USER_AGENT.into(),
		}
	}

	/// Sets the request-token endpoint.
	pub fn request_token_endpoint(mut self, url: Url) -> Self {
		self.request_token_endpoint = Some(url);

		self
	}

	/// Sets the authorize page.
	pub fn authorize_endpoint(mut self, url: Url) -> Self {
		self.authorize_endpoint = Some(url);

		self
	}

	/// Sets the access-token endpoint.
	pub fn access_token_endpoint(mut self, url: Url) -> Self {
		self.access_token_endpoint = Some(url);

		self
	}

	/// Sets the identity endpoint.
	pub fn identity_endpoint(mut self, url: Url) -> Self {
		self.identity_endpoint = Some(url);

		self
	}

	/// Sets the REST API base URL.
	pub fn api_base(mut self, url: Url) -> Self {
		self.api_base = Some(url);

		self
	}

	/// Overrides the `oauth_callback` sent with request-token calls.
	pub fn callback(mut self, callback: impl Into<String>) -> Self {
		self.callback = callback.into();

		self
	}

	/// Overrides the `User-Agent` header.
	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = user_agent.into();

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let endpoints = ProviderEndpoints {
			request_token: require(ProviderEndpoint::RequestToken, self.request_token_endpoint)?,
			authorize: require(ProviderEndpoint::Authorize, self.authorize_endpoint)?,
			access_token: require(ProviderEndpoint::AccessToken, self.access_token_endpoint)?,
			identity: require(ProviderEndpoint::Identity, self.identity_endpoint)?,
			api_base: require(ProviderEndpoint::Api, self.api_base)?,
		};
		let descriptor = ProviderDescriptor {
			name: self.name,
			endpoints,
			callback: self.callback,
			user_agent: self.user_agent,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		for endpoint in [
			ProviderEndpoint::RequestToken,
			ProviderEndpoint::Authorize,
			ProviderEndpoint::AccessToken,
			ProviderEndpoint::Identity,
			ProviderEndpoint::Api,
		] {
			validate_endpoint(endpoint, self.endpoint(endpoint))?;
		}

		if self.name.trim().is_empty() {
			return Err(ProviderDescriptorError::BlankName);
		}
		if self.callback.trim().is_empty() {
			return Err(ProviderDescriptorError::BlankCallback);
		}
		if self.user_agent.trim().is_empty() {
			return Err(ProviderDescriptorError::BlankUserAgent);
		}

		Ok(())
	}
}

fn require(endpoint: ProviderEndpoint, url: Option<Url>) -> Result<Url, ProviderDescriptorError> {
	url.ok_or(ProviderDescriptorError::MissingEndpoint { endpoint: endpoint.as_str() })
}

fn validate_endpoint(endpoint: ProviderEndpoint, url: &Url) -> Result<(), ProviderDescriptorError> {
	let loopback = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));

	match url.scheme() {
		"https" => Ok(()),
		"http" if loopback => Ok(()),
		_ => Err(ProviderDescriptorError::InsecureEndpoint {
			endpoint: endpoint.as_str(),
			url: url.to_string(),
		}),
	}
}
