//! OAuth 1.0a HMAC-SHA1 request signing (RFC 5849 §3.4).
//!
//! [`SigningContext`] gathers everything that feeds a signature, and [`SigningContext::sign`]
//! runs the whole pipeline:
//!
//! 1. protocol, extra, and URL query parameters are merged into a [`CanonicalParameterSet`];
//! 2. the set is serialized and joined with the method and base URL into the base string;
//! 3. the base string is signed with `enc(consumer_secret)&enc(token_secret)`;
//! 4. the protocol parameters and the signature are rendered into the `Authorization` header.
//!
//! Every stage is also exposed on its own so callers can reproduce intermediate values when
//! debugging a provider's rejection.

pub mod base_string;
pub mod encode;
pub mod header;
pub mod hmac;
pub mod nonce;
pub mod params;

pub use base_string::*;
pub use encode::*;
pub use header::*;
pub use nonce::*;
pub use params::*;

// std
use std::iter;
// self
use crate::{
	_prelude::*,
	auth::{ConsumerCredential, TokenSecret},
	error::ConfigError,
};

/// Prefix shared by every protocol parameter.
pub const OAUTH_PREFIX: &str = "oauth_";
/// The only signature method the broker implements.
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
/// Protocol version sent as `oauth_version`.
pub const OAUTH_VERSION: &str = "1.0";

/// Inputs for signing one outbound request.
///
/// Borrowed from the broker for the duration of a single call and consumed by
/// [`SigningContext::sign`].
#[derive(Clone, Debug)]
pub struct SigningContext<'a> {
	/// HTTP method, uppercased on construction.
	pub method: String,
	/// Target URL; its query parameters take part in the signature.
	pub url: &'a Url,
	/// Application credential.
	pub consumer: &'a ConsumerCredential,
	/// `oauth_token`, absent for the request-token leg.
	pub token: Option<&'a str>,
	/// Secret paired with [`SigningContext::token`].
	pub token_secret: Option<&'a TokenSecret>,
	/// Additional signed parameters such as `oauth_callback` or `oauth_verifier`.
	pub extra_params: BTreeMap<String, String>,
}
impl<'a> SigningContext<'a> {
	/// Creates a context without a token.
	pub fn new(method: &str, url: &'a Url, consumer: &'a ConsumerCredential) -> Self {
		Self {
			method: method.to_ascii_uppercase(),
			url,
			consumer,
			token: None,
			token_secret: None,
			extra_params: BTreeMap::new(),
		}
	}

	/// Attaches a request or access token and its secret.
	pub fn with_token(mut self, token: &'a str, token_secret: &'a TokenSecret) -> Self {
		self.token = Some(token);
		self.token_secret = Some(token_secret);

		self
	}

	/// Adds one extra signed parameter, replacing any earlier value under the same name.
	pub fn with_extra_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra_params.insert(key.into(), value.into());

		self
	}

	/// Signs with a fresh nonce and timestamp drawn from `source`.
	pub fn sign(&self, source: &dyn NonceSource) -> Result<SignedRequest, ConfigError> {
		self.sign_at(&source.nonce(), source.timestamp())
	}

	/// Signs with an explicit nonce and timestamp.
	pub fn sign_at(&self, nonce: &str, timestamp: i64) -> Result<SignedRequest, ConfigError> {
		let mut protocol = BTreeMap::from([
			("oauth_consumer_key".to_owned(), self.consumer.key.clone()),
			("oauth_nonce".to_owned(), nonce.to_owned()),
			("oauth_signature_method".to_owned(), SIGNATURE_METHOD.to_owned()),
			("oauth_timestamp".to_owned(), timestamp.to_string()),
			("oauth_version".to_owned(), OAUTH_VERSION.to_owned()),
		]);

		if let Some(token) = self.token {
			protocol.insert("oauth_token".to_owned(), token.to_owned());
		}

		let mut form_params = Vec::new();

		for (key, value) in &self.extra_params {
			// A colliding extra overrides the protocol value instead of duplicating it.
			if let Some(slot) = protocol.get_mut(key) {
				slot.clone_from(value);
			} else {
				form_params.push((key.clone(), value.clone()));
			}
		}

		let mut params = CanonicalParameterSet::new();

		params.extend(&protocol);
		params.extend(form_params.iter().map(|(k, v)| (k, v)));
		params.extend(self.url.query_pairs());

		let base_string = signature_base_string(
			&self.method,
			&base_url(self.url)?,
			&params.to_parameter_string(),
		);
		let key = hmac::signing_key(&self.consumer.secret, self.token_secret);
		let signature = hmac::sign(&key, &base_string)?;
		let authorization = authorization_header(
			protocol
				.iter()
				.map(|(k, v)| (k.as_str(), v.as_str()))
				.chain(iter::once(("oauth_signature", signature.as_str()))),
		);

		Ok(SignedRequest {
			method: self.method.clone(),
			url: self.url.clone(),
			authorization,
			signature,
			base_string,
			form_params,
		})
	}
}

/// Output of [`SigningContext::sign`], ready to hand to a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedRequest {
	/// Uppercased HTTP method.
	pub method: String,
	/// Target URL, query included.
	pub url: Url,
	/// Complete `Authorization` header value.
	pub authorization: String,
	/// Base64 HMAC-SHA1 signature.
	pub signature: String,
	/// Signature base string, kept for diagnostics.
	pub base_string: String,
	/// Signed extra parameters that are not part of the header.
	pub form_params: Vec<(String, String)>,
}
impl SignedRequest {
	/// Extra parameters as an `application/x-www-form-urlencoded` body, if there are any.
	pub fn form_body(&self) -> Option<String> {
		if self.form_params.is_empty() {
			return None;
		}

		let body = url::form_urlencoded::Serializer::new(String::new())
			.extend_pairs(self.form_params.iter())
			.finish();

		Some(body)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Signing fixture URL should parse.")
	}

	fn consumer(key: &str, secret: &str) -> ConsumerCredential {
		ConsumerCredential::new(key, secret).expect("Consumer fixture should be valid.")
	}

	#[test]
	fn reference_vector_with_token_and_query() {
		let url = url("https://api.example.com/resource?a=1");
		let consumer = consumer("dpf43f3p2l4k3l03", "kd94hf93k423kf44");
		let secret = TokenSecret::new("pfkkdhi9sl3r4s00");
		let signed = SigningContext::new("get", &url, &consumer)
			.with_token("nnch734d00sl2jdk", &secret)
			.sign_at("kllo9940pd9333jh", 1_191_242_096)
			.expect("Reference vector should sign.");

		assert_eq!(
			signed.base_string,
			"GET&https%3A%2F%2Fapi.example.com%2Fresource&a%3D1%26oauth_consumer_key%3Ddpf43f3p2l4k3l03%26oauth_nonce%3Dkllo9940pd9333jh%26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1191242096%26oauth_token%3Dnnch734d00sl2jdk%26oauth_version%3D1.0"
		);
		assert_eq!(signed.signature, "pQs92WOh1dxH7C6is0W9xnfTPjg=");
		assert_eq!(
			signed.authorization,
			"OAuth oauth_consumer_key=\"dpf43f3p2l4k3l03\", oauth_nonce=\"kllo9940pd9333jh\", oauth_signature=\"pQs92WOh1dxH7C6is0W9xnfTPjg%3D\", oauth_signature_method=\"HMAC-SHA1\", oauth_timestamp=\"1191242096\", oauth_token=\"nnch734d00sl2jdk\", oauth_version=\"1.0\""
		);
		assert_eq!(signed.method, "GET");
		assert!(signed.form_body().is_none());
	}

	#[test]
	fn published_twitter_vector() {
		let url = url("https://api.twitter.com/1.1/statuses/update.json?include_entities=true");
		let consumer = consumer(
			"xvz1evFS4wEEPTGEFPHBog",
			"kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
		);
		let secret = TokenSecret::new("LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE");
		let signed = SigningContext::new("POST", &url, &consumer)
			.with_token("370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb", &secret)
			.with_extra_param("status", "Hello Ladies + Gentlemen, a signed OAuth request!")
			.sign_at("kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg", 1_318_622_958)
			.expect("Twitter vector should sign.");

		assert_eq!(signed.signature, "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
		assert_eq!(
			signed.form_body().as_deref(),
			Some("status=Hello+Ladies+%2B+Gentlemen%2C+a+signed+OAuth+request%21")
		);
	}

	#[test]
	fn request_token_leg_signs_callback_without_token() {
		let url = url("https://api.discogs.com/oauth/request_token");
		let consumer = consumer("key", "secret");
		let signed = SigningContext::new("POST", &url, &consumer)
			.with_extra_param("oauth_callback", "oob")
			.sign_at("nonce", 1_700_000_000)
			.expect("Request token call should sign.");

		assert_eq!(signed.signature, "4dTRHzF9m/WUNNHWoE0yAwEgpyk=");
		assert!(!signed.authorization.contains("oauth_token="));
		assert!(!signed.authorization.contains("oauth_callback"));
		assert_eq!(signed.form_body().as_deref(), Some("oauth_callback=oob"));
	}

	#[test]
	fn verifier_is_signed_but_kept_out_of_the_header() {
		let url = url("https://api.discogs.com/oauth/access_token");
		let consumer = consumer("key", "secret");
		let secret = TokenSecret::new("rts1");
		let with_verifier = SigningContext::new("POST", &url, &consumer)
			.with_token("rt1", &secret)
			.with_extra_param("oauth_verifier", "X")
			.sign_at("nonce", 1_700_000_000)
			.expect("Exchange call should sign.");
		let without_verifier = SigningContext::new("POST", &url, &consumer)
			.with_token("rt1", &secret)
			.sign_at("nonce", 1_700_000_000)
			.expect("Exchange call should sign.");

		assert!(!with_verifier.authorization.contains("oauth_verifier"));
		assert!(with_verifier.base_string.contains("oauth_verifier%3DX"));
		assert_eq!(with_verifier.form_body().as_deref(), Some("oauth_verifier=X"));
		assert_ne!(with_verifier.signature, without_verifier.signature);
	}

	#[test]
	fn duplicate_query_keys_are_all_signed() {
		let url = url("http://example.com/r?b=2&a=3&a=1&c%21=x+y");
		let consumer = consumer("ck", "cs");
		let signed = SigningContext::new("GET", &url, &consumer)
			.sign_at("n", 1)
			.expect("Duplicate keys should sign.");

		let expected_prefix = concat!(
			"GET&http%3A%2F%2Fexample.com%2Fr&",
			"a%3D1%26a%3D3%26b%3D2%26c%2521%3Dx%2520y%26oauth_consumer_key",
		);

		assert!(signed.base_string.starts_with(expected_prefix));
	}

	#[test]
	fn colliding_extra_replaces_protocol_value() {
		let url = url("https://api.example.com/r");
		let consumer = consumer("ck", "cs");
		let signed = SigningContext::new("GET", &url, &consumer)
			.with_extra_param("oauth_version", "1.0a")
			.sign_at("n", 1)
			.expect("Override should sign.");

		assert!(signed.authorization.contains("oauth_version=\"1.0a\""));
		assert!(signed.base_string.contains("oauth_version%3D1.0a"));
		assert_eq!(signed.base_string.matches("oauth_version").count(), 1);
		assert!(signed.form_body().is_none());
	}

	#[test]
	fn nonce_source_feeds_the_protocol_parameters() {
		let url = url("https://api.example.com/r");
		let consumer = consumer("ck", "cs");
		let source = FixedNonceSource::new("fixed-nonce", 42);
		let signed = SigningContext::new("GET", &url, &consumer)
			.sign(&source)
			.expect("Fixed source should sign.");
		let expected = SigningContext::new("GET", &url, &consumer)
			.sign_at("fixed-nonce", 42)
			.expect("Explicit values should sign.");

		assert_eq!(signed, expected);
		assert!(signed.authorization.contains("oauth_nonce=\"fixed-nonce\""));
		assert!(signed.authorization.contains("oauth_timestamp=\"42\""));
	}
}
