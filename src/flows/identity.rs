//! Best-effort identity lookup performed right after the exchange.

// self
use crate::{
	_prelude::*,
	auth::{RemoteIdentity, TokenSecret},
	flows::{Broker, common},
	http::ProviderHttpClient,
	provider::ProviderEndpoint,
	signing::SigningContext,
};

/// Outcome of the identity lookup. Failure never aborts the exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdentityLookup {
	/// The provider reported who the access token belongs to.
	Found(RemoteIdentity),
	/// The lookup failed; the access token is stored with an empty identity.
	Unavailable {
		/// Human-readable failure description.
		reason: String,
	},
}
impl IdentityLookup {
	/// Whether the provider answered with an identity.
	pub fn is_found(&self) -> bool {
		matches!(self, Self::Found(_))
	}

	/// The identity, or an empty one when the lookup failed.
	pub fn into_identity(self) -> RemoteIdentity {
		match self {
			Self::Found(identity) => identity,
			Self::Unavailable { .. } => RemoteIdentity::default(),
		}
	}
}

#[derive(Debug, Deserialize)]
struct IdentityBody {
	#[serde(default)]
	id: Option<u64>,
	#[serde(default)]
	username: Option<String>,
}

impl<C> Broker<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Asks the identity endpoint who `token` belongs to.
	pub async fn lookup_identity(&self, token: &str, token_secret: &TokenSecret) -> IdentityLookup {
		let endpoint = ProviderEndpoint::Identity;
		let context = SigningContext::new("GET", self.descriptor.endpoint(endpoint), &self.consumer)
			.with_token(token, token_secret);
		let response = match self.send_signed(context, None).await {
			Ok(response) => response,
			Err(e) => return IdentityLookup::Unavailable { reason: e.to_string() },
		};

		if !response.is_success() {
			return IdentityLookup::Unavailable {
				reason: format!("identity endpoint answered with status {}", response.status),
			};
		}

		match parse_identity(&response.body) {
			Ok(identity) => IdentityLookup::Found(identity),
			Err(reason) => IdentityLookup::Unavailable { reason },
		}
	}
}

/// Parses an identity payload, reporting the JSON path of any decoding failure.
pub fn parse_identity(body: &[u8]) -> Result<RemoteIdentity, String> {
	let parsed: IdentityBody = common::decode_json(body)?;

	Ok(RemoteIdentity { username: parsed.username.unwrap_or_default(), id: parsed.id })
}
