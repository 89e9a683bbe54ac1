//! Request and access token records persisted per owner.

// self
use crate::{
	_prelude::*,
	auth::{OwnerId, TokenSecret},
	store::OwnedRecord,
};

/// Temporary credential minted by the first leg and consumed by the exchange.
///
/// Field names serialize to the temporary-token table columns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestToken {
	/// Owner that started the flow.
	#[serde(rename = "user_id")]
	pub owner: OwnerId,
	/// Public request token value (`oauth_token`).
	#[serde(rename = "request_token")]
	pub token: String,
	/// Request token secret used to sign the exchange.
	#[serde(rename = "request_token_secret")]
	pub token_secret: TokenSecret,
}
impl RequestToken {
	/// Creates a new request token record.
	pub fn new(
		owner: OwnerId,
		token: impl Into<String>,
		token_secret: impl Into<TokenSecret>,
	) -> Self {
		Self { owner, token: token.into(), token_secret: token_secret.into() }
	}

	/// Whether the callback's `oauth_token` refers to this record.
	pub fn matches(&self, oauth_token: &str) -> bool {
		self.token == oauth_token
	}
}
impl OwnedRecord for RequestToken {
	fn owner(&self) -> &OwnerId {
		&self.owner
	}
}

/// Remote account details returned by the provider's identity endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteIdentity {
	/// Remote username; empty when the provider omitted it.
	#[serde(default)]
	pub username: String,
	/// Remote numeric user id, when present.
	#[serde(default)]
	pub id: Option<u64>,
}

/// Durable credential minted by the exchange leg and used to sign proxied calls.
///
/// Field names serialize to the access-token table columns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
	/// Owner the credential belongs to.
	#[serde(rename = "user_id")]
	pub owner: OwnerId,
	/// Remote username captured during the exchange, empty if identity lookup failed.
	#[serde(rename = "discogs_username", default)]
	pub remote_username: String,
	/// Remote numeric user id captured during the exchange.
	#[serde(rename = "discogs_user_id", default)]
	pub remote_user_id: Option<u64>,
	/// Public access token value.
	#[serde(rename = "access_token")]
	pub token: String,
	/// Access token secret; never leaves the signing boundary.
	#[serde(rename = "access_token_secret")]
	pub token_secret: TokenSecret,
}
impl AccessToken {
	/// Creates an access token record with the provided remote identity.
	pub fn new(
		owner: OwnerId,
		token: impl Into<String>,
		token_secret: impl Into<TokenSecret>,
		identity: RemoteIdentity,
	) -> Self {
		Self {
			owner,
			remote_username: identity.username,
			remote_user_id: identity.id,
			token: token.into(),
			token_secret: token_secret.into(),
		}
	}
}
impl OwnedRecord for AccessToken {
	fn owner(&self) -> &OwnerId {
		&self.owner
	}
}
