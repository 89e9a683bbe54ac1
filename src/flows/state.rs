//! Per-owner flow state machine.
//!
//! Transitions are pure: they take the state rebuilt from persisted rows plus the incoming
//! input and return the next state together with the [`PersistAction`]s the broker must apply,
//! in order, to make that state durable.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, OwnerId, RequestToken},
};

/// Where an owner stands in the three-legged flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowState {
	/// No pending request token.
	Unauthenticated,
	/// A request token was issued and awaits the verifier callback.
	RequestTokenIssued(RequestToken),
	/// The callback matched the pending request token; the exchange is in flight.
	Exchanging(RequestToken),
	/// The exchange succeeded and the access token is (about to be) persisted.
	AccessTokenIssued(AccessToken),
}
impl FlowState {
	/// Rebuilds the state from the owner's pending request-token row.
	pub fn from_request_row(row: Option<RequestToken>) -> Self {
		match row {
			Some(request) => Self::RequestTokenIssued(request),
			None => Self::Unauthenticated,
		}
	}

	/// Issues a fresh request token. Valid from every state; any pending row is superseded.
	pub fn request_token_issued(request: RequestToken) -> Transition {
		Transition {
			state: Self::RequestTokenIssued(request.clone()),
			actions: vec![PersistAction::UpsertRequestToken(request)],
		}
	}

	/// Starts the exchange when the callback's `oauth_token` matches the pending row.
	pub fn begin_exchange(self, oauth_token: &str) -> Result<Self> {
		match self {
			Self::RequestTokenIssued(request) if request.matches(oauth_token) =>
				Ok(Self::Exchanging(request)),
			_ => Err(Error::NoMatchingRequestToken),
		}
	}

	/// Completes an in-flight exchange with the freshly minted access token.
	///
	/// The access row is upserted before the request row is deleted, so a failed upsert never
	/// loses the pending credential.
	pub fn complete_exchange(self, access: AccessToken) -> Result<Transition> {
		match self {
			Self::Exchanging(request) if request.owner == access.owner => Ok(Transition {
				state: Self::AccessTokenIssued(access.clone()),
				actions: vec![
					PersistAction::UpsertAccessToken(access),
					PersistAction::DeleteRequestToken(request.owner),
				],
			}),
			_ => Err(Error::NoMatchingRequestToken),
		}
	}

	/// Request token tied to the state, if any.
	pub fn request_token(&self) -> Option<&RequestToken> {
		match self {
			Self::RequestTokenIssued(request) | Self::Exchanging(request) => Some(request),
			_ => None,
		}
	}
}

/// Storage mutation requested by a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PersistAction {
	/// Insert or replace the owner's pending request token.
	UpsertRequestToken(RequestToken),
	/// Insert or replace the owner's access token.
	UpsertAccessToken(AccessToken),
	/// Remove the owner's pending request token.
	DeleteRequestToken(OwnerId),
}

/// Result of a state transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
	/// State after the actions are applied.
	pub state: FlowState,
	/// Ordered storage mutations.
	pub actions: Vec<PersistAction>,
}
