//! Second leg: trade the authorized request token and verifier for an access token.
//!
//! The exchange runs under a per-owner guard and loads the pending row only once the guard is
//! held. A concurrent second exchange for the same owner therefore waits, then finds the row
//! already consumed and fails with [`Error::NoMatchingRequestToken`] instead of minting another
//! access token.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, OwnerId},
	flows::{Broker, FlowState, IdentityLookup, common},
	http::ProviderHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::ProviderEndpoint,
	signing::SigningContext,
};

/// Values the provider appends to the callback after the owner authorizes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierCallback {
	/// Request token being authorized.
	pub oauth_token: String,
	/// Verification code proving the owner approved it.
	pub oauth_verifier: String,
}
impl VerifierCallback {
	/// Creates a callback payload.
	pub fn new(oauth_token: impl Into<String>, oauth_verifier: impl Into<String>) -> Self {
		Self { oauth_token: oauth_token.into(), oauth_verifier: oauth_verifier.into() }
	}
}

/// Summary of a completed exchange. Carries no secrets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedAccount {
	/// Owner that connected the account.
	pub owner: OwnerId,
	/// Remote username, empty when the identity lookup failed.
	pub remote_username: String,
	/// Remote numeric id, when known.
	pub remote_user_id: Option<u64>,
}
impl From<&AccessToken> for ConnectedAccount {
	fn from(access: &AccessToken) -> Self {
		Self {
			owner: access.owner.clone(),
			remote_username: access.remote_username.clone(),
			remote_user_id: access.remote_user_id,
		}
	}
}

impl<C> Broker<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Exchanges the callback values for an access token and persists it for `owner`.
	///
	/// The pending request row is left untouched when the provider rejects the exchange and is
	/// deleted once the access row is stored, even if the identity lookup failed.
	pub async fn exchange_access_token(
		&self,
		owner: &OwnerId,
		callback: VerifierCallback,
	) -> Result<ConnectedAccount> {
		const KIND: FlowKind = FlowKind::AccessToken;

		let span = FlowSpan::new(KIND, "exchange_access_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				if callback.oauth_token.trim().is_empty()
					|| callback.oauth_verifier.trim().is_empty()
				{
					return Err(Error::MissingParameters {
						reason: "oauth_token and oauth_verifier are required".into(),
					});
				}

				let guard = common::flow_guard(self, owner);
				let exchanged = {
					let _exchange = guard.lock().await;

					self.exchange_locked(owner, &callback).await
				};

				common::release_flow_guard(self, owner, guard);

				exchanged
			})
			.await;

		obs::record_flow_result(KIND, &result);

		result
	}

	async fn exchange_locked(
		&self,
		owner: &OwnerId,
		callback: &VerifierCallback,
	) -> Result<ConnectedAccount> {
		let row = self.request_tokens.fetch(owner).await?;
		let state = FlowState::from_request_row(row).begin_exchange(&callback.oauth_token)?;
		let pending = state.request_token().cloned().ok_or(Error::NoMatchingRequestToken)?;
		let endpoint = ProviderEndpoint::AccessToken;
		let url = self.descriptor.endpoint(endpoint);
		let context = SigningContext::new("POST", url, &self.consumer)
			.with_token(&pending.token, &pending.token_secret)
			.with_extra_param("oauth_verifier", callback.oauth_verifier.as_str());
		let response = self.send_signed(context, None).await?;
		let response = common::ensure_success(endpoint, response)?;
		let (token, secret) = common::parse_token_pair(endpoint, &response)?;
		let lookup = self.lookup_identity(&token, &secret).await;

		if let IdentityLookup::Unavailable { reason } = &lookup {
			obs::warn_identity_unavailable(owner, reason);
		}

		let access = AccessToken::new(owner.clone(), token, secret, lookup.into_identity());
		let account = ConnectedAccount::from(&access);
		let transition = state.complete_exchange(access)?;

		self.apply_actions(transition.actions).await?;

		Ok(account)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::RequestToken,
		http::{HttpFuture, ProviderRequest, ProviderResponse},
		provider::ProviderDescriptor,
		store::{MemoryStore, TokenStore},
	};

	struct CannedProvider;
	impl ProviderHttpClient for CannedProvider {
		fn execute(&self, request: ProviderRequest) -> HttpFuture<'_, ProviderResponse> {
			let body = if request.url.path().ends_with("/access_token") {
				"oauth_token=at1&oauth_token_secret=ats1"
			} else {
				"{\"id\":7,\"username\":\"crate-digger\"}"
			};

			Box::pin(async move {
				Ok(ProviderResponse { status: 200, content_type: None, body: body.into() })
			})
		}
	}

	fn broker() -> (Broker<CannedProvider>, Arc<MemoryStore<RequestToken>>) {
		let request_tokens = Arc::new(MemoryStore::<RequestToken>::default());
		let descriptor = ProviderDescriptor::discogs_builder()
			.expect("Preset builder should parse.")
			.callback("needl://discogs-callback")
			.user_agent("Needl/1.0")
			.build()
			.expect("Descriptor should build.");
		let consumer =
			crate::auth::ConsumerCredential::new("ck", "cs").expect("Consumer should be valid.");
		let broker = Broker::with_http_client(
			request_tokens.clone(),
			Arc::new(MemoryStore::<AccessToken>::default()),
			descriptor,
			consumer,
			CannedProvider,
		);

		(broker, request_tokens)
	}

	#[tokio::test]
	async fn exchange_guards_are_dropped_once_idle() {
		let (broker, request_tokens) = broker();
		let owner = OwnerId::new("owner-guard").expect("Owner should be valid.");

		request_tokens
			.upsert(RequestToken::new(owner.clone(), "rt1", "rts1"))
			.await
			.expect("Seeding the request token should succeed.");

		let account = broker
			.exchange_access_token(&owner, VerifierCallback::new("rt1", "v1"))
			.await
			.expect("Exchange should succeed.");

		assert_eq!(account.remote_username, "crate-digger");
		assert!(broker.flow_guards.lock().is_empty());

		broker
			.exchange_access_token(&owner, VerifierCallback::new("rt1", "v1"))
			.await
			.expect_err("Replayed exchange should fail.");

		assert!(broker.flow_guards.lock().is_empty());
	}

	#[tokio::test]
	async fn guards_in_use_by_another_exchange_are_kept() {
		let (broker, _) = broker();
		let owner = OwnerId::new("owner-busy").expect("Owner should be valid.");
		let held = common::flow_guard(&broker, &owner);

		common::release_flow_guard(&broker, &owner, common::flow_guard(&broker, &owner));

		assert!(broker.flow_guards.lock().contains_key(&owner));

		common::release_flow_guard(&broker, &owner, held);

		assert!(broker.flow_guards.lock().is_empty());
	}
}
