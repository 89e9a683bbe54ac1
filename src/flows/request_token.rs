//! First leg: obtain a temporary credential and the authorize URL.

// self
use crate::{
	_prelude::*,
	auth::{OwnerId, RequestToken},
	flows::{Broker, FlowState, common},
	http::ProviderHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::ProviderEndpoint,
	signing::SigningContext,
};

/// Where to send the owner after the first leg.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRedirect {
	/// Owner the request token belongs to.
	pub owner: OwnerId,
	/// Freshly issued public request token.
	pub request_token: String,
	/// Provider authorize page with `oauth_token` appended.
	pub authorize_url: Url,
}

impl<C> Broker<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Requests a temporary credential for `owner` and persists it, superseding any pending one.
	///
	/// Concurrent calls for the same owner are last-writer-wins; the losing token later fails
	/// the exchange with [`Error::NoMatchingRequestToken`].
	pub async fn request_token(&self, owner: &OwnerId) -> Result<AuthorizationRedirect> {
		const KIND: FlowKind = FlowKind::RequestToken;

		let span = FlowSpan::new(KIND, "request_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let endpoint = ProviderEndpoint::RequestToken;
				let context =
					SigningContext::new("POST", self.descriptor.endpoint(endpoint), &self.consumer)
						.with_extra_param("oauth_callback", self.descriptor.callback.as_str());
				let response = self.send_signed(context, None).await?;
				let response = common::ensure_success(endpoint, response)?;
				let (token, secret) = common::parse_token_pair(endpoint, &response)?;
				let request = RequestToken::new(owner.clone(), &token, secret);
				let transition = FlowState::request_token_issued(request);

				self.apply_actions(transition.actions).await?;

				Ok(AuthorizationRedirect {
					owner: owner.clone(),
					authorize_url: self.descriptor.authorize_url(&token),
					request_token: token,
				})
			})
			.await;

		obs::record_flow_result(KIND, &result);

		result
	}
}
