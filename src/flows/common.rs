//! Shared helpers for flow implementations (signed dispatch, token parsing, guards).

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{OwnerId, TokenSecret},
	flows::{Broker, PersistAction},
	http::{ProviderHttpClient, ProviderRequest, ProviderResponse},
	obs,
	provider::ProviderEndpoint,
	signing::SigningContext,
};

impl<C> Broker<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Signs `context` and sends it, overriding the content type when requested.
	pub(crate) async fn send_signed(
		&self,
		context: SigningContext<'_>,
		content_type: Option<&str>,
	) -> Result<ProviderResponse> {
		let signed = context.sign(self.nonce_source.as_ref())?;
		let mut request = ProviderRequest::from_signed(signed, &self.descriptor.user_agent);

		if let Some(content_type) = content_type {
			request = request.with_content_type(content_type);
		}

		self.http_client.execute(request).await
	}

	/// Applies transition actions to the stores, strictly in order.
	pub(crate) async fn apply_actions(&self, actions: Vec<PersistAction>) -> Result<()> {
		for action in actions {
			match action {
				PersistAction::UpsertRequestToken(request) =>
					self.request_tokens.upsert(request).await?,
				PersistAction::UpsertAccessToken(access) =>
					self.access_tokens.upsert(access).await?,
				PersistAction::DeleteRequestToken(owner) => {
					self.request_tokens.delete(&owner).await?;
				},
			}
		}

		Ok(())
	}
}

/// Returns (and creates on demand) the exchange guard for an owner.
pub(crate) fn flow_guard<C>(broker: &Broker<C>, owner: &OwnerId) -> Arc<AsyncMutex<()>>
where
	C: ?Sized + ProviderHttpClient,
{
	let mut guards = broker.flow_guards.lock();

	guards.entry(owner.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
}

/// Hands back a guard taken with [`flow_guard`], dropping the owner's entry once nobody else
/// holds or waits on it.
pub(crate) fn release_flow_guard<C>(broker: &Broker<C>, owner: &OwnerId, guard: Arc<AsyncMutex<()>>)
where
	C: ?Sized + ProviderHttpClient,
{
	let mut guards = broker.flow_guards.lock();

	// The map and `guard` are the only two references; clones are only made under this lock.
	if Arc::strong_count(&guard) == 2 {
		guards.remove(owner);
	}
}

/// Rejects non-success responses from `endpoint`, keeping the body for diagnostics.
pub(crate) fn ensure_success(
	endpoint: ProviderEndpoint,
	response: ProviderResponse,
) -> Result<ProviderResponse> {
	if response.is_success() {
		return Ok(response);
	}

	obs::warn_upstream_rejected(endpoint, response.status);

	Err(Error::UpstreamRejected { endpoint, status: response.status, body: response.text() })
}

/// Extracts `oauth_token` and `oauth_token_secret` from a form-encoded token response.
pub(crate) fn parse_token_pair(
	endpoint: ProviderEndpoint,
	response: &ProviderResponse,
) -> Result<(String, TokenSecret)> {
	let mut token = None;
	let mut secret = None;

	for (key, value) in url::form_urlencoded::parse(&response.body) {
		match key.as_ref() {
			"oauth_token" => token = Some(value.into_owned()),
			"oauth_token_secret" => secret = Some(value.into_owned()),
			_ => {},
		}
	}

	match (token.filter(|t| !t.is_empty()), secret.filter(|s| !s.is_empty())) {
		(Some(token), Some(secret)) => Ok((token, TokenSecret::new(secret))),
		_ => Err(Error::InvalidProviderResponse {
			endpoint,
			reason: "response is missing oauth_token or oauth_token_secret".into(),
		}),
	}
}

/// Decodes a JSON body, reporting the path of the first field that failed.
pub(crate) fn decode_json<T>(body: &[u8]) -> Result<T, String>
where
	T: DeserializeOwned,
{
	let deserializer = &mut serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(deserializer)
		.map_err(|e| format!("malformed JSON at `{}`: {}", e.path(), e.inner()))
}
