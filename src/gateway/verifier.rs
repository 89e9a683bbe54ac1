//! Bearer-token identity verification.

// self
use crate::{_prelude::*, auth::OwnerId};

/// Boxed future returned by [`IdentityVerifier::verify`].
pub type VerifyFuture<'a> = Pin<Box<dyn Future<Output = Result<OwnerId>> + 'a + Send>>;

/// Resolves a caller's bearer token to the owner the broker acts for.
///
/// Implementations reject unknown or expired tokens with [`Error::MissingCredentials`].
pub trait IdentityVerifier
where
	Self: Send + Sync,
{
	/// Verifies `bearer` and returns its owner.
	fn verify<'a>(&'a self, bearer: &'a str) -> VerifyFuture<'a>;
}

/// Verifier backed by a fixed token-to-owner table.
#[derive(Clone, Default)]
pub struct StaticTokenVerifier {
	tokens: HashMap<String, OwnerId>,
}
impl StaticTokenVerifier {
	/// Creates an empty verifier that rejects every token.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `token` as a credential for `owner`.
	pub fn with_token(mut self, token: impl Into<String>, owner: OwnerId) -> Self {
		self.tokens.insert(token.into(), owner);

		self
	}
}
impl IdentityVerifier for StaticTokenVerifier {
	fn verify<'a>(&'a self, bearer: &'a str) -> VerifyFuture<'a> {
		Box::pin(async move {
			self.tokens
				.get(bearer)
				.cloned()
				.ok_or_else(|| Error::MissingCredentials { reason: "Invalid token".into() })
		})
	}
}
impl Debug for StaticTokenVerifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StaticTokenVerifier").field("tokens", &self.tokens.len()).finish()
	}
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str> {
	let header = header.map(str::trim).filter(|h| !h.is_empty()).ok_or_else(|| {
		Error::MissingCredentials { reason: "Missing authorization header".into() }
	})?;
	let (scheme, token) = header.split_once(' ').ok_or_else(|| Error::MissingCredentials {
		reason: "Authorization header must use the Bearer scheme".into(),
	})?;

	if !scheme.eq_ignore_ascii_case("bearer") {
		return Err(Error::MissingCredentials {
			reason: "Authorization header must use the Bearer scheme".into(),
		});
	}

	let token = token.trim();

	if token.is_empty() {
		return Err(Error::MissingCredentials { reason: "Bearer token is empty".into() });
	}

	Ok(token)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn bearer_header_is_parsed_case_insensitively() {
		assert_eq!(bearer_token(Some("Bearer abc")).expect("Valid header."), "abc");
		assert_eq!(bearer_token(Some("bearer   abc ")).expect("Padded header."), "abc");
	}

	#[test]
	fn malformed_headers_are_missing_credentials() {
		for header in [None, Some(""), Some("Bearer"), Some("Bearer  "), Some("Basic abc")] {
			assert!(
				matches!(bearer_token(header), Err(Error::MissingCredentials { .. })),
				"{header:?} should be rejected."
			);
		}
	}

	#[tokio::test]
	async fn static_verifier_maps_known_tokens_only() {
		let owner = OwnerId::new("owner-1").expect("Owner fixture should be valid.");
		let verifier = StaticTokenVerifier::new().with_token("jwt-1", owner.clone());

		assert_eq!(verifier.verify("jwt-1").await.expect("Known token."), owner);
		assert!(matches!(
			verifier.verify("jwt-2").await,
			Err(Error::MissingCredentials { .. })
		));
		assert!(!format!("{verifier:?}").contains("jwt-1"));
	}
}
