//! Nonce and timestamp sources for signing operations.

// crates.io
use rand::{Rng, distr::Alphanumeric};
use time::OffsetDateTime;
// self
use crate::_prelude::*;

const NONCE_LEN: usize = 32;

/// Supplies the per-request `oauth_nonce` and `oauth_timestamp`.
pub trait NonceSource
where
	Self: Send + Sync,
{
	/// Fresh single-use nonce.
	fn nonce(&self) -> String;

	/// Current Unix timestamp in seconds.
	fn timestamp(&self) -> i64;
}

/// Production source: 32 alphanumeric characters from the thread-local CSPRNG plus the
/// system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemNonceSource;
impl NonceSource for SystemNonceSource {
	fn nonce(&self) -> String {
		rand::rng().sample_iter(Alphanumeric).take(NONCE_LEN).map(char::from).collect()
	}

	fn timestamp(&self) -> i64 {
		OffsetDateTime::now_utc().unix_timestamp()
	}
}

/// Deterministic source for reproducing signatures in tests and diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedNonceSource {
	/// Nonce returned for every request.
	pub nonce: String,
	/// Timestamp returned for every request.
	pub timestamp: i64,
}
impl FixedNonceSource {
	/// Creates a source that always yields the given pair.
	pub fn new(nonce: impl Into<String>, timestamp: i64) -> Self {
		Self { nonce: nonce.into(), timestamp }
	}
}
impl NonceSource for FixedNonceSource {
	fn nonce(&self) -> String {
		self.nonce.clone()
	}

	fn timestamp(&self) -> i64 {
		self.timestamp
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashSet;
	// self
	use super::*;

	#[test]
	fn system_nonces_are_alphanumeric_and_unique() {
		let source = SystemNonceSource;
		let nonces: HashSet<String> = (0..64).map(|_| source.nonce()).collect();

		assert_eq!(nonces.len(), 64);
		assert!(nonces.iter().all(|n| n.len() == NONCE_LEN));
		assert!(nonces.iter().all(|n| n.chars().all(|c| c.is_ascii_alphanumeric())));
	}

	#[test]
	fn system_timestamp_tracks_the_clock() {
		let before = OffsetDateTime::now_utc().unix_timestamp();
		let stamp = SystemNonceSource.timestamp();
		let after = OffsetDateTime::now_utc().unix_timestamp();

		assert!((before..=after).contains(&stamp));
	}

	#[test]
	fn fixed_source_repeats_its_values() {
		let source = FixedNonceSource::new("kllo9940pd9333jh", 1_191_242_096);

		assert_eq!(source.nonce(), "kllo9940pd9333jh");
		assert_eq!(source.nonce(), "kllo9940pd9333jh");
		assert_eq!(source.timestamp(), 1_191_242_096);
	}
}
