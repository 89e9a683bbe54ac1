//! `Authorization: OAuth ...` header assembly (RFC 5849 §3.5.1).

// self
use crate::signing::{OAUTH_PREFIX, encode::percent_encode};

/// Renders the `oauth_*` entries of `params` as `OAuth k1="v1", k2="v2"`, sorted by key.
///
/// Names without the protocol prefix are skipped.
pub fn authorization_header<'a, I>(params: I) -> String
where
	I: IntoIterator<Item = (&'a str, &'a str)>,
{
	let mut entries: Vec<(String, String)> = params
		.into_iter()
		.filter(|(key, _)| key.starts_with(OAUTH_PREFIX))
		.map(|(key, value)| (percent_encode(key), percent_encode(value)))
		.collect();

	entries.sort();

	let rendered: Vec<String> =
		entries.into_iter().map(|(key, value)| format!("{key}=\"{value}\"")).collect();

	format!("OAuth {}", rendered.join(", "))
}
