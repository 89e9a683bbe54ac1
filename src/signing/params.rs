//! Canonical parameter normalization (RFC 5849 §3.4.1.3.2).

// self
use crate::{_prelude::*, signing::encode::percent_encode};

/// Merged, encoded parameter set that feeds the signature base string.
///
/// Entries are stored already percent-encoded; ordering is applied when the set is
/// serialized, so insertion order never affects the output.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CanonicalParameterSet {
	entries: Vec<(String, String)>,
}
impl CanonicalParameterSet {
	/// Creates an empty set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds one decoded parameter. Repeated names are kept as separate entries.
	pub fn push(&mut self, key: &str, value: &str) {
		self.entries.push((percent_encode(key), percent_encode(value)));
	}

	/// Adds every decoded pair from `pairs`.
	pub fn extend<I, K, V>(&mut self, pairs: I)
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		for (key, value) in pairs {
			self.push(key.as_ref(), value.as_ref());
		}
	}

	/// Number of entries, counting repeated names separately.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the set holds no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Serializes to `k1=v1&k2=v2`, sorted by encoded key and then encoded value.
	pub fn to_parameter_string(&self) -> String {
		let mut sorted: Vec<&(String, String)> = self.entries.iter().collect();

		sorted.sort();

		let mut buf = String::new();

		for (idx, (key, value)) in sorted.into_iter().enumerate() {
			if idx > 0 {
				buf.push('&');
			}

			buf.push_str(key);
			buf.push('=');
			buf.push_str(value);
		}

		buf
	}
}
impl Display for CanonicalParameterSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.to_parameter_string())
	}
}
