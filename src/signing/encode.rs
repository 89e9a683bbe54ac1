//! RFC 3986 percent-encoding as required by OAuth 1.0a.

// crates.io
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything except the unreserved set `A-Z a-z 0-9 - . _ ~`.
///
/// Sub-delimiters such as `! ' ( ) *` are escaped as well, unlike most URI encoders.
const OAUTH_ENCODE_SET: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encodes `input` with uppercase hex escapes, encoding space as `%20`.
pub fn percent_encode(input: &str) -> String {
	utf8_percent_encode(input, OAUTH_ENCODE_SET).to_string()
}
