//! Signature base string construction (RFC 5849 §3.4.1).

// self
use crate::{_prelude::*, error::ConfigError, signing::encode::percent_encode};

/// Normalizes `url` to `scheme://host[:port]/path`.
///
/// Scheme and host come back lowercased from the URL parser, default ports are already
/// dropped by it, and query and fragment are stripped here.
pub fn base_url(url: &Url) -> Result<String, ConfigError> {
	let host = url.host_str().ok_or_else(|| ConfigError::InvalidSigningUrl {
		url: url.to_string(),
		reason: "missing host",
	})?;

	let mut buf = format!("{}://{host}", url.scheme());

	if let Some(port) = url.port() {
		buf.push(':');
		buf.push_str(&port.to_string());
	}

	buf.push_str(url.path());

	Ok(buf)
}

/// Joins method, base URL, and parameter string into the string that gets signed.
pub fn signature_base_string(method: &str, base_url: &str, parameter_string: &str) -> String {
	format!(
		"{}&{}&{}",
		method.to_ascii_uppercase(),
		percent_encode(base_url),
		percent_encode(parameter_string)
	)
}
