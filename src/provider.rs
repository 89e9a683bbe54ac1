//! Provider-facing descriptors.
//!
//! [`ProviderDescriptor`] exposes validated metadata for an OAuth 1.0a provider: the
//! request-token, authorize, access-token, and identity endpoints, the base URL of its
//! REST API, the callback sent during the first leg, and the fixed `User-Agent` attached to
//! every outbound call.

pub mod descriptor;

pub use descriptor::*;
