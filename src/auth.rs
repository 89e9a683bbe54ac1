//! Auth-domain identifiers, secrets, and OAuth 1.0a credential models.

pub mod consumer;
pub mod owner;
pub mod secret;
pub mod token;

pub use consumer::*;
pub use owner::*;
pub use secret::*;
pub use token::*;
