//! Identifier of the local resource owner the broker acts for.
//!
//! Owners come from the identity collaborator (for example the `sub` claim of a verified
//! bearer token) and key both token tables, so the id must survive a round trip through
//! headers, JSON, and storage keys unchanged.

// self
use crate::_prelude::*;

/// Longest subject id accepted, in bytes.
pub const OWNER_ID_MAX_LEN: usize = 255;

/// Subject id of a local user, as resolved by an [`IdentityVerifier`].
///
/// [`IdentityVerifier`]: crate::gateway::IdentityVerifier
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);
impl OwnerId {
	/// Validates `subject` and wraps it.
	pub fn new(subject: impl Into<String>) -> Result<Self, OwnerIdError> {
		let subject = subject.into();

		check_subject(&subject)?;

		Ok(Self(subject))
	}

	/// Subject id as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for OwnerId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl TryFrom<String> for OwnerId {
	type Error = OwnerIdError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl From<OwnerId> for String {
	fn from(value: OwnerId) -> Self {
		value.0
	}
}
impl FromStr for OwnerId {
	type Err = OwnerIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for OwnerId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Owner({})", self.0)
	}
}
impl Display for OwnerId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Reasons a subject id is refused.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum OwnerIdError {
	/// No subject was supplied.
	#[error("Owner id is empty.")]
	Empty,
	/// Whitespace or control characters would not survive headers and storage keys intact.
	#[error("Owner id contains a whitespace or control character at byte {index}.")]
	ForbiddenCharacter {
		/// Byte offset of the first offending character.
		index: usize,
	},
	/// The subject is longer than [`OWNER_ID_MAX_LEN`] bytes.
	#[error("Owner id is {len} bytes long; at most {OWNER_ID_MAX_LEN} are allowed.")]
	TooLong {
		/// Actual length in bytes.
		len: usize,
	},
}

fn check_subject(subject: &str) -> Result<(), OwnerIdError> {
	if subject.is_empty() {
		return Err(OwnerIdError::Empty);
	}
	if subject.len() > OWNER_ID_MAX_LEN {
		return Err(OwnerIdError::TooLong { len: subject.len() });
	}
	if let Some((index, _)) =
		subject.char_indices().find(|(_, c)| c.is_whitespace() || c.is_control())
	{
		return Err(OwnerIdError::ForbiddenCharacter { index });
	}

	Ok(())
}
