//! Storage contracts and built-in store implementations for per-owner token rows.
//!
//! Both broker tables (temporary request tokens and durable access tokens) are keyed
//! single-slot stores: one row per owner, replaced on upsert. [`TokenStore`] captures that
//! contract once and is instantiated per record type.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::OwnerId};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Record that belongs to exactly one owner and is keyed by it.
pub trait OwnedRecord
where
	Self: 'static + Clone + Send + Sync,
{
	/// Owner key of the record.
	fn owner(&self) -> &OwnerId;
}

/// Keyed single-slot storage contract implemented by broker token stores.
pub trait TokenStore<R>
where
	Self: Send + Sync,
	R: OwnedRecord,
{
	/// Fetches the row stored for `owner`, if present.
	fn fetch<'a>(&'a self, owner: &'a OwnerId) -> StoreFuture<'a, Option<R>>;

	/// Inserts the record, replacing any row stored for the same owner.
	fn upsert(&self, record: R) -> StoreFuture<'_, ()>;

	/// Deletes the row stored for `owner`, returning whether one existed.
	fn delete<'a>(&'a self, owner: &'a OwnerId) -> StoreFuture<'a, bool>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures (e.g., serde_json) surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
