//! Thread-safe in-memory [`TokenStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::OwnerId,
	store::{OwnedRecord, StoreError, StoreFuture, TokenStore},
};

type StoreMap<R> = Arc<RwLock<HashMap<OwnerId, R>>>;

/// Storage backend that keeps one row per owner in-process.
#[derive(Clone, Debug)]
pub struct MemoryStore<R>(StoreMap<R>);
impl<R> MemoryStore<R>
where
	R: OwnedRecord,
{
	/// Number of rows currently held.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Whether the store holds no rows.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn upsert_now(map: StoreMap<R>, record: R) -> Result<(), StoreError> {
		map.write().insert(record.owner().clone(), record);

		Ok(())
	}

	fn delete_now(map: StoreMap<R>, owner: OwnerId) -> bool {
		map.write().remove(&owner).is_some()
	}
}
impl<R> Default for MemoryStore<R> {
	fn default() -> Self {
		Self(Arc::new(RwLock::new(HashMap::new())))
	}
}
impl<R> TokenStore<R> for MemoryStore<R>
where
	R: OwnedRecord,
{
	fn fetch<'a>(&'a self, owner: &'a OwnerId) -> StoreFuture<'a, Option<R>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(owner).cloned()) })
	}

	fn upsert(&self, record: R) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::upsert_now(map, record) })
	}

	fn delete<'a>(&'a self, owner: &'a OwnerId) -> StoreFuture<'a, bool> {
		let map = self.0.clone();
		let owner = owner.to_owned();

		Box::pin(async move { Ok(Self::delete_now(map, owner)) })
	}
}
