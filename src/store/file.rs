//! Simple file-backed [`TokenStore`] for lightweight single-node deployments.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::OwnerId,
	store::{OwnedRecord, StoreError, StoreFuture, TokenStore},
};

/// Persists one row per owner to a JSON file after each mutation.
///
/// The snapshot is a JSON array of records, rewritten through a temporary file and an
/// atomic rename so a crash never leaves a half-written table behind. A mutation only becomes
/// visible in memory once its snapshot is on disk.
#[derive(Clone, Debug)]
pub struct FileStore<R> {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<OwnerId, R>>>,
}
impl<R> FileStore<R>
where
	R: OwnedRecord + Serialize + DeserializeOwned,
{
	/// Opens (or creates) a store at the provided path, eagerly loading existing rows.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the JSON snapshot.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<HashMap<OwnerId, R>, StoreError> {
		if !path.exists() {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.is_empty() {
			return Ok(HashMap::new());
		}

		let rows: Vec<R> = serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})?;

		Ok(rows.into_iter().map(|row| (row.owner().clone(), row)).collect())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &HashMap<OwnerId, R>) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let mut rows: Vec<&R> = contents.values().collect();

		rows.sort_by(|a, b| a.owner().cmp(b.owner()));

		let serialized =
			serde_json::to_vec_pretty(&rows).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl<R> TokenStore<R> for FileStore<R>
where
	R: OwnedRecord + Serialize + DeserializeOwned,
{
	fn fetch<'a>(&'a self, owner: &'a OwnerId) -> StoreFuture<'a, Option<R>> {
		Box::pin(async move { Ok(self.inner.read().get(owner).cloned()) })
	}

	fn upsert(&self, record: R) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let mut next = guard.clone();

			next.insert(record.owner().clone(), record);
			self.persist_locked(&next)?;
			*guard = next;

			Ok(())
		})
	}

	fn delete<'a>(&'a self, owner: &'a OwnerId) -> StoreFuture<'a, bool> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			if !guard.contains_key(owner) {
				return Ok(false);
			}

			let mut next = guard.clone();

			next.remove(owner);
			self.persist_locked(&next)?;
			*guard = next;

			Ok(true)
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;
	use crate::auth::{AccessToken, RemoteIdentity, RequestToken};

	fn temp_path(label: &str) -> PathBuf {
		let unique = format!(
			"oauth1_broker_file_store_{label}_{}_{}.json",
			process::id(),
			time::OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	fn owner(value: &str) -> OwnerId {
		OwnerId::new(value).expect("Failed to build owner fixture.")
	}

	#[test]
	fn upsert_and_reload_round_trip() {
		let path = temp_path("reload");
		let store: FileStore<AccessToken> =
			FileStore::open(&path).expect("Failed to open file store snapshot.");
		let record = AccessToken::new(
			owner("owner-file"),
			"at1",
			"ats1",
			RemoteIdentity { username: "digger".into(), id: Some(7) },
		);
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.upsert(record.clone()))
			.expect("Failed to save fixture record to file store.");
		drop(store);

		let reopened: FileStore<AccessToken> =
			FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let fetched = rt
			.block_on(reopened.fetch(&record.owner))
			.expect("Failed to fetch fixture record from file store.")
			.expect("File store lost record after reopen.");

		assert_eq!(fetched, record);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn upsert_replaces_and_delete_persists() {
		let path = temp_path("replace");
		let store: FileStore<RequestToken> =
			FileStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");
		let alice = owner("alice");

		rt.block_on(store.upsert(RequestToken::new(alice.clone(), "rt1", "rts1")))
			.expect("First upsert should succeed.");
		rt.block_on(store.upsert(RequestToken::new(alice.clone(), "rt2", "rts2")))
			.expect("Second upsert should succeed.");

		let reopened: FileStore<RequestToken> =
			FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let current = rt
			.block_on(reopened.fetch(&alice))
			.expect("Fetch should succeed.")
			.expect("Row should exist after upserts.");

		assert_eq!(current.token, "rt2");
		assert!(rt.block_on(reopened.delete(&alice)).expect("Delete should succeed."));
		assert!(!rt.block_on(reopened.delete(&alice)).expect("Second delete should succeed."));

		let emptied: FileStore<RequestToken> =
			FileStore::open(&path).expect("Failed to reopen file store snapshot.");

		assert!(rt.block_on(emptied.fetch(&alice)).expect("Fetch should succeed.").is_none());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn failed_writes_leave_memory_and_disk_unchanged() {
		let path = temp_path("failed_write");
		let store: FileStore<RequestToken> =
			FileStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");
		let alice = owner("alice");

		rt.block_on(store.upsert(RequestToken::new(alice.clone(), "rt1", "rts1")))
			.expect("Initial upsert should succeed.");

		let mut tmp_path = path.clone();

		tmp_path.set_extension("tmp");
		fs::create_dir(&tmp_path).expect("Failed to block the temporary snapshot path.");

		let upsert = rt.block_on(store.upsert(RequestToken::new(owner("bob"), "rt2", "rts2")));

		assert!(matches!(upsert, Err(StoreError::Backend { .. })));
		assert!(rt.block_on(store.fetch(&owner("bob"))).expect("Fetch should succeed.").is_none());

		let delete = rt.block_on(store.delete(&alice));

		assert!(matches!(delete, Err(StoreError::Backend { .. })));
		assert!(rt.block_on(store.fetch(&alice)).expect("Fetch should succeed.").is_some());

		fs::remove_dir(&tmp_path).expect("Failed to unblock the temporary snapshot path.");

		let reopened: FileStore<RequestToken> =
			FileStore::open(&path).expect("Failed to reopen file store snapshot.");

		assert!(rt.block_on(reopened.fetch(&alice)).expect("Fetch should succeed.").is_some());
		assert!(
			rt.block_on(reopened.fetch(&owner("bob"))).expect("Fetch should succeed.").is_none()
		);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
