//! Thread-safe in-memory credential store used when no caller hooks are supplied.

// self
use crate::{
	_prelude::*,
	credential::{CredentialKind, CredentialRecord},
};

type StoreMap = Arc<RwLock<HashMap<CredentialKind, CredentialRecord>>>;

/// Default in-process store holding one record per credential kind.
///
/// Entries are overwritten on refresh, never deleted individually; [`clear`](MemoryStore::clear)
/// wipes every entry and exists for test isolation.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Returns the record for the kind, if one has been cached.
	pub fn load(&self, kind: CredentialKind) -> Option<CredentialRecord> {
		self.0.read().get(&kind).cloned()
	}

	/// Inserts or replaces the record for the kind.
	pub fn save(&self, kind: CredentialKind, record: CredentialRecord) {
		self.0.write().insert(kind, record);
	}

	/// Removes every cached record for every kind.
	///
	/// Has no effect on caller-supplied storage hooks.
	pub fn clear(&self) {
		self.0.write().clear();
	}

	/// Number of cached records.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no records are cached.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
