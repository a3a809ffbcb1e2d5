//! Expiry-aware credential cache with pluggable storage and refresh-on-miss semantics.
//!
//! [`CredentialCache::resolve`] is the single entry point: it consults the caller's get hook (or
//! the in-memory store), refreshes through the supplied fetch strategy on a miss, and persists
//! through the caller's set hook (or the in-memory store). Concurrent misses for the same kind
//! are NOT serialized; duplicate fetches and last-write-wins on the store are accepted because
//! credential fetches are idempotent and cheap relative to request volume.

// self
use crate::{
	_prelude::*,
	credential::{CredentialKind, CredentialRecord},
	fetch::FetchCredential,
	obs::{self, RefreshOutcome, RefreshSpan},
	store::{MemoryStore, StorageHooks},
};

/// Shared two-tier credential cache.
///
/// Clones share the same underlying entries, so the ticket strategy can resolve its access token
/// through the same cache instance the request handler owns. Each handler owns its cache; there
/// is no ambient process-wide state.
#[derive(Clone, Debug, Default)]
pub struct CredentialCache {
	store: MemoryStore,
}
impl CredentialCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Read access to the in-memory store, mainly for tests and diagnostics.
	pub fn store(&self) -> &MemoryStore {
		&self.store
	}

	/// Clears every in-memory entry; caller-supplied hooks are unaffected.
	pub fn clear(&self) {
		self.store.clear();
	}

	/// Returns a valid credential value, refreshing through `fetcher` when needed.
	///
	/// Lookup order:
	/// 1. A present get hook owns reads: a non-empty value is returned immediately with no expiry
	///    check, an empty or absent one falls through to a refresh (the in-memory store is never
	///    consulted).
	/// 2. Otherwise a fresh in-memory record at `reference_time` is returned.
	/// 3. Otherwise `fetcher` is awaited once; the result goes to the set hook when present, to
	///    the in-memory store otherwise.
	///
	/// A fetch failure propagates and writes nothing. At most one outbound fetch happens per
	/// call.
	pub async fn resolve(
		&self,
		kind: CredentialKind,
		hint: Option<&str>,
		hooks: &StorageHooks,
		fetcher: &dyn FetchCredential,
		reference_time: OffsetDateTime,
	) -> Result<String> {
		let span = RefreshSpan::new(kind, "resolve");

		span.instrument(async move {
			if let Some(get) = &hooks.get {
				if let Some(value) = get.get(hint).await?.filter(|value| !value.is_empty()) {
					return Ok(value);
				}
			} else if let Some(record) = self.store.load(kind) {
				if record.is_fresh_at(reference_time) {
					return Ok(record.value.expose().to_owned());
				}
			}

			obs::record_refresh_outcome(kind, RefreshOutcome::Attempt);

			let result = self.refresh(kind, hooks, fetcher).await;

			match &result {
				Ok(_) => obs::record_refresh_outcome(kind, RefreshOutcome::Success),
				Err(_) => obs::record_refresh_outcome(kind, RefreshOutcome::Failure),
			}

			result
		})
		.await
	}

	async fn refresh(
		&self,
		kind: CredentialKind,
		hooks: &StorageHooks,
		fetcher: &dyn FetchCredential,
	) -> Result<String> {
		// Stamped before the outbound call so the record ages from the fetch start, not its
		// completion.
		let obtained_at = OffsetDateTime::now_utc();
		let fresh = fetcher.fetch().await?;
		let expires_in = fresh.expires_in.unwrap_or(Duration::ZERO);

		if let Some(set) = &hooks.set {
			set.set(&fresh.value, expires_in).await?;
		} else {
			let record = CredentialRecord::new(fresh.value.clone(), obtained_at, expires_in);

			self.store.save(kind, record);
		}

		Ok(fresh.value)
	}
}
