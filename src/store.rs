//! Storage contracts for caller-managed credential persistence plus the built-in memory store.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::_prelude::*;

/// Boxed future returned by storage hook implementations.
pub type HookFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, HookError>> + 'a + Send>>;

/// Caller-supplied lookup hook for a single credential kind.
///
/// When present, the hook fully owns reads for its credential: a non-empty value is trusted
/// as-is with no expiry check, and the in-memory store is never consulted. An empty or absent
/// value means "no cache" and triggers a refresh.
pub trait GetCredentialHook
where
	Self: Send + Sync,
{
	/// Looks up the cached value, receiving the optional per-request hint (the target URL for
	/// ticket lookups).
	fn get<'a>(&'a self, hint: Option<&'a str>) -> HookFuture<'a, Option<String>>;
}

/// Caller-supplied persistence hook for a single credential kind.
///
/// When present, the hook fully owns writes for its credential; the in-memory store is bypassed,
/// not mirrored.
pub trait SetCredentialHook
where
	Self: Send + Sync,
{
	/// Persists a freshly fetched value together with its reported lifetime.
	fn set<'a>(&'a self, value: &'a str, expires_in: Duration) -> HookFuture<'a, ()>;
}

/// Optional get/set hook pair for one credential kind.
///
/// Presence is modeled explicitly: each side is an independent [`Option`], matching the
/// configuration surface where a caller may supply a getter without a setter or vice versa.
#[derive(Clone, Default)]
pub struct StorageHooks {
	/// Lookup hook, when the caller owns reads.
	pub get: Option<Arc<dyn GetCredentialHook>>,
	/// Persistence hook, when the caller owns writes.
	pub set: Option<Arc<dyn SetCredentialHook>>,
}
impl StorageHooks {
	/// Creates an empty hook pair; the in-memory store handles both sides.
	pub fn new() -> Self {
		Self::default()
	}

	/// Attaches a lookup hook.
	pub fn with_get(mut self, hook: Arc<dyn GetCredentialHook>) -> Self {
		self.get = Some(hook);

		self
	}

	/// Attaches a persistence hook.
	pub fn with_set(mut self, hook: Arc<dyn SetCredentialHook>) -> Self {
		self.set = Some(hook);

		self
	}
}
impl Debug for StorageHooks {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StorageHooks")
			.field("get", &self.get.is_some())
			.field("set", &self.set.is_some())
			.finish()
	}
}

/// Error type produced by [`GetCredentialHook`]/[`SetCredentialHook`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum HookError {
	/// Backend-level failure for the caller's storage engine.
	#[error("Storage hook failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
