//! Cached credential records and the freshly fetched values that produce them.

// self
use crate::{_prelude::*, credential::secret::CredentialSecret};

/// Value returned by a fetch strategy before it is cached.
///
/// An absent `expires_in` is recorded as zero, which makes the resulting record expire
/// immediately and forces a refresh on every subsequent resolve.
#[derive(Clone)]
pub struct FreshCredential {
	/// Credential value issued by the endpoint.
	pub value: String,
	/// Relative lifetime reported by the endpoint, when present.
	pub expires_in: Option<Duration>,
}
impl FreshCredential {
	/// Wraps a freshly fetched value and its optional lifetime.
	pub fn new(value: impl Into<String>, expires_in: Option<Duration>) -> Self {
		Self { value: value.into(), expires_in }
	}
}
impl Debug for FreshCredential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FreshCredential")
			.field("value", &"<redacted>")
			.field("expires_in", &self.expires_in)
			.finish()
	}
}

/// Cached credential plus the bookkeeping needed for dependent expiry checks.
#[derive(Clone, Debug)]
pub struct CredentialRecord {
	/// Credential value; callers must avoid logging it.
	pub value: CredentialSecret,
	/// Instant the value was fetched, stamped before the outbound call started.
	pub obtained_at: OffsetDateTime,
	/// Relative lifetime reported by the endpoint; zero means always expired.
	pub expires_in: Duration,
}
impl CredentialRecord {
	/// Builds a record from a fetch result and its fetch instant.
	pub fn new(value: impl Into<String>, obtained_at: OffsetDateTime, expires_in: Duration) -> Self {
		Self { value: CredentialSecret::new(value), obtained_at, expires_in }
	}

	/// Returns `true` if the record is still valid at the provided instant.
	///
	/// A zero `expires_in` is never fresh, so such records force a refresh on every call.
	pub fn is_fresh_at(&self, instant: OffsetDateTime) -> bool {
		if self.expires_in.is_zero() {
			return false;
		}

		instant - self.obtained_at <= self.expires_in
	}
}
