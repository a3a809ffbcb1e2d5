//! Optional observability helpers for credential refreshes.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `jssdk_signer.refresh` with the `credential`
//!   (kind) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `jssdk_signer_refresh_total` counter for every
//!   attempt/success/failure, labeled by `credential` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each refresh attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshOutcome {
	/// A cache miss started a refresh.
	Attempt,
	/// The refresh fetched and persisted a fresh value.
	Success,
	/// The refresh failed and the error propagated to the caller.
	Failure,
}
impl RefreshOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshOutcome::Attempt => "attempt",
			RefreshOutcome::Success => "success",
			RefreshOutcome::Failure => "failure",
		}
	}
}
impl Display for RefreshOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
