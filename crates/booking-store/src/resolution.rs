//! The caller-facing resolution state.
//!
//! A UI driving a resolution cycle is in exactly one of three states:
//! still waiting on the fetch, resolved (possibly to zero bookable dates),
//! or failed. These are distinct — "no availability" must never render as
//! an error, and a failed fetch must never render as an empty calendar.

use crate::error::StoreError;

/// Discriminated state of an availability resolution cycle.
#[derive(Debug)]
pub enum Resolution<T> {
    /// The fetch has not completed yet.
    Loading,
    /// The fetch and computation completed. The payload may be empty.
    Resolved(T),
    /// A read query failed; no partial result is available.
    Failed(StoreError),
}

impl<T> Resolution<T> {
    /// Fold a completed fetch into its terminal state.
    pub fn from_result(result: Result<T, StoreError>) -> Self {
        match result {
            Ok(value) => Resolution::Resolved(value),
            Err(err) => Resolution::Failed(err),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Resolution::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Resolution::Failed(_))
    }

    /// The resolved payload, if this cycle completed successfully.
    pub fn resolved(&self) -> Option<&T> {
        match self {
            Resolution::Resolved(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Resolution::Loading => Resolution::Loading,
            Resolution::Resolved(value) => Resolution::Resolved(f(value)),
            Resolution::Failed(err) => Resolution::Failed(err),
        }
    }
}

impl<T> Default for Resolution<T> {
    fn default() -> Self {
        Resolution::Loading
    }
}
