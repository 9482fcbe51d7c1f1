//! Error types for the store boundary.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    /// One of the resolution cycle's read queries failed. Distinct from a
    /// query that succeeds with zero rows — callers must never conflate the
    /// two.
    #[error("Failed to fetch {what}: {message}")]
    Fetch {
        what: &'static str,
        message: String,
    },

    /// The booking write hit the (provider, start time) uniqueness
    /// constraint: another client took the slot between the free check and
    /// this write.
    #[error("Slot at {start_time} is already taken for provider {provider_id}")]
    SlotTaken {
        provider_id: Uuid,
        start_time: DateTime<Utc>,
    },

    /// The provider id is not known to the store.
    #[error("Unknown provider: {0}")]
    ProviderUnknown(Uuid),

    /// A core computation rejected its inputs (e.g., a zero slot interval).
    #[error(transparent)]
    Core(#[from] booking_core::BookingError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
