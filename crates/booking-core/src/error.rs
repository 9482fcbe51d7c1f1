//! Error types for booking-core operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    /// The slot interval was zero or otherwise unusable.
    #[error("Invalid slot interval: {0} minutes")]
    InvalidInterval(u32),
}

pub type Result<T> = std::result::Result<T, BookingError>;
