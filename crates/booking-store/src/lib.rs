//! # booking-store
//!
//! Async data-store boundary for the Pontedra booking calendar.
//!
//! `booking-core` is pure; this crate is where the I/O lives. It defines the
//! ports a backend adapter implements ([`AvailabilityStore`],
//! [`BookingWrite`]), fetches the three reads of a resolution cycle
//! concurrently with join semantics, and exposes the three-way
//! loading/resolved/failed state UIs render from. An in-memory store backs
//! the tests and enforces the slot-uniqueness constraint a real backend must
//! provide.
//!
//! ## Modules
//!
//! - [`ports`] — store traits, snapshot fetch, local-day boundaries
//! - [`service`] — per-provider fetch + resolve composition
//! - [`resolution`] — the `Loading | Resolved | Failed` caller state
//! - [`memory`] — in-memory store for tests and demos
//! - [`error`] — error types

pub mod error;
pub mod memory;
pub mod ports;
pub mod resolution;
pub mod service;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use ports::{fetch_snapshot, AvailabilityStore, BookingWrite, CalendarSnapshot};
pub use resolution::Resolution;
pub use service::AvailabilityService;
