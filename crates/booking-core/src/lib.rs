//! # booking-core
//!
//! Availability resolution and slot generation for the Pontedra booking
//! calendar.
//!
//! Given a provider's weekly recurring rules, date-specific exceptions, and
//! existing appointments, this crate computes which forward calendar dates
//! are bookable and which fixed-length time slots within a date are still
//! free. Everything here is pure: the caller fetches the data and supplies
//! the clock, this crate does the interval math.
//!
//! ## Modules
//!
//! - [`resolver`] — recurring rules + exceptions → bookable-date horizon
//! - [`slots`] — one chosen date → annotated slot list
//! - [`model`] — rules, exceptions, appointments, and the derived rows
//! - [`timeutil`] — stored-time parsing and provider-local projections
//! - [`error`] — error types
//!
//! ## A note on booking
//!
//! Turning a free slot into a persisted appointment is a check-then-act
//! sequence: between generating the slot list and writing the booking,
//! another client may take the slot. This crate gives no transactional
//! guarantee — the persistence layer must enforce uniqueness on
//! (provider, start time) over non-cancelled appointments and surface the
//! collision as a typed error (see `booking-store`).

pub mod error;
pub mod model;
pub mod resolver;
pub mod slots;
pub mod timeutil;

pub use error::BookingError;
pub use model::{
    Appointment, AppointmentStatus, ExceptionRule, RecurringRule, ResolvedDate, ServiceWindow,
    Slot,
};
pub use resolver::{resolve_dates, ResolverConfig, RuleMatch};
pub use slots::generate_slots;
