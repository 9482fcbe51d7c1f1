//! Shared time helpers: strict string-time parsing and provider-local
//! projections of UTC instants.
//!
//! Stored rule/exception times are `HH:MM:SS` strings. Parsing is strict and
//! infallible at the call site: a malformed string yields `None`, and the
//! caller treats the record as non-matching instead of failing the whole
//! resolution pass.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::model::Appointment;

/// Parse a stored `HH:MM:SS` time string. Returns `None` on malformed input.
pub fn parse_hms(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S").ok()
}

/// The `HH:MM` key slots and appointment starts are matched on.
pub fn format_hm(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// The calendar date of a UTC instant in the provider's timezone.
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// The provider-local `HH:MM` start key of an appointment.
pub fn local_start_hm(appointment: &Appointment, tz: Tz) -> String {
    appointment
        .start_time
        .with_timezone(&tz)
        .format("%H:%M")
        .to_string()
}
