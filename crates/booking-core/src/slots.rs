//! Slot generation: fixed-length candidate slots within one bookable date's
//! service window, annotated as booked and/or past.
//!
//! Pure given an explicit `now` — the caller supplies the clock instant, so
//! repeated calls over the same inputs are reproducible in tests.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::{BookingError, Result};
use crate::model::{Appointment, ServiceWindow, Slot};
use crate::timeutil::{format_hm, local_start_hm};

/// Generate the candidate slots for a single chosen date.
///
/// Slots step from `window.start` by `interval_minutes`; a slot is emitted
/// while its start is strictly before `window.end`, and every slot is full
/// interval length (the trailing slot is never truncated). A window whose
/// start is not before its end yields no slots.
///
/// `appointments` are the provider's reservations for the chosen date.
/// Booked matching is by provider-local `HH:MM` start key — date-agnostic,
/// since the input is already restricted to the day — and ignores cancelled
/// appointments. `is_past` compares the slot's provider-local start instant
/// against `now`; the two flags are independent.
///
/// # Errors
/// Returns [`BookingError::InvalidInterval`] when `interval_minutes` is zero.
pub fn generate_slots(
    date: NaiveDate,
    window: ServiceWindow,
    interval_minutes: u32,
    appointments: &[Appointment],
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<Vec<Slot>> {
    if interval_minutes == 0 {
        return Err(BookingError::InvalidInterval(interval_minutes));
    }

    let interval = Duration::minutes(interval_minutes as i64);

    // HH:MM start keys of every slot-occupying appointment on this date.
    let booked_keys: Vec<String> = appointments
        .iter()
        .filter(|a| a.status.occupies_slot())
        .map(|a| local_start_hm(a, tz))
        .collect();

    let mut slots = Vec::new();
    let mut start = window.start;

    while start < window.end {
        let key = format_hm(start);
        let is_booked = booked_keys.iter().any(|k| *k == key);
        let is_past = slot_start_instant(date, start, tz)
            .map(|instant| instant < now)
            .unwrap_or(false);

        slots.push(Slot {
            start_time: start,
            end_time: start + interval,
            is_booked,
            is_past,
        });

        // Stop if stepping would wrap past midnight; the window is a
        // within-day range and a wrapped cursor would never terminate.
        let (next, wrapped) = start.overflowing_add_signed(interval);
        if wrapped != 0 {
            break;
        }
        start = next;
    }

    Ok(slots)
}

/// The UTC instant at which a slot starts, resolved in the provider's
/// timezone. `None` for local times that don't exist (DST spring-forward
/// gap); such slots are treated as not past.
fn slot_start_instant(
    date: NaiveDate,
    start: chrono::NaiveTime,
    tz: Tz,
) -> Option<DateTime<Utc>> {
    date.and_time(start)
        .and_local_timezone(tz)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
