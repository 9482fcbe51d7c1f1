//! Calendar data model: recurring rules, date exceptions, appointments, and
//! the derived rows the resolver and slot generator produce.
//!
//! Rule and exception times are kept as `HH:MM:SS` strings at this layer —
//! that is how the backing store hands them over, and a malformed time in one
//! record must degrade to "does not match" rather than poison a whole
//! deserialization pass. Parsing happens at the point of comparison (see
//! [`crate::timeutil`]).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    /// Cancelled appointments do not occupy a slot; every other status does.
    pub fn occupies_slot(self) -> bool {
        self != AppointmentStatus::Cancelled
    }
}

/// A booked reservation on a provider's calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AppointmentStatus,
}

/// A weekly-repeating availability window for a provider.
///
/// `day_of_week` uses 0 = Sunday … 6 = Saturday, matching the stored form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringRule {
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
}

/// A date-specific override of recurring availability.
///
/// At most one exception exists per (provider, date). When present it fully
/// replaces the recurring rules for that date: an unavailable exception blocks
/// the date even if a matching rule exists, and an available one opens it even
/// if no rule does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionRule {
    pub date: NaiveDate,
    pub is_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

impl ExceptionRule {
    /// The custom service window this exception carries, when both times are
    /// present and parse. Slot generation for the date uses it in place of
    /// the default window.
    pub fn custom_window(&self) -> Option<ServiceWindow> {
        let start = crate::timeutil::parse_hms(self.start_time.as_deref()?)?;
        let end = crate::timeutil::parse_hms(self.end_time.as_deref()?)?;
        Some(ServiceWindow::new(start, end))
    }
}

/// One calendar day of a resolved horizon. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDate {
    pub date: NaiveDate,
    pub is_bookable: bool,
    pub has_existing_appointment: bool,
}

/// A candidate appointment window within a bookable date. Derived, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_booked: bool,
    pub is_past: bool,
}

impl Slot {
    /// A slot can be offered to a client iff it is neither taken nor behind
    /// the current wall clock. The two flags are independent.
    pub fn is_selectable(&self) -> bool {
        !self.is_booked && !self.is_past
    }
}

/// The daily service window slots are generated within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ServiceWindow {
    /// The canonical business window, as literal stored strings. Recurring
    /// rules match against these exactly in the default configuration.
    pub const CANONICAL_START: &'static str = "10:00:00";
    pub const CANONICAL_END: &'static str = "16:00:00";

    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// The canonical 10:00–16:00 window.
    pub fn canonical() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        }
    }
}

impl Default for ServiceWindow {
    fn default() -> Self {
        Self::canonical()
    }
}
