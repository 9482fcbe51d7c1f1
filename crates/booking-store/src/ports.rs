//! Store ports: the read queries and the booking write any backend adapter
//! must implement, plus the joined snapshot one resolution cycle consumes.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::debug;
use uuid::Uuid;

use booking_core::model::{Appointment, ExceptionRule, RecurringRule};

use crate::error::Result;

/// Read side of a provider's calendar. One method per query of a resolution
/// cycle; implementations map each to their backend's filtered read.
#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    /// The provider's weekly recurring rules.
    async fn recurring_rules(&self, provider_id: Uuid) -> Result<Vec<RecurringRule>>;

    /// The provider's date exceptions on or after `from`.
    async fn exceptions(&self, provider_id: Uuid, from: NaiveDate) -> Result<Vec<ExceptionRule>>;

    /// The provider's appointments starting within `[from, to)`.
    async fn appointments_between(
        &self,
        provider_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>>;
}

/// Write side: turn a selected slot into a persisted appointment.
///
/// Implementations must enforce uniqueness on (provider, start time) over
/// non-cancelled appointments and surface a collision as
/// [`crate::StoreError::SlotTaken`] — the slot list the client computed may
/// be stale by the time this write lands.
#[async_trait]
pub trait BookingWrite: Send + Sync {
    async fn book(
        &self,
        provider_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Appointment>;
}

/// The joined result of one resolution cycle's three reads.
#[derive(Debug, Clone, Default)]
pub struct CalendarSnapshot {
    pub rules: Vec<RecurringRule>,
    pub exceptions: Vec<ExceptionRule>,
    pub appointments: Vec<Appointment>,
}

/// Fetch a provider's calendar snapshot for a horizon starting at `today`.
///
/// The three reads are independent and issued concurrently; the snapshot is
/// produced only once all three have completed, and any single failure fails
/// the whole fetch. A failed fetch is an error — never an empty snapshot.
pub async fn fetch_snapshot<S>(
    store: &S,
    provider_id: Uuid,
    today: NaiveDate,
    horizon_days: u32,
    tz: Tz,
) -> Result<CalendarSnapshot>
where
    S: AvailabilityStore + ?Sized,
{
    let from = day_start_utc(today, tz);
    let to = day_start_utc(today + chrono::Days::new(horizon_days as u64), tz);

    let (rules, exceptions, appointments) = tokio::try_join!(
        store.recurring_rules(provider_id),
        store.exceptions(provider_id, today),
        store.appointments_between(provider_id, from, to),
    )?;

    debug!(
        %provider_id,
        rules = rules.len(),
        exceptions = exceptions.len(),
        appointments = appointments.len(),
        "fetched calendar snapshot"
    );

    Ok(CalendarSnapshot {
        rules,
        exceptions,
        appointments,
    })
}

/// The UTC instant at which a provider-local calendar day begins.
///
/// Falls forward by an hour when a DST transition removes local midnight;
/// as a last resort interprets the naive midnight as UTC.
pub fn day_start_utc(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    midnight
        .and_local_timezone(tz)
        .earliest()
        .or_else(|| (midnight + Duration::hours(1)).and_local_timezone(tz).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}
