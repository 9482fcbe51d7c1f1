//! Availability service: fetch + resolve, composed for one provider.
//!
//! The clock instant is supplied at construction, not read from the wall:
//! the service derives "today" and the past-slot cutoff from it, so two
//! services built with the same instant over the same store agree exactly.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use booking_core::model::{Appointment, ResolvedDate, ServiceWindow, Slot};
use booking_core::resolver::{resolve_dates, ResolverConfig};
use booking_core::slots::generate_slots;
use booking_core::timeutil::local_date;

use crate::error::Result;
use crate::ports::{day_start_utc, fetch_snapshot, AvailabilityStore, BookingWrite};

pub struct AvailabilityService<S> {
    store: Arc<S>,
    provider_id: Uuid,
    tz: Tz,
    now: DateTime<Utc>,
}

impl<S> AvailabilityService<S>
where
    S: AvailabilityStore,
{
    pub fn new(store: Arc<S>, provider_id: Uuid, tz: Tz, now: DateTime<Utc>) -> Self {
        Self {
            store,
            provider_id,
            tz,
            now,
        }
    }

    /// "Today" in the provider's timezone.
    pub fn today(&self) -> NaiveDate {
        local_date(self.now, self.tz)
    }

    /// Resolve the bookable-date horizon: three concurrent reads, then the
    /// pure resolution pass.
    pub async fn resolved_dates(&self, config: &ResolverConfig) -> Result<Vec<ResolvedDate>> {
        let today = self.today();
        let snapshot = fetch_snapshot(
            self.store.as_ref(),
            self.provider_id,
            today,
            config.horizon_days,
            self.tz,
        )
        .await?;

        Ok(resolve_dates(
            today,
            config,
            &snapshot.rules,
            &snapshot.exceptions,
            &snapshot.appointments,
            self.tz,
        ))
    }

    /// Generate the slot list for one chosen date.
    ///
    /// An available exception for the date carrying a custom window replaces
    /// the passed `window`.
    pub async fn slots_for(
        &self,
        date: NaiveDate,
        window: ServiceWindow,
        interval_minutes: u32,
    ) -> Result<Vec<Slot>> {
        let from = day_start_utc(date, self.tz);
        let to = day_start_utc(date + chrono::Days::new(1), self.tz);

        let (appointments, exceptions) = tokio::try_join!(
            self.store.appointments_between(self.provider_id, from, to),
            self.store.exceptions(self.provider_id, date),
        )?;

        let window = exceptions
            .iter()
            .find(|e| e.date == date && e.is_available)
            .and_then(|e| e.custom_window())
            .unwrap_or(window);

        let slots = generate_slots(date, window, interval_minutes, &appointments, self.now, self.tz)?;
        Ok(slots)
    }
}

impl<S> AvailabilityService<S>
where
    S: AvailabilityStore + BookingWrite,
{
    /// Persist a selected slot. The free check the caller just did may be
    /// stale; the store's uniqueness constraint has the final say and a
    /// collision comes back as [`crate::StoreError::SlotTaken`].
    pub async fn book(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Appointment> {
        self.store.book(self.provider_id, start_time, end_time).await
    }
}
