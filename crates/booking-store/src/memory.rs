//! In-memory store implementation.
//!
//! Backs the integration tests and offline demos. The booking write enforces
//! the same uniqueness constraint a production backend is expected to carry:
//! one non-cancelled appointment per (provider, start instant).

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use booking_core::model::{Appointment, AppointmentStatus, ExceptionRule, RecurringRule};

use crate::error::{Result, StoreError};
use crate::ports::{AvailabilityStore, BookingWrite};

#[derive(Debug, Default)]
struct ProviderCalendar {
    rules: Vec<RecurringRule>,
    exceptions: Vec<ExceptionRule>,
    appointments: Vec<Appointment>,
}

/// Thread-safe in-memory calendar store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    providers: RwLock<HashMap<Uuid, ProviderCalendar>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider with an empty calendar. Queries against
    /// unregistered providers fail with [`StoreError::ProviderUnknown`];
    /// a registered provider with no rules simply resolves nothing bookable.
    pub async fn add_provider(&self, provider_id: Uuid) {
        self.providers
            .write()
            .await
            .entry(provider_id)
            .or_default();
    }

    pub async fn add_rule(&self, provider_id: Uuid, rule: RecurringRule) {
        let mut providers = self.providers.write().await;
        providers.entry(provider_id).or_default().rules.push(rule);
    }

    pub async fn add_exception(&self, provider_id: Uuid, exception: ExceptionRule) {
        let mut providers = self.providers.write().await;
        let calendar = providers.entry(provider_id).or_default();
        // One exception per date: a new entry replaces any previous one.
        calendar.exceptions.retain(|e| e.date != exception.date);
        calendar.exceptions.push(exception);
    }

    pub async fn add_appointment(&self, appointment: Appointment) {
        let mut providers = self.providers.write().await;
        providers
            .entry(appointment.provider_id)
            .or_default()
            .appointments
            .push(appointment);
    }

    /// Mark an appointment cancelled, freeing its slot for rebooking.
    pub async fn cancel_appointment(&self, provider_id: Uuid, appointment_id: Uuid) {
        let mut providers = self.providers.write().await;
        if let Some(calendar) = providers.get_mut(&provider_id) {
            for appointment in &mut calendar.appointments {
                if appointment.id == appointment_id {
                    appointment.status = AppointmentStatus::Cancelled;
                }
            }
        }
    }
}

#[async_trait]
impl AvailabilityStore for MemoryStore {
    async fn recurring_rules(&self, provider_id: Uuid) -> Result<Vec<RecurringRule>> {
        let providers = self.providers.read().await;
        let calendar = providers
            .get(&provider_id)
            .ok_or(StoreError::ProviderUnknown(provider_id))?;
        Ok(calendar.rules.clone())
    }

    async fn exceptions(&self, provider_id: Uuid, from: NaiveDate) -> Result<Vec<ExceptionRule>> {
        let providers = self.providers.read().await;
        let calendar = providers
            .get(&provider_id)
            .ok_or(StoreError::ProviderUnknown(provider_id))?;
        Ok(calendar
            .exceptions
            .iter()
            .filter(|e| e.date >= from)
            .cloned()
            .collect())
    }

    async fn appointments_between(
        &self,
        provider_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        let providers = self.providers.read().await;
        let calendar = providers
            .get(&provider_id)
            .ok_or(StoreError::ProviderUnknown(provider_id))?;
        Ok(calendar
            .appointments
            .iter()
            .filter(|a| a.start_time >= from && a.start_time < to)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BookingWrite for MemoryStore {
    async fn book(
        &self,
        provider_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Appointment> {
        // Single write lock across check and insert: the constraint check and
        // the write are one atomic step, which is exactly what closes the
        // check-then-act window.
        let mut providers = self.providers.write().await;
        let calendar = providers
            .get_mut(&provider_id)
            .ok_or(StoreError::ProviderUnknown(provider_id))?;

        let collision = calendar
            .appointments
            .iter()
            .any(|a| a.status.occupies_slot() && a.start_time == start_time);
        if collision {
            warn!(%provider_id, %start_time, "booking rejected, slot already taken");
            return Err(StoreError::SlotTaken {
                provider_id,
                start_time,
            });
        }

        let appointment = Appointment {
            id: Uuid::new_v4(),
            provider_id,
            start_time,
            end_time,
            status: AppointmentStatus::Pending,
        };
        calendar.appointments.push(appointment.clone());
        debug!(%provider_id, %start_time, id = %appointment.id, "appointment booked");
        Ok(appointment)
    }
}
