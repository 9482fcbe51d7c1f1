//! Integration tests for the store boundary: snapshot joins, the
//! per-provider service, and the booking uniqueness constraint.

use std::sync::Arc;

use async_trait::async_trait;
use booking_core::model::{
    Appointment, AppointmentStatus, ExceptionRule, RecurringRule, ServiceWindow,
};
use booking_core::resolver::ResolverConfig;
use booking_store::{
    fetch_snapshot, AvailabilityService, AvailabilityStore, MemoryStore, Resolution, StoreError,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn utc() -> Tz {
    "UTC".parse().unwrap()
}

fn canonical_rule(dow: u8) -> RecurringRule {
    RecurringRule {
        day_of_week: dow,
        start_time: "10:00:00".to_string(),
        end_time: "16:00:00".to_string(),
    }
}

fn appointment(provider_id: Uuid, start: &str, status: AppointmentStatus) -> Appointment {
    let start: DateTime<Utc> = start.parse().unwrap();
    Appointment {
        id: Uuid::new_v4(),
        provider_id,
        start_time: start,
        end_time: start + chrono::Duration::hours(1),
        status,
    }
}

/// Sunday before the test Monday (2026-03-16).
fn sunday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
}

async fn seeded_store(provider_id: Uuid) -> MemoryStore {
    let store = MemoryStore::new();
    store.add_provider(provider_id).await;
    store.add_rule(provider_id, canonical_rule(1)).await;
    store
}

// ── Snapshot fetch ──────────────────────────────────────────────────────────

#[tokio::test]
async fn snapshot_joins_all_three_reads() {
    let provider_id = Uuid::new_v4();
    let store = seeded_store(provider_id).await;
    store
        .add_exception(
            provider_id,
            ExceptionRule {
                date: NaiveDate::from_ymd_opt(2026, 3, 23).unwrap(),
                is_available: false,
                start_time: None,
                end_time: None,
            },
        )
        .await;
    store
        .add_appointment(appointment(
            provider_id,
            "2026-03-16T10:00:00Z",
            AppointmentStatus::Confirmed,
        ))
        .await;

    let snapshot = fetch_snapshot(&store, provider_id, sunday(), 30, utc())
        .await
        .unwrap();

    assert_eq!(snapshot.rules.len(), 1);
    assert_eq!(snapshot.exceptions.len(), 1);
    assert_eq!(snapshot.appointments.len(), 1);
}

#[tokio::test]
async fn snapshot_excludes_appointments_outside_the_horizon() {
    let provider_id = Uuid::new_v4();
    let store = seeded_store(provider_id).await;
    store
        .add_appointment(appointment(
            provider_id,
            "2026-03-16T10:00:00Z",
            AppointmentStatus::Confirmed,
        ))
        .await;
    // Well past a 7-day horizon.
    store
        .add_appointment(appointment(
            provider_id,
            "2026-05-01T10:00:00Z",
            AppointmentStatus::Confirmed,
        ))
        .await;

    let snapshot = fetch_snapshot(&store, provider_id, sunday(), 7, utc())
        .await
        .unwrap();

    assert_eq!(snapshot.appointments.len(), 1);
}

#[tokio::test]
async fn snapshot_filters_exceptions_before_today() {
    let provider_id = Uuid::new_v4();
    let store = seeded_store(provider_id).await;
    store
        .add_exception(
            provider_id,
            ExceptionRule {
                date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                is_available: false,
                start_time: None,
                end_time: None,
            },
        )
        .await;

    let snapshot = fetch_snapshot(&store, provider_id, sunday(), 30, utc())
        .await
        .unwrap();

    assert!(snapshot.exceptions.is_empty());
}

#[tokio::test]
async fn unknown_provider_is_an_error_not_an_empty_snapshot() {
    let store = MemoryStore::new();
    let result = fetch_snapshot(&store, Uuid::new_v4(), sunday(), 30, utc()).await;
    assert!(matches!(result, Err(StoreError::ProviderUnknown(_))));
}

// ── Fetch failure vs. empty result ──────────────────────────────────────────

/// A store whose rules query always fails — for checking that a fetch error
/// stays distinct from a resolved-empty calendar.
struct BrokenRulesStore;

#[async_trait]
impl AvailabilityStore for BrokenRulesStore {
    async fn recurring_rules(&self, _provider_id: Uuid) -> Result<Vec<RecurringRule>, StoreError> {
        Err(StoreError::Fetch {
            what: "recurring rules",
            message: "connection reset".into(),
        })
    }

    async fn exceptions(
        &self,
        _provider_id: Uuid,
        _from: NaiveDate,
    ) -> Result<Vec<ExceptionRule>, StoreError> {
        Ok(vec![])
    }

    async fn appointments_between(
        &self,
        _provider_id: Uuid,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, StoreError> {
        Ok(vec![])
    }
}

#[tokio::test]
async fn one_failed_read_fails_the_whole_join() {
    let result = fetch_snapshot(&BrokenRulesStore, Uuid::new_v4(), sunday(), 30, utc()).await;
    assert!(matches!(result, Err(StoreError::Fetch { .. })));
}

#[tokio::test]
async fn resolution_states_stay_distinct() {
    // Failed fetch → Failed.
    let failed = fetch_snapshot(&BrokenRulesStore, Uuid::new_v4(), sunday(), 30, utc()).await;
    let failed = Resolution::from_result(failed);
    assert!(failed.is_failed());

    // Registered provider with an empty calendar → Resolved, not Failed.
    let provider_id = Uuid::new_v4();
    let store = MemoryStore::new();
    store.add_provider(provider_id).await;
    let empty = fetch_snapshot(&store, provider_id, sunday(), 30, utc()).await;
    let empty = Resolution::from_result(empty);
    assert!(!empty.is_failed());
    let snapshot = empty.resolved().unwrap();
    assert!(snapshot.rules.is_empty());
}

// ── Service ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn service_resolves_dates_end_to_end() {
    let provider_id = Uuid::new_v4();
    let store = Arc::new(seeded_store(provider_id).await);
    // Sunday noon UTC.
    let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
    let service = AvailabilityService::new(store, provider_id, utc(), now);

    let config = ResolverConfig {
        horizon_days: 7,
        ..ResolverConfig::client()
    };
    let resolved = service.resolved_dates(&config).await.unwrap();

    assert_eq!(resolved.len(), 7);
    let bookable: Vec<_> = resolved.iter().filter(|r| r.is_bookable).collect();
    assert_eq!(bookable.len(), 1);
    assert_eq!(
        bookable[0].date,
        NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
    );
}

#[tokio::test]
async fn service_generates_slots_with_store_appointments() {
    let provider_id = Uuid::new_v4();
    let store = seeded_store(provider_id).await;
    store
        .add_appointment(appointment(
            provider_id,
            "2026-03-16T11:00:00Z",
            AppointmentStatus::Confirmed,
        ))
        .await;
    let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
    let service = AvailabilityService::new(Arc::new(store), provider_id, utc(), now);

    let slots = service
        .slots_for(
            NaiveDate::from_ymd_opt(2026, 3, 16).unwrap(),
            ServiceWindow::canonical(),
            60,
        )
        .await
        .unwrap();

    assert_eq!(slots.len(), 6);
    assert_eq!(slots.iter().filter(|s| s.is_booked).count(), 1);
    assert!(slots[1].is_booked, "the 11:00 slot should be booked");
}

#[tokio::test]
async fn exception_custom_window_narrows_the_slot_list() {
    let provider_id = Uuid::new_v4();
    let store = seeded_store(provider_id).await;
    store
        .add_exception(
            provider_id,
            ExceptionRule {
                date: NaiveDate::from_ymd_opt(2026, 3, 16).unwrap(),
                is_available: true,
                start_time: Some("11:00:00".to_string()),
                end_time: Some("14:00:00".to_string()),
            },
        )
        .await;
    let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
    let service = AvailabilityService::new(Arc::new(store), provider_id, utc(), now);

    let slots = service
        .slots_for(
            NaiveDate::from_ymd_opt(2026, 3, 16).unwrap(),
            ServiceWindow::canonical(),
            60,
        )
        .await
        .unwrap();

    // 11:00, 12:00, 13:00 instead of the six canonical slots.
    assert_eq!(slots.len(), 3);
    assert_eq!(
        slots[0].start_time,
        chrono::NaiveTime::from_hms_opt(11, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn service_rejects_zero_interval() {
    let provider_id = Uuid::new_v4();
    let store = Arc::new(seeded_store(provider_id).await);
    let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
    let service = AvailabilityService::new(store, provider_id, utc(), now);

    let result = service
        .slots_for(
            NaiveDate::from_ymd_opt(2026, 3, 16).unwrap(),
            ServiceWindow::canonical(),
            0,
        )
        .await;

    assert!(matches!(result, Err(StoreError::Core(_))));
}

// ── Booking constraint ──────────────────────────────────────────────────────

#[tokio::test]
async fn double_booking_the_same_slot_is_rejected() {
    let provider_id = Uuid::new_v4();
    let store = Arc::new(seeded_store(provider_id).await);
    let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
    let service = AvailabilityService::new(store, provider_id, utc(), now);

    let start = Utc.with_ymd_and_hms(2026, 3, 16, 10, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 3, 16, 11, 0, 0).unwrap();

    let first = service.book(start, end).await;
    assert!(first.is_ok());

    let second = service.book(start, end).await;
    assert!(matches!(second, Err(StoreError::SlotTaken { .. })));
}

#[tokio::test]
async fn concurrent_bookings_settle_to_exactly_one_winner() {
    let provider_id = Uuid::new_v4();
    let store = Arc::new(seeded_store(provider_id).await);
    let start = Utc.with_ymd_and_hms(2026, 3, 16, 10, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 3, 16, 11, 0, 0).unwrap();

    // Two clients race for the same slot after both saw it free.
    let mut handles = Vec::new();
    for _ in 0..2 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            use booking_store::BookingWrite;
            store.book(provider_id, start, end).await
        }));
    }

    let mut winners = 0;
    let mut losers = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(StoreError::SlotTaken { .. }) => losers += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(losers, 1);
}

#[tokio::test]
async fn cancelled_appointment_frees_its_slot() {
    let provider_id = Uuid::new_v4();
    let store = Arc::new(seeded_store(provider_id).await);
    let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
    let service = AvailabilityService::new(Arc::clone(&store), provider_id, utc(), now);

    let start = Utc.with_ymd_and_hms(2026, 3, 16, 10, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 3, 16, 11, 0, 0).unwrap();

    let booked = service.book(start, end).await.unwrap();
    store.cancel_appointment(provider_id, booked.id).await;

    // Slot is free again: the constraint only spans non-cancelled rows.
    let rebooked = service.book(start, end).await;
    assert!(rebooked.is_ok());
}

#[tokio::test]
async fn booked_slot_shows_up_in_the_next_slot_list() {
    let provider_id = Uuid::new_v4();
    let store = Arc::new(seeded_store(provider_id).await);
    let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
    let service = AvailabilityService::new(store, provider_id, utc(), now);

    let date = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
    let start = Utc.with_ymd_and_hms(2026, 3, 16, 13, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 3, 16, 14, 0, 0).unwrap();

    let before = service
        .slots_for(date, ServiceWindow::canonical(), 60)
        .await
        .unwrap();
    assert!(before.iter().all(|s| !s.is_booked));

    service.book(start, end).await.unwrap();

    let after = service
        .slots_for(date, ServiceWindow::canonical(), 60)
        .await
        .unwrap();
    let booked: Vec<_> = after.iter().filter(|s| s.is_booked).collect();
    assert_eq!(booked.len(), 1);
    assert_eq!(
        booked[0].start_time,
        chrono::NaiveTime::from_hms_opt(13, 0, 0).unwrap()
    );
}
