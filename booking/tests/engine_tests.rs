use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use booking::engine::{BookingEngine, ReservationRequest, total_price_cents};
use booking::error::BookingError;
use booth::catalog::StaticBoothCatalog;
use booth::types::{Booth, BoothId};
use reservation::model::ReservationStatus;
use reservation::slot::DaySchedule;
use reservation::store::ReservationStore;

use mock_store::InMemoryReservationStore;

fn premium() -> Booth {
    Booth {
        id: BoothId::new("premium"),
        name: "Premium".to_string(),
        hourly_price_cents: 50_00,
        features: vec!["isolation booth".to_string()],
        active: true,
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
}

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    date().and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
}

/// Clock before opening on the booking day, so nothing is filtered as past.
fn early() -> NaiveDateTime {
    at(8, 0)
}

fn engine_with(
    booths: Vec<Booth>,
) -> (
    Arc<InMemoryReservationStore>,
    BookingEngine<InMemoryReservationStore, StaticBoothCatalog>,
) {
    let store = Arc::new(InMemoryReservationStore::default());
    let catalog = Arc::new(StaticBoothCatalog::new(booths));
    let engine =
        BookingEngine::new(store.clone(), catalog, DaySchedule::default()).unwrap();
    (store, engine)
}

fn request(start: NaiveDateTime, duration_min: u32) -> ReservationRequest {
    ReservationRequest {
        booth_id: BoothId::new("premium"),
        user_id: "user-1".to_string(),
        start_time: start,
        duration_min,
    }
}

#[tokio::test]
async fn fresh_day_availability_for_one_hour() -> anyhow::Result<()> {
    let (_, engine) = engine_with(vec![premium()]);

    let starts = engine
        .available_slots(&BoothId::new("premium"), date(), 60, early())
        .await?;

    // 24 half-hour slots; 23 of them begin a run of two consecutive frees.
    assert_eq!(starts.len(), 23);
    assert_eq!(starts[0].label, "09:00");
    assert_eq!(starts[22].label, "20:00");

    let half_hour = engine
        .available_slots(&BoothId::new("premium"), date(), 30, early())
        .await?;
    assert_eq!(half_hour.len(), 24);
    assert_eq!(half_hour[23].label, "20:30");

    Ok(())
}

#[tokio::test]
async fn availability_filters_started_slots() -> anyhow::Result<()> {
    let (_, engine) = engine_with(vec![premium()]);

    // At 12:10 the 12:00 slot has already started; 12:30 is the next start.
    let starts = engine
        .available_slots(&BoothId::new("premium"), date(), 30, at(12, 10))
        .await?;

    assert_eq!(starts[0].label, "12:30");

    Ok(())
}

#[tokio::test]
async fn booking_removes_claimed_runs_and_derives_price() -> anyhow::Result<()> {
    let (_, engine) = engine_with(vec![premium()]);
    let booth_id = BoothId::new("premium");

    let id = engine
        .create_reservation(request(at(10, 0), 60), early())
        .await?;

    let reservation = engine.reservation(id).await?;
    assert_eq!(reservation.status, ReservationStatus::Pending);
    assert_eq!(reservation.total_price_cents, 50_00);
    assert_eq!(reservation.end_time(), at(11, 0));

    let starts = engine
        .available_slots(&booth_id, date(), 60, early())
        .await?;

    // 10:00 and 10:30 are claimed; 09:30 lost its consecutive partner.
    assert_eq!(starts.len(), 20);
    let labels: Vec<&str> = starts.iter().map(|s| s.label.as_str()).collect();
    assert!(!labels.contains(&"09:30"));
    assert!(!labels.contains(&"10:00"));
    assert!(!labels.contains(&"10:30"));
    assert!(labels.contains(&"09:00"));
    assert!(labels.contains(&"11:00"));

    Ok(())
}

#[tokio::test]
async fn overlapping_booking_fails_without_partial_claim() -> anyhow::Result<()> {
    let (store, engine) = engine_with(vec![premium()]);

    engine
        .create_reservation(request(at(10, 30), 60), early())
        .await?;

    let err = engine
        .create_reservation(request(at(10, 0), 60), early())
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::SlotUnavailable));

    // The non-overlapping half of the losing request stayed free.
    let day = store.slots_for_day(&BoothId::new("premium"), date()).await?;
    let ten = day.iter().find(|s| s.label == "10:00").unwrap();
    assert!(ten.is_available);
    assert!(ten.reservation_id.is_none());

    Ok(())
}

#[tokio::test]
async fn cancel_restores_pre_booking_state() -> anyhow::Result<()> {
    let (store, engine) = engine_with(vec![premium()]);
    let booth_id = BoothId::new("premium");

    engine.ensure_slots(&booth_id, date()).await?;
    let before = store.slots_for_day(&booth_id, date()).await?;

    let id = engine
        .create_reservation(request(at(10, 0), 60), early())
        .await?;
    engine.cancel_reservation(id, at(9, 0)).await?;

    let after = store.slots_for_day(&booth_id, date()).await?;
    assert_eq!(before.len(), after.len());
    for (b, a) in before.iter().zip(after.iter()) {
        assert_eq!(b.key, a.key);
        assert_eq!(b.is_available, a.is_available);
        assert_eq!(b.reservation_id, a.reservation_id);
    }

    let cancelled = engine.reservation(id).await?;
    assert_eq!(cancelled.status, ReservationStatus::Cancelled);
    assert_eq!(cancelled.cancelled_at, Some(at(9, 0)));

    Ok(())
}

#[tokio::test]
async fn ensure_slots_is_idempotent_after_booking() -> anyhow::Result<()> {
    let (store, engine) = engine_with(vec![premium()]);
    let booth_id = BoothId::new("premium");

    let id = engine
        .create_reservation(request(at(10, 0), 60), early())
        .await?;

    let snapshot = store.slots_for_day(&booth_id, date()).await?;
    engine.ensure_slots(&booth_id, date()).await?;
    let again = store.slots_for_day(&booth_id, date()).await?;

    assert_eq!(snapshot.len(), again.len());
    for (s, a) in snapshot.iter().zip(again.iter()) {
        assert_eq!(s.is_available, a.is_available);
        assert_eq!(s.reservation_id, a.reservation_id);
    }

    // Reservation itself is untouched.
    assert_eq!(engine.reservation(id).await?.status, ReservationStatus::Pending);

    Ok(())
}

#[tokio::test]
async fn validation_rejects_bad_requests() {
    let (_, engine) = engine_with(vec![premium()]);

    // Past start.
    let err = engine
        .create_reservation(request(at(10, 0), 60), at(11, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidInput(_)));

    // Zero duration.
    let err = engine
        .create_reservation(request(at(10, 0), 0), early())
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidInput(_)));

    // Off-grid start.
    let err = engine
        .create_reservation(request(at(10, 15), 60), early())
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidInput(_)));

    // Span runs past closing.
    let err = engine
        .create_reservation(request(at(20, 30), 60), early())
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidInput(_)));

    // Oversized duration rejects cleanly, no arithmetic panic.
    let err = engine
        .create_reservation(request(at(10, 0), u32::MAX), early())
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidInput(_)));

    // Missing user.
    let mut anonymous = request(at(10, 0), 60);
    anonymous.user_id = "  ".to_string();
    let err = engine.create_reservation(anonymous, early()).await.unwrap_err();
    assert!(matches!(err, BookingError::InvalidInput(_)));
}

#[tokio::test]
async fn unknown_and_inactive_booths_are_rejected() {
    let mut closed = premium();
    closed.id = BoothId::new("closed");
    closed.active = false;

    let (_, engine) = engine_with(vec![premium(), closed]);

    let mut req = request(at(10, 0), 60);
    req.booth_id = BoothId::new("missing");
    let err = engine.create_reservation(req, early()).await.unwrap_err();
    assert!(matches!(err, BookingError::NotFound(_)));

    let mut req = request(at(10, 0), 60);
    req.booth_id = BoothId::new("closed");
    let err = engine.create_reservation(req, early()).await.unwrap_err();
    assert!(matches!(err, BookingError::InvalidInput(_)));
}

#[tokio::test]
async fn cancellation_error_paths() -> anyhow::Result<()> {
    let (store, engine) = engine_with(vec![premium()]);

    let missing = uuid::Uuid::new_v4();
    let err = engine.cancel_reservation(missing, early()).await.unwrap_err();
    assert!(matches!(err, BookingError::NotFound(_)));

    let id = engine
        .create_reservation(request(at(10, 0), 60), early())
        .await?;

    engine.cancel_reservation(id, at(9, 0)).await?;
    let err = engine.cancel_reservation(id, at(9, 5)).await.unwrap_err();
    assert!(matches!(err, BookingError::AlreadyCancelled(_)));

    // Completed reservations are not cancellable either.
    let id = engine
        .create_reservation(request(at(14, 0), 60), early())
        .await?;
    store.update_status(id, ReservationStatus::Completed).await?;
    let err = engine.cancel_reservation(id, early()).await.unwrap_err();
    assert!(matches!(err, BookingError::InvalidInput(_)));

    Ok(())
}

#[tokio::test]
async fn user_reservation_listing() -> anyhow::Result<()> {
    let (_, engine) = engine_with(vec![premium()]);

    let mut req = request(at(9, 0), 60);
    req.user_id = "alice".to_string();
    engine.create_reservation(req, early()).await?;

    let mut req = request(at(14, 0), 90);
    req.user_id = "bob".to_string();
    engine.create_reservation(req, early()).await?;

    let alice = engine.user_reservations("alice").await?;
    assert_eq!(alice.len(), 1);
    assert_eq!(alice[0].start_time, at(9, 0));

    assert!(engine.user_reservations("carol").await?.is_empty());

    Ok(())
}

#[test]
fn price_is_prorated_to_the_minute() {
    assert_eq!(total_price_cents(50_00, 60), 50_00);
    assert_eq!(total_price_cents(50_00, 30), 25_00);
    assert_eq!(total_price_cents(50_00, 90), 75_00);
    assert_eq!(total_price_cents(50_00, 120), 100_00);
}
