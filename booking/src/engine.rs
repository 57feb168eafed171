//! The booking engine.
//!
//! Responsibilities:
//! - Lazily materialize the availability index for a (booth, day).
//! - Answer availability queries as contiguous-run starts.
//! - Create reservations through the store's atomic conditional claim.
//! - Cancel reservations through the matching atomic release.
//!
//! Non-responsibilities:
//! - Authentication (callers arrive already identified).
//! - Admin operations (see `admin`).
//!
//! Correctness property: the availability pre-read here is only a fast
//! path. Double-booking is prevented by the store's conditional claim,
//! which verifies and flips all required slots in one transaction.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use booth::catalog::BoothCatalog;
use booth::types::BoothId;
use reservation::model::{Reservation, ReservationId, ReservationStatus, Slot, UserId};
use reservation::slot::{DaySchedule, day_slots, occupied_keys, slots_needed};
use reservation::store::{ClaimOutcome, ReleaseOutcome, ReservationStore};

use crate::error::BookingError;

/// Parameters of a booking attempt.
#[derive(Debug, Clone)]
pub struct ReservationRequest {
    pub booth_id: BoothId,
    pub user_id: UserId,
    pub start_time: NaiveDateTime,
    pub duration_min: u32,
}

/// Derived price: hourly rate prorated to the minute.
pub fn total_price_cents(hourly_price_cents: u64, duration_min: u32) -> u64 {
    hourly_price_cents * u64::from(duration_min) / 60
}

pub struct BookingEngine<S: ReservationStore, C: BoothCatalog> {
    store: Arc<S>,
    catalog: Arc<C>,
    schedule: DaySchedule,
}

impl<S: ReservationStore, C: BoothCatalog> BookingEngine<S, C> {
    pub fn new(store: Arc<S>, catalog: Arc<C>, schedule: DaySchedule) -> anyhow::Result<Self> {
        schedule.validate()?;
        Ok(Self {
            store,
            catalog,
            schedule,
        })
    }

    pub fn schedule(&self) -> &DaySchedule {
        &self.schedule
    }

    /// Idempotently materialize the slot set for (booth, date).
    #[instrument(skip(self), target = "booking", fields(booth_id = %booth_id, %date))]
    pub async fn ensure_slots(
        &self,
        booth_id: &BoothId,
        date: NaiveDate,
    ) -> Result<(), BookingError> {
        let slots = day_slots(booth_id, date, &self.schedule);
        let inserted = self.store.insert_slots_if_absent(&slots).await?;

        if inserted > 0 {
            debug!(inserted, "materialized slots for day");
        }
        Ok(())
    }

    /// Every slot that begins a contiguous run of enough consecutive
    /// available slots for `duration_min`, chronological. Slots that have
    /// already started relative to `now` are excluded.
    #[instrument(skip(self), target = "booking", fields(booth_id = %booth_id, %date, duration_min))]
    pub async fn available_slots(
        &self,
        booth_id: &BoothId,
        date: NaiveDate,
        duration_min: u32,
        now: NaiveDateTime,
    ) -> Result<Vec<Slot>, BookingError> {
        if duration_min == 0 {
            return Err(BookingError::InvalidInput(
                "duration must be positive".to_string(),
            ));
        }

        self.ensure_slots(booth_id, date).await?;

        let day = self.store.slots_for_day(booth_id, date).await?;
        let needed = slots_needed(duration_min, self.schedule.slot_minutes) as usize;

        let starts = day
            .windows(needed)
            .filter(|run| {
                run[0].start_time >= now
                    && run.iter().all(|s| s.is_available)
                    && run
                        .windows(2)
                        .all(|pair| pair[0].end_time == pair[1].start_time)
            })
            .map(|run| run[0].clone())
            .collect();

        Ok(starts)
    }

    /// Book a booth for a contiguous span starting at `request.start_time`.
    ///
    /// Validation happens before any write. The claim itself is one atomic
    /// conditional transaction in the store: either every required slot is
    /// flipped and the reservation is recorded, or nothing is.
    #[instrument(
        skip(self, request),
        target = "booking",
        fields(booth_id = %request.booth_id, user_id = %request.user_id)
    )]
    pub async fn create_reservation(
        &self,
        request: ReservationRequest,
        now: NaiveDateTime,
    ) -> Result<ReservationId, BookingError> {
        self.validate_request(&request, now)?;

        let booth = self
            .catalog
            .fetch(&request.booth_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("booth {}", request.booth_id)))?;

        if !booth.active {
            return Err(BookingError::InvalidInput(format!(
                "booth {} is not bookable",
                booth.id
            )));
        }

        let date = request.start_time.date();
        self.ensure_slots(&request.booth_id, date).await?;

        let keys = occupied_keys(
            &request.booth_id,
            request.start_time,
            request.duration_min,
            self.schedule.slot_minutes,
        );

        // Fast-path rejection; the conditional claim below is what actually
        // guarantees exclusivity under concurrency.
        let current = self.store.fetch_slots(&keys).await?;
        if current.len() != keys.len() || current.iter().any(|s| !s.is_available) {
            return Err(BookingError::SlotUnavailable);
        }

        let reservation = Reservation {
            id: Uuid::new_v4(),
            booth_id: request.booth_id.clone(),
            user_id: request.user_id.clone(),
            start_time: request.start_time,
            duration_min: request.duration_min,
            status: ReservationStatus::Pending,
            total_price_cents: total_price_cents(booth.hourly_price_cents, request.duration_min),
            created_at: now,
            cancelled_at: None,
        };

        match self.store.claim_slots(&reservation, &keys).await? {
            ClaimOutcome::Claimed => {
                info!(
                    reservation_id = %reservation.id,
                    slots = keys.len(),
                    total_price_cents = reservation.total_price_cents,
                    "reservation created"
                );
                Ok(reservation.id)
            }
            ClaimOutcome::Unavailable => Err(BookingError::SlotUnavailable),
        }
    }

    /// Cancel a reservation and release every slot it occupies.
    ///
    /// The occupied keys are recomputed from (booth, start, duration); the
    /// status flip and the slot release happen in one conditional
    /// transaction, so a cancelled record can never keep slots claimed.
    #[instrument(skip(self), target = "booking", fields(reservation_id = %id))]
    pub async fn cancel_reservation(
        &self,
        id: ReservationId,
        now: NaiveDateTime,
    ) -> Result<(), BookingError> {
        let reservation = self
            .store
            .fetch_reservation(id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("reservation {id}")))?;

        match reservation.status {
            ReservationStatus::Cancelled => return Err(BookingError::AlreadyCancelled(id)),
            ReservationStatus::Completed => {
                return Err(BookingError::InvalidInput(
                    "completed reservations cannot be cancelled".to_string(),
                ));
            }
            ReservationStatus::Pending | ReservationStatus::Active => {}
        }

        let keys = occupied_keys(
            &reservation.booth_id,
            reservation.start_time,
            reservation.duration_min,
            self.schedule.slot_minutes,
        );

        match self.store.release_reservation(id, now, &keys).await? {
            ReleaseOutcome::Released => {
                info!(slots = keys.len(), "reservation cancelled");
                Ok(())
            }
            // Lost a race with another cancellation of the same id.
            ReleaseOutcome::NotCancellable => Err(BookingError::AlreadyCancelled(id)),
        }
    }

    pub async fn reservation(&self, id: ReservationId) -> Result<Reservation, BookingError> {
        self.store
            .fetch_reservation(id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("reservation {id}")))
    }

    pub async fn user_reservations(
        &self,
        user_id: &str,
    ) -> Result<Vec<Reservation>, BookingError> {
        Ok(self.store.reservations_for_user(user_id).await?)
    }

    fn validate_request(
        &self,
        request: &ReservationRequest,
        now: NaiveDateTime,
    ) -> Result<(), BookingError> {
        if request.duration_min == 0 {
            return Err(BookingError::InvalidInput(
                "duration must be positive".to_string(),
            ));
        }
        if request.user_id.trim().is_empty() {
            return Err(BookingError::InvalidInput("missing user id".to_string()));
        }
        if request.start_time < now {
            return Err(BookingError::InvalidInput(
                "start time is in the past".to_string(),
            ));
        }
        if !self.schedule.is_aligned(request.start_time) {
            return Err(BookingError::InvalidInput(format!(
                "start time must fall on a {}-minute boundary",
                self.schedule.slot_minutes
            )));
        }

        // The whole occupied span has to fit inside one day's window. Span
        // math in i64: an oversized duration must reject, not overflow.
        let needed = slots_needed(request.duration_min, self.schedule.slot_minutes);
        let span_min = i64::from(needed) * i64::from(self.schedule.slot_minutes);
        let span_end = request
            .start_time
            .checked_add_signed(Duration::minutes(span_min))
            .ok_or_else(|| {
                BookingError::InvalidInput("requested duration is too long".to_string())
            })?;
        let (open, close) = self.schedule.window(request.start_time.date());

        if request.start_time < open || span_end > close {
            return Err(BookingError::InvalidInput(format!(
                "requested span is outside operating hours {:02}:00-{:02}:00",
                self.schedule.open_hour, self.schedule.close_hour
            )));
        }

        Ok(())
    }
}
