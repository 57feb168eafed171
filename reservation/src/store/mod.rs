pub mod sqlite_store;

use booth::types::BoothId;
use chrono::{NaiveDate, NaiveDateTime};

use crate::model::{Reservation, ReservationId, ReservationStatus, Slot, SlotKey};

/// Result of an atomic conditional claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// All required slots were available and are now owned by the reservation.
    Claimed,
    /// At least one slot was missing or already claimed; nothing was written.
    Unavailable,
}

/// Result of an atomic conditional release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Released,
    /// The reservation was missing or no longer pending/active; nothing was
    /// written. The caller distinguishes the two by re-reading.
    NotCancellable,
}

/// Contract the reservation subsystem needs from its backing store.
///
/// `claim_slots` and `release_reservation` are the two conditional-write
/// operations; each must apply fully or not at all. Every other method is a
/// plain read or an unconditional write.
#[async_trait::async_trait]
pub trait ReservationStore: Send + Sync {
    /// Create-if-absent persistence of generated slots. Returns how many
    /// were actually inserted; existing slots are left untouched.
    async fn insert_slots_if_absent(&self, slots: &[Slot]) -> anyhow::Result<u64>;

    /// All slots for (booth, date), chronological.
    async fn slots_for_day(&self, booth_id: &BoothId, date: NaiveDate)
    -> anyhow::Result<Vec<Slot>>;

    /// Fetch specific slots by key. Missing keys are simply absent from the
    /// result.
    async fn fetch_slots(&self, keys: &[SlotKey]) -> anyhow::Result<Vec<Slot>>;

    /// Atomically: verify every key is available, mark all of them
    /// unavailable with `reservation.id` as owner, and insert the
    /// reservation record. Rolls back entirely on any shortfall.
    async fn claim_slots(
        &self,
        reservation: &Reservation,
        keys: &[SlotKey],
    ) -> anyhow::Result<ClaimOutcome>;

    /// Atomically: if the reservation is still pending/active, mark it
    /// cancelled (recording `cancelled_at`) and release every slot it owns.
    async fn release_reservation(
        &self,
        id: ReservationId,
        cancelled_at: NaiveDateTime,
        keys: &[SlotKey],
    ) -> anyhow::Result<ReleaseOutcome>;

    async fn fetch_reservation(&self, id: ReservationId) -> anyhow::Result<Option<Reservation>>;

    async fn reservations_for_user(&self, user_id: &str) -> anyhow::Result<Vec<Reservation>>;

    async fn all_reservations(&self) -> anyhow::Result<Vec<Reservation>>;

    /// Status update for the admin flow, conditional on the reservation not
    /// being cancelled: a cancelled reservation no longer holds its slots,
    /// so reviving it would leave a live claim over a window anyone can
    /// book. Returns false when the id does not resolve or the reservation
    /// is cancelled.
    async fn update_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> anyhow::Result<bool>;
}
