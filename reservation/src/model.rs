use std::fmt;
use std::str::FromStr;

use booth::types::BoothId;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub type ReservationId = uuid::Uuid;
pub type UserId = String;

/// Deterministic identity of one slot: `{booth}_{YYYY-MM-DD}_{HHMM}`.
///
/// Derived purely from (booth, start time), so the booking and cancellation
/// orchestrators can recompute which keys a reservation occupies without
/// storing an explicit list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotKey(String);

impl SlotKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Active,
    Cancelled,
    Completed,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Active => "active",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

impl FromStr for ReservationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReservationStatus::Pending),
            "active" => Ok(ReservationStatus::Active),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            "completed" => Ok(ReservationStatus::Completed),
            other => Err(anyhow::anyhow!("Invalid ReservationStatus value: {}", other)),
        }
    }
}

/// A fixed-length bookable window for one booth on one day.
///
/// Invariant: `is_available` is true iff no pending/active reservation
/// currently claims the slot. Slots are created lazily per (booth, date)
/// and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub key: SlotKey,
    pub booth_id: BoothId,
    pub date: NaiveDate,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Human-readable start label, e.g. "09:30".
    pub label: String,
    pub is_available: bool,
    pub reservation_id: Option<ReservationId>,
}

/// A customer's claim on a booth for a contiguous span of time.
///
/// While pending/active the reservation holds exclusive claim over the slots
/// spanning [start, start + duration); once cancelled it holds none.
/// Reservations are never hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub booth_id: BoothId,
    pub user_id: UserId,
    pub start_time: NaiveDateTime,
    pub duration_min: u32,
    pub status: ReservationStatus,
    /// Derived: booth hourly price x duration. Never independently mutated.
    pub total_price_cents: u64,
    pub created_at: NaiveDateTime,
    pub cancelled_at: Option<NaiveDateTime>,
}

impl Reservation {
    pub fn end_time(&self) -> NaiveDateTime {
        self.start_time + Duration::minutes(i64::from(self.duration_min))
    }

    /// Only pending/active reservations hold slots and may be cancelled.
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self.status,
            ReservationStatus::Pending | ReservationStatus::Active
        )
    }
}
