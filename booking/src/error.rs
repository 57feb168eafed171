use thiserror::Error;

use reservation::model::ReservationId;

/// Failure taxonomy of the booking and cancellation orchestrators.
///
/// Validation failures (`InvalidInput`) are detected before any write.
/// `SlotUnavailable` means re-select a time; `Store` wraps a backing-store
/// failure the caller may retry.
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("one or more required slots are no longer available")]
    SlotUnavailable,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("reservation {0} is already cancelled")]
    AlreadyCancelled(ReservationId),

    #[error("caller is not an administrator")]
    Forbidden,

    #[error("store unavailable: {0}")]
    Store(#[from] anyhow::Error),
}
