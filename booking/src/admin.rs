//! Admin surface consumed by the dashboard collaborator.
//!
//! Authorization is a single boolean capability on the caller, resolved once
//! at the authentication boundary through `AdminDirectory`.

use std::sync::Arc;

use tracing::info;

use reservation::model::{Reservation, ReservationId, ReservationStatus, UserId};
use reservation::store::ReservationStore;

use crate::error::BookingError;

/// An authenticated caller as seen by the admin surface.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: UserId,
    pub is_admin: bool,
}

/// Authentication collaborator that owns the admin capability.
#[async_trait::async_trait]
pub trait AdminDirectory: Send + Sync {
    async fn is_admin(&self, user_id: &str) -> anyhow::Result<bool>;
    async fn set_admin(&self, user_id: &str, grant: bool) -> anyhow::Result<()>;
}

pub struct AdminService<S: ReservationStore, D: AdminDirectory> {
    store: Arc<S>,
    directory: Arc<D>,
}

impl<S: ReservationStore, D: AdminDirectory> AdminService<S, D> {
    pub fn new(store: Arc<S>, directory: Arc<D>) -> Self {
        Self { store, directory }
    }

    /// Resolve a user id into a caller with its admin capability.
    pub async fn caller(&self, user_id: impl Into<UserId>) -> Result<Caller, BookingError> {
        let user_id = user_id.into();
        let is_admin = self.directory.is_admin(&user_id).await?;
        Ok(Caller { user_id, is_admin })
    }

    pub async fn all_reservations(
        &self,
        caller: &Caller,
    ) -> Result<Vec<Reservation>, BookingError> {
        require_admin(caller)?;
        Ok(self.store.all_reservations().await?)
    }

    /// Admin status transition (e.g. confirm pending -> active, or mark
    /// completed). Cancellation is refused here: it must go through the
    /// cancellation orchestrator so the occupied slots are released. For the
    /// same reason a cancelled reservation cannot be transitioned at all —
    /// its slots are already released, so reviving it would leave a live
    /// claim over a window anyone can book.
    pub async fn update_reservation_status(
        &self,
        caller: &Caller,
        id: ReservationId,
        status: ReservationStatus,
    ) -> Result<(), BookingError> {
        require_admin(caller)?;

        if status == ReservationStatus::Cancelled {
            return Err(BookingError::InvalidInput(
                "use cancel_reservation to cancel; it releases the occupied slots".to_string(),
            ));
        }

        let current = self
            .store
            .fetch_reservation(id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("reservation {id}")))?;

        if current.status == ReservationStatus::Cancelled {
            return Err(BookingError::AlreadyCancelled(id));
        }

        // The store update is itself conditional on the status not being
        // cancelled; a cancellation racing in between wins, not the update.
        if !self.store.update_status(id, status).await? {
            return Err(BookingError::AlreadyCancelled(id));
        }

        info!(reservation_id = %id, %status, admin = %caller.user_id, "reservation status updated");
        Ok(())
    }

    pub async fn set_user_role(
        &self,
        caller: &Caller,
        target_user_id: &str,
        grant: bool,
    ) -> Result<(), BookingError> {
        require_admin(caller)?;
        self.directory.set_admin(target_user_id, grant).await?;

        info!(target = %target_user_id, grant, admin = %caller.user_id, "admin role toggled");
        Ok(())
    }
}

fn require_admin(caller: &Caller) -> Result<(), BookingError> {
    if caller.is_admin {
        Ok(())
    } else {
        Err(BookingError::Forbidden)
    }
}
