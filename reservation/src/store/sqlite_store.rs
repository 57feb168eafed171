//! SQLite-backed implementation of the `ReservationStore` trait.
//!
//! This is the durable availability index and reservation ledger:
//!
//!  - slots are inserted lazily with create-if-absent semantics
//!  - claim and release each run inside a single transaction whose UPDATE is
//!    conditional on the current availability/status, so two racing callers
//!    cannot both claim the same slot
//!  - reservations are never deleted, only status-transitioned

use anyhow::Context;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

use super::{ClaimOutcome, ReleaseOutcome, ReservationStore};
use crate::model::{Reservation, ReservationId, ReservationStatus, Slot, SlotKey};
use booth::types::BoothId;

pub struct SqliteReservationStore {
    pool: SqlitePool,
}

impl SqliteReservationStore {
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect and ensure the schema exists.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = SqlitePool::connect(database_url).await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS time_slots (
                slot_key TEXT PRIMARY KEY,
                booth_id TEXT NOT NULL,
                date TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                label TEXT NOT NULL,
                is_available INTEGER NOT NULL CHECK (is_available IN (0,1)),
                reservation_id TEXT
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reservations (
                id TEXT PRIMARY KEY,
                booth_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                start_time TEXT NOT NULL,
                duration_min INTEGER NOT NULL,
                status TEXT NOT NULL,
                total_price_cents INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                cancelled_at TEXT
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"CREATE INDEX IF NOT EXISTS idx_time_slots_booth_date ON time_slots(booth_id, date);"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"CREATE INDEX IF NOT EXISTS idx_reservations_user ON reservations(user_id);"#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ReservationStore for SqliteReservationStore {
    async fn insert_slots_if_absent(&self, slots: &[Slot]) -> anyhow::Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;

        for slot in slots {
            let res = sqlx::query(
                r#"
                INSERT OR IGNORE INTO time_slots
                    (slot_key, booth_id, date, start_time, end_time, label, is_available, reservation_id)
                VALUES (?, ?, ?, ?, ?, ?, ?, NULL);
            "#,
            )
            .bind(slot.key.as_str())
            .bind(slot.booth_id.as_str())
            .bind(slot.date)
            .bind(slot.start_time)
            .bind(slot.end_time)
            .bind(&slot.label)
            .bind(slot.is_available)
            .execute(&mut *tx)
            .await?;

            inserted += res.rows_affected();
        }

        tx.commit().await?;

        if inserted > 0 {
            debug!(inserted, "created missing time slots");
        }
        Ok(inserted)
    }

    async fn slots_for_day(
        &self,
        booth_id: &BoothId,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<Slot>> {
        let rows = sqlx::query(
            r#"SELECT * FROM time_slots WHERE booth_id = ? AND date = ? ORDER BY start_time"#,
        )
        .bind(booth_id.as_str())
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_slot).collect()
    }

    async fn fetch_slots(&self, keys: &[SlotKey]) -> anyhow::Result<Vec<Slot>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT * FROM time_slots WHERE slot_key IN ({}) ORDER BY start_time",
            placeholders(keys.len())
        );

        let mut query = sqlx::query(&sql);
        for key in keys {
            query = query.bind(key.as_str());
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_slot).collect()
    }

    async fn claim_slots(
        &self,
        reservation: &Reservation,
        keys: &[SlotKey],
    ) -> anyhow::Result<ClaimOutcome> {
        if keys.is_empty() {
            anyhow::bail!("attempted to claim an empty slot set");
        }

        let mut tx = self.pool.begin().await?;

        // Conditional claim: only rows still available flip. A shortfall
        // means someone else got there first; roll everything back.
        let sql = format!(
            "UPDATE time_slots SET is_available = 0, reservation_id = ? \
             WHERE slot_key IN ({}) AND is_available = 1",
            placeholders(keys.len())
        );

        let mut query = sqlx::query(&sql).bind(reservation.id.to_string());
        for key in keys {
            query = query.bind(key.as_str());
        }

        let claimed = query.execute(&mut *tx).await?.rows_affected();

        if claimed as usize != keys.len() {
            tx.rollback().await?;
            debug!(
                reservation_id = %reservation.id,
                wanted = keys.len(),
                claimed,
                "slot claim lost to a concurrent booking"
            );
            return Ok(ClaimOutcome::Unavailable);
        }

        sqlx::query(
            r#"
            INSERT INTO reservations
                (id, booth_id, user_id, start_time, duration_min, status,
                 total_price_cents, created_at, cancelled_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?);
        "#,
        )
        .bind(reservation.id.to_string())
        .bind(reservation.booth_id.as_str())
        .bind(&reservation.user_id)
        .bind(reservation.start_time)
        .bind(reservation.duration_min as i64)
        .bind(reservation.status.to_string())
        .bind(reservation.total_price_cents as i64)
        .bind(reservation.created_at)
        .bind(reservation.cancelled_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(ClaimOutcome::Claimed)
    }

    async fn release_reservation(
        &self,
        id: ReservationId,
        cancelled_at: NaiveDateTime,
        keys: &[SlotKey],
    ) -> anyhow::Result<ReleaseOutcome> {
        let mut tx = self.pool.begin().await?;

        // Conditional on the reservation still holding its slots; a repeat
        // cancellation (or a race with one) flips zero rows.
        let res = sqlx::query(
            r#"
            UPDATE reservations SET status = ?, cancelled_at = ?
            WHERE id = ? AND status IN ('pending', 'active');
        "#,
        )
        .bind(ReservationStatus::Cancelled.to_string())
        .bind(cancelled_at)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        if res.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(ReleaseOutcome::NotCancellable);
        }

        if !keys.is_empty() {
            let sql = format!(
                "UPDATE time_slots SET is_available = 1, reservation_id = NULL \
                 WHERE slot_key IN ({}) AND reservation_id = ?",
                placeholders(keys.len())
            );

            let mut query = sqlx::query(&sql);
            for key in keys {
                query = query.bind(key.as_str());
            }
            query.bind(id.to_string()).execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(ReleaseOutcome::Released)
    }

    async fn fetch_reservation(&self, id: ReservationId) -> anyhow::Result<Option<Reservation>> {
        let row = sqlx::query("SELECT * FROM reservations WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some(row_to_reservation(&r)?)),
            None => Ok(None),
        }
    }

    async fn reservations_for_user(&self, user_id: &str) -> anyhow::Result<Vec<Reservation>> {
        let rows =
            sqlx::query("SELECT * FROM reservations WHERE user_id = ? ORDER BY start_time")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(row_to_reservation).collect()
    }

    async fn all_reservations(&self) -> anyhow::Result<Vec<Reservation>> {
        let rows = sqlx::query("SELECT * FROM reservations ORDER BY start_time")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_reservation).collect()
    }

    async fn update_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> anyhow::Result<bool> {
        let res =
            sqlx::query("UPDATE reservations SET status = ? WHERE id = ? AND status != 'cancelled'")
                .bind(status.to_string())
                .bind(id.to_string())
                .execute(&self.pool)
                .await?;

        Ok(res.rows_affected() > 0)
    }
}

/* =========================
Row mapping
========================= */

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn row_to_slot(r: &sqlx::sqlite::SqliteRow) -> anyhow::Result<Slot> {
    let reservation_id = r
        .get::<Option<String>, _>("reservation_id")
        .map(|s| Uuid::parse_str(&s))
        .transpose()
        .context("invalid reservation_id on slot row")?;

    Ok(Slot {
        key: SlotKey::new(r.get::<String, _>("slot_key")),
        booth_id: BoothId::new(r.get::<String, _>("booth_id")),
        date: r.get("date"),
        start_time: r.get("start_time"),
        end_time: r.get("end_time"),
        label: r.get("label"),
        is_available: r.get("is_available"),
        reservation_id,
    })
}

fn row_to_reservation(r: &sqlx::sqlite::SqliteRow) -> anyhow::Result<Reservation> {
    let id_str: String = r.get("id");
    let id = Uuid::parse_str(&id_str).context("invalid reservation id")?;

    let status_str: String = r.get("status");
    let status = ReservationStatus::from_str(&status_str)
        .with_context(|| format!("invalid reservation status '{status_str}'"))?;

    let duration: i64 = r.get("duration_min");
    let price: i64 = r.get("total_price_cents");
    if duration < 0 || price < 0 {
        anyhow::bail!("negative duration or price on reservation {id}");
    }

    Ok(Reservation {
        id,
        booth_id: BoothId::new(r.get::<String, _>("booth_id")),
        user_id: r.get("user_id"),
        start_time: r.get("start_time"),
        duration_min: duration as u32,
        status,
        total_price_cents: price as u64,
        created_at: r.get("created_at"),
        cancelled_at: r.get("cancelled_at"),
    })
}
