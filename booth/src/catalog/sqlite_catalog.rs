//! SQLite-backed booth catalog.
//!
//! Booths are reference data: seeded once when the table is empty, read by
//! the booking layer to resolve the hourly price, never mutated by the
//! reservation subsystem.

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use super::{BoothCatalog, standard_booths};
use crate::types::{Booth, BoothId};

pub struct SqliteBoothCatalog {
    pool: SqlitePool,
}

impl SqliteBoothCatalog {
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect, ensure the schema exists and seed the standard booths.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = SqlitePool::connect(database_url).await?;
        let catalog = Self { pool };
        catalog.migrate().await?;
        catalog.seed_if_empty().await?;
        Ok(catalog)
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS booths (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                hourly_price_cents INTEGER NOT NULL,
                features_json TEXT NOT NULL,
                active INTEGER NOT NULL CHECK (active IN (0,1))
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert the standard booths if the catalog is empty. Idempotent.
    pub async fn seed_if_empty(&self) -> anyhow::Result<()> {
        for booth in standard_booths() {
            let features_json = serde_json::to_string(&booth.features)?;

            sqlx::query(
                r#"
                INSERT OR IGNORE INTO booths (id, name, hourly_price_cents, features_json, active)
                VALUES (?, ?, ?, ?, ?);
            "#,
            )
            .bind(booth.id.as_str())
            .bind(&booth.name)
            .bind(booth.hourly_price_cents as i64)
            .bind(features_json)
            .bind(booth.active)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl BoothCatalog for SqliteBoothCatalog {
    async fn fetch(&self, id: &BoothId) -> anyhow::Result<Option<Booth>> {
        let row = sqlx::query("SELECT * FROM booths WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some(row_to_booth(&r)?)),
            None => Ok(None),
        }
    }

    async fn all(&self) -> anyhow::Result<Vec<Booth>> {
        let rows = sqlx::query("SELECT * FROM booths ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_booth).collect()
    }
}

fn row_to_booth(r: &sqlx::sqlite::SqliteRow) -> anyhow::Result<Booth> {
    let id: String = r.get("id");
    let hourly_price: i64 = r.get("hourly_price_cents");
    if hourly_price < 0 {
        anyhow::bail!("negative hourly price for booth {id}");
    }

    let features_json: String = r.get("features_json");
    let features: Vec<String> =
        serde_json::from_str(&features_json).context("invalid booth features JSON")?;

    Ok(Booth {
        id: BoothId::new(id),
        name: r.get("name"),
        hourly_price_cents: hourly_price as u64,
        features,
        active: r.get("active"),
    })
}
