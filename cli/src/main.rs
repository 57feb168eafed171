pub mod cli;

use std::sync::Arc;

use clap::Parser;
use sqlx::SqlitePool;

use booking::config::AppConfig;
use booking::engine::{BookingEngine, ReservationRequest};
use booth::catalog::BoothCatalog;
use booth::catalog::sqlite_catalog::SqliteBoothCatalog;
use booth::types::BoothId;
use cli::{Cli, Command};
use common::logger::init_logger;
use common::time::now_local;
use reservation::store::sqlite_store::SqliteReservationStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger("boothctl");

    let args = Cli::parse();
    let config = AppConfig::from_env();

    let pool = SqlitePool::connect(&config.database_url).await?;

    let catalog = Arc::new(SqliteBoothCatalog::from_pool(pool.clone()));
    catalog.migrate().await?;
    catalog.seed_if_empty().await?;

    let store = Arc::new(SqliteReservationStore::from_pool(pool));
    store.migrate().await?;

    let engine = BookingEngine::new(store, catalog.clone(), config.schedule())?;

    match args.command {
        Command::Booths => {
            let booths = catalog.all().await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&booths)?);
            } else {
                for b in booths {
                    let price = b.hourly_price_cents as f64 / 100.0;
                    let state = if b.active { "" } else { " (inactive)" };
                    println!("{}  {}  {:.2}/h{}", b.id, b.name, price, state);
                }
            }
        }

        Command::Availability {
            booth,
            date,
            duration,
        } => {
            let starts = engine
                .available_slots(&BoothId::new(booth), date, duration, now_local())
                .await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&starts)?);
            } else if starts.is_empty() {
                println!("no availability on {date} for {duration} minutes");
            } else {
                for s in starts {
                    println!("{}", s.label);
                }
            }
        }

        Command::Reserve {
            booth,
            user,
            start,
            duration,
        } => {
            let id = engine
                .create_reservation(
                    ReservationRequest {
                        booth_id: BoothId::new(booth),
                        user_id: user,
                        start_time: start,
                        duration_min: duration,
                    },
                    now_local(),
                )
                .await?;

            let reservation = engine.reservation(id).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&reservation)?);
            } else {
                println!(
                    "reserved {} from {} for {} min, total {:.2} ({})",
                    reservation.booth_id,
                    reservation.start_time.format("%Y-%m-%d %H:%M"),
                    reservation.duration_min,
                    reservation.total_price_cents as f64 / 100.0,
                    reservation.id
                );
            }
        }

        Command::Cancel { id } => {
            engine.cancel_reservation(id, now_local()).await?;
            println!("reservation {id} cancelled");
        }

        Command::Reservations { user } => {
            let reservations = engine.user_reservations(&user).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&reservations)?);
            } else if reservations.is_empty() {
                println!("no reservations for {user}");
            } else {
                for r in reservations {
                    println!(
                        "{}  {}  {} min  {}  {}",
                        r.id,
                        r.start_time.format("%Y-%m-%d %H:%M"),
                        r.duration_min,
                        r.booth_id,
                        r.status
                    );
                }
            }
        }
    }

    Ok(())
}
