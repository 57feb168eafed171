use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[clap(name = "boothctl", version)]
pub struct Cli {
    /// Print results as JSON instead of plain text
    #[clap(long, global = true)]
    pub json: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the booth catalog
    Booths,

    /// Show available start times for a booth on a given day
    Availability {
        booth: String,

        /// Day to query (YYYY-MM-DD)
        date: NaiveDate,

        /// Session length in minutes
        #[clap(long, default_value = "60")]
        duration: u32,
    },

    /// Book a booth
    Reserve {
        booth: String,
        user: String,

        /// Start of the session (YYYY-MM-DDTHH:MM)
        #[clap(value_parser = parse_start)]
        start: NaiveDateTime,

        /// Session length in minutes
        #[clap(long, default_value = "60")]
        duration: u32,
    },

    /// Cancel a reservation and free its slots
    Cancel { id: Uuid },

    /// List a user's reservations
    Reservations { user: String },
}

fn parse_start(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .map_err(|e| format!("expected YYYY-MM-DDTHH:MM: {e}"))
}
