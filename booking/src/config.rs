use reservation::slot::DaySchedule;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Database connection string.
    pub database_url: String,

    /// First bookable hour of the day.
    pub open_hour: u32,

    /// Closing hour; the last slot ends exactly here.
    pub close_hour: u32,

    /// Slot granularity in minutes.
    pub slot_minutes: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://booths_dev.db".to_string());

        Self {
            database_url,
            open_hour: env_u32("OPEN_HOUR", 9),
            close_hour: env_u32("CLOSE_HOUR", 21),
            slot_minutes: env_u32("SLOT_MINUTES", 30),
        }
    }

    pub fn schedule(&self) -> DaySchedule {
        DaySchedule {
            open_hour: self.open_hour,
            close_hour: self.close_hour,
            slot_minutes: self.slot_minutes,
        }
    }
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
