use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a physical rentable booth (e.g. "cabina1").
///
/// Slot keys embed this value verbatim, so it must be stable across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoothId(String);

impl BoothId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BoothId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static reference data for one booth.
///
/// Read-only from the reservation subsystem's perspective: booking and
/// cancellation never mutate booths, they only read the hourly price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booth {
    pub id: BoothId,
    pub name: String,
    /// Hourly rental price in cents.
    pub hourly_price_cents: u64,
    pub features: Vec<String>,
    pub active: bool,
}
