//! Pure slot arithmetic: key derivation, day generation, occupancy.
//!
//! No async, no IO. Both orchestrators recompute slot keys from
//! (booth, start, duration) with these functions, which is what makes the
//! claim/release pair symmetric.

use booth::types::BoothId;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::model::{Slot, SlotKey};

/// Operating window and slot granularity for one calendar day.
#[derive(Debug, Clone, Copy)]
pub struct DaySchedule {
    /// First bookable hour (slots start at `open_hour:00`).
    pub open_hour: u32,
    /// Closing hour; the last slot ends exactly here.
    pub close_hour: u32,
    /// Slot length in minutes. Must divide 60.
    pub slot_minutes: u32,
}

impl Default for DaySchedule {
    fn default() -> Self {
        Self {
            open_hour: 9,
            close_hour: 21,
            slot_minutes: 30,
        }
    }
}

impl DaySchedule {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.open_hour >= self.close_hour || self.close_hour > 24 {
            anyhow::bail!(
                "invalid operating hours: {}..{}",
                self.open_hour,
                self.close_hour
            );
        }
        if self.slot_minutes == 0 || 60 % self.slot_minutes != 0 {
            anyhow::bail!("slot length must divide 60, got {}", self.slot_minutes);
        }
        Ok(())
    }

    /// Inclusive open / exclusive close boundary for `date`.
    pub fn window(&self, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        let midnight = date.and_time(NaiveTime::MIN);
        (
            midnight + Duration::minutes(i64::from(self.open_hour) * 60),
            midnight + Duration::minutes(i64::from(self.close_hour) * 60),
        )
    }

    /// True when `t` falls exactly on a slot boundary of this schedule.
    pub fn is_aligned(&self, t: NaiveDateTime) -> bool {
        t.second() == 0 && t.nanosecond() == 0 && t.minute() % self.slot_minutes == 0
    }
}

/// Number of consecutive slots a duration occupies (ceiling division).
pub fn slots_needed(duration_min: u32, slot_minutes: u32) -> u32 {
    duration_min.div_ceil(slot_minutes)
}

pub fn time_label(hour: u32, minute: u32) -> String {
    format!("{hour:02}:{minute:02}")
}

/// Derive the deterministic key for a slot: `{booth}_{YYYY-MM-DD}_{HHMM}`.
pub fn slot_key(booth_id: &BoothId, date: NaiveDate, hour: u32, minute: u32) -> SlotKey {
    SlotKey::new(format!(
        "{}_{}_{:02}{:02}",
        booth_id.as_str(),
        date.format("%Y-%m-%d"),
        hour,
        minute
    ))
}

/// Key of the slot covering the instant `t` starts at.
pub fn key_for(booth_id: &BoothId, t: NaiveDateTime) -> SlotKey {
    slot_key(booth_id, t.date(), t.hour(), t.minute())
}

/// Generate the full slot set for (booth, date): one available slot per
/// granularity step from opening to closing hour. Deterministic; the caller
/// persists the result with create-if-absent semantics.
pub fn day_slots(booth_id: &BoothId, date: NaiveDate, schedule: &DaySchedule) -> Vec<Slot> {
    let (open, close) = schedule.window(date);
    let step = Duration::minutes(i64::from(schedule.slot_minutes));

    let mut slots = Vec::new();
    let mut start = open;

    while start < close {
        let end = start + step;
        slots.push(Slot {
            key: key_for(booth_id, start),
            booth_id: booth_id.clone(),
            date,
            start_time: start,
            end_time: end,
            label: time_label(start.hour(), start.minute()),
            is_available: true,
            reservation_id: None,
        });
        start = end;
    }

    slots
}

/// Keys of the consecutive slots a reservation starting at `start` for
/// `duration_min` occupies.
pub fn occupied_keys(
    booth_id: &BoothId,
    start: NaiveDateTime,
    duration_min: u32,
    slot_minutes: u32,
) -> Vec<SlotKey> {
    let n = slots_needed(duration_min, slot_minutes);
    (0..n)
        .map(|i| key_for(booth_id, start + Duration::minutes(i64::from(i * slot_minutes))))
        .collect()
}
