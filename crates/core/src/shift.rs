//! # Shift Calendar
//!
//! Turns a working shift (wall-clock start and end) into the fixed-length
//! slot boundaries customers can book on a given date.
//!
//! Slots are produced lazily and walk forward from the shift start in steps
//! of the slot length. A slot is only emitted when its end does not exceed the
//! shift end, so a trailing partial slot is dropped rather than truncated.
//! Shifts are generated independently; no slot ever spans the gap between the
//! morning and the afternoon shift.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named working period expressed in wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftDefinition {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ShiftDefinition {
    /// Builds a shift from hour/minute pairs.
    ///
    /// Returns `None` when either pair is not a valid time of day or when the
    /// shift does not start strictly before it ends.
    pub fn from_hm(start_hour: u32, start_minute: u32, end_hour: u32, end_minute: u32) -> Option<Self> {
        let start = NaiveTime::from_hms_opt(start_hour, start_minute, 0)?;
        let end = NaiveTime::from_hms_opt(end_hour, end_minute, 0)?;
        (start < end).then_some(Self { start, end })
    }

    /// The shift boundaries on a concrete date.
    pub fn on(&self, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        (date.and_time(self.start), date.and_time(self.end))
    }

    pub fn slots_on(&self, date: NaiveDate, slot_minutes: u32) -> SlotIter {
        generate_slots(date, self.start, self.end, slot_minutes)
    }
}

impl fmt::Display for ShiftDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// Parses the `HH:MM-HH:MM` form used in configuration.
impl FromStr for ShiftDefinition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid shift '{}': expected HH:MM-HH:MM", s))?;
        let start = NaiveTime::parse_from_str(start.trim(), "%H:%M")
            .map_err(|e| format!("Invalid shift start '{}': {}", start.trim(), e))?;
        let end = NaiveTime::parse_from_str(end.trim(), "%H:%M")
            .map_err(|e| format!("Invalid shift end '{}': {}", end.trim(), e))?;
        if start >= end {
            return Err(format!("Invalid shift '{}': start must be before end", s));
        }
        Ok(Self { start, end })
    }
}

/// Wall-clock boundaries of one bookable slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotBounds {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Lazy, finite sequence of slots inside one shift.
#[derive(Debug, Clone)]
pub struct SlotIter {
    next_start: NaiveDateTime,
    shift_end: NaiveDateTime,
    step: Duration,
}

impl Iterator for SlotIter {
    type Item = SlotBounds;

    fn next(&mut self) -> Option<Self::Item> {
        if self.step <= Duration::zero() {
            return None;
        }
        let end = self.next_start + self.step;
        if end > self.shift_end {
            return None;
        }
        let slot = SlotBounds {
            start: self.next_start,
            end,
        };
        self.next_start = end;
        Some(slot)
    }
}

/// Generates the slots of a shift on `date`.
///
/// Pure and deterministic. A shift shorter than one slot yields nothing, and
/// so does a zero slot length. Inverted shifts are a configuration error that
/// is rejected when the configuration is parsed, not here; they simply yield
/// nothing.
pub fn generate_slots(
    date: NaiveDate,
    shift_start: NaiveTime,
    shift_end: NaiveTime,
    slot_minutes: u32,
) -> SlotIter {
    SlotIter {
        next_start: date.and_time(shift_start),
        shift_end: date.and_time(shift_end),
        step: Duration::minutes(i64::from(slot_minutes)),
    }
}

/// The two daily shifts together with the slot length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftCalendar {
    pub morning: ShiftDefinition,
    pub afternoon: ShiftDefinition,
    pub slot_minutes: u32,
}

impl ShiftCalendar {
    /// Morning slots followed by afternoon slots for `date`.
    pub fn slots_for(&self, date: NaiveDate) -> impl Iterator<Item = SlotBounds> + '_ {
        self.morning
            .slots_on(date, self.slot_minutes)
            .chain(self.afternoon.slots_on(date, self.slot_minutes))
    }

    /// The morning shift must end no later than the afternoon shift starts.
    pub fn check_shifts(&self) -> Result<(), String> {
        if self.morning.end > self.afternoon.start {
            return Err(format!(
                "Morning shift ends at {} but afternoon shift starts at {}",
                self.morning.end.format("%H:%M"),
                self.afternoon.start.format("%H:%M")
            ));
        }
        Ok(())
    }
}

impl Default for ShiftCalendar {
    fn default() -> Self {
        Self {
            morning: ShiftDefinition {
                start: wall_clock(8, 0),
                end: wall_clock(11, 30),
            },
            afternoon: ShiftDefinition {
                start: wall_clock(13, 30),
                end: wall_clock(20, 0),
            },
            slot_minutes: 15,
        }
    }
}

/// Time of day for compile-time known constants; out-of-range input maps to midnight.
pub(crate) fn wall_clock(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}
