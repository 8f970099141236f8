//! Seconds-since-midnight clock codec.
//!
//! Revision start/end times are stored as seconds since local midnight and shown as
//! zero-padded `HH:mm:ss`. On the wire a [`ClockSeconds`] is written as that string and read
//! back from either the string or a bare integer.

use crate::constants::SECONDS_PER_DAY;
use crate::{CardioError, CardioResult};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seconds since local midnight, always in `0..86400`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockSeconds(u32);

impl ClockSeconds {
    pub const MIDNIGHT: ClockSeconds = ClockSeconds(0);

    pub fn new(seconds: u32) -> CardioResult<Self> {
        if seconds >= SECONDS_PER_DAY {
            return Err(CardioError::ClockOutOfRange(seconds));
        }
        Ok(Self(seconds))
    }

    pub fn seconds(self) -> u32 {
        self.0
    }

    /// 12-hour display form, e.g. `"09:05 PM"`.
    pub fn to_12h(self) -> String {
        seconds_to_clock_12h(self.0)
    }
}

impl fmt::Display for ClockSeconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&seconds_to_clock(self.0))
    }
}

impl FromStr for ClockSeconds {
    type Err = CardioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        clock_to_seconds(s).and_then(Self::new)
    }
}

/// Format seconds since midnight as `HH:mm:ss`.
///
/// Only `0..86400` is meaningful; larger inputs produce hours of 24 or more rather than
/// wrapping.
pub fn seconds_to_clock(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Format seconds since midnight as `hh:mm AM|PM`. Seconds are dropped; inputs past the end
/// of the day wrap around.
pub fn seconds_to_clock_12h(seconds: u32) -> String {
    NaiveTime::from_num_seconds_from_midnight_opt(seconds % SECONDS_PER_DAY, 0)
        .unwrap_or_default()
        .format("%I:%M %p")
        .to_string()
}

/// Parse `HH:mm:ss` into seconds since midnight.
///
/// # Errors
///
/// [`CardioError::InvalidClock`] unless the input is exactly three colon-separated unsigned
/// integers with hours below 24 and minutes and seconds below 60.
pub fn clock_to_seconds(clock: &str) -> CardioResult<u32> {
    let invalid = || CardioError::InvalidClock(clock.to_string());

    let mut fields = clock.trim().split(':');
    let mut next_field = |limit: u32| -> CardioResult<u32> {
        let field = fields.next().ok_or_else(invalid)?;
        if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let value: u32 = field.parse().map_err(|_| invalid())?;
        if value >= limit {
            return Err(invalid());
        }
        Ok(value)
    };

    let hours = next_field(24)?;
    let minutes = next_field(60)?;
    let secs = next_field(60)?;
    if fields.next().is_some() {
        return Err(invalid());
    }

    Ok(hours * 3600 + minutes * 60 + secs)
}

impl Serialize for ClockSeconds {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockSeconds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Seconds(u32),
            Clock(String),
        }

        let parsed = match Raw::deserialize(deserializer)? {
            Raw::Seconds(seconds) => ClockSeconds::new(seconds),
            Raw::Clock(clock) => clock.parse(),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}
