use chrono::{NaiveDateTime, TimeDelta};

use crate::error::{ConvertError, Result};

static DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

/// ISO 8601 without offset, always with microseconds.
pub const EFFECTIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

const MICROS_PER_SECOND: f64 = 1_000_000.0;

pub fn parse_datetime(value: &str) -> Result<NaiveDateTime> {
    let trimmed = value.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(dt);
        }
    }
    Err(ConvertError::InvalidTimestamp {
        value: trimmed.to_string(),
        message: "expected 'YYYY-MM-DD HH:MM:SS[.ffffff]'".to_string(),
    })
}

/// Combines the separate date and time-of-day strings of a recording header.
pub fn parse_start_time(date: &str, time: &str) -> Result<NaiveDateTime> {
    parse_datetime(&format!("{} {}", date.trim(), time.trim()))
}

pub fn format_effective(dt: &NaiveDateTime) -> String {
    dt.format(EFFECTIVE_FORMAT).to_string()
}

/// Maps a sample offset (row position or sequence number) onto wall-clock time
/// with a constant step of `1 / sampling_rate` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleClock {
    start: NaiveDateTime,
    sampling_rate: f64,
}

impl SampleClock {
    pub fn new(start: NaiveDateTime, sampling_rate: f64) -> Result<Self> {
        if !sampling_rate.is_finite() || sampling_rate <= 0.0 {
            return Err(ConvertError::InvalidSamplingRate(sampling_rate));
        }
        Ok(Self {
            start,
            sampling_rate,
        })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    /// Elapsed microseconds for `offset`, rounded to the nearest microsecond.
    pub fn offset_micros(&self, offset: f64) -> i64 {
        (offset * MICROS_PER_SECOND / self.sampling_rate).round() as i64
    }

    pub fn at(&self, offset: f64) -> Result<NaiveDateTime> {
        self.start
            .checked_add_signed(TimeDelta::microseconds(self.offset_micros(offset)))
            .ok_or_else(|| ConvertError::InvalidTimestamp {
                value: format!("{} + {offset} samples", self.start),
                message: "timestamp out of range".to_string(),
            })
    }
}
