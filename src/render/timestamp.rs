use crate::types::EventTimestamp;
use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use std::fmt::{Display, Write};

pub const TIMESTAMP_PLACEHOLDER: &str = "--:--:--";
pub const DEFAULT_TIME_FORMAT: &str = "%-I:%M:%S %p";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayZone {
    Local,
    Utc,
    Fixed(FixedOffset),
}

impl DisplayZone {
    /// Accepts `local`, `utc`, or an offset such as `+05:30` / `-0800`.
    pub fn parse(input: &str) -> Option<Self> {
        let normalized = input.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "local" | "" => Some(Self::Local),
            "utc" | "z" => Some(Self::Utc),
            other => parse_utc_offset(other).map(Self::Fixed),
        }
    }
}

fn parse_utc_offset(input: &str) -> Option<FixedOffset> {
    let (sign, digits) = match input.as_bytes().first()? {
        b'+' => (1, &input[1..]),
        b'-' => (-1, &input[1..]),
        _ => return None,
    };
    let digits: String = digits.chars().filter(|ch| *ch != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Formats event instants as a time of day in the configured zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeOfDayFormatter {
    zone: DisplayZone,
    format: String,
}

impl Default for TimeOfDayFormatter {
    fn default() -> Self {
        Self::new(DisplayZone::Local, DEFAULT_TIME_FORMAT)
    }
}

impl TimeOfDayFormatter {
    pub fn new(zone: DisplayZone, format: impl Into<String>) -> Self {
        Self {
            zone,
            format: format.into(),
        }
    }

    /// Unreadable timestamps become [`TIMESTAMP_PLACEHOLDER`].
    pub fn format(&self, timestamp: &EventTimestamp) -> String {
        match timestamp.to_utc() {
            Some(instant) => self.format_instant(instant),
            None => TIMESTAMP_PLACEHOLDER.to_string(),
        }
    }

    pub fn format_instant(&self, instant: DateTime<Utc>) -> String {
        match self.zone {
            DisplayZone::Local => self.write_in_zone(&instant, &Local),
            DisplayZone::Utc => self.write_in_zone(&instant, &Utc),
            DisplayZone::Fixed(offset) => self.write_in_zone(&instant, &offset),
        }
    }

    fn write_in_zone<Tz>(&self, instant: &DateTime<Utc>, zone: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let mut out = String::new();
        // chrono reports a bad format string as a fmt::Error at write time.
        match write!(out, "{}", instant.with_timezone(zone).format(&self.format)) {
            Ok(()) => out,
            Err(_) => TIMESTAMP_PLACEHOLDER.to_string(),
        }
    }
}
