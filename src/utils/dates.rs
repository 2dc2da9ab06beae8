//! W3CDTF date handling (https://www.w3.org/TR/NOTE-datetime).
//!
//! Date-only values are anchored at midnight UTC.

use crate::utils::error::{RdpError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M%z", "%Y-%m-%dT%H:%M:%S%z"];

fn colon_offset() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[+-]\d{1,2}:\d\d$").expect("static regex"))
}

fn year_month() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})(?:-(\d{2}))?$").expect("static regex"))
}

fn midnight_utc(date: NaiveDate) -> Option<DateTime<FixedOffset>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&naive).fixed_offset())
}

/// Parses a single W3CDTF date or date-time.
pub fn parse_date_string(date_string: &str) -> Result<DateTime<FixedOffset>> {
    let invalid = || RdpError::InvalidDate {
        value: date_string.to_string(),
    };

    let mut candidate = date_string.trim().to_string();
    if let Some(stripped) = candidate.strip_suffix('Z') {
        candidate = format!("{}+0000", stripped);
    }
    // "+01:00" -> "+0100"
    if colon_offset().is_match(&candidate) {
        let cut = candidate.len() - 3;
        candidate.replace_range(cut..cut + 1, "");
    }

    if let Some(caps) = year_month().captures(&candidate) {
        let year: i32 = caps[1].parse().map_err(|_| invalid())?;
        let month: u32 = match caps.get(2) {
            Some(m) => m.as_str().parse().map_err(|_| invalid())?,
            None => 1,
        };
        return NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(midnight_utc)
            .ok_or_else(invalid);
    }

    if let Ok(date) = NaiveDate::parse_from_str(&candidate, "%Y-%m-%d") {
        return midnight_utc(date).ok_or_else(invalid);
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(&candidate, format).ok())
        .ok_or_else(invalid)
}

/// A point in time or a `start/end` interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateValue {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub is_range: bool,
}

impl DateValue {
    pub fn parse(value: &str) -> Result<Self> {
        match value.split_once('/') {
            Some((start, end)) => {
                let start = parse_date_string(start)?;
                let end = parse_date_string(end)?;
                if end < start {
                    return Err(RdpError::InvalidDate {
                        value: value.to_string(),
                    });
                }
                Ok(Self {
                    start,
                    end,
                    is_range: true,
                })
            }
            None => {
                let start = parse_date_string(value)?;
                Ok(Self {
                    start,
                    end: start,
                    is_range: false,
                })
            }
        }
    }
}
