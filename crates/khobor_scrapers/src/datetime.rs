//! Normalizer for Bangla-script publisher timestamps.
//!
//! Bangladesh Pratidin prints datelines as `HH:MM, <weekday>, DD <month>, YYYY`
//! using Bangla digits and Bangla weekday/month names. The translator is
//! table-driven: digits map through a 10-symbol lexicon, month names resolve
//! by ordinal position in a fixed vocabulary (position is the month number).
//! The full grammar must match; partially matching strings are rejected.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateTimeError {
    #[error("datetime string does not match the expected grammar")]
    InvalidFormat,

    #[error("datetime token outside the known lexicon: {0}")]
    InvalidValue(String),
}

/// Publisher timestamps are Dhaka local time, UTC+6.
pub const DHAKA_UTC_OFFSET_SECS: i32 = 6 * 3600;

const BANGLA_DIGITS: [char; 10] = ['০', '১', '২', '৩', '৪', '৫', '৬', '৭', '৮', '৯'];

const BANGLA_WEEKDAYS: [&str; 7] = [
    "রবিবার",
    "সোমবার",
    "মঙ্গলবার",
    "বুধবার",
    "বৃহস্পতিবার",
    "শুক্রবার",
    "শনিবার",
];

const BANGLA_MONTHS: [&str; 12] = [
    "জানুয়ারি",
    "ফেব্রুয়ারি",
    "মার্চ",
    "এপ্রিল",
    "মে",
    "জুন",
    "জুলাই",
    "আগস্ট",
    "সেপ্টেম্বর",
    "অক্টোবর",
    "নভেম্বর",
    "ডিসেম্বর",
];

/// Parses `HH:MM, <weekday>, DD <month>, YYYY` into UTC.
pub fn parse_bangla_datetime(text: &str) -> Result<DateTime<Utc>, DateTimeError> {
    let parts: Vec<&str> = text.split(", ").collect();
    let [clock, weekday, day_month, year] = parts[..] else {
        return Err(DateTimeError::InvalidFormat);
    };

    let (hh, mm) = clock
        .split_once(':')
        .ok_or(DateTimeError::InvalidFormat)?;
    let hour = digits_to_number(hh, 2)?;
    let minute = digits_to_number(mm, 2)?;

    // Weekday membership is checked against the lexicon but not cross-checked
    // against the resolved calendar date.
    if !BANGLA_WEEKDAYS.contains(&weekday) {
        return Err(DateTimeError::InvalidValue(weekday.to_string()));
    }

    let (dd, month_name) = day_month
        .split_once(' ')
        .ok_or(DateTimeError::InvalidFormat)?;
    let day = digits_to_number(dd, 2)?;
    let month = BANGLA_MONTHS
        .iter()
        .position(|&name| name == month_name)
        .map(|i| i as u32 + 1)
        .ok_or_else(|| DateTimeError::InvalidValue(month_name.to_string()))?;

    let year = digits_to_number(year, 4)?;

    let offset = FixedOffset::east_opt(DHAKA_UTC_OFFSET_SECS).unwrap();
    offset
        .with_ymd_and_hms(year as i32, month, day, hour, minute, 0)
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| DateTimeError::InvalidValue(text.to_string()))
}

/// Translates a fixed-width run of Bangla digits to its numeric value,
/// failing fast on any out-of-vocabulary symbol.
fn digits_to_number(text: &str, width: usize) -> Result<u32, DateTimeError> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() != width {
        return Err(DateTimeError::InvalidFormat);
    }

    let mut value = 0u32;
    for c in chars {
        let digit = BANGLA_DIGITS
            .iter()
            .position(|&d| d == c)
            .ok_or_else(|| DateTimeError::InvalidValue(c.to_string()))?;
        value = value * 10 + digit as u32;
    }
    Ok(value)
}
