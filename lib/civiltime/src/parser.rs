//! Hand-written ISO 8601 scanner and printer shared by [`Date`], [`Time`]
//! and [`DateTime`].
//!
//! The date grammars are dispatched by string length and the characters at
//! the grammar's fixed positions:
//!
//! | form         | rendered     | length |
//! |--------------|--------------|--------|
//! | `%Y-%m-%d`   | `YYYY-MM-DD` | 10     |
//! | `%Y%m%d`     | `YYYYMMDD`   | 8      |
//! | `%Y-W%V`     | `YYYY-Www`   | 8      |
//! | `%YW%V`      | `YYYYWww`    | 7      |
//! | `%Y-W%V-%u`  | `YYYY-Www-D` | 10     |
//! | `%YW%V%u`    | `YYYYWwwD`   | 8      |
//! | `%Y-%j`      | `YYYY-DDD`   | 8      |
//! | `%Y%j`       | `YYYYDDD`    | 7      |
//!
//! Separator presence is inferred once at the year boundary and enforced for
//! the rest of the string; times infer theirs from the first field boundary
//! the same way.

use crate::date::{
    Date, DateTimeOverflowError, MAX_YEAR, MIN_YEAR, ValidationError, days_before_year,
    is_leap_year,
};
use crate::date_time::DateTime;
use crate::duration::Duration;
use crate::time::Time;
use crate::timezone::{FixedOffset, InvalidOffsetError, TimeZone, utc};
use std::fmt::Write;
use std::sync::Arc;

/// How much of the time of day `isoformat` renders.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub enum TimeSpec {
    /// Seconds, or microseconds when the microsecond field is non-zero.
    #[default]
    Auto,
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
    Microseconds,
}

/// Renders `HH[:MM[:SS[.fff[fff]]]]` per `timespec`.
pub(crate) fn push_time(
    out: &mut String,
    hour: u8,
    minute: u8,
    second: u8,
    microsecond: u32,
    timespec: TimeSpec,
) {
    let timespec = match timespec {
        TimeSpec::Auto if microsecond == 0 => TimeSpec::Seconds,
        TimeSpec::Auto => TimeSpec::Microseconds,
        explicit => explicit,
    };
    match timespec {
        TimeSpec::Hours => write!(out, "{hour:02}"),
        TimeSpec::Minutes => write!(out, "{hour:02}:{minute:02}"),
        TimeSpec::Seconds => write!(out, "{hour:02}:{minute:02}:{second:02}"),
        TimeSpec::Milliseconds => write!(
            out,
            "{hour:02}:{minute:02}:{second:02}.{:03}",
            microsecond / 1_000
        ),
        TimeSpec::Auto | TimeSpec::Microseconds => {
            write!(out, "{hour:02}:{minute:02}:{second:02}.{microsecond:06}")
        }
    }
    .unwrap();
}

/// Renders `±HH:MM[:SS[.ffffff]]`.
pub(crate) fn push_offset(out: &mut String, offset: Duration) {
    let (sign, offset) = if offset < Duration::ZERO {
        ('-', offset.abs())
    } else {
        ('+', offset)
    };
    let seconds = offset.total_seconds_truncated();
    write!(out, "{sign}{:02}:{:02}", seconds / 3_600, seconds % 3_600 / 60).unwrap();
    if seconds % 60 != 0 || offset.microseconds() != 0 {
        write!(out, ":{:02}", seconds % 60).unwrap();
        if offset.microseconds() != 0 {
            write!(out, ".{:06}", offset.microseconds()).unwrap();
        }
    }
}

/// An ISO 8601 string failed to parse.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ParseError(#[from] ParseErrorKind);

#[derive(Debug, Clone, thiserror::Error)]
enum ParseErrorKind {
    #[error("{message} at byte {position}")]
    Syntax {
        message: &'static str,
        position: usize,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Overflow(#[from] DateTimeOverflowError),
    #[error(transparent)]
    InvalidOffset(#[from] InvalidOffsetError),
}

impl ParseError {
    const fn syntax(message: &'static str, position: usize) -> Self {
        Self(ParseErrorKind::Syntax { message, position })
    }

    /// Byte offset of the offending character, for syntax errors.
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        match &self.0 {
            ParseErrorKind::Syntax { position, .. } => Some(*position),
            _ => None,
        }
    }
}

impl From<ValidationError> for ParseError {
    fn from(error: ValidationError) -> Self {
        Self(ParseErrorKind::Validation(error))
    }
}

impl From<DateTimeOverflowError> for ParseError {
    fn from(error: DateTimeOverflowError) -> Self {
        Self(ParseErrorKind::Overflow(error))
    }
}

impl From<InvalidOffsetError> for ParseError {
    fn from(error: InvalidOffsetError) -> Self {
        Self(ParseErrorKind::InvalidOffset(error))
    }
}

/// Reads exactly `count` ASCII digits starting at `pos`.
fn digits(s: &[u8], pos: usize, count: usize) -> Result<(i64, usize), ParseError> {
    let end = pos + count;
    if s.len() < end {
        return Err(ParseError::syntax("unexpected end of string", s.len()));
    }
    let mut value = 0_i64;
    for (i, &byte) in s[pos..end].iter().enumerate() {
        if !byte.is_ascii_digit() {
            return Err(ParseError::syntax("expected a digit", pos + i));
        }
        value = value * 10 + i64::from(byte - b'0');
    }
    Ok((value, end))
}

fn expect_byte(
    s: &[u8],
    pos: usize,
    expected: u8,
    message: &'static str,
) -> Result<usize, ParseError> {
    if s.get(pos) == Some(&expected) {
        Ok(pos + 1)
    } else {
        Err(ParseError::syntax(message, pos))
    }
}

// yearFrag '-'? monthFrag '-'? dayFrag
fn scan_calendar_date(s: &[u8], sep: bool) -> Result<Date, ParseError> {
    let (year, pos) = digits(s, 0, 4)?;
    let pos = if sep {
        expect_byte(s, pos, b'-', "expected '-' after the year")?
    } else {
        pos
    };
    let (month, pos) = digits(s, pos, 2)?;
    let pos = if sep {
        expect_byte(s, pos, b'-', "inconsistent use of the date separator")?
    } else {
        pos
    };
    let (day, _) = digits(s, pos, 2)?;
    Ok(Date::new(year, month, day)?)
}

// yearFrag '-'? 'W' weekFrag ('-'? weekdayFrag)?
fn scan_week_date(s: &[u8], sep: bool, with_day: bool) -> Result<Date, ParseError> {
    let (year, pos) = digits(s, 0, 4)?;
    let pos = if sep {
        expect_byte(s, pos, b'-', "expected '-' after the year")?
    } else {
        pos
    };
    let pos = expect_byte(s, pos, b'W', "expected 'W' before the week number")?;
    let (week, pos) = digits(s, pos, 2)?;
    let weekday = if with_day {
        let pos = if sep {
            expect_byte(s, pos, b'-', "inconsistent use of the date separator")?
        } else {
            pos
        };
        let (weekday, _) = digits(s, pos, 1)?;
        weekday
    } else {
        1
    };
    Ok(Date::from_iso_week_date(year, week, weekday)?)
}

// yearFrag '-'? dayOfYearFrag
fn scan_ordinal_date(s: &[u8], sep: bool) -> Result<Date, ParseError> {
    let (year, pos) = digits(s, 0, 4)?;
    let pos = if sep {
        expect_byte(s, pos, b'-', "expected '-' after the year")?
    } else {
        pos
    };
    let (day_of_year, _) = digits(s, pos, 3)?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(ValidationError::new("year", MIN_YEAR, MAX_YEAR, year).into());
    }
    let last = if is_leap_year(year) { 366 } else { 365 };
    if !(1..=last).contains(&day_of_year) {
        return Err(ValidationError::new("day_of_year", 1, last, day_of_year).into());
    }
    Ok(Date::from_ordinal(days_before_year(year) + day_of_year)?)
}

/// Dispatches over the supported date grammars; `s` holds exactly the date.
fn scan_date(s: &[u8]) -> Result<Date, ParseError> {
    match s.len() {
        7 if s[4] == b'W' => scan_week_date(s, false, false),
        7 => scan_ordinal_date(s, false),
        8 if s[4] == b'W' => scan_week_date(s, false, true),
        8 if s[4] == b'-' && s[5] == b'W' => scan_week_date(s, true, false),
        8 if s[4] == b'-' => scan_ordinal_date(s, true),
        8 => scan_calendar_date(s, false),
        10 if s[4] == b'-' && s[5] == b'W' => scan_week_date(s, true, true),
        10 => scan_calendar_date(s, true),
        _ => Err(ParseError::syntax(
            "a date must be 7, 8 or 10 characters long",
            0,
        )),
    }
}

pub(crate) fn parse_date(input: &str) -> Result<Date, ParseError> {
    scan_date(input.as_bytes())
}

/// Scans `HH[:?MM[:?SS[(.|,)fff...]]]` between `start` and `end`; separator
/// presence is inferred from the first boundary and enforced thereafter.
fn scan_hh_mm_ss_ff(
    s: &[u8],
    start: usize,
    end: usize,
) -> Result<(i64, i64, i64, i64), ParseError> {
    let mut values = [0_i64; 3];
    let mut fraction = 0_i64;
    let mut has_separator = true;
    let mut pos = start;
    let mut index = 0;
    while index < 3 {
        let (value, next) = digits(s, pos, 2)?;
        values[index] = value;
        pos = next;
        if pos == end {
            return Ok((values[0], values[1], values[2], fraction));
        }
        let byte = s[pos];
        if index == 0 {
            has_separator = byte == b':';
        }
        if byte == b'.' || byte == b',' {
            if index < 2 {
                return Err(ParseError::syntax(
                    "a decimal mark is only allowed after the seconds",
                    pos,
                ));
            }
            fraction = scan_fraction(s, pos + 1, end)?;
            return Ok((values[0], values[1], values[2], fraction));
        }
        if has_separator {
            if byte != b':' {
                return Err(ParseError::syntax(
                    "inconsistent use of the time separator",
                    pos,
                ));
            }
            if index == 2 {
                return Err(ParseError::syntax("unexpected ':' after the seconds", pos));
            }
            pos += 1;
        }
        index += 1;
    }
    if pos == end {
        Ok((values[0], values[1], values[2], fraction))
    } else {
        Err(ParseError::syntax("unexpected trailing characters", pos))
    }
}

/// Fractional seconds, right-padded or truncated to exactly six digits.
fn scan_fraction(s: &[u8], start: usize, end: usize) -> Result<i64, ParseError> {
    if start == end {
        return Err(ParseError::syntax(
            "expected digits after the decimal mark",
            start,
        ));
    }
    let take = (end - start).min(6);
    let (mut value, mut pos) = digits(s, start, take)?;
    for _ in take..6 {
        value *= 10;
    }
    while pos < end && s[pos].is_ascii_digit() {
        pos += 1;
    }
    if pos == end {
        Ok(value)
    } else {
        Err(ParseError::syntax("unexpected trailing characters", pos))
    }
}

/// Scans the time half plus an optional zone designator, running to the end
/// of `s`. Field ranges are left to the caller's constructors; an hour of 24
/// is passed through for the caller's end-of-day handling.
#[expect(clippy::type_complexity)]
fn scan_time(
    s: &[u8],
    start: usize,
) -> Result<(i64, i64, i64, i64, Option<Arc<dyn TimeZone>>), ParseError> {
    let designator = s[start..]
        .iter()
        .position(|&byte| matches!(byte, b'Z' | b'+' | b'-'))
        .map(|found| start + found);
    let time_end = designator.unwrap_or(s.len());
    let (hour, minute, second, microsecond) = scan_hh_mm_ss_ff(s, start, time_end)?;
    let zone: Option<Arc<dyn TimeZone>> = match designator {
        None => None,
        Some(mark) if s[mark] == b'Z' => {
            if mark + 1 != s.len() {
                return Err(ParseError::syntax(
                    "unexpected characters after the zone designator",
                    mark + 1,
                ));
            }
            Some(utc())
        }
        Some(mark) => {
            let sign = if s[mark] == b'-' { -1 } else { 1 };
            let (oh, om, os, ous) = scan_hh_mm_ss_ff(s, mark + 1, s.len())?;
            let offset_us = sign * (((oh * 3_600 + om * 60 + os) * 1_000_000) + ous);
            let offset = Duration::new(0, 0, offset_us)
                .map_err(|_| ParseError::syntax("timezone offset out of range", mark))?;
            Some(Arc::new(FixedOffset::new(offset)?))
        }
    };
    Ok((hour, minute, second, microsecond, zone))
}

pub(crate) fn parse_time(input: &str) -> Result<Time, ParseError> {
    let s = input.as_bytes();
    let start = usize::from(s.first() == Some(&b'T'));
    let (hour, minute, second, microsecond, zone) = scan_time(s, start)?;
    let hour = if hour == 24 {
        // End-of-day form: 24:00 exactly means midnight.
        if minute != 0 || second != 0 || microsecond != 0 {
            return Err(ValidationError::new("hour", 0, 23, 24).into());
        }
        0
    } else {
        hour
    };
    Ok(Time::new(hour, minute, second, microsecond)?.with_zone(zone))
}

/// Locates the end of the date half of a combined string, keyed on length
/// and the characters at the date grammars' fixed positions.
///
/// `YYYYWww` and `YYYYWwwD` prefixes are told apart by the parity of the
/// digit run that follows position 7: time fields come in pairs, so an odd
/// run means a weekday digit is present. `YYYY-Www-##` stays ambiguous
/// between a hyphen separator at 8 and a digit separator at 10; the hyphen
/// reading wins. Ordinal dates put a digit where the calendar forms place
/// their second separator, which is what the `s[7]` probes key on.
fn find_date_end(s: &[u8]) -> Option<usize> {
    if s.len() == 7 {
        return Some(7);
    }
    if s[4] == b'-' {
        if s[5] == b'W' {
            if s.len() > 8 && s[8] == b'-' {
                if s.len() == 9 {
                    return None;
                }
                if s.len() > 10 && s[10].is_ascii_digit() {
                    return Some(8);
                }
                return Some(10);
            }
            Some(8)
        } else if s.len() > 7 && s[7] == b'-' {
            Some(10)
        } else {
            Some(8)
        }
    } else if s[4] == b'W' {
        let mut idx = 7;
        while idx < s.len() && s[idx].is_ascii_digit() {
            idx += 1;
        }
        if idx < 9 {
            return Some(idx);
        }
        Some(if idx % 2 == 0 { 7 } else { 8 })
    } else if s.len() > 7 && s[7].is_ascii_digit() {
        Some(8)
    } else {
        Some(7)
    }
}

pub(crate) fn parse_date_time(input: &str) -> Result<DateTime, ParseError> {
    let s = input.as_bytes();
    if s.len() < 7 {
        return Err(ParseError::syntax("string too short for a date", 0));
    }
    let date_end = find_date_end(s)
        .ok_or_else(|| ParseError::syntax("could not locate the date/time separator", 0))?;
    if date_end > s.len() {
        return Err(ParseError::syntax("string too short for a date", s.len()));
    }
    let date = scan_date(&s[..date_end])?;
    if date_end == s.len() {
        // A bare date reads as midnight.
        return Ok(DateTime::combine(date, Time::MIN));
    }
    // Any single character may separate the halves; the date grammar is all
    // ASCII, so date_end is a character boundary.
    let separator = input[date_end..]
        .chars()
        .next()
        .ok_or_else(|| ParseError::syntax("expected a date/time separator", date_end))?;
    let time_start = date_end + separator.len_utf8();
    let (hour, minute, second, microsecond, zone) = scan_time(s, time_start)?;
    if hour == 24 {
        // End-of-day form rolls into the next day once both halves are known.
        if minute != 0 || second != 0 || microsecond != 0 {
            return Err(ValidationError::new("hour", 0, 23, 24).into());
        }
        let next = date
            .checked_add_days(1)
            .ok_or(ParseError::from(DateTimeOverflowError))?;
        return Ok(DateTime::combine(
            next,
            Time::new(0, 0, 0, 0)?.with_zone(zone),
        ));
    }
    Ok(DateTime::combine(
        date,
        Time::new(hour, minute, second, microsecond)?.with_zone(zone),
    ))
}
