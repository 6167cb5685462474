use crate::duration::Duration;
use crate::parser::{ParseError, parse_date};
use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

/// First year of the proleptic Gregorian range.
pub const MIN_YEAR: i64 = 1;
/// Last year of the proleptic Gregorian range.
pub const MAX_YEAR: i64 = 9999;

// Lengths of the Gregorian leap cycles.
const DI4Y: i64 = 1_461;
const DI100Y: i64 = 36_524;
const DI400Y: i64 = 146_097;

/// Ordinal of 9999-12-31, the last representable day.
pub(crate) const MAX_ORDINAL: i64 = 3_652_059;

const DAYS_IN_MONTH: [u8; 13] = [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const DAYS_BEFORE_MONTH: [i64; 13] = [0, 0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

#[inline]
#[must_use]
pub const fn is_leap_year(year: i64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in a month. `month` must be in `1..=12`.
#[inline]
#[must_use]
pub const fn days_in_month(year: i64, month: u8) -> u8 {
    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS_IN_MONTH[month as usize]
    }
}

/// Days in all years strictly before `year`, counting from year 1.
pub(crate) const fn days_before_year(year: i64) -> i64 {
    let y = year - 1;
    y * 365 + y / 4 - y / 100 + y / 400
}

/// Days in all months of `year` strictly before `month`.
const fn days_before_month(year: i64, month: u8) -> i64 {
    DAYS_BEFORE_MONTH[month as usize] + if month > 2 && is_leap_year(year) { 1 } else { 0 }
}

/// Ordinal of the Monday starting ISO week 1 of `year`, the first calendar
/// week containing a Thursday.
fn iso_week1_monday(year: i64) -> i64 {
    let first_day = days_before_year(year) + 1;
    let first_weekday = (first_day + 6) % 7;
    let week1_monday = first_day - first_weekday;
    if first_weekday > 3 {
        // Jan 1 fell on Friday, Saturday or Sunday.
        week1_monday + 7
    } else {
        week1_monday
    }
}

/// A proleptic-Gregorian calendar day between year 1 and year 9999.
///
/// The triple is validated on construction, so every held value names a real
/// day; ordering and hashing are derived from the fields.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Copy, Hash)]
pub struct Date {
    year: u16,
    month: u8,
    day: u8,
}

impl Date {
    pub const MAX: Self = Self {
        year: 9_999,
        month: 12,
        day: 31,
    };
    pub const MIN: Self = Self {
        year: 1,
        month: 1,
        day: 1,
    };
    /// The smallest span two distinct days can differ by.
    pub const RESOLUTION: Duration = Duration::whole_days(1);

    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(year: i64, month: i64, day: i64) -> Result<Self, ValidationError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(ValidationError::new("year", MIN_YEAR, MAX_YEAR, year));
        }
        if !(1..=12).contains(&month) {
            return Err(ValidationError::new("month", 1, 12, month));
        }
        let dim = i64::from(days_in_month(year, month as u8));
        if !(1..=dim).contains(&day) {
            return Err(ValidationError::new("day", 1, dim, day));
        }
        Ok(Self {
            year: year as u16,
            month: month as u8,
            day: day as u8,
        })
    }

    /// Inverse of [`to_ordinal`](Self::to_ordinal); day 1 is 0001-01-01.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_ordinal(ordinal: i64) -> Result<Self, ValidationError> {
        if !(1..=MAX_ORDINAL).contains(&ordinal) {
            return Err(ValidationError::new("ordinal", 1, MAX_ORDINAL, ordinal));
        }
        // Unwind the 400/100/4-year leap cycles, then locate the month by
        // estimate and at most one correction step.
        let mut n = ordinal - 1;
        let n400 = n / DI400Y;
        n %= DI400Y;
        let n100 = n / DI100Y;
        n %= DI100Y;
        let n4 = n / DI4Y;
        n %= DI4Y;
        let n1 = n / 365;
        n %= 365;
        let year = n400 * 400 + n100 * 100 + n4 * 4 + n1 + 1;
        if n1 == 4 || n100 == 4 {
            // December 31 of a leap year: the cycle arithmetic landed one
            // year too far.
            return Ok(Self {
                year: (year - 1) as u16,
                month: 12,
                day: 31,
            });
        }
        let leap = n1 == 3 && (n4 != 24 || n100 == 3);
        let mut month = ((n + 50) >> 5) as u8;
        let mut preceding = DAYS_BEFORE_MONTH[month as usize] + if month > 2 && leap { 1 } else { 0 };
        if preceding > n {
            month -= 1;
            preceding -= i64::from(DAYS_IN_MONTH[month as usize])
                + if month == 2 && leap { 1 } else { 0 };
        }
        Ok(Self {
            year: year as u16,
            month,
            day: (n - preceding + 1) as u8,
        })
    }

    /// Builds the day named by an ISO week-date triple.
    ///
    /// Week 53 only exists in years starting on a Thursday and in leap years
    /// starting on a Wednesday; invalid weeks and invalid weekdays are
    /// reported distinctly.
    pub fn from_iso_week_date(
        iso_year: i64,
        iso_week: i64,
        iso_weekday: i64,
    ) -> Result<Self, ValidationError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&iso_year) {
            return Err(ValidationError::new("iso_year", MIN_YEAR, MAX_YEAR, iso_year));
        }
        if !(1..=53).contains(&iso_week) {
            return Err(ValidationError::new("iso_week", 1, 53, iso_week));
        }
        if iso_week == 53 {
            let first_weekday = (days_before_year(iso_year) + 1 + 6) % 7;
            if !(first_weekday == 3 || (first_weekday == 2 && is_leap_year(iso_year))) {
                return Err(ValidationError::new("iso_week", 1, 52, iso_week));
            }
        }
        if !(1..=7).contains(&iso_weekday) {
            return Err(ValidationError::new("iso_weekday", 1, 7, iso_weekday));
        }
        Self::from_ordinal(iso_week1_monday(iso_year) + (iso_week - 1) * 7 + (iso_weekday - 1))
    }

    #[inline]
    #[must_use]
    pub fn from_be_bytes(bytes: [u8; 4]) -> Self {
        Self {
            year: u16::from_be_bytes(bytes[0..2].try_into().unwrap()),
            month: bytes[2],
            day: bytes[3],
        }
    }

    #[inline]
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 4] {
        let mut bytes = [0; 4];
        bytes[0..2].copy_from_slice(&self.year.to_be_bytes());
        bytes[2] = self.month;
        bytes[3] = self.day;
        bytes
    }

    #[inline]
    #[must_use]
    pub const fn year(self) -> u16 {
        self.year
    }

    #[inline]
    #[must_use]
    pub const fn month(self) -> u8 {
        self.month
    }

    #[inline]
    #[must_use]
    pub const fn day(self) -> u8 {
        self.day
    }

    /// Day count from the calendar epoch; 0001-01-01 is day 1.
    #[inline]
    #[must_use]
    pub const fn to_ordinal(self) -> i64 {
        days_before_year(self.year as i64)
            + days_before_month(self.year as i64, self.month)
            + self.day as i64
    }

    /// Day of the week with Monday as 0 through Sunday as 6.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[inline]
    #[must_use]
    pub const fn weekday(self) -> u8 {
        ((self.to_ordinal() + 6) % 7) as u8
    }

    /// Day of the week with Monday as 1 through Sunday as 7.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[inline]
    #[must_use]
    pub const fn iso_weekday(self) -> u8 {
        let rem = (self.to_ordinal() % 7) as u8;
        if rem == 0 { 7 } else { rem }
    }

    /// The ISO week-date triple naming this day.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn iso_calendar(self) -> IsoWeekDate {
        let mut year = i64::from(self.year);
        let today = self.to_ordinal();
        let mut week1_monday = iso_week1_monday(year);
        let mut week = (today - week1_monday).div_euclid(7);
        if week < 0 {
            // The day belongs to the last week of the previous ISO year.
            year -= 1;
            week1_monday = iso_week1_monday(year);
            week = (today - week1_monday).div_euclid(7);
        } else if week >= 52 && today >= iso_week1_monday(year + 1) {
            year += 1;
            week = 0;
        }
        IsoWeekDate {
            year: year as u16,
            week: (week + 1) as u8,
            weekday: ((today - week1_monday).rem_euclid(7) + 1) as u8,
        }
    }

    /// Moves by the whole-day part of `rhs`; sub-day parts are ignored.
    ///
    /// Returns `None` when the result leaves the year 1 to 9999 range.
    #[inline]
    #[must_use]
    pub fn checked_add_duration(self, rhs: Duration) -> Option<Self> {
        self.checked_add_days(i64::from(rhs.days()))
    }

    /// Moves back by the whole-day part of `rhs`; sub-day parts are ignored.
    ///
    /// Returns `None` when the result leaves the year 1 to 9999 range.
    #[inline]
    #[must_use]
    pub fn checked_sub_duration(self, rhs: Duration) -> Option<Self> {
        self.checked_add_days(-i64::from(rhs.days()))
    }

    pub(crate) fn checked_add_days(self, days: i64) -> Option<Self> {
        Self::from_ordinal(self.to_ordinal().checked_add(days)?).ok()
    }

    pub fn with_year(self, year: i64) -> Result<Self, ValidationError> {
        Self::new(year, self.month.into(), self.day.into())
    }

    pub fn with_month(self, month: i64) -> Result<Self, ValidationError> {
        Self::new(self.year.into(), month, self.day.into())
    }

    pub fn with_day(self, day: i64) -> Result<Self, ValidationError> {
        Self::new(self.year.into(), self.month.into(), day)
    }
}

impl Sub for Date {
    type Output = Duration;

    /// Whole-day difference between two days.
    #[expect(clippy::cast_possible_truncation)]
    #[inline]
    fn sub(self, rhs: Self) -> Duration {
        Duration::whole_days((self.to_ordinal() - rhs.to_ordinal()) as i32)
    }
}

impl FromStr for Date {
    type Err = ParseError;

    fn from_str(input: &str) -> Result<Self, ParseError> {
        parse_date(input)
    }
}

impl fmt::Display for Date {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// The ISO 8601 week-date form of a [`Date`].
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct IsoWeekDate {
    year: u16,
    week: u8,
    weekday: u8,
}

impl IsoWeekDate {
    /// The ISO year, which can differ by one from the calendar year near
    /// January 1.
    #[inline]
    #[must_use]
    pub const fn year(self) -> u16 {
        self.year
    }

    /// Week number, 1 through 53.
    #[inline]
    #[must_use]
    pub const fn week(self) -> u8 {
        self.week
    }

    /// Day of the week, Monday as 1 through Sunday as 7.
    #[inline]
    #[must_use]
    pub const fn weekday(self) -> u8 {
        self.weekday
    }
}

/// A field fell outside its documented range.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("{field} must be in {min}..={max}, not {value}")]
pub struct ValidationError {
    field: &'static str,
    min: i64,
    max: i64,
    value: i64,
}

impl ValidationError {
    pub(crate) const fn new(field: &'static str, min: i64, max: i64, value: i64) -> Self {
        Self {
            field,
            min,
            max,
            value,
        }
    }

    /// Name of the offending field.
    #[inline]
    #[must_use]
    pub const fn field(&self) -> &'static str {
        self.field
    }
}

/// An arithmetic result left the supported year range 1 to 9999.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("date value out of range")]
pub struct DateTimeOverflowError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_validates_each_field() {
        assert_eq!(Date::new(0, 1, 1).unwrap_err().field(), "year");
        assert_eq!(Date::new(10_000, 1, 1).unwrap_err().field(), "year");
        assert_eq!(Date::new(2021, 13, 1).unwrap_err().field(), "month");
        assert_eq!(Date::new(2021, 2, 30).unwrap_err().field(), "day");
        assert_eq!(
            Date::new(2021, 2, 30).unwrap_err().to_string(),
            "day must be in 1..=28, not 30"
        );
        assert!(Date::new(2020, 2, 29).is_ok());
    }

    #[test]
    fn leap_years() {
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert!(!is_leap_year(2023));
        assert!(is_leap_year(2400));
    }

    #[test]
    fn ordinal_round_trip() -> Result<(), ValidationError> {
        assert_eq!(Date::MIN.to_ordinal(), 1);
        assert_eq!(Date::MAX.to_ordinal(), MAX_ORDINAL);
        for date in [
            Date::MIN,
            Date::new(4, 12, 31)?,
            Date::new(100, 3, 1)?,
            Date::new(400, 12, 31)?,
            Date::new(1970, 1, 1)?,
            Date::new(2000, 2, 29)?,
            Date::new(2020, 12, 31)?,
            Date::new(2021, 1, 1)?,
            Date::MAX,
        ] {
            assert_eq!(Date::from_ordinal(date.to_ordinal())?, date);
        }
        assert_eq!(Date::new(1970, 1, 1)?.to_ordinal(), 719_163);
        assert_eq!(Date::from_ordinal(0).unwrap_err().field(), "ordinal");
        assert_eq!(
            Date::from_ordinal(MAX_ORDINAL + 1).unwrap_err().field(),
            "ordinal"
        );
        Ok(())
    }

    #[test]
    fn weekdays() -> Result<(), ValidationError> {
        // 0001-01-01 was a Monday.
        assert_eq!(Date::MIN.weekday(), 0);
        assert_eq!(Date::MIN.iso_weekday(), 1);
        // 2021-01-01 was a Friday.
        assert_eq!(Date::new(2021, 1, 1)?.weekday(), 4);
        assert_eq!(Date::new(2021, 1, 1)?.iso_weekday(), 5);
        Ok(())
    }

    #[test]
    fn iso_calendar_at_year_boundaries() -> Result<(), ValidationError> {
        let w = Date::new(2021, 1, 1)?.iso_calendar();
        assert_eq!((w.year(), w.week(), w.weekday()), (2020, 53, 5));
        let w = Date::new(2019, 12, 30)?.iso_calendar();
        assert_eq!((w.year(), w.week(), w.weekday()), (2020, 1, 1));
        let w = Date::new(2020, 12, 28)?.iso_calendar();
        assert_eq!((w.year(), w.week(), w.weekday()), (2020, 53, 1));
        let w = Date::MAX.iso_calendar();
        assert_eq!((w.year(), w.week(), w.weekday()), (9_999, 52, 5));
        Ok(())
    }

    #[test]
    fn from_iso_week_date() -> Result<(), ValidationError> {
        assert_eq!(
            Date::from_iso_week_date(2021, 1, 2)?,
            Date::new(2021, 1, 5)?
        );
        assert_eq!(
            Date::from_iso_week_date(2020, 53, 5)?,
            Date::new(2021, 1, 1)?
        );
        // 2021 starts on a Friday, so it has no week 53.
        assert_eq!(
            Date::from_iso_week_date(2021, 53, 1).unwrap_err().field(),
            "iso_week"
        );
        // 2020 is a leap year starting on a Wednesday, so it does.
        assert!(Date::from_iso_week_date(2020, 53, 1).is_ok());
        assert_eq!(
            Date::from_iso_week_date(2021, 0, 1).unwrap_err().field(),
            "iso_week"
        );
        assert_eq!(
            Date::from_iso_week_date(2021, 1, 8).unwrap_err().field(),
            "iso_weekday"
        );
        Ok(())
    }

    #[test]
    fn round_trips_through_iso_calendar() -> Result<(), ValidationError> {
        for date in [
            Date::new(2019, 12, 30)?,
            Date::new(2020, 12, 28)?,
            Date::new(2021, 1, 1)?,
            Date::new(2021, 6, 15)?,
        ] {
            let w = date.iso_calendar();
            assert_eq!(
                Date::from_iso_week_date(w.year().into(), w.week().into(), w.weekday().into())?,
                date
            );
        }
        Ok(())
    }

    #[test]
    fn duration_arithmetic_uses_whole_days() -> Result<(), ValidationError> {
        let date = Date::new(2020, 2, 28)?;
        let day = Duration::whole_days(1);
        assert_eq!(date.checked_add_duration(day), Some(Date::new(2020, 2, 29)?));
        assert_eq!(
            date.checked_add_duration(Duration::new(2, 0, 0).unwrap()),
            Some(Date::new(2020, 3, 1)?)
        );
        // Sub-day parts do not move the date.
        assert_eq!(
            date.checked_add_duration(Duration::new(0, 86_399, 0).unwrap()),
            Some(date)
        );
        // A negative sub-day span normalizes to minus one day.
        assert_eq!(
            date.checked_add_duration(Duration::new(0, 0, -1).unwrap()),
            Some(Date::new(2020, 2, 27)?)
        );
        assert_eq!(Date::MAX.checked_add_duration(day), None);
        assert_eq!(Date::MIN.checked_sub_duration(day), None);
        assert_eq!(
            date.checked_add_duration(day).unwrap().checked_sub_duration(day),
            Some(date)
        );
        Ok(())
    }

    #[test]
    fn date_difference() -> Result<(), ValidationError> {
        assert_eq!(
            Date::new(2021, 1, 5)? - Date::new(2020, 12, 31)?,
            Duration::whole_days(5)
        );
        assert_eq!(
            Date::new(2020, 12, 31)? - Date::new(2021, 1, 5)?,
            Duration::whole_days(-5)
        );
        assert_eq!(Date::MAX - Date::MIN, Duration::whole_days(3_652_058));
        Ok(())
    }

    #[test]
    fn field_replacement() -> Result<(), ValidationError> {
        let date = Date::new(2020, 2, 29)?;
        assert_eq!(date.with_day(28)?, Date::new(2020, 2, 28)?);
        assert_eq!(date.with_year(2021).unwrap_err().field(), "day");
        assert_eq!(date.with_month(13).unwrap_err().field(), "month");
        Ok(())
    }

    #[test]
    fn display() -> Result<(), ValidationError> {
        assert_eq!(Date::new(2021, 1, 5)?.to_string(), "2021-01-05");
        assert_eq!(Date::new(8, 12, 1)?.to_string(), "0008-12-01");
        Ok(())
    }
}
