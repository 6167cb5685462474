use crate::date::ValidationError;
use crate::duration::Duration;
use crate::parser::{ParseError, TimeSpec, parse_time, push_offset, push_time};
use crate::timezone::{FixedOffset, TimeZone};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

const USECS_PER_DAY: i64 = 86_400_000_000;

/// A wall-clock time of day with microsecond precision.
///
/// A value is *aware* when it carries a [`TimeZone`] capability and *naive*
/// otherwise; the two kinds never compare equal and cannot be ordered
/// against each other. The fold bit disambiguates wall-clock readings that
/// occur twice during a backward transition; it is ignored by comparisons.
#[derive(Debug, Clone)]
pub struct Time {
    hour: u8,
    minute: u8,
    second: u8,
    microsecond: u32,
    fold: bool,
    zone: Option<Arc<dyn TimeZone>>,
}

impl Time {
    pub const MAX: Self = Self {
        hour: 23,
        minute: 59,
        second: 59,
        microsecond: 999_999,
        fold: false,
        zone: None,
    };
    pub const MIN: Self = Self {
        hour: 0,
        minute: 0,
        second: 0,
        microsecond: 0,
        fold: false,
        zone: None,
    };
    /// The smallest span two distinct times can differ by.
    pub const RESOLUTION: Duration = Duration::RESOLUTION;

    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(
        hour: i64,
        minute: i64,
        second: i64,
        microsecond: i64,
    ) -> Result<Self, ValidationError> {
        if !(0..=23).contains(&hour) {
            return Err(ValidationError::new("hour", 0, 23, hour));
        }
        if !(0..=59).contains(&minute) {
            return Err(ValidationError::new("minute", 0, 59, minute));
        }
        if !(0..=59).contains(&second) {
            return Err(ValidationError::new("second", 0, 59, second));
        }
        if !(0..=999_999).contains(&microsecond) {
            return Err(ValidationError::new("microsecond", 0, 999_999, microsecond));
        }
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
            second: second as u8,
            microsecond: microsecond as u32,
            fold: false,
            zone: None,
        })
    }

    /// Rebuilds the time of day from a microsecond count since midnight.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn from_microseconds_of_day(us: i64, zone: Option<Arc<dyn TimeZone>>) -> Self {
        debug_assert!((0..USECS_PER_DAY).contains(&us));
        Self {
            hour: (us / 3_600_000_000) as u8,
            minute: (us / 60_000_000 % 60) as u8,
            second: (us / 1_000_000 % 60) as u8,
            microsecond: (us % 1_000_000) as u32,
            fold: false,
            zone,
        }
    }

    #[inline]
    #[must_use]
    pub const fn hour(&self) -> u8 {
        self.hour
    }

    #[inline]
    #[must_use]
    pub const fn minute(&self) -> u8 {
        self.minute
    }

    #[inline]
    #[must_use]
    pub const fn second(&self) -> u8 {
        self.second
    }

    #[inline]
    #[must_use]
    pub const fn microsecond(&self) -> u32 {
        self.microsecond
    }

    #[inline]
    #[must_use]
    pub const fn fold(&self) -> bool {
        self.fold
    }

    #[inline]
    #[must_use]
    pub fn zone(&self) -> Option<&Arc<dyn TimeZone>> {
        self.zone.as_ref()
    }

    #[inline]
    #[must_use]
    pub const fn is_aware(&self) -> bool {
        self.zone.is_some()
    }

    pub fn with_hour(&self, hour: i64) -> Result<Self, ValidationError> {
        let mut time = Self::new(
            hour,
            self.minute.into(),
            self.second.into(),
            self.microsecond.into(),
        )?;
        time.fold = self.fold;
        time.zone = self.zone.clone();
        Ok(time)
    }

    pub fn with_minute(&self, minute: i64) -> Result<Self, ValidationError> {
        let mut time = Self::new(
            self.hour.into(),
            minute,
            self.second.into(),
            self.microsecond.into(),
        )?;
        time.fold = self.fold;
        time.zone = self.zone.clone();
        Ok(time)
    }

    pub fn with_second(&self, second: i64) -> Result<Self, ValidationError> {
        let mut time = Self::new(
            self.hour.into(),
            self.minute.into(),
            second,
            self.microsecond.into(),
        )?;
        time.fold = self.fold;
        time.zone = self.zone.clone();
        Ok(time)
    }

    pub fn with_microsecond(&self, microsecond: i64) -> Result<Self, ValidationError> {
        let mut time = Self::new(
            self.hour.into(),
            self.minute.into(),
            self.second.into(),
            microsecond,
        )?;
        time.fold = self.fold;
        time.zone = self.zone.clone();
        Ok(time)
    }

    #[must_use]
    pub fn with_fold(mut self, fold: bool) -> Self {
        self.fold = fold;
        self
    }

    #[must_use]
    pub fn with_zone(mut self, zone: Option<Arc<dyn TimeZone>>) -> Self {
        self.zone = zone;
        self
    }

    /// Offset reported by the attached zone, without an instant to refine
    /// it. `None` when the value is naive or the zone cannot say.
    #[must_use]
    pub fn utc_offset(&self) -> Option<Duration> {
        self.zone.as_ref()?.utc_offset(None)
    }

    /// Daylight-saving amount reported by the attached zone.
    #[must_use]
    pub fn dst(&self) -> Option<Duration> {
        self.zone.as_ref()?.dst(None)
    }

    /// Name reported by the attached zone.
    #[must_use]
    pub fn zone_name(&self) -> Option<String> {
        self.zone.as_ref()?.zone_name(None)
    }

    pub(crate) fn microseconds_of_day(&self) -> i64 {
        (i64::from(self.hour) * 3_600 + i64::from(self.minute) * 60 + i64::from(self.second))
            * 1_000_000
            + i64::from(self.microsecond)
    }

    const fn fields(&self) -> (u8, u8, u8, u32) {
        (self.hour, self.minute, self.second, self.microsecond)
    }

    /// Renders `HH:MM[:SS[.ffffff]]` per `timespec`, plus the offset
    /// designator when the zone reports one.
    #[must_use]
    pub fn isoformat(&self, timespec: TimeSpec) -> String {
        let mut out = String::new();
        push_time(
            &mut out,
            self.hour,
            self.minute,
            self.second,
            self.microsecond,
            timespec,
        );
        if let Some(offset) = self.utc_offset() {
            push_offset(&mut out, offset);
        }
        out
    }

    /// Serializes to an explicit record; an attached zone is captured as its
    /// offset snapshot and name.
    #[must_use]
    pub fn to_record(&self) -> TimeRecord {
        TimeRecord {
            hour: self.hour,
            minute: self.minute,
            second: self.second,
            microsecond: self.microsecond,
            fold: self.fold,
            zone: self.zone.as_ref().and_then(|zone| {
                Some(ZoneRecord {
                    offset: zone.utc_offset(None)?,
                    name: zone.zone_name(None),
                })
            }),
        }
    }

    pub fn from_record(record: TimeRecord) -> Result<Self, ValidationError> {
        let zone = record.zone.map(ZoneRecord::into_zone).transpose()?;
        Ok(Self::new(
            record.hour.into(),
            record.minute.into(),
            record.second.into(),
            record.microsecond.into(),
        )?
        .with_fold(record.fold)
        .with_zone(zone))
    }
}

impl PartialEq for Time {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl Eq for Time {}

impl PartialOrd for Time {
    /// Naive values order by their fields, aware values by offset-adjusted
    /// time of day; ordering across the naive/aware boundary is refused.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.utc_offset(), other.utc_offset()) {
            (None, None) => Some(self.fields().cmp(&other.fields())),
            (Some(mine), Some(theirs)) => {
                if mine == theirs {
                    Some(self.fields().cmp(&other.fields()))
                } else {
                    let adjusted =
                        i128::from(self.microseconds_of_day()) - mine.total_microseconds();
                    let other_adjusted =
                        i128::from(other.microseconds_of_day()) - theirs.total_microseconds();
                    Some(adjusted.cmp(&other_adjusted))
                }
            }
            _ => None,
        }
    }
}

impl Hash for Time {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.utc_offset() {
            Some(offset) => {
                (i128::from(self.microseconds_of_day()) - offset.total_microseconds()).hash(state);
            }
            None => self.fields().hash(state),
        }
    }
}

impl FromStr for Time {
    type Err = ParseError;

    fn from_str(input: &str) -> Result<Self, ParseError> {
        parse_time(input)
    }
}

impl fmt::Display for Time {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.isoformat(TimeSpec::Auto))
    }
}

/// Serialized layout of a [`Time`], with the fold spelled as an honest
/// boolean.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeRecord {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub microsecond: u32,
    pub fold: bool,
    pub zone: Option<ZoneRecord>,
}

/// Serialized snapshot of a timezone: the offset it reported and its name.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneRecord {
    pub offset: Duration,
    pub name: Option<String>,
}

impl ZoneRecord {
    pub(crate) fn into_zone(self) -> Result<Arc<dyn TimeZone>, ValidationError> {
        let seconds = self.offset.total_seconds_truncated();
        let zone = match self.name {
            Some(name) => FixedOffset::with_name(self.offset, name),
            None => FixedOffset::new(self.offset),
        }
        .map_err(|_| ValidationError::new("offset", -86_399, 86_399, seconds))?;
        Ok(Arc::new(zone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timezone::utc;
    use std::hash::{BuildHasher, RandomState};

    fn offset_zone(seconds: i64) -> Option<Arc<dyn TimeZone>> {
        Some(Arc::new(
            FixedOffset::new(Duration::new(0, seconds, 0).unwrap()).unwrap(),
        ))
    }

    #[test]
    fn new_validates_each_field() {
        assert_eq!(Time::new(24, 0, 0, 0).unwrap_err().field(), "hour");
        assert_eq!(Time::new(24, 1, 0, 0).unwrap_err().field(), "hour");
        assert_eq!(Time::new(-1, 0, 0, 0).unwrap_err().field(), "hour");
        assert_eq!(Time::new(0, 60, 0, 0).unwrap_err().field(), "minute");
        assert_eq!(Time::new(0, 0, 60, 0).unwrap_err().field(), "second");
        assert_eq!(
            Time::new(0, 0, 0, 1_000_000).unwrap_err().field(),
            "microsecond"
        );
        assert!(Time::new(23, 59, 59, 999_999).is_ok());
    }

    #[test]
    fn naive_and_aware_never_mix() -> Result<(), ValidationError> {
        let naive = Time::new(12, 0, 0, 0)?;
        let aware = Time::new(12, 0, 0, 0)?.with_zone(Some(utc()));
        assert_ne!(naive, aware);
        assert_eq!(naive.partial_cmp(&aware), None);
        assert_eq!(aware.partial_cmp(&naive), None);
        assert_eq!(naive, naive.clone());
        assert_eq!(aware, aware.clone());
        Ok(())
    }

    #[test]
    fn aware_values_compare_by_adjusted_time() -> Result<(), ValidationError> {
        // 12:00+01:00 and 11:00Z denote the same time of day.
        let plus_one = Time::new(12, 0, 0, 0)?.with_zone(offset_zone(3_600));
        let zulu = Time::new(11, 0, 0, 0)?.with_zone(Some(utc()));
        assert_eq!(plus_one, zulu);
        assert_eq!(plus_one.partial_cmp(&zulu), Some(Ordering::Equal));
        assert!(Time::new(10, 59, 0, 0)?.with_zone(Some(utc())) < plus_one);

        // With identical offsets the raw fields decide.
        let a = Time::new(1, 0, 0, 0)?.with_zone(offset_zone(3_600));
        let b = Time::new(2, 0, 0, 0)?.with_zone(offset_zone(3_600));
        assert!(a < b);
        Ok(())
    }

    #[test]
    fn fold_is_ignored_by_comparisons() -> Result<(), ValidationError> {
        let t = Time::new(1, 30, 0, 0)?;
        assert_eq!(t.clone().with_fold(true), t);
        Ok(())
    }

    #[test]
    fn equal_values_hash_identically() -> Result<(), ValidationError> {
        let hasher = RandomState::new();
        let plus_one = Time::new(12, 0, 0, 0)?.with_zone(offset_zone(3_600));
        let zulu = Time::new(11, 0, 0, 0)?.with_zone(Some(utc()));
        assert_eq!(plus_one, zulu);
        assert_eq!(hasher.hash_one(&plus_one), hasher.hash_one(&zulu));

        let naive = Time::new(7, 8, 9, 10)?;
        assert_eq!(
            hasher.hash_one(&naive),
            hasher.hash_one(&naive.clone().with_fold(true))
        );
        Ok(())
    }

    #[test]
    fn field_replacement() -> Result<(), ValidationError> {
        let t = Time::new(1, 2, 3, 4)?.with_zone(Some(utc())).with_fold(true);
        let replaced = t.with_hour(23)?;
        assert_eq!(replaced.hour(), 23);
        assert_eq!(replaced.minute(), 2);
        assert!(replaced.fold());
        assert!(replaced.is_aware());
        assert_eq!(t.with_minute(60).unwrap_err().field(), "minute");
        assert_eq!(t.with_microsecond(-1).unwrap_err().field(), "microsecond");
        Ok(())
    }

    #[test]
    fn offset_queries_delegate_to_the_zone() -> Result<(), ValidationError> {
        let naive = Time::new(6, 0, 0, 0)?;
        assert_eq!(naive.utc_offset(), None);
        assert_eq!(naive.zone_name(), None);
        let aware = naive.with_zone(Some(utc()));
        assert_eq!(aware.utc_offset(), Some(Duration::ZERO));
        assert_eq!(aware.dst(), None);
        assert_eq!(aware.zone_name().as_deref(), Some("UTC"));
        Ok(())
    }

    #[test]
    fn isoformat_timespecs() -> Result<(), ValidationError> {
        let t = Time::new(3, 4, 5, 60_000)?;
        assert_eq!(t.isoformat(TimeSpec::Auto), "03:04:05.060000");
        assert_eq!(t.isoformat(TimeSpec::Hours), "03");
        assert_eq!(t.isoformat(TimeSpec::Minutes), "03:04");
        assert_eq!(t.isoformat(TimeSpec::Seconds), "03:04:05");
        assert_eq!(t.isoformat(TimeSpec::Milliseconds), "03:04:05.060");
        assert_eq!(t.isoformat(TimeSpec::Microseconds), "03:04:05.060000");
        assert_eq!(
            Time::new(3, 4, 5, 0)?.isoformat(TimeSpec::Auto),
            "03:04:05"
        );
        assert_eq!(
            Time::new(3, 4, 5, 0)?.with_zone(Some(utc())).to_string(),
            "03:04:05+00:00"
        );
        Ok(())
    }

    #[test]
    fn record_round_trip() -> Result<(), ValidationError> {
        let t = Time::new(1, 2, 3, 4)?
            .with_fold(true)
            .with_zone(offset_zone(-5 * 3_600));
        let record = t.to_record();
        assert!(record.fold);
        assert_eq!(
            record.zone.as_ref().map(|z| z.offset),
            Some(Duration::new(0, -5 * 3_600, 0).unwrap())
        );
        let back = Time::from_record(record)?;
        assert_eq!(back, t);
        assert!(back.fold());

        let bad = TimeRecord {
            hour: 0,
            minute: 0,
            second: 0,
            microsecond: 0,
            fold: false,
            zone: Some(ZoneRecord {
                offset: Duration::new(1, 0, 0).unwrap(),
                name: None,
            }),
        };
        assert_eq!(Time::from_record(bad).unwrap_err().field(), "offset");
        Ok(())
    }
}
