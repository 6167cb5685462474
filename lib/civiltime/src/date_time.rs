#![expect(clippy::expect_used)]

use crate::date::{Date, DateTimeOverflowError, ValidationError};
use crate::duration::Duration;
use crate::parser::{ParseError, TimeSpec, parse_date_time, push_offset, push_time};
use crate::time::{Time, ZoneRecord};
use crate::timezone::{
    ConversionError, EPOCH_SECONDS, SystemOffset, TimeZone, local_fixed_zone, local_to_seconds,
};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

const USECS_PER_DAY: i128 = 86_400_000_000;

/// A calendar day combined with a wall-clock time of day.
///
/// The value is *aware* when it carries a [`TimeZone`] capability and
/// *naive* otherwise. Aware and naive values never compare equal, cannot be
/// ordered against each other and cannot be subtracted from each other.
///
/// Equality carries one documented edge case: when both operands' UTC
/// offsets change under a fold flip and every other field matches, `==`
/// evaluates to `false` — even for a value compared against its own clone.
/// Ordering operators keep treating such operands as equal, mirroring the
/// semantics this type is modelled on, which is why [`DateTime`] implements
/// [`PartialEq`] but not [`Eq`].
#[derive(Debug, Clone)]
pub struct DateTime {
    date: Date,
    time: Time,
}

impl DateTime {
    pub const MAX: Self = Self {
        date: Date::MAX,
        time: Time::MAX,
    };
    pub const MIN: Self = Self {
        date: Date::MIN,
        time: Time::MIN,
    };
    /// The smallest span two distinct values can differ by.
    pub const RESOLUTION: Duration = Duration::RESOLUTION;

    pub fn new(
        year: i64,
        month: i64,
        day: i64,
        hour: i64,
        minute: i64,
        second: i64,
        microsecond: i64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            date: Date::new(year, month, day)?,
            time: Time::new(hour, minute, second, microsecond)?,
        })
    }

    /// Glues a day and a time of day together; the time's zone and fold are
    /// kept.
    #[inline]
    #[must_use]
    pub const fn combine(date: Date, time: Time) -> Self {
        Self { date, time }
    }

    /// The Unix epoch, 1970-01-01T00:00:00 in UTC.
    #[must_use]
    pub fn unix_epoch() -> Self {
        Self::new(1970, 1, 1, 0, 0, 0, 0)
            .expect("the epoch is a valid date-time")
            .with_zone(Some(crate::timezone::utc()))
    }

    #[inline]
    #[must_use]
    pub const fn year(&self) -> u16 {
        self.date.year()
    }

    #[inline]
    #[must_use]
    pub const fn month(&self) -> u8 {
        self.date.month()
    }

    #[inline]
    #[must_use]
    pub const fn day(&self) -> u8 {
        self.date.day()
    }

    #[inline]
    #[must_use]
    pub const fn hour(&self) -> u8 {
        self.time.hour()
    }

    #[inline]
    #[must_use]
    pub const fn minute(&self) -> u8 {
        self.time.minute()
    }

    #[inline]
    #[must_use]
    pub const fn second(&self) -> u8 {
        self.time.second()
    }

    #[inline]
    #[must_use]
    pub const fn microsecond(&self) -> u32 {
        self.time.microsecond()
    }

    #[inline]
    #[must_use]
    pub const fn fold(&self) -> bool {
        self.time.fold()
    }

    #[inline]
    #[must_use]
    pub fn zone(&self) -> Option<&Arc<dyn TimeZone>> {
        self.time.zone()
    }

    #[inline]
    #[must_use]
    pub const fn is_aware(&self) -> bool {
        self.time.is_aware()
    }

    /// The calendar-day part.
    #[inline]
    #[must_use]
    pub const fn date(&self) -> Date {
        self.date
    }

    /// The time-of-day part without its zone; the fold bit is kept.
    #[must_use]
    pub fn time(&self) -> Time {
        self.time.clone().with_zone(None)
    }

    /// The time-of-day part with its zone.
    #[must_use]
    pub fn time_with_zone(&self) -> Time {
        self.time.clone()
    }

    pub fn with_year(&self, year: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            date: self.date.with_year(year)?,
            time: self.time.clone(),
        })
    }

    pub fn with_month(&self, month: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            date: self.date.with_month(month)?,
            time: self.time.clone(),
        })
    }

    pub fn with_day(&self, day: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            date: self.date.with_day(day)?,
            time: self.time.clone(),
        })
    }

    pub fn with_hour(&self, hour: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            date: self.date,
            time: self.time.with_hour(hour)?,
        })
    }

    pub fn with_minute(&self, minute: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            date: self.date,
            time: self.time.with_minute(minute)?,
        })
    }

    pub fn with_second(&self, second: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            date: self.date,
            time: self.time.with_second(second)?,
        })
    }

    pub fn with_microsecond(&self, microsecond: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            date: self.date,
            time: self.time.with_microsecond(microsecond)?,
        })
    }

    #[must_use]
    pub fn with_fold(self, fold: bool) -> Self {
        Self {
            date: self.date,
            time: self.time.with_fold(fold),
        }
    }

    #[must_use]
    pub fn with_zone(self, zone: Option<Arc<dyn TimeZone>>) -> Self {
        Self {
            date: self.date,
            time: self.time.with_zone(zone),
        }
    }

    /// Offset reported by the attached zone for this value. `None` when the
    /// value is naive or the zone cannot say.
    #[must_use]
    pub fn utc_offset(&self) -> Option<Duration> {
        self.zone()?.utc_offset(Some(self))
    }

    /// Daylight-saving amount reported by the attached zone for this value.
    #[must_use]
    pub fn dst(&self) -> Option<Duration> {
        self.zone()?.dst(Some(self))
    }

    /// Name reported by the attached zone for this value.
    #[must_use]
    pub fn zone_name(&self) -> Option<String> {
        self.zone()?.zone_name(Some(self))
    }

    /// Microseconds from the calendar epoch spelled by the raw fields,
    /// ignoring the zone.
    fn naive_microseconds(&self) -> i128 {
        i128::from(self.date.to_ordinal()) * USECS_PER_DAY
            + i128::from(self.time.microseconds_of_day())
    }

    /// Seconds from the calendar epoch spelled by the raw fields, truncating
    /// microseconds.
    pub(crate) fn utc_seconds(&self) -> i64 {
        self.date.to_ordinal() * 86_400 + self.time.microseconds_of_day() / 1_000_000
    }

    /// Moves by `delta` microseconds, carrying through second, minute, hour
    /// and day, then into month and year. The zone is kept; the fold bit is
    /// reset. `None` when the result leaves year 1 to 9999.
    fn checked_add_microseconds(&self, delta: i128) -> Option<Self> {
        let sum = i128::from(self.time.microseconds_of_day()) + delta;
        let day_carry = sum.div_euclid(USECS_PER_DAY);
        #[expect(clippy::cast_possible_truncation)]
        let us_of_day = sum.rem_euclid(USECS_PER_DAY) as i64;
        let date = self
            .date
            .checked_add_days(i64::try_from(day_carry).ok()?)?;
        Some(Self {
            date,
            time: Time::from_microseconds_of_day(us_of_day, self.zone().map(Arc::clone)),
        })
    }

    /// Returns `None` when the result leaves the year 1 to 9999 range.
    #[inline]
    #[must_use]
    pub fn checked_add_duration(&self, rhs: Duration) -> Option<Self> {
        self.checked_add_microseconds(rhs.total_microseconds())
    }

    /// Returns `None` when the result leaves the year 1 to 9999 range.
    #[inline]
    #[must_use]
    pub fn checked_sub_duration(&self, rhs: Duration) -> Option<Self> {
        self.checked_add_microseconds(-rhs.total_microseconds())
    }

    /// Difference between two values.
    ///
    /// Both naive, or both aware with equal offsets, subtract field-wise;
    /// aware values with different offsets subtract the offset difference
    /// out. Mixing a naive and an aware value fails.
    pub fn checked_sub(&self, rhs: &Self) -> Result<Duration, NaiveAwareMismatchError> {
        let base = self.naive_microseconds() - rhs.naive_microseconds();
        match (self.utc_offset(), rhs.utc_offset()) {
            (None, None) => Ok(duration_from_difference(base)),
            (Some(mine), Some(theirs)) => Ok(duration_from_difference(
                base - (mine.total_microseconds() - theirs.total_microseconds()),
            )),
            _ => Err(NaiveAwareMismatchError),
        }
    }

    /// Seconds from the Unix epoch denoted by this value.
    ///
    /// An aware value subtracts its own offset; a naive value is interpreted
    /// in the system zone through `sys`, honouring the fold bit during
    /// repeated or skipped wall-clock readings.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn timestamp(&self, sys: &dyn SystemOffset) -> f64 {
        if let Some(offset) = self.utc_offset() {
            let us = self.naive_microseconds()
                - offset.total_microseconds()
                - i128::from(EPOCH_SECONDS) * 1_000_000;
            us as f64 / 1e6
        } else {
            let seconds = local_to_seconds(self, self.fold(), sys);
            (seconds - EPOCH_SECONDS) as f64 + f64::from(self.microsecond()) / 1e6
        }
    }

    /// Re-expresses this value in `zone`.
    ///
    /// The receiver is first brought to UTC — subtracting its own offset, or
    /// the system zone's offset via `sys` when it is naive or its zone
    /// cannot name one — then stamped with `zone` and handed to the zone's
    /// [`from_utc`](TimeZone::from_utc).
    pub fn astimezone(
        &self,
        zone: Arc<dyn TimeZone>,
        sys: &dyn SystemOffset,
    ) -> Result<Self, ConversionError> {
        if let Some(own) = self.zone() {
            // Conversion to the value's own zone is a no-op.
            if Arc::ptr_eq(own, &zone) {
                return Ok(self.clone());
            }
        }
        let offset = match self.utc_offset() {
            Some(offset) => offset,
            None => local_fixed_zone(self, sys)?.offset(),
        };
        let utc = self
            .checked_add_microseconds(-offset.total_microseconds())
            .ok_or(ConversionError::Overflow(DateTimeOverflowError))?
            .with_zone(Some(Arc::clone(&zone)));
        zone.from_utc(&utc)
    }

    /// Renders `date{sep}time` with the time cut per `timespec`, plus the
    /// offset designator when the zone reports one.
    #[must_use]
    pub fn isoformat(&self, sep: char, timespec: TimeSpec) -> String {
        let mut out = self.date.to_string();
        out.push(sep);
        push_time(
            &mut out,
            self.hour(),
            self.minute(),
            self.second(),
            self.microsecond(),
            timespec,
        );
        if let Some(offset) = self.utc_offset() {
            push_offset(&mut out, offset);
        }
        out
    }

    /// Serializes to an explicit record; an attached zone is captured as the
    /// offset snapshot it reports for this value, plus its name.
    #[must_use]
    pub fn to_record(&self) -> DateTimeRecord {
        DateTimeRecord {
            year: self.year(),
            month: self.month(),
            day: self.day(),
            hour: self.hour(),
            minute: self.minute(),
            second: self.second(),
            microsecond: self.microsecond(),
            fold: self.fold(),
            zone: self.zone().and_then(|zone| {
                Some(ZoneRecord {
                    offset: zone.utc_offset(Some(self))?,
                    name: zone.zone_name(Some(self)),
                })
            }),
        }
    }

    pub fn from_record(record: DateTimeRecord) -> Result<Self, ValidationError> {
        let zone = record.zone.map(ZoneRecord::into_zone).transpose()?;
        Ok(Self::new(
            record.year.into(),
            record.month.into(),
            record.day.into(),
            record.hour.into(),
            record.minute.into(),
            record.second.into(),
            record.microsecond.into(),
        )?
        .with_fold(record.fold)
        .with_zone(zone))
    }

    /// The offset this value would report with its fold bit flipped.
    fn flipped_fold_offset(&self) -> Option<Duration> {
        let flipped = self.clone().with_fold(!self.fold());
        flipped.utc_offset()
    }

    /// Whether the zone's answer depends on the fold bit, the marker of a
    /// value sitting inside a repeated wall-clock hour.
    fn offset_depends_on_fold(&self) -> bool {
        self.is_aware() && self.utc_offset() != self.flipped_fold_offset()
    }
}

impl PartialEq for DateTime {
    fn eq(&self, other: &Self) -> bool {
        let equal = match (self.utc_offset(), other.utc_offset()) {
            (None, None) => self.naive_microseconds() == other.naive_microseconds(),
            (Some(mine), Some(theirs)) => {
                if mine == theirs {
                    self.naive_microseconds() == other.naive_microseconds()
                } else {
                    self.naive_microseconds() - mine.total_microseconds()
                        == other.naive_microseconds() - theirs.total_microseconds()
                }
            }
            _ => return false,
        };
        // Fold-ambiguous readings never satisfy equality, not even against
        // themselves.
        equal && !self.offset_depends_on_fold() && !other.offset_depends_on_fold()
    }
}

impl PartialOrd for DateTime {
    /// Naive values order by their fields, aware values by the UTC instant
    /// they denote; ordering across the naive/aware boundary is refused.
    ///
    /// Note that two fold-ambiguous readings of one wall-clock value order
    /// as `Equal` even though `==` reports them unequal; see the type-level
    /// documentation.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.utc_offset(), other.utc_offset()) {
            (None, None) => Some(self.naive_microseconds().cmp(&other.naive_microseconds())),
            (Some(mine), Some(theirs)) => {
                if mine == theirs {
                    Some(self.naive_microseconds().cmp(&other.naive_microseconds()))
                } else {
                    let instant = self.naive_microseconds() - mine.total_microseconds();
                    let other_instant = other.naive_microseconds() - theirs.total_microseconds();
                    Some(instant.cmp(&other_instant))
                }
            }
            _ => None,
        }
    }
}

impl Hash for DateTime {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // The fold bit never enters the hash; the offset is read with fold
        // forced to zero so equal values from both sides of a fold agree.
        let base = if self.fold() {
            self.clone().with_fold(false)
        } else {
            self.clone()
        };
        match base.utc_offset() {
            Some(offset) => (base.naive_microseconds() - offset.total_microseconds()).hash(state),
            None => base.naive_microseconds().hash(state),
        }
    }
}

impl FromStr for DateTime {
    type Err = ParseError;

    fn from_str(input: &str) -> Result<Self, ParseError> {
        parse_date_time(input)
    }
}

impl fmt::Display for DateTime {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.isoformat('T', TimeSpec::Auto))
    }
}

/// Differences between two in-range values always fit a [`Duration`].
fn duration_from_difference(us: i128) -> Duration {
    i64::try_from(us)
        .ok()
        .and_then(|us| Duration::new(0, 0, us).ok())
        .expect("difference of in-range date-times fits a duration")
}

/// Serialized layout of a [`DateTime`], with the fold spelled as an honest
/// boolean.
#[derive(Debug, Clone, PartialEq)]
pub struct DateTimeRecord {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub microsecond: u32,
    pub fold: bool,
    pub zone: Option<ZoneRecord>,
}

/// An operation mixed a timezone-aware value with a naive one.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("cannot mix naive and timezone-aware values")]
pub struct NaiveAwareMismatchError;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timezone::{FixedOffset, utc};
    use std::hash::{BuildHasher, RandomState};

    fn hours(n: i64) -> Duration {
        Duration::new(0, n * 3_600, 0).unwrap()
    }

    fn offset_zone(seconds: i64) -> Arc<dyn TimeZone> {
        Arc::new(FixedOffset::new(Duration::new(0, seconds, 0).unwrap()).unwrap())
    }

    /// System zone at a constant offset.
    #[derive(Debug)]
    struct FixedSystem(Duration);

    impl SystemOffset for FixedSystem {
        fn offset_and_name_at(&self, _instant: i64) -> (Duration, Option<String>) {
            (self.0, Some("SYSTEM".to_owned()))
        }
    }

    /// A zone whose offset depends on the fold bit, like a real zone during
    /// a repeated hour.
    #[derive(Debug)]
    struct FoldSensitive;

    impl TimeZone for FoldSensitive {
        fn utc_offset(&self, at: Option<&DateTime>) -> Option<Duration> {
            Some(if at?.fold() { hours(1) } else { hours(2) })
        }

        fn dst(&self, at: Option<&DateTime>) -> Option<Duration> {
            self.utc_offset(at)
        }

        fn zone_name(&self, _at: Option<&DateTime>) -> Option<String> {
            Some("FOLDY".to_owned())
        }
    }

    #[test]
    fn new_validates_jointly() {
        assert_eq!(
            DateTime::new(2021, 2, 30, 0, 0, 0, 0).unwrap_err().field(),
            "day"
        );
        assert_eq!(
            DateTime::new(2021, 2, 28, 24, 0, 0, 0).unwrap_err().field(),
            "hour"
        );
        assert!(DateTime::new(2021, 2, 28, 23, 59, 59, 999_999).is_ok());
    }

    #[test]
    fn combine_keeps_zone_and_fold() -> Result<(), ValidationError> {
        let time = Time::new(1, 2, 3, 4)?.with_zone(Some(utc())).with_fold(true);
        let dt = DateTime::combine(Date::new(2021, 5, 6)?, time);
        assert!(dt.is_aware());
        assert!(dt.fold());
        assert_eq!(dt.date(), Date::new(2021, 5, 6)?);
        assert!(dt.time().zone().is_none());
        assert!(dt.time().fold());
        assert!(dt.time_with_zone().is_aware());
        Ok(())
    }

    #[test]
    fn addition_carries_all_the_way_up() -> Result<(), ValidationError> {
        let dt = DateTime::new(2021, 12, 31, 23, 59, 59, 999_999)?;
        let next = dt.checked_add_duration(Duration::RESOLUTION).unwrap();
        assert_eq!(next, DateTime::new(2022, 1, 1, 0, 0, 0, 0)?);

        let dt = DateTime::new(2020, 2, 28, 23, 0, 0, 0)?;
        assert_eq!(
            dt.checked_add_duration(hours(2)).unwrap(),
            DateTime::new(2020, 2, 29, 1, 0, 0, 0)?
        );

        let delta = Duration::new(3, 7_200, 17).unwrap();
        let there = dt.checked_add_duration(delta).unwrap();
        assert_eq!(there.checked_sub_duration(delta).unwrap(), dt);
        Ok(())
    }

    #[test]
    fn arithmetic_is_range_checked() {
        assert_eq!(DateTime::MAX.checked_add_duration(Duration::RESOLUTION), None);
        assert_eq!(DateTime::MIN.checked_sub_duration(Duration::RESOLUTION), None);
    }

    #[test]
    fn arithmetic_keeps_zone_and_resets_fold() -> Result<(), ValidationError> {
        let dt = DateTime::new(2021, 1, 1, 0, 0, 0, 0)?
            .with_zone(Some(utc()))
            .with_fold(true);
        let moved = dt.checked_add_duration(hours(1)).unwrap();
        assert!(moved.is_aware());
        assert!(!moved.fold());
        Ok(())
    }

    #[test]
    fn subtraction() -> Result<(), ValidationError> {
        let a = DateTime::new(2021, 1, 2, 3, 0, 0, 0)?;
        let b = DateTime::new(2021, 1, 1, 1, 30, 0, 0)?;
        assert_eq!(
            a.checked_sub(&b).unwrap(),
            Duration::new(1, 5_400, 0).unwrap()
        );
        assert_eq!(
            b.checked_sub(&a).unwrap(),
            Duration::new(-1, -5_400, 0).unwrap()
        );

        // Equal instants spelled under different offsets cancel out.
        let noon_plus_two = DateTime::new(2021, 6, 1, 12, 0, 0, 0)?.with_zone(Some(offset_zone(7_200)));
        let eleven_plus_one =
            DateTime::new(2021, 6, 1, 11, 0, 0, 0)?.with_zone(Some(offset_zone(3_600)));
        assert_eq!(
            noon_plus_two.checked_sub(&eleven_plus_one).unwrap(),
            Duration::ZERO
        );
        Ok(())
    }

    #[test]
    fn subtraction_refuses_mixed_awareness() -> Result<(), ValidationError> {
        let naive = DateTime::new(2021, 1, 1, 0, 0, 0, 0)?;
        let aware = naive.clone().with_zone(Some(utc()));
        assert!(naive.checked_sub(&aware).is_err());
        assert!(aware.checked_sub(&naive).is_err());
        assert_eq!(
            aware.checked_sub(&naive).unwrap_err().to_string(),
            "cannot mix naive and timezone-aware values"
        );
        Ok(())
    }

    #[test]
    fn comparisons() -> Result<(), ValidationError> {
        let naive = DateTime::new(2021, 1, 1, 12, 0, 0, 0)?;
        let aware = naive.clone().with_zone(Some(utc()));
        assert_ne!(naive, aware);
        assert_eq!(naive.partial_cmp(&aware), None);

        // Aware values compare by instant.
        let plus_one = DateTime::new(2021, 1, 1, 12, 0, 0, 0)?.with_zone(Some(offset_zone(3_600)));
        let zulu = DateTime::new(2021, 1, 1, 11, 0, 0, 0)?.with_zone(Some(utc()));
        assert_eq!(plus_one, zulu);
        assert!(DateTime::new(2021, 1, 1, 12, 0, 0, 1)?.with_zone(Some(utc())) > plus_one);

        // Naive values compare by fields, ignoring fold.
        assert_eq!(naive, naive.clone().with_fold(true));
        assert!(naive < DateTime::new(2021, 1, 1, 12, 0, 0, 1)?);
        Ok(())
    }

    #[test]
    fn fold_dependent_offsets_force_inequality() -> Result<(), ValidationError> {
        let zone: Arc<dyn TimeZone> = Arc::new(FoldSensitive);
        let first = DateTime::new(2021, 11, 7, 1, 30, 0, 0)?.with_zone(Some(Arc::clone(&zone)));
        let second = first.clone().with_fold(true);
        // Identical stored fields apart from fold, still unequal.
        assert_ne!(first, second);
        // The carve-out even defeats self-comparison.
        assert_ne!(first, first.clone());
        // Ordering keeps treating the readings by instant.
        assert_eq!(first.partial_cmp(&first.clone()), Some(Ordering::Equal));

        // Under a fold-insensitive zone the same pair is equal.
        let fixed = DateTime::new(2021, 11, 7, 1, 30, 0, 0)?.with_zone(Some(offset_zone(3_600)));
        assert_eq!(fixed, fixed.clone().with_fold(true));
        Ok(())
    }

    #[test]
    fn equal_values_hash_identically() -> Result<(), ValidationError> {
        let hasher = RandomState::new();
        let plus_one = DateTime::new(2021, 1, 1, 12, 0, 0, 0)?.with_zone(Some(offset_zone(3_600)));
        let zulu = DateTime::new(2021, 1, 1, 11, 0, 0, 0)?.with_zone(Some(utc()));
        assert_eq!(plus_one, zulu);
        assert_eq!(hasher.hash_one(&plus_one), hasher.hash_one(&zulu));

        let naive = DateTime::new(2021, 1, 1, 12, 0, 0, 0)?;
        assert_eq!(
            hasher.hash_one(&naive),
            hasher.hash_one(&naive.clone().with_fold(true))
        );
        Ok(())
    }

    #[test]
    fn timestamps() -> Result<(), ValidationError> {
        let sys = FixedSystem(hours(1));
        assert_eq!(DateTime::unix_epoch().timestamp(&sys), 0.0);
        assert_eq!(
            DateTime::new(1970, 1, 2, 0, 0, 0, 500_000)?
                .with_zone(Some(utc()))
                .timestamp(&sys),
            86_400.5
        );
        assert_eq!(
            DateTime::new(1970, 1, 1, 1, 0, 0, 0)?
                .with_zone(Some(offset_zone(3_600)))
                .timestamp(&sys),
            0.0
        );
        // A naive value consults the system zone.
        assert_eq!(
            DateTime::new(1970, 1, 2, 0, 0, 0, 0)?.timestamp(&sys),
            (86_400 - 3_600) as f64
        );
        Ok(())
    }

    #[test]
    fn astimezone_between_zones() -> Result<(), ValidationError> {
        let sys = FixedSystem(hours(1));
        let noon = DateTime::new(2021, 6, 1, 12, 0, 0, 0)?.with_zone(Some(utc()));
        let shifted = noon.astimezone(offset_zone(7_200), &sys).unwrap();
        assert_eq!(shifted.hour(), 14);
        assert_eq!(noon.checked_sub(&shifted).unwrap(), Duration::ZERO);

        // Converting to the value's own zone is a no-op.
        let zone = offset_zone(3_600);
        let dt = DateTime::new(2021, 6, 1, 9, 0, 0, 0)?.with_zone(Some(Arc::clone(&zone)));
        assert_eq!(dt.astimezone(Arc::clone(&zone), &sys).unwrap(), dt);

        // A naive value is first interpreted in the system zone.
        let naive = DateTime::new(2021, 6, 1, 12, 0, 0, 0)?;
        let in_utc = naive.astimezone(utc(), &sys).unwrap();
        assert_eq!(in_utc.hour(), 11);
        Ok(())
    }

    #[test]
    fn isoformat_variants() -> Result<(), ValidationError> {
        let dt = DateTime::new(2021, 1, 5, 12, 30, 0, 0)?;
        assert_eq!(dt.isoformat('T', TimeSpec::Auto), "2021-01-05T12:30:00");
        assert_eq!(dt.isoformat(' ', TimeSpec::Minutes), "2021-01-05 12:30");
        assert_eq!(
            dt.with_microsecond(7)?.isoformat('T', TimeSpec::Auto),
            "2021-01-05T12:30:00.000007"
        );
        assert_eq!(
            dt.clone()
                .with_zone(Some(offset_zone(5 * 3_600 + 30 * 60)))
                .to_string(),
            "2021-01-05T12:30:00+05:30"
        );
        assert_eq!(
            dt.with_zone(Some(utc())).to_string(),
            "2021-01-05T12:30:00+00:00"
        );
        Ok(())
    }

    #[test]
    fn record_round_trip() -> Result<(), ValidationError> {
        let dt = DateTime::new(2021, 7, 8, 9, 10, 11, 12)?
            .with_fold(true)
            .with_zone(Some(Arc::new(
                FixedOffset::with_name(hours(-5), "EST").unwrap(),
            )));
        let record = dt.to_record();
        assert!(record.fold);
        assert_eq!(record.zone.as_ref().map(|z| z.offset), Some(hours(-5)));
        assert_eq!(
            record.zone.as_ref().and_then(|z| z.name.as_deref()),
            Some("EST")
        );
        let back = DateTime::from_record(record)?;
        assert_eq!(back, dt);
        assert!(back.fold());

        let naive_record = DateTime::new(2021, 7, 8, 9, 10, 11, 12)?.to_record();
        assert_eq!(naive_record.zone, None);
        Ok(())
    }
}
