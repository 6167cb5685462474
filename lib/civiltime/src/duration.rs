use std::fmt;

const MAX_DAYS: i128 = 999_999_999;
const USECS_PER_SEC: i128 = 1_000_000;
const USECS_PER_DAY: i128 = 86_400 * USECS_PER_SEC;

/// A signed span of days, seconds and microseconds.
///
/// The triple is kept normalized: `0 <= seconds < 86_400`,
/// `0 <= microseconds < 1_000_000` and `|days| <= 999_999_999`. The sign of
/// the whole value is carried by `days` alone, so two equal spans always hold
/// identical triples and equality, ordering and hashing can be derived from
/// the fields directly.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Copy, Hash, Default)]
pub struct Duration {
    days: i32,
    seconds: i32,
    microseconds: i32,
}

impl Duration {
    pub const MAX: Self = Self {
        days: 999_999_999,
        seconds: 86_399,
        microseconds: 999_999,
    };
    pub const MIN: Self = Self {
        days: -999_999_999,
        seconds: 0,
        microseconds: 0,
    };
    /// The smallest representable non-zero span, one microsecond.
    pub const RESOLUTION: Self = Self {
        days: 0,
        seconds: 0,
        microseconds: 1,
    };
    pub const ZERO: Self = Self {
        days: 0,
        seconds: 0,
        microseconds: 0,
    };

    /// Builds a normalized span from possibly denormalized components.
    ///
    /// Components may be negative and carry into each other; the result is
    /// reduced to the canonical triple.
    #[inline]
    pub fn new(days: i64, seconds: i64, microseconds: i64) -> Result<Self, DurationOverflowError> {
        Self::from_microseconds(
            i128::from(days) * USECS_PER_DAY
                + i128::from(seconds) * USECS_PER_SEC
                + i128::from(microseconds),
        )
    }

    /// Builds a span from per-unit components, any of which may be fractional.
    ///
    /// Integer parts are accumulated exactly; the fractional remainders are
    /// summed apart and folded in with a single round-half-to-even step.
    /// Non-finite components are rejected as overflow.
    #[expect(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn from_units(
        days: f64,
        seconds: f64,
        microseconds: f64,
        milliseconds: f64,
        minutes: f64,
        hours: f64,
        weeks: f64,
    ) -> Result<Self, DurationOverflowError> {
        let mut whole_us = 0_i128;
        let mut leftover_us = 0.0_f64;
        for (value, factor) in [
            (days, USECS_PER_DAY),
            (seconds, USECS_PER_SEC),
            (microseconds, 1),
            (milliseconds, 1_000),
            (minutes, 60 * USECS_PER_SEC),
            (hours, 3_600 * USECS_PER_SEC),
            (weeks, 7 * USECS_PER_DAY),
        ] {
            if !value.is_finite() {
                return Err(DurationOverflowError);
            }
            let int_part = value.trunc();
            if int_part.abs() >= 9.0e18 {
                return Err(DurationOverflowError);
            }
            whole_us = (int_part as i128)
                .checked_mul(factor)
                .and_then(|us| whole_us.checked_add(us))
                .ok_or(DurationOverflowError)?;
            leftover_us += (value - int_part) * factor as f64;
        }
        let rounded = leftover_us.round_ties_even();
        if rounded.abs() >= 9.0e18 {
            return Err(DurationOverflowError);
        }
        Self::from_microseconds(whole_us + rounded as i128)
    }

    #[expect(clippy::cast_possible_truncation)]
    fn from_microseconds(us: i128) -> Result<Self, DurationOverflowError> {
        let days = us.div_euclid(USECS_PER_DAY);
        let rem = us.rem_euclid(USECS_PER_DAY);
        if !(-MAX_DAYS..=MAX_DAYS).contains(&days) {
            return Err(DurationOverflowError);
        }
        Ok(Self {
            days: days as i32,
            seconds: (rem / USECS_PER_SEC) as i32,
            microseconds: (rem % USECS_PER_SEC) as i32,
        })
    }

    #[inline]
    #[must_use]
    pub fn from_be_bytes(bytes: [u8; 12]) -> Self {
        Self {
            days: i32::from_be_bytes(bytes[0..4].try_into().unwrap()),
            seconds: i32::from_be_bytes(bytes[4..8].try_into().unwrap()),
            microseconds: i32::from_be_bytes(bytes[8..12].try_into().unwrap()),
        }
    }

    #[inline]
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 12] {
        let mut bytes = [0; 12];
        bytes[0..4].copy_from_slice(&self.days.to_be_bytes());
        bytes[4..8].copy_from_slice(&self.seconds.to_be_bytes());
        bytes[8..12].copy_from_slice(&self.microseconds.to_be_bytes());
        bytes
    }

    #[inline]
    #[must_use]
    pub const fn days(self) -> i32 {
        self.days
    }

    #[inline]
    #[must_use]
    pub const fn seconds(self) -> i32 {
        self.seconds
    }

    #[inline]
    #[must_use]
    pub const fn microseconds(self) -> i32 {
        self.microseconds
    }

    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.days == 0 && self.seconds == 0 && self.microseconds == 0
    }

    /// The whole span expressed in seconds, with microsecond precision folded
    /// into the fraction.
    #[expect(clippy::cast_precision_loss)]
    #[inline]
    #[must_use]
    pub fn total_seconds(self) -> f64 {
        self.total_microseconds() as f64 / 1e6
    }

    pub(crate) const fn total_microseconds(self) -> i128 {
        self.days as i128 * USECS_PER_DAY
            + self.seconds as i128 * USECS_PER_SEC
            + self.microseconds as i128
    }

    /// The whole span in seconds, truncating sub-second precision toward zero.
    pub(crate) const fn total_seconds_truncated(self) -> i64 {
        self.days as i64 * 86_400 + self.seconds as i64
    }

    pub(crate) const fn whole_days(days: i32) -> Self {
        Self {
            days,
            seconds: 0,
            microseconds: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        Self::from_microseconds(self.total_microseconds() + rhs.total_microseconds()).ok()
    }

    #[inline]
    #[must_use]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        Self::from_microseconds(self.total_microseconds() - rhs.total_microseconds()).ok()
    }

    /// Returns `None` when negating [`Duration::MAX`]-adjacent values whose
    /// sub-day part would borrow the day count past the minimum.
    #[inline]
    #[must_use]
    pub fn checked_neg(self) -> Option<Self> {
        Self::from_microseconds(-self.total_microseconds()).ok()
    }

    #[inline]
    #[must_use]
    pub fn abs(self) -> Self {
        if self.days < 0 {
            // A negative span always negates in range: its sub-day fields
            // only borrow the day count upward.
            self.checked_neg().unwrap_or(Self::ZERO)
        } else {
            self
        }
    }

    #[inline]
    #[must_use]
    pub fn checked_mul(self, rhs: i64) -> Option<Self> {
        Self::from_microseconds(self.total_microseconds().checked_mul(i128::from(rhs))?).ok()
    }

    /// Multiplies by a float through its exact integer ratio.
    ///
    /// The factor is decomposed into `numerator / 2^exponent` before any
    /// arithmetic happens, so the product never passes through a floating
    /// point microsecond count.
    #[must_use]
    pub fn checked_mul_f64(self, rhs: f64) -> Option<Self> {
        let (numerator, den_exp) = float_as_integer_ratio(rhs)?;
        let product = self.total_microseconds().checked_mul(numerator)?;
        let us = if den_exp == 0 {
            product
        } else if den_exp > 126 {
            // |product| < 2^120 < 2^(den_exp - 1), so the quotient rounds to
            // zero.
            0
        } else {
            div_nearest(product, 1_i128 << den_exp)
        };
        Self::from_microseconds(us).ok()
    }

    /// True division by an integer, rounding half to even.
    #[must_use]
    pub fn checked_div(self, rhs: i64) -> Option<Self> {
        if rhs == 0 {
            return None;
        }
        let mut us = self.total_microseconds();
        let mut divisor = i128::from(rhs);
        if divisor < 0 {
            us = -us;
            divisor = -divisor;
        }
        Self::from_microseconds(div_nearest(us, divisor)).ok()
    }

    /// True division by a float through its exact integer ratio, rounding
    /// half to even.
    #[must_use]
    pub fn checked_div_f64(self, rhs: f64) -> Option<Self> {
        let (numerator, den_exp) = float_as_integer_ratio(rhs)?;
        if numerator == 0 {
            return None;
        }
        let us = self.total_microseconds();
        if us == 0 {
            return Some(Self::ZERO);
        }
        if den_exp > 126 {
            // The divisor magnitude is below 2^-73; the quotient cannot fit.
            return None;
        }
        let mut scaled = us.checked_mul(1_i128 << den_exp)?;
        let mut divisor = numerator;
        if divisor < 0 {
            scaled = -scaled;
            divisor = -divisor;
        }
        Self::from_microseconds(div_nearest(scaled, divisor)).ok()
    }

    /// Floor division by an integer.
    #[must_use]
    pub fn checked_floor_div(self, rhs: i64) -> Option<Self> {
        if rhs == 0 {
            return None;
        }
        let (quotient, _) = floor_div_rem(self.total_microseconds(), i128::from(rhs));
        Self::from_microseconds(quotient).ok()
    }

    /// How many whole `rhs` spans fit into this one, rounding toward negative
    /// infinity. Returns `None` when `rhs` is zero.
    #[must_use]
    pub fn floor_div_duration(self, rhs: Self) -> Option<i128> {
        if rhs.is_zero() {
            return None;
        }
        let (quotient, _) = floor_div_rem(self.total_microseconds(), rhs.total_microseconds());
        Some(quotient)
    }

    /// The exact ratio of the two spans. Returns `None` when `rhs` is zero.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn div_duration(self, rhs: Self) -> Option<f64> {
        if rhs.is_zero() {
            return None;
        }
        Some(self.total_microseconds() as f64 / rhs.total_microseconds() as f64)
    }

    /// Remainder of floor division; takes the sign of `rhs`. Returns `None`
    /// when `rhs` is zero.
    #[must_use]
    pub fn checked_rem(self, rhs: Self) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }
        let (_, remainder) = floor_div_rem(self.total_microseconds(), rhs.total_microseconds());
        Self::from_microseconds(remainder).ok()
    }

    /// Floor quotient and remainder in one step. Returns `None` when `rhs` is
    /// zero.
    #[must_use]
    pub fn checked_divmod(self, rhs: Self) -> Option<(i128, Self)> {
        if rhs.is_zero() {
            return None;
        }
        let (quotient, remainder) =
            floor_div_rem(self.total_microseconds(), rhs.total_microseconds());
        Some((quotient, Self::from_microseconds(remainder).ok()?))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.days != 0 {
            write!(
                f,
                "{} day{}, ",
                self.days,
                if self.days.abs() == 1 { "" } else { "s" }
            )?;
        }
        write!(
            f,
            "{}:{:02}:{:02}",
            self.seconds / 3_600,
            self.seconds % 3_600 / 60,
            self.seconds % 60
        )?;
        if self.microseconds != 0 {
            write!(f, ".{:06}", self.microseconds)?;
        }
        Ok(())
    }
}

/// Floor division with the remainder taking the divisor's sign.
fn floor_div_rem(dividend: i128, divisor: i128) -> (i128, i128) {
    let mut quotient = dividend / divisor;
    let mut remainder = dividend % divisor;
    if remainder != 0 && (remainder < 0) != (divisor < 0) {
        quotient -= 1;
        remainder += divisor;
    }
    (quotient, remainder)
}

/// Integer division rounding half to even. `divisor` must be positive.
fn div_nearest(dividend: i128, divisor: i128) -> i128 {
    let (quotient, remainder) = floor_div_rem(dividend, divisor);
    let twice = 2 * remainder;
    if twice > divisor || (twice == divisor && quotient % 2 != 0) {
        quotient + 1
    } else {
        quotient
    }
}

/// Decomposes a finite float into `numerator / 2^exponent` exactly.
///
/// Returns `None` for non-finite values and for magnitudes whose numerator
/// cannot fit an `i128`. The numerator carries the sign and is odd whenever
/// the exponent is non-zero; in that case it is at most 2^53.
fn float_as_integer_ratio(value: f64) -> Option<(i128, u32)> {
    if !value.is_finite() {
        return None;
    }
    if value == 0.0 {
        return Some((0, 0));
    }
    let bits = value.to_bits();
    let sign = if bits >> 63 == 0 { 1 } else { -1_i128 };
    let raw_exponent = i32::try_from((bits >> 52) & 0x7FF).ok()?;
    let raw_mantissa = i128::from(bits & ((1_u64 << 52) - 1));
    let (mut mantissa, mut exponent) = if raw_exponent == 0 {
        (raw_mantissa, -1074)
    } else {
        (raw_mantissa | (1 << 52), raw_exponent - 1075)
    };
    while mantissa % 2 == 0 && exponent < 0 {
        mantissa /= 2;
        exponent += 1;
    }
    if exponent >= 0 {
        let exponent = u32::try_from(exponent).ok()?;
        if 128 - mantissa.leading_zeros() + exponent > 126 {
            return None;
        }
        Some((sign * (mantissa << exponent), 0))
    } else {
        Some((sign * mantissa, u32::try_from(-exponent).ok()?))
    }
}

/// The magnitude of a [`Duration`] went past 999,999,999 days.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("duration days must have magnitude at most 999999999")]
pub struct DurationOverflowError;
