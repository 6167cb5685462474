use crate::date::DateTimeOverflowError;
use crate::date_time::DateTime;
use crate::duration::Duration;
use crate::parser::push_offset;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Upper bound on any real-world transition shift, used when probing for
/// folds. As of 2015f the largest fold in the IANA database is 23 hours, at
/// 1969-09-30 13:00:00 in Kwajalein.
const MAX_FOLD_SECONDS: i64 = 24 * 3_600;

/// Seconds between 0001-01-01T00:00:00 and the Unix epoch; the ordinal of
/// 1970-01-01 is 719,163.
pub(crate) const EPOCH_SECONDS: i64 = 719_163 * 86_400;

/// The timezone capability consulted by aware [`DateTime`] and
/// [`Time`](crate::Time) values.
///
/// `None` from [`utc_offset`](Self::utc_offset) or [`dst`](Self::dst) means
/// "unknown", which is distinct from a zero offset: a value whose zone cannot
/// name an offset behaves as naive in comparisons and subtraction.
pub trait TimeZone: fmt::Debug + Send + Sync {
    /// Offset of local time from UTC at `at`, or `None` when unknown.
    fn utc_offset(&self, at: Option<&DateTime>) -> Option<Duration>;

    /// Daylight-saving component of the offset at `at`, or `None` when
    /// unknown.
    fn dst(&self, at: Option<&DateTime>) -> Option<Duration>;

    /// Display name of the zone at `at`, or `None` when unknown.
    fn zone_name(&self, at: Option<&DateTime>) -> Option<String>;

    /// Maps `at`, which carries this zone but whose fields spell a UTC
    /// instant, to the local time it names in this zone.
    ///
    /// The provided implementation is correct for any zone whose DST amount
    /// is constant between two daily transition boundaries: it applies the
    /// standard offset first and then corrects once by the DST amount in
    /// force at the candidate. Both steps are required — a single offset
    /// application reads the DST amount at the wrong wall time next to a
    /// transition.
    fn from_utc(&self, at: &DateTime) -> Result<DateTime, ConversionError> {
        let offset = self
            .utc_offset(Some(at))
            .ok_or(ConversionError::MissingUtcOffset)?;
        let dst = self.dst(Some(at)).ok_or(ConversionError::MissingDst)?;
        let std_offset = offset
            .checked_sub(dst)
            .ok_or(ConversionError::Overflow(DateTimeOverflowError))?;
        let candidate = at
            .checked_add_duration(std_offset)
            .ok_or(ConversionError::Overflow(DateTimeOverflowError))?;
        let candidate_dst = self
            .dst(Some(&candidate))
            .ok_or(ConversionError::InconsistentDst)?;
        if candidate_dst.is_zero() {
            Ok(candidate)
        } else {
            candidate
                .checked_add_duration(candidate_dst)
                .ok_or(ConversionError::Overflow(DateTimeOverflowError))
        }
    }
}

/// A timezone at a constant offset from UTC, optionally named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedOffset {
    offset: Duration,
    name: Option<String>,
}

impl FixedOffset {
    /// The canonical zero-offset zone, displayed as `UTC`. Prefer [`utc()`]
    /// for stamping values so they share one allocation.
    pub const UTC: Self = Self {
        offset: Duration::ZERO,
        name: None,
    };

    /// Builds a zone at `offset`, which must be strictly between -24 and
    /// +24 hours.
    pub fn new(offset: Duration) -> Result<Self, InvalidOffsetError> {
        Self::build(offset, None)
    }

    /// Builds a named zone at `offset`, which must be strictly between -24
    /// and +24 hours.
    pub fn with_name(
        offset: Duration,
        name: impl Into<String>,
    ) -> Result<Self, InvalidOffsetError> {
        Self::build(offset, Some(name.into()))
    }

    fn build(offset: Duration, name: Option<String>) -> Result<Self, InvalidOffsetError> {
        if offset.abs() < Duration::whole_days(1) {
            Ok(Self { offset, name })
        } else {
            Err(InvalidOffsetError { offset })
        }
    }

    #[inline]
    #[must_use]
    pub const fn offset(&self) -> Duration {
        self.offset
    }

    /// The stored name, if one was given at construction.
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            name.clone()
        } else if self.offset.is_zero() {
            "UTC".to_owned()
        } else {
            let mut out = String::from("UTC");
            push_offset(&mut out, self.offset);
            out
        }
    }
}

impl TimeZone for FixedOffset {
    #[inline]
    fn utc_offset(&self, _at: Option<&DateTime>) -> Option<Duration> {
        Some(self.offset)
    }

    /// A fixed offset has no daylight-saving component to report.
    #[inline]
    fn dst(&self, _at: Option<&DateTime>) -> Option<Duration> {
        None
    }

    #[inline]
    fn zone_name(&self, _at: Option<&DateTime>) -> Option<String> {
        Some(self.display_name())
    }

    fn from_utc(&self, at: &DateTime) -> Result<DateTime, ConversionError> {
        at.checked_add_duration(self.offset)
            .ok_or(ConversionError::Overflow(DateTimeOverflowError))
    }
}

impl fmt::Display for FixedOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// The process-wide UTC singleton. Every caller receives the same shared
/// allocation, so stamping values with UTC never allocates again.
pub fn utc() -> Arc<dyn TimeZone> {
    static UTC: OnceLock<Arc<FixedOffset>> = OnceLock::new();
    let zone: Arc<FixedOffset> = Arc::clone(UTC.get_or_init(|| Arc::new(FixedOffset::UTC)));
    zone
}

/// External capability standing in for the system zone: the UTC offset and
/// zone name in force at an instant, given as seconds from the Unix epoch.
///
/// This crate defines the contract only; wiring it to an operating system or
/// a timezone database is the caller's concern. The query is synchronous and
/// never retried here.
pub trait SystemOffset {
    fn offset_and_name_at(&self, instant: i64) -> (Duration, Option<String>);
}

/// Wall-clock seconds (from the calendar epoch) the system zone shows at the
/// UTC second `u`.
fn local(sys: &dyn SystemOffset, u: i64) -> i64 {
    let (offset, _) = sys.offset_and_name_at(u - EPOCH_SECONDS);
    u + offset.total_seconds_truncated()
}

/// Solves `local(u) = t` for `u`, where `t` is the wall-clock reading of
/// `dt`, in seconds from the calendar epoch.
///
/// One probe yields a candidate offset; when re-probing at the candidate
/// reproduces `t`, a further probe `MAX_FOLD_SECONDS` away — earlier for
/// fold 0, later for fold 1 — distinguishes a fold (two valid answers) from
/// a unique one. When the first candidate fails, the discovered offset names
/// a second candidate; if neither reproduces `t` the wall time falls in a
/// gap and the pre-transition reading (fold 0) or post-transition reading
/// (fold 1) is chosen.
pub(crate) fn local_to_seconds(dt: &DateTime, fold: bool, sys: &dyn SystemOffset) -> i64 {
    let t = dt.utc_seconds();
    let a = local(sys, t) - t;
    let u1 = t - a;
    let t1 = local(sys, u1);
    let b;
    if t1 == t {
        let u2 = if fold {
            u1 + MAX_FOLD_SECONDS
        } else {
            u1 - MAX_FOLD_SECONDS
        };
        b = local(sys, u2) - u2;
        if a == b {
            return u1;
        }
    } else {
        b = t1 - u1;
    }
    let u2 = t - b;
    if local(sys, u2) == t {
        return u2;
    }
    if t1 == t {
        return u1;
    }
    // Neither candidate reproduces t: the wall time falls in a gap.
    if fold { u1.min(u2) } else { u1.max(u2) }
}

/// Interprets a naive wall-clock value in the system zone and returns the
/// fixed offset in force at the instant it names.
pub(crate) fn local_fixed_zone(
    dt: &DateTime,
    sys: &dyn SystemOffset,
) -> Result<Arc<FixedOffset>, ConversionError> {
    let fold = dt.fold();
    let seconds = local_to_seconds(dt, fold, sys);
    let other = local_to_seconds(dt, !fold, sys);
    // In a gap the two interpretations disagree; keep the one on the side
    // the fold bit selects.
    let seconds = if other != seconds && (other > seconds) == fold {
        other
    } else {
        seconds
    };
    let (offset, name) = sys.offset_and_name_at(seconds - EPOCH_SECONDS);
    Ok(Arc::new(match name {
        Some(name) => FixedOffset::with_name(offset, name)?,
        None => FixedOffset::new(offset)?,
    }))
}

/// The offset handed to [`FixedOffset`] is not strictly within ±24 hours.
#[derive(Debug, Clone, thiserror::Error)]
#[error("fixed offset must be strictly between -24 and +24 hours, not {offset}")]
pub struct InvalidOffsetError {
    offset: Duration,
}

/// A UTC to local conversion could not be carried out.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConversionError {
    #[error("the timezone did not report a UTC offset for the instant")]
    MissingUtcOffset,
    #[error("the timezone did not report a DST amount for the instant")]
    MissingDst,
    #[error("the timezone reported inconsistent DST amounts; cannot convert")]
    InconsistentDst,
    #[error(transparent)]
    Overflow(#[from] DateTimeOverflowError),
    #[error(transparent)]
    InvalidOffset(#[from] InvalidOffsetError),
}
