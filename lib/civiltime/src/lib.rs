#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]

mod date;
mod date_time;
mod duration;
mod parser;
mod time;
mod timezone;

pub use self::date::{
    Date, DateTimeOverflowError, IsoWeekDate, MAX_YEAR, MIN_YEAR, ValidationError, days_in_month,
    is_leap_year,
};
pub use self::date_time::{DateTime, DateTimeRecord, NaiveAwareMismatchError};
pub use self::duration::{Duration, DurationOverflowError};
pub use self::parser::{ParseError, TimeSpec};
pub use self::time::{Time, TimeRecord, ZoneRecord};
pub use self::timezone::{
    ConversionError, FixedOffset, InvalidOffsetError, SystemOffset, TimeZone, utc,
};
