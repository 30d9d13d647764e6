use crate::clock::{Clock, SystemClock};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Order of the numeric fields in a date token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    YearMonthDay,
    MonthDayYear,
    DayMonthYear,
}

/// Whether the time column carries an `AM`/`PM` suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HourClock {
    TwentyFour,
    /// `AM`/`PM` suffix accepted; a bare `HH:MM` is still read as 24-hour
    Twelve,
}

/// How a style writes its date and time columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampFormat {
    pub order: DateOrder,
    pub separator: char,
    pub clock: HourClock,
}

impl TimestampFormat {
    /// `yy/MM/dd HH:mm:ss`
    pub const OS400: Self = Self::new(DateOrder::YearMonthDay, '/', HourClock::TwentyFour);
    /// `yy.MM.dd HH:mm:ss`
    pub const OS400_DOTTED: Self = Self::new(DateOrder::YearMonthDay, '.', HourClock::TwentyFour);
    /// `MM-dd-yy hh:mma`
    pub const NT: Self = Self::new(DateOrder::MonthDayYear, '-', HourClock::Twelve);
    /// `yyyy-MM-dd HH:mm`
    pub const ISO: Self = Self::new(DateOrder::YearMonthDay, '-', HourClock::TwentyFour);

    pub const fn new(order: DateOrder, separator: char, clock: HourClock) -> Self {
        Self {
            order,
            separator,
            clock,
        }
    }
}

/// A date or time column that cannot be turned into a real calendar instant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("malformed date {0:?}")]
    MalformedDate(String),

    #[error("malformed time {0:?}")]
    MalformedTime(String),

    #[error("unknown month name {0:?}")]
    UnknownMonth(String),

    #[error("month {0} out of range")]
    MonthOutOfRange(u32),

    #[error("day {day} out of range for {year:04}-{month:02}")]
    DayOutOfRange { year: i32, month: u32, day: u32 },

    #[error("hour {0} out of range")]
    HourOutOfRange(u32),

    #[error("minute {0} out of range")]
    MinuteOutOfRange(u32),

    #[error("second {0} out of range")]
    SecondOutOfRange(u32),
}

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// A year column before century resolution
#[derive(Debug, Clone, Copy)]
enum Year {
    Abbreviated(i32),
    Full(i32),
}

/// Turns listing date/time columns into timestamps.
///
/// Abbreviated years are resolved against the injected clock so that the
/// result is never later than "now".
#[derive(Clone)]
pub struct DateTimeInterpreter {
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for DateTimeInterpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateTimeInterpreter")
            .field("now", &self.clock.now())
            .finish()
    }
}

impl Default for DateTimeInterpreter {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl DateTimeInterpreter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Reference time used for year resolution
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Parse a numeric date column and a time column under `format`.
    pub fn parse(
        &self,
        date: &str,
        time: &str,
        format: TimestampFormat,
    ) -> Result<NaiveDateTime, DateError> {
        let (year, month, day) = split_date(date, format)?;
        let time = parse_time(time, format.clock)?;

        let year = match year {
            Year::Full(year) => year,
            Year::Abbreviated(yy) => self.resolve_century(yy, month, day, time),
        };

        build(year, month, day, time)
    }

    /// Parse a Unix-style `Mon D` date followed by either `HH:MM` or `YYYY`.
    ///
    /// Entries showing a time carry no year; they belong to the most recent
    /// year that does not put them after "now".
    pub fn parse_month_day(
        &self,
        month: &str,
        day: &str,
        time_or_year: &str,
    ) -> Result<NaiveDateTime, DateError> {
        let month = month_number(month)?;
        let day = number(day, 2).ok_or_else(|| DateError::MalformedDate(day.to_string()))?;

        if !time_or_year.contains(':') {
            let year = number(time_or_year, 4)
                .filter(|_| time_or_year.len() == 4)
                .ok_or_else(|| DateError::MalformedDate(time_or_year.to_string()))?;
            return build(year as i32, month, day, NaiveTime::MIN);
        }

        let time = parse_time(time_or_year, HourClock::TwentyFour)?;
        let now = self.now();
        for year in [now.year(), now.year() - 1] {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                let candidate = date.and_time(time);
                if candidate <= now {
                    return Ok(candidate);
                }
            }
        }

        Err(DateError::DayOutOfRange {
            year: now.year() - 1,
            month,
            day,
        })
    }

    /// Pick the century that keeps the date at or before "now", rolling back
    /// at most once.
    fn resolve_century(&self, yy: i32, month: u32, day: u32, time: NaiveTime) -> i32 {
        let now = self.now();
        let full = now.year().div_euclid(100) * 100 + yy;
        let candidate = (full, month, day, time);
        let reference = (now.year(), now.month(), now.day(), now.time());
        if candidate > reference {
            full - 100
        } else {
            full
        }
    }
}

fn build(year: i32, month: u32, day: u32, time: NaiveTime) -> Result<NaiveDateTime, DateError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|date| date.and_time(time))
        .ok_or(DateError::DayOutOfRange { year, month, day })
}

/// Parse a run of at most `max_len` ASCII digits
fn number(token: &str, max_len: usize) -> Option<u32> {
    if token.is_empty() || token.len() > max_len || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn split_date(token: &str, format: TimestampFormat) -> Result<(Year, u32, u32), DateError> {
    let malformed = || DateError::MalformedDate(token.to_string());

    let parts: Vec<&str> = token.split(format.separator).collect();
    let [a, b, c] = parts.as_slice() else {
        return Err(malformed());
    };

    let (year, month, day) = match format.order {
        DateOrder::YearMonthDay => (*a, *b, *c),
        DateOrder::MonthDayYear => (*c, *a, *b),
        DateOrder::DayMonthYear => (*c, *b, *a),
    };

    let year = match (year.len(), number(year, 4)) {
        (2, Some(yy)) => Year::Abbreviated(yy as i32),
        (4, Some(yyyy)) => Year::Full(yyyy as i32),
        _ => return Err(malformed()),
    };
    let month = number(month, 2).ok_or_else(malformed)?;
    let day = number(day, 2).ok_or_else(malformed)?;

    if !(1..=12).contains(&month) {
        return Err(DateError::MonthOutOfRange(month));
    }
    if day == 0 || day > 31 {
        let year = match year {
            Year::Abbreviated(yy) => yy,
            Year::Full(yyyy) => yyyy,
        };
        return Err(DateError::DayOutOfRange { year, month, day });
    }

    Ok((year, month, day))
}

fn parse_time(token: &str, clock: HourClock) -> Result<NaiveTime, DateError> {
    let malformed = || DateError::MalformedTime(token.to_string());

    let upper = token.to_ascii_uppercase();
    let (digits, meridiem) = match clock {
        HourClock::Twelve => {
            if let Some(rest) = upper.strip_suffix("AM") {
                (rest, Some(false))
            } else if let Some(rest) = upper.strip_suffix("PM") {
                (rest, Some(true))
            } else {
                (upper.as_str(), None)
            }
        }
        HourClock::TwentyFour => (upper.as_str(), None),
    };

    let parts: Vec<&str> = digits.split(':').collect();
    let (hour, minute, second) = match parts.as_slice() {
        [h, m] => (*h, *m, None),
        [h, m, s] => (*h, *m, Some(*s)),
        _ => return Err(malformed()),
    };

    let hour = number(hour, 2).ok_or_else(malformed)?;
    let minute = number(minute, 2).ok_or_else(malformed)?;
    let second = match second {
        Some(s) => number(s, 2).ok_or_else(malformed)?,
        None => 0,
    };

    let hour = match meridiem {
        Some(pm) => {
            if !(1..=12).contains(&hour) {
                return Err(DateError::HourOutOfRange(hour));
            }
            match (hour, pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, false) => h,
                (h, true) => h + 12,
            }
        }
        None => hour,
    };

    if hour > 23 {
        return Err(DateError::HourOutOfRange(hour));
    }
    if minute > 59 {
        return Err(DateError::MinuteOutOfRange(minute));
    }
    if second > 59 {
        return Err(DateError::SecondOutOfRange(second));
    }

    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(malformed)
}

fn month_number(name: &str) -> Result<u32, DateError> {
    let lower = name.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == lower)
        .map(|idx| idx as u32 + 1)
        .ok_or_else(|| DateError::UnknownMonth(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn interpreter(now: &str) -> DateTimeInterpreter {
        DateTimeInterpreter::new(Arc::new(FixedClock(at(now))))
    }

    #[test]
    fn test_os400_slash_layout() {
        let dt = interpreter("2024-06-01 00:00:00")
            .parse("04/03/24", "14:06:34", TimestampFormat::OS400)
            .unwrap();
        assert_eq!(dt, at("2004-03-24 14:06:34"));
    }

    #[test]
    fn test_dotted_layout_rolls_back_a_century() {
        let dt = interpreter("2024-06-01 00:00:00")
            .parse("29.06.13", "15:45:09", TimestampFormat::OS400_DOTTED)
            .unwrap();
        assert_eq!(dt, at("1929-06-13 15:45:09"));
    }

    #[test]
    fn test_two_digit_year_equal_to_now_is_kept() {
        let dt = interpreter("2024-03-24 14:06:34")
            .parse("24/03/24", "14:06:34", TimestampFormat::OS400)
            .unwrap();
        assert_eq!(dt, at("2024-03-24 14:06:34"));
    }

    #[test]
    fn test_two_digit_year_one_second_ahead_rolls_back() {
        let dt = interpreter("2024-03-24 14:06:34")
            .parse("24/03/24", "14:06:35", TimestampFormat::OS400)
            .unwrap();
        assert_eq!(dt, at("1924-03-24 14:06:35"));
    }

    #[test]
    fn test_resolved_year_never_after_now() {
        let now = at("2026-10-17 12:00:00");
        let interp = interpreter("2026-10-17 12:00:00");
        for yy in 0..100 {
            let date = format!("{:02}/12/31", yy);
            let dt = interp.parse(&date, "23:59:59", TimestampFormat::OS400).unwrap();
            assert!(dt <= now, "{} resolved into the future", date);
            assert!(dt.year() >= now.year() - 100, "{} rolled back twice", date);
        }
    }

    #[test]
    fn test_four_digit_year_taken_literally() {
        let dt = interpreter("2000-01-01 00:00:00")
            .parse("2030-01-05", "10:00", TimestampFormat::ISO)
            .unwrap();
        assert_eq!(dt, at("2030-01-05 10:00:00"));
    }

    #[test]
    fn test_out_of_range_components() {
        let interp = interpreter("2024-06-01 00:00:00");
        let f = TimestampFormat::OS400;
        assert_eq!(
            interp.parse("04/03/18", "30:06:29", f),
            Err(DateError::HourOutOfRange(30))
        );
        assert_eq!(
            interp.parse("04/03/18", "13:60:29", f),
            Err(DateError::MinuteOutOfRange(60))
        );
        assert_eq!(
            interp.parse("04/03/18", "13:06:60", f),
            Err(DateError::SecondOutOfRange(60))
        );
        assert_eq!(
            interp.parse("04/13/18", "13:06:29", f),
            Err(DateError::MonthOutOfRange(13))
        );
        assert_eq!(
            interp.parse("04/02/30", "13:06:29", f),
            Err(DateError::DayOutOfRange {
                year: 2004,
                month: 2,
                day: 30
            })
        );
    }

    #[test]
    fn test_leap_day_checked_against_resolved_year() {
        let interp = interpreter("2024-06-01 00:00:00");
        assert!(interp.parse("00/02/29", "00:00:00", TimestampFormat::OS400).is_ok());
        assert!(interp.parse("01/02/29", "00:00:00", TimestampFormat::OS400).is_err());
    }

    #[test]
    fn test_wrong_separator_is_malformed() {
        let interp = interpreter("2024-06-01 00:00:00");
        assert!(matches!(
            interp.parse("29.06.13", "15:45:09", TimestampFormat::OS400),
            Err(DateError::MalformedDate(_))
        ));
        assert!(matches!(
            interp.parse("03/24", "13:18:19", TimestampFormat::OS400),
            Err(DateError::MalformedDate(_))
        ));
    }

    #[test]
    fn test_optional_seconds() {
        let dt = interpreter("2024-06-01 00:00:00")
            .parse("04/03/24", "14:06", TimestampFormat::OS400)
            .unwrap();
        assert_eq!(dt, at("2004-03-24 14:06:00"));
    }

    #[test]
    fn test_twelve_hour_clock() {
        let interp = interpreter("2024-06-01 00:00:00");
        assert_eq!(
            interp.parse("04-27-00", "09:09PM", TimestampFormat::NT).unwrap(),
            at("2000-04-27 21:09:00")
        );
        assert_eq!(
            interp.parse("04-27-00", "12:15AM", TimestampFormat::NT).unwrap(),
            at("2000-04-27 00:15:00")
        );
        assert_eq!(
            interp.parse("04-27-00", "13:15PM", TimestampFormat::NT),
            Err(DateError::HourOutOfRange(13))
        );
    }

    #[test]
    fn test_day_first_layout() {
        let day_first = TimestampFormat::new(DateOrder::DayMonthYear, '.', HourClock::TwentyFour);
        let interp = interpreter("2024-06-01 00:00:00");
        assert_eq!(
            interp.parse("13.06.09", "15:45", day_first).unwrap(),
            at("2009-06-13 15:45:00")
        );
        // Same digits read year-first land on a different day
        assert_eq!(
            interp.parse("13.06.09", "15:45", TimestampFormat::OS400_DOTTED).unwrap(),
            at("2013-06-09 15:45:00")
        );
        assert_eq!(
            interp.parse("06.13.09", "15:45", day_first),
            Err(DateError::MonthOutOfRange(13))
        );
    }

    #[test]
    fn test_meridiem_rejected_on_24_hour_layout() {
        let interp = interpreter("2024-06-01 00:00:00");
        assert!(matches!(
            interp.parse("04/03/24", "09:09PM", TimestampFormat::OS400),
            Err(DateError::MalformedTime(_))
        ));
    }

    #[test]
    fn test_month_day_with_year() {
        let dt = interpreter("2024-06-01 00:00:00")
            .parse_month_day("Jan", "5", "2020")
            .unwrap();
        assert_eq!(dt, at("2020-01-05 00:00:00"));
    }

    #[test]
    fn test_month_day_recent_entry_stays_in_current_year() {
        let dt = interpreter("2024-06-01 00:00:00")
            .parse_month_day("May", "30", "08:15")
            .unwrap();
        assert_eq!(dt, at("2024-05-30 08:15:00"));
    }

    #[test]
    fn test_month_day_future_entry_moves_to_previous_year() {
        let dt = interpreter("2024-06-01 00:00:00")
            .parse_month_day("Dec", "24", "18:00")
            .unwrap();
        assert_eq!(dt, at("2023-12-24 18:00:00"));
    }

    #[test]
    fn test_month_day_leap_day_in_non_leap_year() {
        let dt = interpreter("2025-01-10 00:00:00")
            .parse_month_day("feb", "29", "12:00")
            .unwrap();
        assert_eq!(dt, at("2024-02-29 12:00:00"));
    }

    #[test]
    fn test_unknown_month_name() {
        let interp = interpreter("2024-06-01 00:00:00");
        assert_eq!(
            interp.parse_month_day("Foo", "5", "2020"),
            Err(DateError::UnknownMonth("Foo".to_string()))
        );
    }
}
