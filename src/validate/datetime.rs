use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateTimeError {
    #[error("unrecognized date; use YYYY-MM-DD, MM-DD-YYYY or DD-MM-YYYY")]
    Layout,
    #[error("{year:04}-{month:02}-{day:02} is not a day on the calendar")]
    NoSuchDay { year: i32, month: u32, day: u32 },
    #[error("time of day must be HH:MM or HH:MM:SS")]
    BadTime,
}

/// Parse a calendar date from one of three layouts, delimiter-agnostic:
/// `YYYY-MM-DD`, `MM-DD-YYYY`, or `DD-MM-YYYY`. The year position
/// disambiguates the first from the rest; for year-last input a first
/// group above 12 forces day-first, otherwise month-first wins.
/// Day-of-month validation is calendar-exact, leap years included.
pub fn parse_date(raw: &str) -> Result<NaiveDate, DateTimeError> {
    let groups: Vec<&str> = raw
        .trim()
        .split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .collect();
    if groups.len() != 3 {
        return Err(DateTimeError::Layout);
    }

    let nums: Vec<u32> = groups
        .iter()
        .map(|g| g.parse::<u32>().map_err(|_| DateTimeError::Layout))
        .collect::<Result<_, _>>()?;

    let (year, month, day) = if groups[0].len() == 4 {
        (nums[0], nums[1], nums[2])
    } else if groups[2].len() == 4 {
        if nums[0] > 12 {
            (nums[2], nums[1], nums[0])
        } else {
            (nums[2], nums[0], nums[1])
        }
    } else {
        return Err(DateTimeError::Layout);
    };

    NaiveDate::from_ymd_opt(year as i32, month, day).ok_or(DateTimeError::NoSuchDay {
        year: year as i32,
        month,
        day,
    })
}

/// Parse a free-text time-of-day, `HH:MM` or `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Result<NaiveTime, DateTimeError> {
    let parts: Vec<&str> = raw.trim().split(':').collect();
    if parts.len() != 2 && parts.len() != 3 {
        return Err(DateTimeError::BadTime);
    }
    let mut nums = [0u32; 3];
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() || part.len() > 2 {
            return Err(DateTimeError::BadTime);
        }
        nums[i] = part.parse().map_err(|_| DateTimeError::BadTime)?;
    }
    NaiveTime::from_hms_opt(nums[0], nums[1], nums[2]).ok_or(DateTimeError::BadTime)
}

/// Proxy state for the `time_from`/`time_to` input pairs: each side is
/// a date-picker value plus an optional free-text time-of-day. The
/// canonical Unix timestamps are composed from here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub from_date: Option<NaiveDate>,
    pub from_time: Option<NaiveTime>,
    pub to_date: Option<NaiveDate>,
    pub to_time: Option<NaiveTime>,
}

impl TimeWindow {
    /// Window start; a missing time-of-day means midnight.
    pub fn from_timestamp(&self) -> Option<i64> {
        let date = self.from_date?;
        let time = self.from_time.unwrap_or(NaiveTime::MIN);
        Some(date.and_time(time).and_utc().timestamp())
    }

    /// Window end. When the end date equals the start date and no
    /// time-of-day was given, the end advances to 23:59:59 so the
    /// range covers the whole day instead of collapsing to an instant.
    pub fn to_timestamp(&self) -> Option<i64> {
        let date = self.to_date?;
        let time = match self.to_time {
            Some(t) => t,
            None if self.from_date == Some(date) => end_of_day(),
            None => NaiveTime::MIN,
        };
        Some(date.and_time(time).and_utc().timestamp())
    }

    pub fn clear(&mut self) {
        *self = TimeWindow::default();
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).expect("23:59:59 is a valid time")
}
