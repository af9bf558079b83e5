use crate::photoexport_core::error::{ExportError, Result};
use std::fmt;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::{format_description, time};
use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time};

/// Length of the default export window ending today.
pub const DEFAULT_WINDOW: Duration = Duration::weeks(1);

/// Last representable instant of a day, used to close a date-only upper bound.
const END_OF_DAY: Time = time!(23:59:59.999999999);

/// Layout used when echoing range bounds back to the user.
const DISPLAY_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Date-only layouts accepted on the command line, tried in order.
const DATE_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month padding:none]-[day padding:none]"),
    format_description!("[year]/[month padding:none]/[day padding:none]"),
    format_description!("[year].[month padding:none].[day padding:none]"),
    format_description!("[month padding:none]/[day padding:none]/[year]"),
    format_description!("[month repr:short case_sensitive:false] [day padding:none] [year]"),
    format_description!("[month repr:short case_sensitive:false] [day padding:none], [year]"),
    format_description!("[month repr:long case_sensitive:false] [day padding:none] [year]"),
    format_description!("[month repr:long case_sensitive:false] [day padding:none], [year]"),
    format_description!("[day padding:none] [month repr:short case_sensitive:false] [year]"),
    format_description!("[day padding:none] [month repr:long case_sensitive:false] [year]"),
];

/// Date-time layouts. A `T` separator is normalized to a space before these are tried.
const DATE_TIME_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month padding:none]-[day padding:none] [hour padding:none]:[minute]"),
    format_description!(
        "[year]-[month padding:none]-[day padding:none] [hour padding:none]:[minute]:[second]"
    ),
    format_description!(
        "[year]-[month padding:none]-[day padding:none] [hour padding:none]:[minute]:[second].[subsecond]"
    ),
    format_description!("[year]/[month padding:none]/[day padding:none] [hour padding:none]:[minute]"),
    format_description!(
        "[year]/[month padding:none]/[day padding:none] [hour padding:none]:[minute]:[second]"
    ),
];

/// A date parsed from user input, with the time of day if one was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDate {
    pub date: Date,
    pub time: Option<Time>,
}

impl ParsedDate {
    pub fn from_date(date: Date) -> Self {
        ParsedDate { date, time: None }
    }

    /// Earliest instant covered by this date (midnight when no time was given).
    pub fn start(&self) -> PrimitiveDateTime {
        self.date.with_time(self.time.unwrap_or(Time::MIDNIGHT))
    }

    /// Latest instant covered by this date (end of day when no time was given).
    pub fn end(&self) -> PrimitiveDateTime {
        self.date.with_time(self.time.unwrap_or(END_OF_DAY))
    }
}

/// An inclusive range of wall-clock date-times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: PrimitiveDateTime,
    pub to: PrimitiveDateTime,
}

impl DateRange {
    pub fn new(from: ParsedDate, to: ParsedDate) -> Self {
        DateRange {
            from: from.start(),
            to: to.end(),
        }
    }

    /// The trailing window ending on `today`.
    pub fn default_window(today: Date) -> Self {
        let from = today.checked_sub(DEFAULT_WINDOW).unwrap_or(Date::MIN);
        DateRange::new(ParsedDate::from_date(from), ParsedDate::from_date(today))
    }

    pub fn contains(&self, moment: PrimitiveDateTime) -> bool {
        self.from <= moment && moment <= self.to
    }

    /// True when `from` is after `to`. Such a range matches nothing.
    pub fn is_empty(&self) -> bool {
        self.from > self.to
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", format_moment(self.from), format_moment(self.to))
    }
}

/// Render a range bound to the second.
pub fn format_moment(moment: PrimitiveDateTime) -> String {
    moment
        .format(DISPLAY_FORMAT)
        .unwrap_or_else(|_| moment.to_string())
}

/// Parse a free-form date string.
///
/// Relative keywords (`today`, `yesterday`, `tomorrow`) are resolved against `today`,
/// which the caller computes at invocation time.
pub fn parse_date(input: &str, today: Date) -> Result<ParsedDate> {
    let trimmed = input.trim();
    let invalid = || ExportError::InvalidDateFormat(input.to_string());

    match trimmed.to_lowercase().as_str() {
        "" => return Err(invalid()),
        "today" => return Ok(ParsedDate::from_date(today)),
        "yesterday" => return today.previous_day().map(ParsedDate::from_date).ok_or_else(invalid),
        "tomorrow" => return today.next_day().map(ParsedDate::from_date).ok_or_else(invalid),
        _ => {}
    }

    if let Some(date) = parse_compact(trimmed) {
        return Ok(ParsedDate::from_date(date));
    }

    // Offsets are dropped: ranges compare wall-clock values.
    if let Ok(moment) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(ParsedDate {
            date: moment.date(),
            time: Some(moment.time()),
        });
    }

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|format| Date::parse(trimmed, format).ok())
    {
        return Ok(ParsedDate::from_date(date));
    }

    let normalized = normalize_time_separator(trimmed);
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(&normalized, format).ok())
        .map(|moment| ParsedDate {
            date: moment.date(),
            time: Some(moment.time()),
        })
        .ok_or_else(invalid)
}

/// Parse `YYYYMMDD`.
fn parse_compact(input: &str) -> Option<Date> {
    if input.len() != 8 || !input.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = input[0..4].parse().ok()?;
    let month = Month::try_from(input[4..6].parse::<u8>().ok()?).ok()?;
    let day: u8 = input[6..8].parse().ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

/// Replace an ISO `T` date/time separator with a space.
fn normalize_time_separator(input: &str) -> String {
    let bytes = input.as_bytes();
    input
        .char_indices()
        .map(|(i, c)| {
            let between_digits = matches!(c, 'T' | 't')
                && i > 0
                && bytes[i - 1].is_ascii_digit()
                && bytes.get(i + 1).is_some_and(u8::is_ascii_digit);
            if between_digits { ' ' } else { c }
        })
        .collect()
}

/// Wall-clock value of an offset date-time, in its own offset.
pub fn wall_clock(moment: OffsetDateTime) -> PrimitiveDateTime {
    PrimitiveDateTime::new(moment.date(), moment.time())
}

pub fn get_local_tz() -> time::UtcOffset {
    OffsetDateTime::now_local()
        .map(|dt| dt.offset())
        .unwrap_or_else(|_| {
            log::warn!("Failed to get local time, using UTC instead.");
            time::UtcOffset::UTC
        })
}

/// Get the current local time, falling back to UTC if local time cannot be determined.
pub fn get_current_time() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| {
        log::warn!("Failed to get local time, using UTC instead.");
        OffsetDateTime::now_utc()
    })
}
