//! Java style timestamps, as written by `java.util.Properties#store`.

use std::env;

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Local, NaiveDateTime, Offset, TimeZone, Timelike,
    Utc,
};
use chrono_tz::{OffsetName, Tz};
use tracing::debug;

/// Day names as Java prints them, Monday first.
static DAYS_OF_WEEK: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

static MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Point in time to render with [`java_timestamp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timestamp {
    /// No timestamp at all.
    None,
    /// The current time in the host time zone.
    #[default]
    Now,
    /// Seconds since the Unix epoch, shown in the host time zone.
    Epoch(i64),
    /// Wall clock time in the host time zone.
    Local(NaiveDateTime),
    /// Time with an explicit UTC offset, shown in that offset.
    Zoned(DateTime<FixedOffset>),
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::Zoned(value)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Zoned(value.fixed_offset())
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(value: NaiveDateTime) -> Self {
        Self::Local(value)
    }
}

/// Java's name for a zone that is only known by its offset.
fn zone_name(offset: FixedOffset) -> String {
    let seconds = offset.local_minus_utc();
    if seconds == 0 {
        return String::from("UTC");
    }

    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.unsigned_abs() / 60;
    format!("GMT{sign}{:02}:{:02}", minutes / 60, minutes % 60)
}

/// The host time zone, `TZ` first and the system setting otherwise.
/// None if neither names a zone of the tz database.
fn host_zone() -> Option<Tz> {
    let name = match env::var("TZ") {
        Ok(tz) if !tz.is_empty() => tz.trim_start_matches(':').to_owned(),
        _ => iana_time_zone::get_timezone().ok()?,
    };

    let zone: Option<Tz> = name.parse().ok();
    if zone.is_none() {
        debug!(zone = %name, "unknown host time zone, falling back to offsets");
    }
    zone
}

/// Abbreviation in effect at `time`, such as `CET` or `EDT`.
/// Zones that only have numeric abbreviations get Java's `GMT+HH:MM` form.
fn abbreviation(time: &DateTime<Tz>) -> String {
    match time.offset().abbreviation() {
        Some(name) if !name.starts_with(['+', '-']) => name.to_owned(),
        _ => zone_name(time.offset().fix()),
    }
}

/// Place a timestamp that has no zone of its own in `zone`.
fn in_zone<Z: TimeZone>(timestamp: &Timestamp, zone: &Z) -> Option<DateTime<Z>> {
    match *timestamp {
        Timestamp::None => None,
        Timestamp::Now => Some(Utc::now().with_timezone(zone)),
        Timestamp::Epoch(seconds) => zone.timestamp_opt(seconds, 0).earliest(),
        Timestamp::Local(naive) => zone
            .from_local_datetime(&naive)
            .earliest()
            // Inside a DST gap mktime moves the wall clock forward.
            .or_else(|| {
                naive
                    .checked_add_signed(Duration::hours(1))
                    .and_then(|later| zone.from_local_datetime(&later).earliest())
            })
            .or_else(|| Some(zone.from_utc_datetime(&naive))),
        Timestamp::Zoned(zoned) => Some(zoned.with_timezone(zone)),
    }
}

/// Resolve a timestamp to a concrete time and the name of its zone.
/// None for `Timestamp::None` and for epochs chrono cannot represent.
fn resolve(timestamp: &Timestamp) -> Option<(DateTime<FixedOffset>, String)> {
    if let Timestamp::Zoned(zoned) = *timestamp {
        return Some((zoned, zone_name(*zoned.offset())));
    }

    if let Some(zone) = host_zone() {
        return in_zone(timestamp, &zone).map(|time| (time.fixed_offset(), abbreviation(&time)));
    }

    in_zone(timestamp, &Local).map(|time| {
        let time = time.fixed_offset();
        (time, zone_name(*time.offset()))
    })
}

/// Render a timestamp the way `java.util.Date#toString` does, e.g.
/// `Mon Sep 02 14:00:54 CEST 2024`.
///
/// Times without a zone of their own are shown in the host time zone (the `TZ`
/// variable, else the system setting) with its abbreviation. Fixed offsets are
/// named `UTC` or `GMT+HH:MM`. Day and month names are always English.
/// `Timestamp::None` renders as an empty string, as does an epoch outside the
/// range chrono supports.
///
/// # Example
/// ```rust
/// use chrono::{FixedOffset, TimeZone};
/// use javaprops::{java_timestamp, Timestamp};
///
/// let time = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2024, 9, 2, 14, 0, 54).unwrap();
/// assert_eq!(java_timestamp(&Timestamp::Zoned(time)), "Mon Sep 02 14:00:54 UTC 2024");
/// ```
#[must_use]
pub fn java_timestamp(timestamp: &Timestamp) -> String {
    let Some((time, zone)) = resolve(timestamp) else {
        return String::new();
    };

    format!(
        "{} {} {:02} {:02}:{:02}:{:02} {} {:04}",
        DAYS_OF_WEEK[time.weekday().num_days_from_monday() as usize],
        MONTHS[time.month0() as usize],
        time.day(),
        time.hour(),
        time.minute(),
        time.second(),
        zone,
        time.year()
    )
}
