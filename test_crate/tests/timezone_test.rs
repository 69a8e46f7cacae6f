//! Runs in its own test binary since it pins the process wide `TZ` variable.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use javaprops::{java_timestamp, Timestamp};

fn new_york() {
    std::env::set_var("TZ", "America/New_York");
}

fn wall_clock(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

#[test]
pub fn local_times_use_zone_abbreviations() {
    new_york();
    assert_eq!(
        java_timestamp(&Timestamp::Local(wall_clock(2020, 6, 15, 12, 0))),
        "Mon Jun 15 12:00:00 EDT 2020"
    );
    assert_eq!(
        java_timestamp(&Timestamp::Local(wall_clock(2020, 1, 15, 12, 0))),
        "Wed Jan 15 12:00:00 EST 2020"
    );
}

#[test]
pub fn epochs_are_shown_in_host_zone() {
    new_york();
    assert_eq!(
        java_timestamp(&Timestamp::Epoch(0)),
        "Wed Dec 31 19:00:00 EST 1969"
    );

    let now = java_timestamp(&Timestamp::Now);
    assert!(now.contains(" EDT ") || now.contains(" EST "), "{now}");
}

#[test]
pub fn dst_gap_moves_forward() {
    new_york();
    assert_eq!(
        java_timestamp(&Timestamp::Local(wall_clock(2020, 3, 8, 2, 30))),
        "Sun Mar 08 03:30:00 EDT 2020"
    );
}

#[test]
pub fn fixed_offsets_keep_gmt_names() {
    new_york();
    let time = FixedOffset::west_opt(4 * 3600)
        .unwrap()
        .with_ymd_and_hms(2020, 6, 15, 12, 0, 0)
        .unwrap();
    assert_eq!(
        java_timestamp(&Timestamp::Zoned(time)),
        "Mon Jun 15 12:00:00 GMT-04:00 2020"
    );
}
