//! Turning "next Friday, two weeks out" into concrete calendar dates.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::model::{DateWindow, weekday_name};

/// Resolve the selected weekday into the pair of dates one fetch covers.
///
/// `primary` is the nearest occurrence of `weekday` on or after `today`
/// (today counts when it matches), pushed forward by `week_offset` whole
/// weeks. `secondary` is always one week after `primary`. No upper bound is
/// applied here.
pub fn resolve(today: NaiveDate, weekday: Weekday, week_offset: u32) -> DateWindow {
    let current = today.weekday().num_days_from_sunday();
    let target = weekday.num_days_from_sunday();

    let days_to_add = if target >= current {
        target - current
    } else {
        7 - current + target
    };

    let primary = add_days(today, u64::from(days_to_add) + u64::from(week_offset) * 7);
    let secondary = add_days(primary, 7);

    DateWindow { primary, secondary }
}

// Dates beyond chrono's range saturate at the maximum representable date.
fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

/// English ordinal suffix for a day of the month.
pub fn ordinal_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&(day % 100)) {
        return "th";
    }

    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// "Friday the 8th".
pub fn day_with_ordinal(date: NaiveDate, weekday: Weekday) -> String {
    let day = date.day();
    format!("{} the {}{}", weekday_name(weekday), day, ordinal_suffix(day))
}

/// Heading for the selected day: "This Friday the 8th" while it falls within
/// the coming week, "Next Friday the 15th" after that.
pub fn primary_heading(date: NaiveDate, today: NaiveDate, weekday: Weekday) -> String {
    let prefix = if date < add_days(today, 7) { "This" } else { "Next" };
    format!("{prefix} {}", day_with_ordinal(date, weekday))
}

/// Heading for the day one week after the selected one.
pub fn secondary_heading(date: NaiveDate, today: NaiveDate, weekday: Weekday) -> String {
    if date == add_days(today, 7) {
        format!("Next {}", day_with_ordinal(date, weekday))
    } else {
        day_with_ordinal(date, weekday)
    }
}
