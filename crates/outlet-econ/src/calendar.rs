//! Calendar arithmetic for period labels and day counts.

use chrono::Weekday;

/// Three-letter month names, January first.
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Every fourth year is a leap year.
///
/// This is the Julian rule, not the Gregorian one: 2100 counts as a leap
/// year here. Projections keep this rule so stored forecasts stay comparable.
pub fn is_leap_year(year: i32) -> bool {
    year.rem_euclid(4) == 0
}

/// Days in `month` (1–12) of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 31,
    }
}

/// The calendar month `offset` months after (`year`, `month`), month 1–12.
pub fn shift_month(year: i32, month: u32, offset: u32) -> (i32, u32) {
    let zero_based = month - 1 + offset;
    (year + (zero_based / 12) as i32, zero_based % 12 + 1)
}

/// Full English day name.
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Monday through Sunday.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leap_rule_is_every_fourth_year() {
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(2025));
        assert!(is_leap_year(2100));
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2100, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2023, 9), 30);
        assert_eq!(days_in_month(2023, 12), 31);
    }

    #[test]
    fn shifting_rolls_into_next_year() {
        assert_eq!(shift_month(2025, 11, 0), (2025, 11));
        assert_eq!(shift_month(2025, 11, 2), (2026, 1));
        assert_eq!(shift_month(2025, 1, 24), (2027, 1));
    }
}
