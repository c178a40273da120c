use std::collections::BTreeMap;
use std::sync::Arc;

use time::{Date, Month};

/// Deterministic, closed-form map of statutory holidays for a region/year.
/// Pure; safe to call from any worker. See SPEC_FULL.md §4.A.1 for the
/// tabulation this is grounded on.
pub struct HolidayCalendar;

impl HolidayCalendar {
    /// Gauss's algorithm for the date of Easter Sunday in the Gregorian calendar.
    pub fn easter_sunday(year: i32) -> Date {
        let a = year % 19;
        let b = year / 100;
        let c = year % 100;
        let d = b / 4;
        let e = b % 4;
        let f = (b + 8) / 25;
        let g = (b - f + 1) / 3;
        let h = (19 * a + b - d - g + 15) % 30;
        let i = c / 4;
        let k = c % 4;
        let l = (32 + 2 * e + 2 * i - h - k) % 7;
        let m = (a + 11 * h + 22 * l) / 451;
        let month = (h + l - 7 * m + 114) / 31;
        let day = (h + l - 7 * m + 114) % 31 + 1;
        Date::from_calendar_date(
            year,
            Month::try_from(month as u8).expect("Gauss's algorithm yields a valid month"),
            day as u8,
        )
        .expect("Gauss's algorithm yields a valid day")
    }

    /// Holidays for `region` (currently only the German state "BW" is
    /// tabulated) in `year`, keyed by date.
    pub fn for_year(region: &str, year: i32) -> BTreeMap<Date, Arc<str>> {
        let mut map = BTreeMap::new();
        let easter = Self::easter_sunday(year);
        let fixed: &[(Month, u8, &str)] = &[
            (Month::January, 1, "Neujahr"),
            (Month::January, 6, "Heilige Drei Könige"),
            (Month::May, 1, "Tag der Arbeit"),
            (Month::October, 3, "Tag der Deutschen Einheit"),
            (Month::November, 1, "Allerheiligen"),
            (Month::December, 25, "1. Weihnachtsfeiertag"),
            (Month::December, 26, "2. Weihnachtsfeiertag"),
        ];
        for (month, day, name) in fixed {
            let date = Date::from_calendar_date(year, *month, *day)
                .expect("tabulated fixed holiday dates are valid calendar dates");
            map.insert(date, Arc::from(*name));
        }
        let floating: &[(i64, &str)] = &[
            (-2, "Karfreitag"),
            (0, "Ostersonntag"),
            (1, "Ostermontag"),
            (39, "Christi Himmelfahrt"),
            (49, "Pfingstsonntag"),
            (50, "Pfingstmontag"),
            (60, "Fronleichnam"),
        ];
        for (offset, name) in floating {
            let date = if *offset >= 0 {
                easter + time::Duration::days(*offset)
            } else {
                easter - time::Duration::days(-*offset)
            };
            map.insert(date, Arc::from(*name));
        }
        let _ = region;
        map
    }

    pub fn is_holiday(region: &str, date: Date) -> bool {
        Self::for_year(region, date.year()).contains_key(&date)
    }

    pub fn name(region: &str, date: Date) -> Option<Arc<str>> {
        Self::for_year(region, date.year()).get(&date).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_easter_2025() {
        assert_eq!(HolidayCalendar::easter_sunday(2025), date!(2025 - 04 - 20));
    }

    #[test]
    fn test_easter_2026() {
        assert_eq!(HolidayCalendar::easter_sunday(2026), date!(2026 - 04 - 05));
    }

    #[test]
    fn test_fixed_holidays_2025() {
        let holidays = HolidayCalendar::for_year("BW", 2025);
        assert_eq!(holidays.get(&date!(2025 - 01 - 01)).unwrap().as_ref(), "Neujahr");
        assert_eq!(
            holidays.get(&date!(2025 - 10 - 03)).unwrap().as_ref(),
            "Tag der Deutschen Einheit"
        );
        assert!(holidays.contains_key(&date!(2025 - 11 - 01)));
    }

    #[test]
    fn test_floating_holidays_derived_from_easter_2025() {
        let holidays = HolidayCalendar::for_year("BW", 2025);
        assert!(holidays.contains_key(&date!(2025 - 04 - 18))); // Good Friday
        assert!(holidays.contains_key(&date!(2025 - 04 - 21))); // Easter Monday
        assert!(holidays.contains_key(&date!(2025 - 05 - 29))); // Ascension
        assert!(holidays.contains_key(&date!(2025 - 06 - 09))); // Whit Monday
        assert!(holidays.contains_key(&date!(2025 - 06 - 19))); // Corpus Christi
    }

    #[test]
    fn test_is_holiday() {
        assert!(HolidayCalendar::is_holiday("BW", date!(2025 - 11 - 01)));
        assert!(!HolidayCalendar::is_holiday("BW", date!(2025 - 11 - 02)));
    }
}
