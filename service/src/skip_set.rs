use std::collections::BTreeSet;

use time::Date;

use crate::holiday_calendar::HolidayCalendar;
use crate::holiday_profile::{CustomHoliday, HolidayProfile, VacationPeriod};

const DEFAULT_REGION: &str = "BW";

/// Builds the set of dates to omit during recurring-shift expansion. Pure,
/// never fails; an absent profile contributes nothing. See spec.md §4.C.
pub fn build_skip_set(
    profile: Option<&HolidayProfile>,
    vacation_periods: &[VacationPeriod],
    custom_holidays: &[CustomHoliday],
    skip_public_holidays: bool,
    years: impl IntoIterator<Item = i32>,
) -> BTreeSet<Date> {
    let mut skip = BTreeSet::new();

    if profile.is_some() {
        for period in vacation_periods {
            let mut day = period.start_date;
            while day <= period.end_date {
                skip.insert(day);
                day = day.next_day().expect("calendar dates do not overflow here");
            }
        }
        for holiday in custom_holidays {
            skip.insert(holiday.date);
        }
    }

    if skip_public_holidays {
        let region = profile.map(|p| p.region_code.as_ref()).unwrap_or(DEFAULT_REGION);
        for year in years {
            skip.extend(HolidayCalendar::for_year(region, year).into_keys());
        }
    }

    skip
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;
    use uuid::Uuid;

    fn profile() -> HolidayProfile {
        HolidayProfile {
            id: Uuid::nil(),
            tenant_id: Uuid::nil(),
            name: "Test".into(),
            region_code: "BW".into(),
            active: true,
            created_at: None,
        }
    }

    #[test]
    fn test_empty_when_no_profile_and_no_holidays() {
        let skip = build_skip_set(None, &[], &[], false, []);
        assert!(skip.is_empty());
    }

    #[test]
    fn test_vacation_period_expands_inclusive() {
        let p = profile();
        let periods = vec![VacationPeriod {
            id: Uuid::nil(),
            profile_id: p.id,
            tenant_id: p.tenant_id,
            name: "Summer".into(),
            start_date: date!(2025 - 07 - 31),
            end_date: date!(2025 - 08 - 02),
            color: "#fff".into(),
        }];
        let skip = build_skip_set(Some(&p), &periods, &[], false, []);
        assert_eq!(skip.len(), 3);
        assert!(skip.contains(&date!(2025 - 07 - 31)));
        assert!(skip.contains(&date!(2025 - 08 - 02)));
    }

    #[test]
    fn test_holiday_and_vacation_overlap_counts_once() {
        let p = profile();
        let periods = vec![VacationPeriod {
            id: Uuid::nil(),
            profile_id: p.id,
            tenant_id: p.tenant_id,
            name: "AroundHoliday".into(),
            start_date: date!(2025 - 10 - 31),
            end_date: date!(2025 - 11 - 02),
            color: "#fff".into(),
        }];
        let skip = build_skip_set(Some(&p), &periods, &[], true, [2025]);
        assert!(skip.contains(&date!(2025 - 11 - 01)));
        // overlap does not double count; len is periods ∪ holidays, not summed.
        assert!(skip.len() < 3 + HolidayCalendar::for_year("BW", 2025).len());
    }

    #[test]
    fn test_absent_profile_still_adds_public_holidays() {
        let skip = build_skip_set(None, &[], &[], true, [2025]);
        assert!(skip.contains(&date!(2025 - 01 - 01)));
    }
}
