//! Calendar expansion: weekly service patterns plus date-level exceptions
//! collapse down into `raptor_core::model::CalendarIndex`, a plain
//! date -> active-service-set map, which is all the round-based search
//! ever consults.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use raptor_core::ids::prefixed;
use raptor_core::model::CalendarIndex;

use crate::feed::records::{RawCalendar, RawCalendarDate};

fn parse_yyyymmdd(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 {
        return None;
    }
    let year: i32 = s[0..4].parse().ok()?;
    let month: u32 = s[4..6].parse().ok()?;
    let day: u32 = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn active_on_weekday(calendar: &RawCalendar, weekday: Weekday) -> bool {
    let flag = match weekday {
        Weekday::Mon => calendar.monday,
        Weekday::Tue => calendar.tuesday,
        Weekday::Wed => calendar.wednesday,
        Weekday::Thu => calendar.thursday,
        Weekday::Fri => calendar.friday,
        Weekday::Sat => calendar.saturday,
        Weekday::Sun => calendar.sunday,
    };
    flag > 0
}

/// Walk every operator's weekly service table over its validity interval,
/// emit every concrete date the service is active, then apply date-level
/// `calendar_dates` exceptions (1 = add, 2 = remove) on top.
pub fn expand(operator_code: &str, calendars: &[RawCalendar], exceptions: &[RawCalendarDate], index: &mut CalendarIndex) {
    for calendar in calendars {
        let (Some(start), Some(end)) = (parse_yyyymmdd(&calendar.start_date), parse_yyyymmdd(&calendar.end_date)) else {
            log::warn!("{operator_code}: calendar row for {} has an unparseable date range", calendar.service_id);
            continue;
        };
        let service = prefixed(operator_code, &calendar.service_id);
        let mut date = start;
        while date <= end {
            if active_on_weekday(calendar, date.weekday()) {
                index.add(date.format("%Y-%m-%d").to_string(), service.clone());
            }
            date += Duration::days(1);
        }
    }

    for exception in exceptions {
        let Some(date) = parse_yyyymmdd(&exception.date) else {
            log::warn!("{operator_code}: calendar_dates row for {} has an unparseable date", exception.service_id);
            continue;
        };
        let key = date.format("%Y-%m-%d").to_string();
        let service = prefixed(operator_code, &exception.service_id);
        match exception.exception_type {
            1 => index.add(key, service),
            2 => {
                if let Some(services) = index.0.get_mut(&key) {
                    services.remove(&service);
                }
            }
            other => log::warn!("{operator_code}: unknown calendar_dates exception_type {other}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn week_calendar(service_id: &str, days: [u8; 7], start: &str, end: &str) -> RawCalendar {
        RawCalendar {
            service_id: service_id.into(),
            monday: days[0],
            tuesday: days[1],
            wednesday: days[2],
            thursday: days[3],
            friday: days[4],
            saturday: days[5],
            sunday: days[6],
            start_date: start.into(),
            end_date: end.into(),
        }
    }

    #[test]
    fn expands_weekdays_only_over_range() {
        let calendars = vec![week_calendar("S1", [1, 1, 1, 1, 1, 0, 0], "20250106", "20250112")];
        let mut index = CalendarIndex::default();
        expand("SNCF", &calendars, &[], &mut index);
        assert!(index.active_services("2025-01-06").contains("SNCF:S1")); // Monday
        assert!(!index.active_services("2025-01-11").contains("SNCF:S1")); // Saturday
    }

    #[test]
    fn exceptions_add_and_remove_dates() {
        let calendars = vec![week_calendar("S1", [1, 0, 0, 0, 0, 0, 0], "20250106", "20250106")];
        let exceptions = vec![
            RawCalendarDate {
                service_id: "S1".into(),
                date: "20250111".into(),
                exception_type: 1,
            },
            RawCalendarDate {
                service_id: "S1".into(),
                date: "20250106".into(),
                exception_type: 2,
            },
        ];
        let mut index = CalendarIndex::default();
        expand("SNCF", &calendars, &exceptions, &mut index);
        assert!(index.active_services("2025-01-11").contains("SNCF:S1"));
        assert!(!index.active_services("2025-01-06").contains("SNCF:S1"));
    }
}
