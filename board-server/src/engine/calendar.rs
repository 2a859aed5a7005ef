//! Running-day resolution.
//!
//! Decides, for one schedule and one calendar date, whether the schedule
//! operates. The rules are evaluated in strict precedence order; the
//! first decisive rule wins.

use chrono::NaiveDate;

use crate::domain::Schedule;

/// Does `schedule` run on `date`?
///
/// Precedence:
///
/// 1. a schedule with substitutions is hidden: it "runs" exactly when one
///    of its substitution sillons runs (they replace, never supplement);
/// 2. an explicit service date or custom date equal to `date` wins
///    outright, bypassing weekday checks;
/// 3. a date outside the validity window never runs;
/// 4. otherwise the day-of-week specification decides (mask and legacy
///    list OR-merged), with `exceptions` forcing a non-running day even
///    when the weekday matches;
/// 5. with no day specification at all, service is assumed daily
///    (permissive default — malformed calendars must not blank a board).
pub fn runs_on_date(schedule: &Schedule, date: NaiveDate) -> bool {
    if !schedule.substitutions.is_empty() {
        return schedule
            .substitutions
            .iter()
            .any(|sub| runs_on_date(sub, date));
    }

    let calendar = &schedule.calendar;

    if calendar.matches_exact_date(date) {
        return true;
    }

    if !calendar.within_validity(date) {
        return false;
    }

    if calendar.exceptions.contains(&date) {
        return false;
    }

    match calendar.weekday_matches(date) {
        Some(matches) => matches,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Calendar, Schedule, ScheduleId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// 2025-03-10 is a Monday.
    fn monday() -> NaiveDate {
        date(2025, 3, 10)
    }

    fn schedule_with(calendar: Calendar) -> Schedule {
        let mut s = Schedule::between(ScheduleId(1), "A", "B");
        s.calendar = calendar;
        s
    }

    #[test]
    fn monday_only_mask_runs_mondays() {
        let s = schedule_with(Calendar {
            day_mask: Some("1".into()),
            ..Calendar::default()
        });

        assert!(runs_on_date(&s, monday()));
        // Every other weekday of that week.
        for offset in 1..7 {
            let d = monday() + chrono::Days::new(offset);
            assert!(!runs_on_date(&s, d), "should not run on {d}");
        }
        // And the following Monday again.
        assert!(runs_on_date(&s, monday() + chrono::Days::new(7)));
    }

    #[test]
    fn day_number_list_mon_wed_fri() {
        let s = schedule_with(Calendar {
            day_list: Some("1;3;5".into()),
            ..Calendar::default()
        });

        let tuesday = date(2025, 3, 11);
        let wednesday = date(2025, 3, 12);
        assert!(runs_on_date(&s, wednesday));
        assert!(!runs_on_date(&s, tuesday));
    }

    #[test]
    fn exception_beats_weekday_match() {
        let s = schedule_with(Calendar {
            day_mask: Some("1".into()),
            exceptions: vec![monday()],
            ..Calendar::default()
        });

        assert!(!runs_on_date(&s, monday()));
        assert!(runs_on_date(&s, monday() + chrono::Days::new(7)));
    }

    #[test]
    fn custom_date_bypasses_weekday_checks() {
        let sunday = date(2025, 3, 9);
        let s = schedule_with(Calendar {
            day_mask: Some("1".into()),
            custom_dates: vec![sunday],
            ..Calendar::default()
        });

        assert!(runs_on_date(&s, sunday));
        assert!(!runs_on_date(&s, date(2025, 3, 16)));
    }

    #[test]
    fn extra_date_wins_outright() {
        let s = schedule_with(Calendar {
            day_mask: Some("0000000".into()),
            extra_date: Some(monday()),
            ..Calendar::default()
        });

        assert!(runs_on_date(&s, monday()));
        assert!(!runs_on_date(&s, monday() + chrono::Days::new(1)));
    }

    #[test]
    fn validity_window_bounds() {
        let s = schedule_with(Calendar {
            valid_from: Some(date(2025, 3, 1)),
            valid_to: Some(date(2025, 3, 31)),
            ..Calendar::default()
        });

        assert!(runs_on_date(&s, date(2025, 3, 15)));
        assert!(!runs_on_date(&s, date(2025, 2, 28)));
        assert!(!runs_on_date(&s, date(2025, 4, 1)));
    }

    #[test]
    fn no_day_spec_defaults_to_daily() {
        let s = schedule_with(Calendar::daily());
        assert!(runs_on_date(&s, monday()));
        assert!(runs_on_date(&s, date(2025, 3, 16)));
    }

    #[test]
    fn malformed_spec_defaults_to_daily() {
        let s = schedule_with(Calendar {
            day_mask: Some("???".into()),
            ..Calendar::default()
        });
        assert!(runs_on_date(&s, monday()));
    }

    #[test]
    fn present_but_empty_spec_never_runs() {
        let s = schedule_with(Calendar {
            day_mask: Some("0000000".into()),
            ..Calendar::default()
        });
        assert!(!runs_on_date(&s, monday()));
    }

    #[test]
    fn mask_and_list_or_merge() {
        // Mask says Monday, legacy list says Wednesday; either runs.
        let s = schedule_with(Calendar {
            day_mask: Some("1".into()),
            day_list: Some("3".into()),
            ..Calendar::default()
        });

        assert!(runs_on_date(&s, monday()));
        assert!(runs_on_date(&s, date(2025, 3, 12)));
        assert!(!runs_on_date(&s, date(2025, 3, 14)));
    }

    #[test]
    fn substitutions_replace_base_calendar() {
        // Base would run daily; its substitution runs only on one date.
        let target = monday();

        let mut substitution = Schedule::between(ScheduleId(2), "A", "B");
        substitution.is_substitution = true;
        substitution.calendar = Calendar {
            extra_date: Some(target),
            day_mask: Some("0000000".into()),
            ..Calendar::default()
        };

        let mut base = schedule_with(Calendar::daily());
        base.substitutions = vec![substitution];

        assert!(runs_on_date(&base, target));
        assert!(!runs_on_date(&base, target + chrono::Days::new(1)));
    }

    #[test]
    fn any_of_several_substitutions_suffices() {
        let d1 = monday();
        let d2 = date(2025, 3, 13);

        let mut sub1 = Schedule::between(ScheduleId(2), "A", "B");
        sub1.calendar = Calendar {
            extra_date: Some(d1),
            day_mask: Some("0000000".into()),
            ..Calendar::default()
        };
        let mut sub2 = Schedule::between(ScheduleId(3), "A", "B");
        sub2.calendar = Calendar {
            extra_date: Some(d2),
            day_mask: Some("0000000".into()),
            ..Calendar::default()
        };

        let mut base = schedule_with(Calendar::daily());
        base.substitutions = vec![sub1, sub2];

        assert!(runs_on_date(&base, d1));
        assert!(runs_on_date(&base, d2));
        assert!(!runs_on_date(&base, date(2025, 3, 11)));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::{Calendar, Schedule, ScheduleId};
    use chrono::Datelike;
    use proptest::prelude::*;

    fn schedule_with(calendar: Calendar) -> Schedule {
        let mut s = Schedule::between(ScheduleId(1), "A", "B");
        s.calendar = calendar;
        s
    }

    proptest! {
        /// A single-day binary mask runs on exactly that weekday.
        #[test]
        fn single_day_mask_is_deterministic(
            day in 1u8..=7,
            offset in 0u64..366,
        ) {
            let mask: String = (1..=7u8)
                .map(|d| if d == day { '1' } else { '0' })
                .collect();
            let s = schedule_with(Calendar {
                day_mask: Some(mask),
                ..Calendar::default()
            });

            let d = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap() // a Monday
                + chrono::Days::new(offset);
            let expected = d.weekday().number_from_monday() == day as u32;
            prop_assert_eq!(runs_on_date(&s, d), expected);
        }

        /// Adding the date to exceptions always forces a non-running day.
        #[test]
        fn exception_always_wins_over_mask(offset in 0u64..366) {
            let d = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
                + chrono::Days::new(offset);

            let s = schedule_with(Calendar {
                day_mask: Some("127".into()), // every day
                exceptions: vec![d],
                ..Calendar::default()
            });

            prop_assert!(!runs_on_date(&s, d));
        }
    }
}
