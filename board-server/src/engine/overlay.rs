//! Perturbation matching and the real-time status overlay.
//!
//! Turns a (schedule, date) pair plus the day's perturbation feed into an
//! [`EffectiveSchedule`]. The overlay is pure and idempotent: it reads
//! only the schedule and the feed, never prior derived state, so
//! recomputing it on every refresh tick is safe and folding its output
//! back into a schedule changes nothing on re-resolution.

use chrono::NaiveDate;

use crate::domain::{
    DailyPerturbation, EffectiveSchedule, Schedule, ServiceStatus, normalize_station,
    stations_match,
};

/// Result of classifying one perturbation (or a schedule's native
/// status fields).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMapping {
    pub status: ServiceStatus,
    pub delay_minutes: i64,
    pub cancelled: bool,
}

/// Find the perturbation affecting `schedule` on `date`, if any.
///
/// The primary key is (schedule id, date) at day granularity. Records
/// without a schedule id fall back to train-number equality, then to a
/// normalized station + time match. When several records match, the
/// first in feed order wins — deterministic, but not "most recent"; a
/// known limitation of the feed.
pub fn find_perturbation<'a>(
    schedule: &Schedule,
    date: NaiveDate,
    perturbations: &'a [DailyPerturbation],
) -> Option<&'a DailyPerturbation> {
    let mut candidates = perturbations
        .iter()
        .filter(|p| matches_schedule(schedule, date, p));

    let first = candidates.next();
    if first.is_some() && candidates.next().is_some() {
        tracing::debug!(
            schedule_id = %schedule.id,
            %date,
            "multiple perturbations match, keeping the first in feed order"
        );
    }
    first
}

fn matches_schedule(schedule: &Schedule, date: NaiveDate, p: &DailyPerturbation) -> bool {
    // Day granularity; a record dated for another day never applies.
    if let Some(d) = p.date {
        if d != date {
            return false;
        }
    }

    if let Some(id) = p.schedule_id {
        return id == schedule.id;
    }

    if let Some(train_number) = &p.train_number {
        if !train_number.is_empty() && !schedule.train_number.is_empty() {
            return train_number == &schedule.train_number;
        }
    }

    // Last resort: the record names a station and a departure time.
    if let Some(station) = &p.station {
        if stations_match(station, &schedule.departure_station) {
            if let (Some(p_time), Some(s_time)) = (&p.time, schedule.departure_time) {
                return times_match_loose(p_time, &s_time.as_hhmm());
            }
        }
    }

    false
}

/// Loose time equality: strip non-digits, compare the leading HHMM.
fn times_match_loose(a: &str, b: &str) -> bool {
    fn digits(s: &str) -> String {
        s.chars().filter(char::is_ascii_digit).take(4).collect()
    }

    let da = digits(a);
    !da.is_empty() && da == digits(b)
}

/// Classify a perturbation into a canonical status.
pub fn map_status(p: &DailyPerturbation) -> StatusMapping {
    classify(&p.kind, p.cancelled, p.delay_minutes)
}

/// Keyword classification of free status text.
///
/// Case- and accent-insensitive substring match, first category wins.
/// No keyword and no explicit cancelled flag means on time; any delay
/// magnitude is carried through untouched.
fn classify(text: &str, explicit_cancelled: bool, delay_minutes: i64) -> StatusMapping {
    let folded = normalize_station(text);
    let has = |needles: &[&str]| needles.iter().any(|n| folded.contains(n));

    let status = if explicit_cancelled || has(&["supprim", "annul", "cancel"]) {
        ServiceStatus::Cancelled
    } else if has(&["retard", "delay", "late"]) {
        ServiceStatus::Delayed
    } else if has(&["substitu", "remplac"]) {
        ServiceStatus::Substituted
    } else if has(&["incident", "panne"]) {
        ServiceStatus::Incident
    } else if has(&["modif"]) {
        ServiceStatus::Modified
    } else if has(&["avance"]) {
        ServiceStatus::Advanced
    } else {
        ServiceStatus::OnTime
    };

    StatusMapping {
        status,
        delay_minutes,
        cancelled: status == ServiceStatus::Cancelled,
    }
}

/// Compute the effective real-time state of `schedule` on `date`.
///
/// With a matching perturbation its cancellation, delay and cause
/// override the schedule's native fields and the stop sequence is
/// rewritten (removed stops dropped, rerouted endpoints spliced in).
/// Without one, the native fields pass through verbatim.
pub fn resolve(
    schedule: &Schedule,
    date: NaiveDate,
    perturbations: &[DailyPerturbation],
) -> EffectiveSchedule {
    let mut stops = schedule.full_stop_sequence();
    let perturbation = find_perturbation(schedule, date, perturbations);

    let (mapping, cause) = match perturbation {
        Some(p) => (map_status(p), p.cause.clone()),
        None => (
            classify(
                schedule.status.as_deref().unwrap_or(""),
                schedule.cancelled,
                schedule.delay_minutes,
            ),
            None,
        ),
    };

    let mut rerouted = false;
    if let Some(p) = perturbation {
        if !p.removed_stops.is_empty() {
            stops.retain(|stop| {
                !p.removed_stops
                    .iter()
                    .any(|removed| stations_match(removed, &stop.station_name))
            });
        }

        if let Some(change) = &p.modified_departure {
            if let Some(first) = stops.first_mut() {
                first.station_name = change.station_name.clone();
                if change.time.is_some() {
                    first.planned_departure = change.time;
                }
                rerouted = true;
            }
        }

        if let Some(change) = &p.modified_arrival {
            if let Some(last) = stops.last_mut() {
                last.station_name = change.station_name.clone();
                if change.time.is_some() {
                    last.planned_arrival = change.time;
                }
                rerouted = true;
            }
        }
    }

    EffectiveSchedule {
        schedule_id: schedule.id,
        date,
        status: mapping.status,
        delay_minutes: mapping.delay_minutes,
        cancelled: mapping.cancelled,
        rerouted,
        cause,
        effective_stops: stops,
        platform: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EndpointChange, ScheduleId, Stop, TimeOfDay, TrainNumber};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn t(s: &str) -> Option<TimeOfDay> {
        TimeOfDay::parse(s)
    }

    fn schedule_42() -> Schedule {
        let mut s = Schedule::between(ScheduleId(42), "StationA", "StationC");
        s.train_number = TrainNumber::from("886410");
        s.departure_time = t("08:00");
        s.arrival_time = t("08:40");
        s.stops = vec![Stop {
            station_name: "StationB".into(),
            planned_arrival: t("08:20"),
            planned_departure: t("08:25"),
        }];
        s
    }

    fn delay_perturbation() -> DailyPerturbation {
        DailyPerturbation {
            schedule_id: Some(ScheduleId(42)),
            date: Some(date(2025, 3, 10)),
            kind: "Retard".into(),
            delay_minutes: 12,
            ..DailyPerturbation::default()
        }
    }

    #[test]
    fn delayed_perturbation_overlays() {
        let s = schedule_42();
        let effective = resolve(&s, date(2025, 3, 10), &[delay_perturbation()]);

        assert_eq!(effective.status.key(), "delayed");
        assert_eq!(effective.delay_minutes, 12);
        assert!(!effective.cancelled);
        assert!(!effective.rerouted);
        assert_eq!(effective.effective_stops.len(), 3);
    }

    #[test]
    fn perturbation_on_other_date_is_ignored() {
        let s = schedule_42();
        let effective = resolve(&s, date(2025, 3, 11), &[delay_perturbation()]);

        assert_eq!(effective.status, ServiceStatus::OnTime);
        assert_eq!(effective.delay_minutes, 0);
    }

    #[test]
    fn no_perturbation_passes_native_fields_through() {
        let mut s = schedule_42();
        s.status = Some("Retard travaux".into());
        s.delay_minutes = 7;

        let effective = resolve(&s, date(2025, 3, 10), &[]);
        assert_eq!(effective.status, ServiceStatus::Delayed);
        assert_eq!(effective.delay_minutes, 7);
        assert!(!effective.cancelled);
    }

    #[test]
    fn native_cancelled_flag_passes_through() {
        let mut s = schedule_42();
        s.cancelled = true;

        let effective = resolve(&s, date(2025, 3, 10), &[]);
        assert_eq!(effective.status, ServiceStatus::Cancelled);
        assert!(effective.cancelled);
    }

    #[test]
    fn keyword_categories() {
        let cases = [
            ("Train supprimé", ServiceStatus::Cancelled),
            ("Annulation", ServiceStatus::Cancelled),
            ("Cancelled by operator", ServiceStatus::Cancelled),
            ("Retard 10 min", ServiceStatus::Delayed),
            ("Running late", ServiceStatus::Delayed),
            ("Substitution routière", ServiceStatus::Substituted),
            ("Train substitué", ServiceStatus::Substituted),
            ("Remplacé par car", ServiceStatus::Substituted),
            ("Incident voyageur", ServiceStatus::Incident),
            ("Panne matérielle", ServiceStatus::Incident),
            ("Horaires modifiés", ServiceStatus::Modified),
            ("Départ avancé", ServiceStatus::Advanced),
            ("", ServiceStatus::OnTime),
            ("RAS", ServiceStatus::OnTime),
        ];

        for (text, expected) in cases {
            let p = DailyPerturbation {
                schedule_id: Some(ScheduleId(42)),
                kind: text.into(),
                ..DailyPerturbation::default()
            };
            assert_eq!(map_status(&p).status, expected, "for {text:?}");
        }
    }

    #[test]
    fn cancelled_keyword_beats_delay_keyword() {
        let p = DailyPerturbation {
            kind: "Retard puis annulation".into(),
            delay_minutes: 30,
            ..DailyPerturbation::default()
        };
        let mapping = map_status(&p);
        assert_eq!(mapping.status, ServiceStatus::Cancelled);
        assert!(mapping.cancelled);
        assert_eq!(mapping.delay_minutes, 30);
    }

    #[test]
    fn explicit_cancel_flag_without_text() {
        let p = DailyPerturbation {
            cancelled: true,
            ..DailyPerturbation::default()
        };
        assert_eq!(map_status(&p).status, ServiceStatus::Cancelled);
    }

    #[test]
    fn first_match_wins_deterministically() {
        let s = schedule_42();
        let d = date(2025, 3, 10);

        let first = DailyPerturbation {
            schedule_id: Some(ScheduleId(42)),
            date: Some(d),
            kind: "Retard".into(),
            delay_minutes: 5,
            ..DailyPerturbation::default()
        };
        let second = DailyPerturbation {
            schedule_id: Some(ScheduleId(42)),
            date: Some(d),
            kind: "Supprimé".into(),
            ..DailyPerturbation::default()
        };

        let effective = resolve(&s, d, &[first, second]);
        assert_eq!(effective.status, ServiceStatus::Delayed);
        assert_eq!(effective.delay_minutes, 5);
    }

    #[test]
    fn train_number_fallback_match() {
        let s = schedule_42();
        let p = DailyPerturbation {
            train_number: Some(TrainNumber::from("886410")),
            date: Some(date(2025, 3, 10)),
            kind: "Retard".into(),
            delay_minutes: 3,
            ..DailyPerturbation::default()
        };

        assert!(find_perturbation(&s, date(2025, 3, 10), &[p]).is_some());
    }

    #[test]
    fn station_and_time_fallback_match() {
        let s = schedule_42();
        let p = DailyPerturbation {
            station: Some("STATIONA".into()),
            time: Some("08h00".into()),
            kind: "Retard".into(),
            ..DailyPerturbation::default()
        };

        assert!(find_perturbation(&s, date(2025, 3, 10), &[p.clone()]).is_some());

        let wrong_time = DailyPerturbation {
            time: Some("09h00".into()),
            ..p
        };
        assert!(find_perturbation(&s, date(2025, 3, 10), &[wrong_time]).is_none());
    }

    #[test]
    fn removed_stops_are_dropped() {
        let s = schedule_42();
        let p = DailyPerturbation {
            schedule_id: Some(ScheduleId(42)),
            date: Some(date(2025, 3, 10)),
            kind: "Modification".into(),
            removed_stops: vec!["StationB".into()],
            ..DailyPerturbation::default()
        };

        let effective = resolve(&s, date(2025, 3, 10), &[p]);
        assert_eq!(effective.effective_stops.len(), 2);
        assert!(
            effective
                .effective_stops
                .iter()
                .all(|stop| stop.station_name != "StationB")
        );
        // Removing a stop alone is not a rerouting.
        assert!(!effective.rerouted);
    }

    #[test]
    fn modified_arrival_reroutes_terminus() {
        let s = schedule_42();
        let p = DailyPerturbation {
            schedule_id: Some(ScheduleId(42)),
            date: Some(date(2025, 3, 10)),
            kind: "Modification".into(),
            modified_arrival: Some(EndpointChange {
                station_name: "StationD".into(),
                time: t("09:00"),
            }),
            ..DailyPerturbation::default()
        };

        let effective = resolve(&s, date(2025, 3, 10), &[p]);
        assert!(effective.rerouted);
        let last = effective.effective_stops.last().unwrap();
        assert_eq!(last.station_name, "StationD");
        assert_eq!(last.planned_arrival, t("09:00"));
    }

    #[test]
    fn modified_departure_reroutes_origin() {
        let s = schedule_42();
        let p = DailyPerturbation {
            schedule_id: Some(ScheduleId(42)),
            date: Some(date(2025, 3, 10)),
            kind: "Modification".into(),
            modified_departure: Some(EndpointChange {
                station_name: "StationZ".into(),
                time: t("08:10"),
            }),
            ..DailyPerturbation::default()
        };

        let effective = resolve(&s, date(2025, 3, 10), &[p]);
        assert!(effective.rerouted);
        let first = effective.effective_stops.first().unwrap();
        assert_eq!(first.station_name, "StationZ");
        assert_eq!(first.planned_departure, t("08:10"));
    }

    #[test]
    fn overlay_is_idempotent() {
        let s = schedule_42();
        let d = date(2025, 3, 10);
        let perturbations = vec![DailyPerturbation {
            schedule_id: Some(ScheduleId(42)),
            date: Some(d),
            kind: "Retard".into(),
            delay_minutes: 12,
            removed_stops: vec!["StationB".into()],
            modified_arrival: Some(EndpointChange {
                station_name: "StationD".into(),
                time: t("09:00"),
            }),
            ..DailyPerturbation::default()
        }];

        let once = resolve(&s, d, &perturbations);
        let folded = once.apply_to(&s);
        let twice = resolve(&folded, d, &perturbations);

        assert_eq!(once.status, twice.status);
        assert_eq!(once.delay_minutes, twice.delay_minutes);
        assert_eq!(once.cancelled, twice.cancelled);
        assert_eq!(once.effective_stops, twice.effective_stops);
    }

    #[test]
    fn loose_time_match() {
        assert!(times_match_loose("08:30", "08h30"));
        assert!(times_match_loose("0830", "08:30:00"));
        assert!(!times_match_loose("08:30", "08:31"));
        assert!(!times_match_loose("", "08:30"));
    }
}
