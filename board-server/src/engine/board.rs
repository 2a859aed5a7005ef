//! Departure/arrival board assembly.
//!
//! For a station and a reference date: select the schedules that run and
//! serve the station, overlay the day's perturbations, resolve platforms,
//! then keep what is still to come today — falling back to the whole of
//! tomorrow when nothing remains.

use chrono::{Days, NaiveDate};

use crate::domain::{
    DailyPerturbation, EffectiveSchedule, PlatformAssignment, PlatformDisplay, PlatformOverride,
    Schedule, TimeOfDay, TrainNumber, stations_match,
};

use super::calendar::runs_on_date;
use super::overlay;
use super::platform::{arrivals_heuristic_platform, resolve_platform};

/// Which face of the board is being assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardKind {
    Departures,
    Arrivals,
}

/// Everything a board draws from, already fetched.
#[derive(Debug, Clone, Copy)]
pub struct BoardSources<'a> {
    pub schedules: &'a [Schedule],
    pub perturbations: &'a [DailyPerturbation],
    pub platform_overrides: &'a [PlatformOverride],
    pub platform_assignments: &'a [PlatformAssignment],
}

/// One board request.
#[derive(Debug, Clone)]
pub struct BoardRequest<'a> {
    pub station: &'a str,
    pub date: NaiveDate,
    pub kind: BoardKind,
    /// The actual current date; the "remaining" filter only applies when
    /// the requested date is today.
    pub today: NaiveDate,
    /// Wall-clock time used by the "remaining" filter.
    pub now: TimeOfDay,
    pub page_size: usize,
}

/// One row of the board.
#[derive(Debug, Clone)]
pub struct BoardEntry {
    pub train_number: TrainNumber,
    pub train_type: Option<String>,
    pub rolling_stock: Option<String>,
    /// Effective origin/destination (rerouting may have changed them).
    pub origin: String,
    pub destination: String,
    /// Station-local sort time.
    pub local_time: Option<TimeOfDay>,
    pub effective: EffectiveSchedule,
    pub platform: Option<PlatformDisplay>,
}

/// An assembled board.
#[derive(Debug, Clone)]
pub struct Board {
    pub station: String,
    pub date: NaiveDate,
    pub kind: BoardKind,
    /// True when nothing remained today and tomorrow is shown instead.
    pub fallback_next_day: bool,
    pub entries: Vec<BoardEntry>,
}

/// Assemble the board for one request.
///
/// Today's board keeps only entries at or after `now`; when that leaves
/// nothing, the whole of the next day is shown and flagged. Entries are
/// sorted by station-local time, unknown times last, then truncated to
/// the page size.
pub fn assemble_board(request: &BoardRequest<'_>, sources: &BoardSources<'_>) -> Board {
    let mut date = request.date;
    let mut fallback_next_day = false;

    let mut entries = collect_day(request, sources, date, true);
    if entries.is_empty() {
        if let Some(next) = date.checked_add_days(Days::new(1)) {
            date = next;
            fallback_next_day = true;
            entries = collect_day(request, sources, date, false);
        }
    }

    entries.sort_by_key(|e| (e.local_time.is_none(), e.local_time));
    entries.truncate(request.page_size.max(1));

    Board {
        station: request.station.to_string(),
        date,
        kind: request.kind,
        fallback_next_day,
        entries,
    }
}

fn collect_day(
    request: &BoardRequest<'_>,
    sources: &BoardSources<'_>,
    date: NaiveDate,
    apply_remaining: bool,
) -> Vec<BoardEntry> {
    let remaining_from = (apply_remaining && date == request.today).then_some(request.now);

    let mut entries = Vec::new();
    for schedule in sources.schedules {
        // Substitution sillons are displayed through their base schedule;
        // a top-level listing would duplicate the row.
        if schedule.is_substitution {
            continue;
        }
        if !runs_on_date(schedule, date) || !schedule.serves_station(request.station) {
            continue;
        }

        let local_time = station_local_time(schedule, request.station, request.kind);
        if let Some(from) = remaining_from {
            match local_time {
                Some(t) if t >= from => {}
                _ => continue,
            }
        }

        entries.push(build_entry(request, sources, schedule, date, local_time));
    }
    entries
}

/// The time to sort and filter this schedule by at the board's station.
///
/// Arrival-biased for an arrivals board, departure-biased for a
/// departures board, each falling back to the other, then to the
/// whole-schedule times.
fn station_local_time(
    schedule: &Schedule,
    station: &str,
    kind: BoardKind,
) -> Option<TimeOfDay> {
    let stop = schedule
        .full_stop_sequence()
        .into_iter()
        .find(|s| stations_match(&s.station_name, station));

    let (stop_first, stop_second) = match &stop {
        Some(s) => match kind {
            BoardKind::Arrivals => (s.planned_arrival, s.planned_departure),
            BoardKind::Departures => (s.planned_departure, s.planned_arrival),
        },
        None => (None, None),
    };

    let (sched_first, sched_second) = match kind {
        BoardKind::Arrivals => (schedule.arrival_time, schedule.departure_time),
        BoardKind::Departures => (schedule.departure_time, schedule.arrival_time),
    };

    stop_first
        .or(stop_second)
        .or(sched_first)
        .or(sched_second)
}

fn build_entry(
    request: &BoardRequest<'_>,
    sources: &BoardSources<'_>,
    schedule: &Schedule,
    date: NaiveDate,
    local_time: Option<TimeOfDay>,
) -> BoardEntry {
    let effective = overlay::resolve(schedule, date, sources.perturbations);

    let mut platform = resolve_platform(
        schedule,
        request.station,
        sources.platform_overrides,
        sources.platform_assignments,
    );
    // The parity heuristic exists for the arrivals board only.
    if platform.is_none() && request.kind == BoardKind::Arrivals {
        platform = Some(PlatformDisplay::Track(
            arrivals_heuristic_platform(&schedule.train_number).to_string(),
        ));
    }

    let origin = effective
        .effective_stops
        .first()
        .map(|s| s.station_name.clone())
        .unwrap_or_else(|| schedule.departure_station.clone());
    let destination = effective
        .effective_stops
        .last()
        .map(|s| s.station_name.clone())
        .unwrap_or_else(|| schedule.arrival_station.clone());

    BoardEntry {
        train_number: schedule.train_number.clone(),
        train_type: schedule.train_type.clone(),
        rolling_stock: schedule.rolling_stock.clone(),
        origin,
        destination,
        local_time,
        effective,
        platform,
    }
}
