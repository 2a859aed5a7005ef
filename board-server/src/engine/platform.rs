//! Platform resolution precedence chain.
//!
//! The display platform for a (schedule, station) pair comes from the
//! first source in the chain that has anything to say: the per-station
//! admin override table, then the station-scoped assignment table, then
//! the schedule's own platform field. When none does, no platform cell
//! is rendered at all — the chain never invents a value. The arrivals
//! board alone has a parity heuristic as a very last resort; it is kept
//! out of the chain so no other surface picks it up.

use crate::domain::{
    PlatformAssignment, PlatformDisplay, PlatformOverride, Schedule, TrainNumber, stations_match,
};

/// Resolve the platform to display for `schedule` at `station`.
///
/// Precedence, first present source wins:
///
/// 1. an admin override for the schedule — an explicitly empty one means
///    "withheld" (rendered "—"), which is a real answer, not a miss;
/// 2. a station-scoped admin assignment for (schedule, station);
/// 3. the schedule's own platform field;
/// 4. `None` — render no platform cell.
pub fn resolve_platform(
    schedule: &Schedule,
    station: &str,
    overrides: &[PlatformOverride],
    assignments: &[PlatformAssignment],
) -> Option<PlatformDisplay> {
    if let Some(o) = overrides.iter().find(|o| o.schedule_id == schedule.id) {
        return Some(match o.platform.as_deref() {
            Some(p) if !p.trim().is_empty() => PlatformDisplay::Track(p.trim().to_string()),
            _ => PlatformDisplay::Withheld,
        });
    }

    if let Some(a) = assignments.iter().find(|a| {
        a.schedule_id == schedule.id && stations_match(&a.station_name, station)
    }) {
        if !a.platform.trim().is_empty() {
            return Some(PlatformDisplay::Track(a.platform.trim().to_string()));
        }
    }

    if let Some(own) = schedule.platform.as_deref() {
        if !own.trim().is_empty() {
            return Some(PlatformDisplay::Track(own.trim().to_string()));
        }
    }

    None
}

/// Parity fallback for the arrivals board only: odd train numbers to
/// platform "1", even to "2". A display heuristic, not data; callers
/// other than the arrivals board must not use it.
pub fn arrivals_heuristic_platform(train_number: &TrainNumber) -> &'static str {
    match train_number.numeric() {
        Some(n) if n % 2 == 0 => "2",
        _ => "1",
    }
}
