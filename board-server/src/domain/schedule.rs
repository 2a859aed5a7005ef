//! Schedule ("sillon") and stop types.
//!
//! A `Schedule` is the static definition of a train path: endpoints,
//! intermediate stops, running-day calendar, and possible substitution
//! sillons. It is reference data, created by the admin tooling and
//! read-only to this engine; everything real-time is layered on top as an
//! [`EffectiveSchedule`](super::EffectiveSchedule).

use std::fmt;

use super::{Calendar, TimeOfDay};

/// Identifier of a schedule, as assigned by the admin store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScheduleId(pub i64);

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ScheduleId {
    fn from(value: i64) -> Self {
        ScheduleId(value)
    }
}

/// Commercial train number (e.g. "886410").
///
/// Kept as a string because operators occasionally suffix letters; the
/// numeric part is exposed for the odd/even platform heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TrainNumber(String);

impl TrainNumber {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The numeric part of the train number, ignoring non-digits.
    pub fn numeric(&self) -> Option<u64> {
        let digits: String = self.0.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return None;
        }
        digits.parse().ok()
    }
}

impl fmt::Display for TrainNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrainNumber {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A stop on a schedule's route.
///
/// In canonical form the first stop of a full sequence has no arrival and
/// the last has no departure. Either time may be missing on degraded
/// data; callers render a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stop {
    pub station_name: String,
    pub planned_arrival: Option<TimeOfDay>,
    pub planned_departure: Option<TimeOfDay>,
}

impl Stop {
    pub fn new(station_name: impl Into<String>) -> Self {
        Self {
            station_name: station_name.into(),
            planned_arrival: None,
            planned_departure: None,
        }
    }

    /// Best available time at this stop, arrival first.
    pub fn arrival_or_departure(&self) -> Option<TimeOfDay> {
        self.planned_arrival.or(self.planned_departure)
    }

    /// Best available time at this stop, departure first.
    pub fn departure_or_arrival(&self) -> Option<TimeOfDay> {
        self.planned_departure.or(self.planned_arrival)
    }
}

/// A scheduled train path.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub id: ScheduleId,
    pub train_number: TrainNumber,
    /// Service type for display ("TER", "Car", ...).
    pub train_type: Option<String>,
    /// Rolling stock for display ("X 73500", ...).
    pub rolling_stock: Option<String>,
    pub departure_station: String,
    pub arrival_station: String,
    pub departure_time: Option<TimeOfDay>,
    pub arrival_time: Option<TimeOfDay>,
    /// Intermediate stops only; endpoints live in the fields above.
    pub stops: Vec<Stop>,
    pub calendar: Calendar,
    /// Alternate sillons that replace this one on the dates they run.
    pub substitutions: Vec<Schedule>,
    /// Is this schedule itself a substitution sillon?
    pub is_substitution: bool,
    /// Native status free text, overridden by any matching perturbation.
    pub status: Option<String>,
    pub cancelled: bool,
    pub delay_minutes: i64,
    /// Own platform, lowest-precedence source for the platform chain.
    pub platform: Option<String>,
}

impl Schedule {
    /// A minimal schedule between two stations; the rest defaults.
    pub fn between(
        id: ScheduleId,
        departure_station: impl Into<String>,
        arrival_station: impl Into<String>,
    ) -> Self {
        Self {
            id,
            train_number: TrainNumber::default(),
            train_type: None,
            rolling_stock: None,
            departure_station: departure_station.into(),
            arrival_station: arrival_station.into(),
            departure_time: None,
            arrival_time: None,
            stops: Vec::new(),
            calendar: Calendar::daily(),
            substitutions: Vec::new(),
            is_substitution: false,
            status: None,
            cancelled: false,
            delay_minutes: 0,
            platform: None,
        }
    }

    /// The full stop sequence: origin, intermediates, terminus.
    pub fn full_stop_sequence(&self) -> Vec<Stop> {
        let mut seq = Vec::with_capacity(self.stops.len() + 2);
        seq.push(Stop {
            station_name: self.departure_station.clone(),
            planned_arrival: None,
            planned_departure: self.departure_time,
        });
        seq.extend(self.stops.iter().cloned());
        seq.push(Stop {
            station_name: self.arrival_station.clone(),
            planned_arrival: self.arrival_time,
            planned_departure: None,
        });
        seq
    }

    /// Does this schedule serve the given station (endpoints included)?
    pub fn serves_station(&self, station: &str) -> bool {
        use super::stations_match;

        stations_match(&self.departure_station, station)
            || stations_match(&self.arrival_station, station)
            || self
                .stops
                .iter()
                .any(|s| stations_match(&s.station_name, station))
    }
}
