//! Daily perturbations and the effective real-time state derived from
//! them.
//!
//! A `DailyPerturbation` is an operator-entered disruption for one
//! schedule on one date. The overlay engine classifies its free-text kind
//! into a canonical [`ServiceStatus`] and produces an
//! [`EffectiveSchedule`], which is recomputed on every board refresh and
//! never persisted.

use chrono::NaiveDate;

use super::{PlatformDisplay, Schedule, ScheduleId, Stop, TimeOfDay, TrainNumber};

/// Canonical real-time status of a service on a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ServiceStatus {
    #[default]
    OnTime,
    Delayed,
    Cancelled,
    Substituted,
    Incident,
    Modified,
    Advanced,
}

impl ServiceStatus {
    /// Stable wire key.
    pub fn key(&self) -> &'static str {
        match self {
            ServiceStatus::OnTime => "on_time",
            ServiceStatus::Delayed => "delayed",
            ServiceStatus::Cancelled => "cancelled",
            ServiceStatus::Substituted => "substituted",
            ServiceStatus::Incident => "incident",
            ServiceStatus::Modified => "modified",
            ServiceStatus::Advanced => "advanced",
        }
    }

    /// French board label.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceStatus::OnTime => "À l'heure",
            ServiceStatus::Delayed => "Retardé",
            ServiceStatus::Cancelled => "Supprimé",
            ServiceStatus::Substituted => "Substitué",
            ServiceStatus::Incident => "Incident",
            ServiceStatus::Modified => "Modifié",
            ServiceStatus::Advanced => "Avancé",
        }
    }
}

/// A station+time rewrite carried by a perturbation (rerouting of one
/// end of the trip).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointChange {
    pub station_name: String,
    pub time: Option<TimeOfDay>,
}

/// An operator-entered disruption for one schedule on one date.
///
/// At most one is expected per (schedule, date); the matcher tolerates
/// zero or many and picks the first in feed order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyPerturbation {
    pub schedule_id: Option<ScheduleId>,
    /// Secondary match key when the id is absent.
    pub train_number: Option<TrainNumber>,
    pub date: Option<NaiveDate>,
    /// Free text, classified by keyword into a [`ServiceStatus`].
    pub kind: String,
    pub delay_minutes: i64,
    pub cause: Option<String>,
    pub cancelled: bool,
    /// Rewrites the origin when present.
    pub modified_departure: Option<EndpointChange>,
    /// Rewrites the terminus when present.
    pub modified_arrival: Option<EndpointChange>,
    /// Station names dropped from the stop sequence.
    pub removed_stops: Vec<String>,
    /// Tertiary match keys: station + time of the affected departure.
    pub station: Option<String>,
    pub time: Option<String>,
}

/// The real-time state of one schedule on one date.
///
/// Derived, never persisted; identity is (schedule id, date) only.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveSchedule {
    pub schedule_id: ScheduleId,
    pub date: NaiveDate,
    pub status: ServiceStatus,
    pub delay_minutes: i64,
    pub cancelled: bool,
    /// True when a perturbation rewrote an endpoint of the trip.
    pub rerouted: bool,
    pub cause: Option<String>,
    /// Full stop sequence after removals and endpoint rewrites.
    pub effective_stops: Vec<Stop>,
    /// Filled by surfaces that know which station they display.
    pub platform: Option<PlatformDisplay>,
}

impl EffectiveSchedule {
    /// Fold this effective state back into a copy of `base`, as if it
    /// were the schedule's native data.
    ///
    /// Resolving the result against the same perturbation feed yields
    /// the same effective state again — the overlay reads only schedule
    /// and perturbations, so nothing is double-applied.
    pub fn apply_to(&self, base: &Schedule) -> Schedule {
        let mut schedule = base.clone();

        schedule.status = Some(self.status.label().to_string());
        schedule.cancelled = self.cancelled;
        schedule.delay_minutes = self.delay_minutes;

        if let (Some(first), Some(last)) =
            (self.effective_stops.first(), self.effective_stops.last())
        {
            schedule.departure_station = first.station_name.clone();
            schedule.departure_time = first.departure_or_arrival();
            schedule.arrival_station = last.station_name.clone();
            schedule.arrival_time = last.arrival_or_departure();
            let inner = self.effective_stops.len().saturating_sub(1);
            schedule.stops = self.effective_stops[1..inner.max(1)].to_vec();
        }

        schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_keys_are_stable() {
        assert_eq!(ServiceStatus::OnTime.key(), "on_time");
        assert_eq!(ServiceStatus::Delayed.key(), "delayed");
        assert_eq!(ServiceStatus::Cancelled.key(), "cancelled");
        assert_eq!(ServiceStatus::Substituted.key(), "substituted");
        assert_eq!(ServiceStatus::Incident.key(), "incident");
        assert_eq!(ServiceStatus::Modified.key(), "modified");
        assert_eq!(ServiceStatus::Advanced.key(), "advanced");
    }

    #[test]
    fn status_labels_are_french() {
        assert_eq!(ServiceStatus::Cancelled.label(), "Supprimé");
        assert_eq!(ServiceStatus::Delayed.label(), "Retardé");
    }

    #[test]
    fn default_status_is_on_time() {
        assert_eq!(ServiceStatus::default(), ServiceStatus::OnTime);
    }

    #[test]
    fn default_perturbation_is_inert() {
        let p = DailyPerturbation::default();
        assert!(p.schedule_id.is_none());
        assert!(!p.cancelled);
        assert_eq!(p.delay_minutes, 0);
        assert!(p.removed_stops.is_empty());
    }
}
