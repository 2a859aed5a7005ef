//! Domain types for the board engine.
//!
//! Validated reference data (schedules, calendars, stops) and the derived
//! real-time types layered on top of it. Types enforce their invariants
//! at construction, so downstream code can trust any value it receives.

mod calendar;
mod perturbation;
mod platform;
mod schedule;
mod station;
mod time;

pub use calendar::{Calendar, WeekdaySet, parse_weekday_spec};
pub use perturbation::{DailyPerturbation, EffectiveSchedule, EndpointChange, ServiceStatus};
pub use platform::{PlatformAssignment, PlatformDisplay, PlatformOverride};
pub use schedule::{Schedule, ScheduleId, Stop, TrainNumber};
pub use station::{normalize_station, stations_match};
pub use time::{MINUTES_PER_DAY, TimeOfDay};
