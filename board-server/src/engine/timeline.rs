//! Live timeline and position interpolation for the single-train view.
//!
//! Builds an absolute, monotonically non-decreasing minute sequence from
//! a stop list (handling midnight wraparound and dwell times), then
//! answers two questions for a given instant: where is the train along
//! its route (a fraction of the drawn line, with a "motionless at a
//! stop" flag), and what is each stop's discrete state (past, current,
//! future).

use crate::domain::Stop;

/// One stop lifted onto the absolute minute axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelinePoint {
    /// Index into the effective stop sequence.
    pub station_index: usize,
    /// Absolute arrival minute (>= previous departure).
    pub arrival: i64,
    /// Absolute departure minute (>= arrival).
    pub departure: i64,
}

impl TimelinePoint {
    /// Positive dwell means the train demonstrably waits here.
    pub fn has_dwell(&self) -> bool {
        self.departure > self.arrival
    }
}

/// Continuous position along the route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Fraction of the drawn line, 0.0 at the origin, 1.0 at the
    /// terminus.
    pub fraction: f64,
    /// True while the train is motionless at a stop.
    pub dwelling: bool,
}

/// Discrete per-stop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopState {
    Past,
    Current,
    Future,
}

/// How "now" is obtained for the timeline view.
///
/// `Live` is only honest when the viewed date is the current date; for
/// any other date the view is `Static` — no live marker, rather than
/// fabricated motion. `Simulation` loops wall time modulo the trip
/// duration for demos and previews; its output is flagged
/// non-authoritative wherever it is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimelineClock {
    #[default]
    Live,
    Static,
    Simulation,
}

/// The interpolation model for one effective schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineModel {
    points: Vec<TimelinePoint>,
}

impl TimelineModel {
    /// Build the model from an ordered stop sequence.
    ///
    /// Walks the stops keeping a running minute. A time earlier than the
    /// running minute is lifted by whole days until it no longer is
    /// (midnight wraparound); departures are clamped to their arrival.
    /// Stops with no time at all inherit the running minute. The result
    /// is monotonically non-decreasing by construction.
    ///
    /// `None` when fewer than two stops carry any time — there is no
    /// line to draw.
    pub fn build(stops: &[Stop]) -> Option<Self> {
        let timed = stops
            .iter()
            .filter(|s| s.arrival_or_departure().is_some())
            .count();
        if stops.len() < 2 || timed < 2 {
            return None;
        }

        let mut points = Vec::with_capacity(stops.len());
        let mut running: i64 = 0;

        for (index, stop) in stops.iter().enumerate() {
            let arrival_raw = stop
                .arrival_or_departure()
                .map(|t| t.minute_of_day() as i64)
                .unwrap_or(running);
            let arrival = lift(arrival_raw, running);

            let departure_raw = stop
                .planned_departure
                .map(|t| t.minute_of_day() as i64)
                .unwrap_or(arrival);
            let departure = lift(departure_raw, arrival).max(arrival);

            points.push(TimelinePoint {
                station_index: index,
                arrival,
                departure,
            });
            running = departure;
        }

        Some(Self { points })
    }

    /// The lifted break-points, in stop order.
    pub fn points(&self) -> &[TimelinePoint] {
        &self.points
    }

    /// Absolute minute at which the trip begins.
    pub fn trip_start(&self) -> i64 {
        self.points.first().map(|p| p.arrival).unwrap_or(0)
    }

    /// Absolute minute at which the trip ends.
    pub fn trip_end(&self) -> i64 {
        self.points.last().map(|p| p.departure).unwrap_or(0)
    }

    /// Total trip duration in minutes.
    pub fn duration(&self) -> i64 {
        self.trip_end() - self.trip_start()
    }

    /// Continuous position at the given absolute minute.
    pub fn progress(&self, now: i64) -> Progress {
        let n = self.points.len();
        if now <= self.trip_start() {
            return Progress {
                fraction: 0.0,
                dwelling: false,
            };
        }
        if now >= self.trip_end() {
            return Progress {
                fraction: 1.0,
                dwelling: false,
            };
        }

        let span = (n - 1) as f64;
        for i in 0..n - 1 {
            let here = &self.points[i];

            if here.has_dwell() && now >= here.arrival && now < here.departure {
                return Progress {
                    fraction: i as f64 / span,
                    dwelling: true,
                };
            }

            let next = &self.points[i + 1];
            if now >= here.departure && now < next.arrival {
                let segment = (next.arrival - here.departure) as f64;
                let along = (now - here.departure) as f64 / segment;
                return Progress {
                    fraction: i as f64 / span + along / span,
                    dwelling: false,
                };
            }
        }

        // Inside the terminus dwell window, if the data carries one.
        Progress {
            fraction: 1.0,
            dwelling: self.points[n - 1].has_dwell(),
        }
    }

    /// Discrete state of every stop at the given absolute minute.
    ///
    /// A stop is current from first reach to last leave; a zero-dwell
    /// stop flips from future to past without a current window.
    pub fn stop_states(&self, now: i64) -> Vec<StopState> {
        self.points
            .iter()
            .map(|p| {
                if now >= p.departure {
                    StopState::Past
                } else if now >= p.arrival {
                    StopState::Current
                } else {
                    StopState::Future
                }
            })
            .collect()
    }

    /// Resolve "now" for a clock mode.
    ///
    /// `wall_minute` is the wall-clock minute of day; `is_today` whether
    /// the viewed date is the current date. `None` means no live marker.
    pub fn resolve_now(
        &self,
        clock: TimelineClock,
        is_today: bool,
        wall_minute: i64,
    ) -> Option<i64> {
        match clock {
            TimelineClock::Static => None,
            TimelineClock::Live => {
                if !is_today {
                    return None;
                }
                let mut now = wall_minute;
                // A small post-midnight reading belongs to the tail of an
                // overnight trip.
                if now < self.trip_start() && now + 1440 <= self.trip_end() {
                    now += 1440;
                }
                Some(now)
            }
            TimelineClock::Simulation => Some(self.simulated_now(wall_minute)),
        }
    }

    /// Loop the wall clock over the trip for demo playback.
    pub fn simulated_now(&self, wall_minute: i64) -> i64 {
        let duration = self.duration().max(1);
        self.trip_start() + wall_minute.rem_euclid(duration + 1)
    }
}

/// Lift a minute-of-day onto the absolute axis: add whole days until it
/// is not before `floor`.
fn lift(mut minute: i64, floor: i64) -> i64 {
    while minute < floor {
        minute += 1440;
    }
    minute
}
