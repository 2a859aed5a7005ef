//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

/// Query parameters for a board request.
#[derive(Debug, Deserialize)]
pub struct BoardQuery {
    /// "departures" (default) or "arrivals".
    #[serde(rename = "type")]
    pub kind: Option<String>,

    /// Reference date, `YYYY-MM-DD`; defaults to today.
    pub date: Option<String>,

    /// Page size override.
    pub limit: Option<usize>,
}

/// Query parameters for the single-train timeline.
#[derive(Debug, Deserialize)]
pub struct TimelineQuery {
    /// Viewed date, `YYYY-MM-DD`; defaults to today.
    pub date: Option<String>,

    /// "live" (default), "static", or "simulation".
    pub mode: Option<String>,
}

/// Query parameters for the daily perturbation listing.
#[derive(Debug, Deserialize)]
pub struct PerturbationQuery {
    pub date: Option<String>,
}

/// Query parameters for the platform listing.
#[derive(Debug, Deserialize)]
pub struct PlatformQuery {
    #[serde(alias = "stationName")]
    pub station: Option<String>,
    pub limit: Option<usize>,
}

/// The station block of a board response.
#[derive(Debug, Serialize)]
pub struct StationResult {
    pub name: String,
}

/// One day of board rows.
#[derive(Debug, Serialize)]
pub struct BoardDay {
    pub date: String,
    /// True when nothing remained on the requested day and the next day
    /// is shown instead.
    pub fallback_next_day: bool,
    pub schedules: Vec<BoardEntryResult>,
}

/// Response for a board request.
#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub station: StationResult,
    pub days: Vec<BoardDay>,
}

/// One board row.
#[derive(Debug, Serialize)]
pub struct BoardEntryResult {
    pub schedule_id: i64,
    pub train_number: String,
    pub train_type: Option<String>,
    pub rolling_stock: Option<String>,
    pub origin: String,
    pub destination: String,

    /// Station-local time, wire form `HH:MM`.
    pub local_time: Option<String>,
    /// Station-local time, board form `HHhMM`.
    pub local_time_display: Option<String>,

    pub status_key: String,
    pub status_label: String,
    pub delay_minutes: i64,
    pub cancelled: bool,
    pub rerouted: bool,
    pub cause: Option<String>,

    /// Display platform; absent means no platform cell at all.
    pub platform: Option<String>,
}

/// One stop row of the timeline view.
#[derive(Debug, Serialize)]
pub struct TimelineStopResult {
    pub station_name: String,
    pub arrival: Option<String>,
    pub departure: Option<String>,
    /// "past" | "current" | "future"; absent when there is no live
    /// marker (static view).
    pub state: Option<String>,
}

/// The live position block of the timeline view.
#[derive(Debug, Serialize)]
pub struct PositionResult {
    pub fraction: f64,
    pub dwelling: bool,
    /// True when the position comes from the demo simulation clock and
    /// is not authoritative.
    pub simulated: bool,
}

/// Response for the single-train timeline.
#[derive(Debug, Serialize)]
pub struct TimelineResponse {
    pub schedule_id: i64,
    pub train_number: String,
    pub date: String,
    /// Whether the schedule runs on the viewed date at all.
    pub runs: bool,
    pub status_key: String,
    pub status_label: String,
    pub delay_minutes: i64,
    pub cancelled: bool,
    pub stops: Vec<TimelineStopResult>,
    pub position: Option<PositionResult>,
}

/// One perturbation record in the daily listing.
#[derive(Debug, Serialize)]
pub struct PerturbationResult {
    pub schedule_id: Option<i64>,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub status_key: String,
    pub delay_minutes: i64,
    pub cancelled: bool,
    pub cause: Option<String>,
}

/// Response for the daily perturbation listing.
#[derive(Debug, Serialize)]
pub struct PerturbationListResponse {
    pub items: Vec<PerturbationResult>,
}

/// One platform record.
#[derive(Debug, Serialize)]
pub struct PlatformItemResult {
    pub schedule_id: i64,
    /// `null` is a meaningful override: platform withheld, render "—".
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_name: Option<String>,
}

/// Response for the platform listing.
#[derive(Debug, Serialize)]
pub struct PlatformListResponse {
    pub items: Vec<PlatformItemResult>,
}

/// Error body for non-2xx responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
