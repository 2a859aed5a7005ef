//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::Local;

use crate::domain::{
    DailyPerturbation, EffectiveSchedule, ScheduleId, TimeOfDay, normalize_station,
    stations_match,
};
use crate::engine::{
    BoardEntry, BoardKind, BoardRequest, BoardSources, TimelineClock, TimelineModel, StopState,
    assemble_board, map_status, runs_on_date,
};
use crate::feed::parse_date_loose;

use super::dto::*;
use super::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/boards/:station", get(get_board))
        .route("/schedules/:id/timeline", get(get_timeline))
        .route("/perturbations/daily", get(get_daily_perturbations))
        .route("/platforms", get(get_platforms))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Departure or arrival board for one station.
async fn get_board(
    State(state): State<AppState>,
    Path(station): Path<String>,
    Query(query): Query<BoardQuery>,
) -> Result<Json<BoardResponse>, ApiError> {
    let kind = match query.kind.as_deref() {
        Some("arrivals") => BoardKind::Arrivals,
        _ => BoardKind::Departures,
    };

    let now_local = Local::now();
    let today = now_local.date_naive();
    let now = TimeOfDay::from_naive_time(now_local.time());

    let date = match &query.date {
        Some(s) => parse_date_loose(s).ok_or_else(|| bad_request("invalid date"))?,
        None => today,
    };
    let page_size = state.config.effective_page_size(query.limit);

    // Boards are cached untruncated at the maximum page size; the
    // requested limit is applied at render time.
    let key = (
        normalize_station(&station),
        date,
        kind,
        state.board_cache.bucket(now.minute_of_day()),
    );

    let board = match state.board_cache.get(&key).await {
        Some(board) => board,
        None => {
            let schedules = state.feeds.schedules.get().await;
            let perturbations = state.feeds.perturbations.get().await;
            let overrides = state.feeds.platform_overrides.get().await;
            let assignments = state.feeds.platform_assignments.get().await;

            let request = BoardRequest {
                station: &station,
                date,
                kind,
                today,
                now,
                page_size: state.config.max_page_size,
            };
            let sources = BoardSources {
                schedules: &schedules,
                perturbations: &perturbations,
                platform_overrides: &overrides,
                platform_assignments: &assignments,
            };

            let board = Arc::new(assemble_board(&request, &sources));
            state.board_cache.insert(key, Arc::clone(&board)).await;
            board
        }
    };

    Ok(Json(BoardResponse {
        station: StationResult {
            name: station.clone(),
        },
        days: vec![BoardDay {
            date: board.date.to_string(),
            fallback_next_day: board.fallback_next_day,
            schedules: board
                .entries
                .iter()
                .take(page_size)
                .map(entry_result)
                .collect(),
        }],
    }))
}

fn entry_result(entry: &BoardEntry) -> BoardEntryResult {
    let effective = &entry.effective;
    BoardEntryResult {
        schedule_id: effective.schedule_id.0,
        train_number: entry.train_number.as_str().to_string(),
        train_type: entry.train_type.clone(),
        rolling_stock: entry.rolling_stock.clone(),
        origin: entry.origin.clone(),
        destination: entry.destination.clone(),
        local_time: entry.local_time.map(|t| t.as_hhmm()),
        local_time_display: entry.local_time.map(|t| t.to_string()),
        status_key: effective.status.key().to_string(),
        status_label: effective.status.label().to_string(),
        delay_minutes: effective.delay_minutes,
        cancelled: effective.cancelled,
        rerouted: effective.rerouted,
        cause: effective.cause.clone(),
        platform: entry.platform.as_ref().map(|p| p.to_string()),
    }
}

/// Live timeline view for one schedule.
async fn get_timeline(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<TimelineResponse>, ApiError> {
    let schedules = state.feeds.schedules.get().await;
    let schedule = schedules
        .iter()
        .find(|s| s.id == ScheduleId(id))
        .ok_or_else(|| not_found("unknown schedule"))?;

    let now_local = Local::now();
    let today = now_local.date_naive();
    let wall_minute = TimeOfDay::from_naive_time(now_local.time()).minute_of_day() as i64;

    let date = match &query.date {
        Some(s) => parse_date_loose(s).ok_or_else(|| bad_request("invalid date"))?,
        None => today,
    };

    let clock = match query.mode.as_deref() {
        Some("static") => TimelineClock::Static,
        Some("simulation") => TimelineClock::Simulation,
        _ => TimelineClock::Live,
    };

    let perturbations = state.feeds.perturbations.get().await;
    let effective = crate::engine::resolve(schedule, date, &perturbations);

    let model = TimelineModel::build(&effective.effective_stops);
    let (states, position) = match &model {
        Some(model) => match model.resolve_now(clock, date == today, wall_minute) {
            Some(now) => {
                let progress = model.progress(now);
                (
                    Some(model.stop_states(now)),
                    Some(PositionResult {
                        fraction: progress.fraction,
                        dwelling: progress.dwelling,
                        simulated: clock == TimelineClock::Simulation,
                    }),
                )
            }
            None => (None, None),
        },
        None => (None, None),
    };

    Ok(Json(timeline_response(
        schedule.train_number.as_str(),
        &effective,
        runs_on_date(schedule, date),
        states,
        position,
    )))
}

fn timeline_response(
    train_number: &str,
    effective: &EffectiveSchedule,
    runs: bool,
    states: Option<Vec<StopState>>,
    position: Option<PositionResult>,
) -> TimelineResponse {
    let stops = effective
        .effective_stops
        .iter()
        .enumerate()
        .map(|(i, stop)| TimelineStopResult {
            station_name: stop.station_name.clone(),
            arrival: stop.planned_arrival.map(|t| t.as_hhmm()),
            departure: stop.planned_departure.map(|t| t.as_hhmm()),
            state: states.as_ref().map(|s| {
                match s.get(i) {
                    Some(StopState::Past) => "past",
                    Some(StopState::Current) => "current",
                    _ => "future",
                }
                .to_string()
            }),
        })
        .collect();

    TimelineResponse {
        schedule_id: effective.schedule_id.0,
        train_number: train_number.to_string(),
        date: effective.date.to_string(),
        runs,
        status_key: effective.status.key().to_string(),
        status_label: effective.status.label().to_string(),
        delay_minutes: effective.delay_minutes,
        cancelled: effective.cancelled,
        stops,
        position,
    }
}

/// The day's perturbation records.
async fn get_daily_perturbations(
    State(state): State<AppState>,
    Query(query): Query<PerturbationQuery>,
) -> Result<Json<PerturbationListResponse>, ApiError> {
    let date = match &query.date {
        Some(s) => parse_date_loose(s).ok_or_else(|| bad_request("invalid date"))?,
        None => Local::now().date_naive(),
    };

    let perturbations = state.feeds.perturbations.get().await;
    let items = perturbations
        .iter()
        .filter(|p| p.date.is_none() || p.date == Some(date))
        .map(perturbation_result)
        .collect();

    Ok(Json(PerturbationListResponse { items }))
}

fn perturbation_result(p: &DailyPerturbation) -> PerturbationResult {
    let mapping = map_status(p);
    PerturbationResult {
        schedule_id: p.schedule_id.map(|id| id.0),
        date: p.date.map(|d| d.to_string()),
        kind: p.kind.clone(),
        status_key: mapping.status.key().to_string(),
        delay_minutes: mapping.delay_minutes,
        cancelled: mapping.cancelled,
        cause: p.cause.clone(),
    }
}

/// Platform overrides and assignments, optionally scoped to a station.
async fn get_platforms(
    State(state): State<AppState>,
    Query(query): Query<PlatformQuery>,
) -> Json<PlatformListResponse> {
    let limit = query.limit.unwrap_or(100).min(500);

    let overrides = state.feeds.platform_overrides.get().await;
    let assignments = state.feeds.platform_assignments.get().await;

    let mut items: Vec<PlatformItemResult> = overrides
        .iter()
        .map(|o| PlatformItemResult {
            schedule_id: o.schedule_id.0,
            platform: o.platform.clone(),
            station_name: None,
        })
        .collect();

    items.extend(
        assignments
            .iter()
            .filter(|a| match &query.station {
                Some(station) => stations_match(&a.station_name, station),
                None => true,
            })
            .map(|a| PlatformItemResult {
                schedule_id: a.schedule_id.0,
                platform: Some(a.platform.clone()),
                station_name: Some(a.station_name.clone()),
            }),
    );

    items.truncate(limit);
    Json(PlatformListResponse { items })
}

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

fn not_found(message: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}
