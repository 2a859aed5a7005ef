//! Conversion from feed DTOs to domain types.
//!
//! One bad record must never take a board down: conversion failures are
//! logged and the record skipped, while individually unusable fields
//! degrade to "absent" and let the engine's permissive defaults apply.

use chrono::NaiveDate;
use serde_json::Value;

use crate::domain::{
    Calendar, DailyPerturbation, EndpointChange, PlatformAssignment, PlatformOverride, Schedule,
    ScheduleId, Stop, TimeOfDay, TrainNumber,
};

use super::types::{PerturbationDto, PlatformDto, ScheduleDto, StopDto};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConversionError {
    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Convert a batch of schedule records, skipping the unusable ones.
pub fn convert_schedules(dtos: Vec<ScheduleDto>) -> Vec<Schedule> {
    let mut schedules = Vec::with_capacity(dtos.len());
    for dto in dtos {
        match convert_schedule(&dto) {
            Ok(s) => schedules.push(s),
            Err(e) => {
                tracing::warn!(error = %e, "skipping unusable schedule record");
            }
        }
    }
    schedules
}

/// Convert a single schedule record.
pub fn convert_schedule(dto: &ScheduleDto) -> Result<Schedule, ConversionError> {
    let id = dto
        .id
        .as_ref()
        .and_then(|v| v.as_i64())
        .ok_or(ConversionError::MissingField("id"))?;

    let substitutions = dto
        .substitutions
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .filter_map(|sub| match convert_schedule(sub) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::warn!(error = %e, base_id = id, "skipping unusable substitution record");
                None
            }
        })
        .collect();

    Ok(Schedule {
        id: ScheduleId(id),
        train_number: TrainNumber::new(dto.train_number.clone().unwrap_or_default()),
        train_type: non_empty(dto.train_type.clone()),
        rolling_stock: non_empty(dto.rolling_stock.clone()),
        departure_station: dto.departure_station.clone().unwrap_or_default(),
        arrival_station: dto.arrival_station.clone().unwrap_or_default(),
        departure_time: dto.departure_time.as_deref().and_then(TimeOfDay::parse),
        arrival_time: dto.arrival_time.as_deref().and_then(TimeOfDay::parse),
        stops: convert_stops(dto.stops_json.as_ref()),
        calendar: convert_calendar(dto),
        substitutions,
        is_substitution: dto.is_substitution.unwrap_or(false),
        status: non_empty(dto.status.clone()),
        cancelled: dto.cancelled.unwrap_or(false),
        delay_minutes: dto
            .delay_minutes
            .as_ref()
            .and_then(|v| v.as_i64())
            .unwrap_or(0),
        platform: dto.platform_field().map(str::to_string),
    })
}

fn convert_calendar(dto: &ScheduleDto) -> Calendar {
    Calendar {
        day_mask: dto
            .days_mask
            .as_ref()
            .or(dto.days.as_ref())
            .and_then(value_to_string),
        day_list: non_empty(dto.days_mask_list.clone()),
        custom_dates: parse_date_list(dto.custom_dates.as_ref()),
        valid_from: dto.valid_from.as_deref().and_then(parse_date_loose),
        valid_to: dto.valid_to.as_deref().and_then(parse_date_loose),
        exceptions: parse_date_list(dto.exceptions.as_ref()),
        extra_date: dto.date.as_deref().and_then(parse_date_loose),
    }
}

/// Decode `stops_json`: a JSON array, or the same array doubly encoded
/// as a string.
fn convert_stops(value: Option<&Value>) -> Vec<Stop> {
    let dtos: Vec<StopDto> = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect(),
        Some(Value::String(encoded)) => match serde_json::from_str(encoded) {
            Ok(dtos) => dtos,
            Err(e) => {
                tracing::warn!(error = %e, "unreadable stops_json string, dropping stop list");
                Vec::new()
            }
        },
        Some(other) => {
            tracing::warn!(kind = %json_kind(other), "unexpected stops_json shape, dropping stop list");
            Vec::new()
        }
    };

    dtos.into_iter().filter_map(convert_stop).collect()
}

fn convert_stop(dto: StopDto) -> Option<Stop> {
    let name = dto.station_name.as_deref()?.trim();
    if name.is_empty() {
        return None;
    }

    let mut stop = Stop {
        station_name: name.to_string(),
        planned_arrival: dto.arrival_time.as_deref().and_then(TimeOfDay::parse),
        planned_departure: dto.departure_time.as_deref().and_then(TimeOfDay::parse),
    };

    // Salvage a time buried under a nonstandard key rather than losing
    // the stop's time entirely.
    if stop.planned_arrival.is_none() && stop.planned_departure.is_none() {
        stop.planned_departure = dto
            .extra
            .values()
            .filter_map(|v| v.as_str())
            .find_map(TimeOfDay::parse);
    }

    Some(stop)
}

/// Convert a batch of perturbation records. Records are kept even when
/// they carry no usable match key; the matcher simply never selects
/// them.
pub fn convert_perturbations(dtos: Vec<PerturbationDto>) -> Vec<DailyPerturbation> {
    dtos.into_iter().map(convert_perturbation).collect()
}

fn convert_perturbation(dto: PerturbationDto) -> DailyPerturbation {
    DailyPerturbation {
        schedule_id: dto
            .schedule_id
            .as_ref()
            .and_then(|v| v.as_i64())
            .map(ScheduleId),
        train_number: non_empty(dto.train_number).map(TrainNumber::new),
        date: dto.date.as_deref().and_then(parse_date_loose),
        kind: dto.kind.unwrap_or_default(),
        delay_minutes: dto
            .delay_minutes
            .as_ref()
            .and_then(|v| v.as_i64())
            .unwrap_or(0),
        cause: non_empty(dto.cause),
        cancelled: dto.cancelled.unwrap_or(false),
        modified_departure: endpoint_change(
            dto.modified_departure_station,
            dto.modified_departure_time.as_deref(),
        ),
        modified_arrival: endpoint_change(
            dto.modified_arrival_station,
            dto.modified_arrival_time.as_deref(),
        ),
        removed_stops: parse_name_list(dto.removed_stops.as_ref()),
        station: non_empty(dto.station),
        time: non_empty(dto.time),
    }
}

fn endpoint_change(station: Option<String>, time: Option<&str>) -> Option<EndpointChange> {
    let station_name = non_empty(station)?;
    Some(EndpointChange {
        station_name,
        time: time.and_then(TimeOfDay::parse),
    })
}

/// Convert platform records into the two admin tables: records carrying
/// a station name are station-scoped assignments, the rest are
/// per-station overrides (the station is implied by the query).
pub fn convert_platforms(dtos: Vec<PlatformDto>) -> (Vec<PlatformOverride>, Vec<PlatformAssignment>) {
    let mut overrides = Vec::new();
    let mut assignments = Vec::new();

    for dto in dtos {
        let Some(schedule_id) = dto.schedule_id.as_ref().and_then(|v| v.as_i64()) else {
            tracing::warn!("skipping platform record without schedule id");
            continue;
        };
        let schedule_id = ScheduleId(schedule_id);

        match non_empty(dto.station_name) {
            Some(station_name) => {
                // Assignments carry real platforms; an empty one says
                // nothing (only overrides have a withheld sentinel).
                if let Some(platform) = non_empty(dto.platform) {
                    assignments.push(PlatformAssignment {
                        schedule_id,
                        station_name,
                        platform,
                    });
                }
            }
            None => overrides.push(PlatformOverride {
                schedule_id,
                platform: non_empty(dto.platform),
            }),
        }
    }

    (overrides, assignments)
}

/// Day-granularity date parse: the leading `YYYY-MM-DD` of whatever
/// arrived ("2025-03-10", "2025-03-10T00:00:00", ...).
pub fn parse_date_loose(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let head = if s.len() > 10 { s.get(..10)? } else { s };
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// A list of dates: JSON array of strings, or one delimited string.
fn parse_date_list(value: Option<&Value>) -> Vec<NaiveDate> {
    string_items(value)
        .iter()
        .filter_map(|s| parse_date_loose(s))
        .collect()
}

/// A list of names: JSON array of strings, or one delimited string.
fn parse_name_list(value: Option<&Value>) -> Vec<String> {
    string_items(value)
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn string_items(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s.split([';', ',']).map(str::to_string).collect(),
        Some(_) => Vec::new(),
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
