//! Upstream feed DTOs.
//!
//! These types map the admin-store JSON as it actually arrives: field
//! names vary by endpoint generation (`schedule_id` vs `sillon_id`,
//! `type` vs `titre`), numbers arrive as numbers or strings, stop lists
//! arrive as arrays or doubly-encoded JSON strings, and list envelopes
//! use several wrapper keys. `Option` everywhere; the conversion layer
//! decides what is usable.

use serde::Deserialize;
use serde_json::Value;

/// An identifier that may arrive as a number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Num(i64),
    Str(String),
}

impl IdValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            IdValue::Num(n) => Some(*n),
            IdValue::Str(s) => s.trim().parse().ok(),
        }
    }
}

/// A numeric field that may arrive as integer, float, or string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumValue {
    Num(i64),
    Float(f64),
    Str(String),
}

impl NumValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NumValue::Num(n) => Some(*n),
            NumValue::Float(f) => Some(*f as i64),
            NumValue::Str(s) => s.trim().parse().ok(),
        }
    }
}

/// A schedule record on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScheduleDto {
    #[serde(alias = "sillon_id", alias = "schedule_id")]
    pub id: Option<IdValue>,

    #[serde(alias = "numero")]
    pub train_number: Option<String>,

    pub train_type: Option<String>,

    #[serde(alias = "materiel")]
    pub rolling_stock: Option<String>,

    #[serde(alias = "gare_depart")]
    pub departure_station: Option<String>,

    #[serde(alias = "gare_arrivee")]
    pub arrival_station: Option<String>,

    #[serde(alias = "heure_depart")]
    pub departure_time: Option<String>,

    #[serde(alias = "heure_arrivee")]
    pub arrival_time: Option<String>,

    /// Day-of-week mask; integer or string depending on endpoint.
    pub days_mask: Option<Value>,

    /// Alternate mask field on older records.
    pub days: Option<Value>,

    /// Legacy delimited day list, evaluated independently of the mask.
    pub days_mask_list: Option<String>,

    /// Explicit running dates; array of date strings or delimited string.
    pub custom_dates: Option<Value>,

    pub valid_from: Option<String>,
    pub valid_to: Option<String>,

    /// Explicit non-running dates.
    pub exceptions: Option<Value>,

    /// A single explicit service date carried by some records.
    #[serde(alias = "service_date")]
    pub date: Option<String>,

    /// Stop list; JSON array or doubly-encoded JSON string.
    pub stops_json: Option<Value>,

    pub is_substitution: Option<bool>,
    pub substitutions: Option<Vec<ScheduleDto>>,

    pub status: Option<String>,
    pub cancelled: Option<bool>,

    #[serde(alias = "delay", alias = "retard_min")]
    pub delay_minutes: Option<NumValue>,

    pub platform: Option<String>,
    pub voie: Option<String>,
    pub platform_code: Option<String>,
    pub track: Option<String>,
}

impl ScheduleDto {
    /// First non-empty of the aliased platform fields.
    pub fn platform_field(&self) -> Option<&str> {
        [&self.platform, &self.voie, &self.platform_code, &self.track]
            .into_iter()
            .filter_map(|f| f.as_deref())
            .map(str::trim)
            .find(|p| !p.is_empty())
    }
}

/// A stop record inside `stops_json`.
///
/// Unknown extra fields are retained so a time buried under a
/// nonstandard key can still be salvaged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StopDto {
    #[serde(alias = "station", alias = "gare", alias = "name")]
    pub station_name: Option<String>,

    #[serde(alias = "arrival", alias = "arrivee")]
    pub arrival_time: Option<String>,

    #[serde(alias = "departure", alias = "depart")]
    pub departure_time: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A daily perturbation record on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PerturbationDto {
    #[serde(alias = "sillon_id")]
    pub schedule_id: Option<IdValue>,

    #[serde(alias = "numero")]
    pub train_number: Option<String>,

    pub date: Option<String>,

    #[serde(rename = "type", alias = "titre", alias = "title")]
    pub kind: Option<String>,

    #[serde(alias = "delay", alias = "retard_min")]
    pub delay_minutes: Option<NumValue>,

    #[serde(alias = "motif")]
    pub cause: Option<String>,

    pub cancelled: Option<bool>,

    pub modified_departure_station: Option<String>,
    pub modified_departure_time: Option<String>,
    pub modified_arrival_station: Option<String>,
    pub modified_arrival_time: Option<String>,

    /// Array of station names or a delimited string.
    pub removed_stops: Option<Value>,

    /// Tertiary match keys.
    #[serde(alias = "gare")]
    pub station: Option<String>,
    #[serde(alias = "heure")]
    pub time: Option<String>,
}

/// A platform record on the wire.
///
/// `platform` carrying `null` or `""` is a meaningful override ("no
/// platform", rendered "—"), not a missing value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlatformDto {
    #[serde(alias = "sillon_id")]
    pub schedule_id: Option<IdValue>,

    #[serde(alias = "station")]
    pub station_name: Option<String>,

    #[serde(alias = "voie", alias = "platform_code", alias = "track")]
    pub platform: Option<String>,
}

/// List envelope used by several endpoints: a wrapper object under one
/// of a few keys, or a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Bare(Vec<T>),
    Items { items: Vec<T> },
    Perturbations { perturbations: Vec<T> },
    Schedules { schedules: Vec<T> },
    Data { data: Vec<T> },
    Results { results: Vec<T> },
}

impl<T> Envelope<T> {
    /// Unwrap whichever envelope arrived.
    pub fn into_records(self) -> Vec<T> {
        match self {
            Envelope::Bare(v)
            | Envelope::Items { items: v }
            | Envelope::Perturbations { perturbations: v }
            | Envelope::Schedules { schedules: v }
            | Envelope::Data { data: v }
            | Envelope::Results { results: v } => v,
        }
    }
}
