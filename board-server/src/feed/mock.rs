//! Mock feed for development and tests.
//!
//! Loads one JSON fixture file with the same wire shapes the live feeds
//! use, so the server runs without an upstream:
//!
//! ```json
//! {
//!   "schedules": [...],
//!   "perturbations": [...],
//!   "platforms": [...]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use super::client::FeedBundle;
use super::convert::{convert_perturbations, convert_platforms, convert_schedules};
use super::error::FeedError;
use super::types::{PerturbationDto, PlatformDto, ScheduleDto};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FixtureFile {
    schedules: Vec<ScheduleDto>,
    perturbations: Vec<PerturbationDto>,
    platforms: Vec<PlatformDto>,
}

/// Load a fixture file into a feed bundle.
pub fn load_fixture(path: impl AsRef<Path>) -> Result<FeedBundle, FeedError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|e| FeedError::Fixture(format!("failed to read {}: {e}", path.display())))?;
    parse_fixture(&raw)
}

/// Parse fixture JSON into a feed bundle.
pub fn parse_fixture(raw: &str) -> Result<FeedBundle, FeedError> {
    let fixture: FixtureFile = serde_json::from_str(raw).map_err(|e| FeedError::Json {
        message: e.to_string(),
    })?;

    let (platform_overrides, platform_assignments) = convert_platforms(fixture.platforms);

    Ok(FeedBundle {
        schedules: convert_schedules(fixture.schedules),
        perturbations: convert_perturbations(fixture.perturbations),
        platform_overrides,
        platform_assignments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ScheduleId, ServiceStatus, TimeOfDay};
    use crate::engine::{BoardKind, BoardRequest, BoardSources, assemble_board};
    use chrono::NaiveDate;

    #[test]
    fn parse_complete_fixture() {
        let raw = r#"{
            "schedules": [
                {
                    "id": 1,
                    "train_number": "886410",
                    "departure_station": "Gap",
                    "arrival_station": "Briançon",
                    "departure_time": "08:00",
                    "arrival_time": "09:10",
                    "days_mask": "1111100"
                }
            ],
            "perturbations": [
                {"schedule_id": 1, "date": "2025-03-10", "type": "Retard", "delay_minutes": 12}
            ],
            "platforms": [
                {"schedule_id": 1, "platform": "2"}
            ]
        }"#;

        let bundle = parse_fixture(raw).unwrap();
        assert_eq!(bundle.schedules.len(), 1);
        assert_eq!(bundle.schedules[0].id, ScheduleId(1));
        assert_eq!(bundle.perturbations.len(), 1);
        assert_eq!(bundle.platform_overrides.len(), 1);
        assert!(bundle.platform_assignments.is_empty());
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let bundle = parse_fixture("{}").unwrap();
        assert!(bundle.schedules.is_empty());
        assert!(bundle.perturbations.is_empty());
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(parse_fixture("not json").is_err());
    }

    /// Wire fixture straight through to an assembled board.
    #[test]
    fn fixture_to_board() {
        let raw = r#"{
            "schedules": [
                {
                    "id": 1,
                    "train_number": "886410",
                    "train_type": "TER",
                    "departure_station": "Gap",
                    "arrival_station": "Briançon",
                    "departure_time": "08:00",
                    "arrival_time": "09:10",
                    "stops_json": [
                        {"station_name": "Embrun", "arrival_time": "08:40", "departure_time": "08:42"}
                    ]
                },
                {
                    "id": 2,
                    "train_number": "886412",
                    "departure_station": "Gap",
                    "arrival_station": "Briançon",
                    "departure_time": "12:00",
                    "arrival_time": "13:10"
                }
            ],
            "perturbations": [
                {"sillon_id": 1, "date": "2025-03-10", "titre": "Retard", "retard_min": "15"}
            ],
            "platforms": [
                {"schedule_id": 2, "platform": ""}
            ]
        }"#;

        let bundle = parse_fixture(raw).unwrap();
        let request = BoardRequest {
            station: "Gap",
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            kind: BoardKind::Departures,
            today: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            now: TimeOfDay::parse("06:00").unwrap(),
            page_size: 8,
        };
        let sources = BoardSources {
            schedules: &bundle.schedules,
            perturbations: &bundle.perturbations,
            platform_overrides: &bundle.platform_overrides,
            platform_assignments: &bundle.platform_assignments,
        };

        let board = assemble_board(&request, &sources);
        assert_eq!(board.entries.len(), 2);

        // Aliased perturbation fields land on the first train.
        let first = &board.entries[0];
        assert_eq!(first.effective.status, ServiceStatus::Delayed);
        assert_eq!(first.effective.delay_minutes, 15);

        // The explicitly empty platform override renders withheld.
        let second = &board.entries[1];
        assert_eq!(second.platform.as_ref().map(ToString::to_string), Some("—".into()));
    }
}
