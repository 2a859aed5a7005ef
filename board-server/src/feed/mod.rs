//! Upstream feed integration.
//!
//! Wire DTOs tolerant of every shape the admin store emits, conversion
//! into domain types, the async HTTP client, and a fixture-backed mock
//! for running without an upstream.

pub mod client;
pub mod convert;
pub mod error;
pub mod mock;
pub mod types;

pub use client::{FeedBundle, FeedClient, FeedConfig};
pub use convert::{
    ConversionError, convert_perturbations, convert_platforms, convert_schedule,
    convert_schedules, parse_date_loose,
};
pub use error::FeedError;
pub use mock::{load_fixture, parse_fixture};
