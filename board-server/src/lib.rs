//! Regional rail board server.
//!
//! Computes live departure/arrival boards, single-train timeline views,
//! and platform display for TER display surfaces, from static schedules
//! ("sillons"), their running-day calendars, and the day's perturbation
//! feed. All resolution logic lives in [`engine`] as pure functions; the
//! rest of the crate is plumbing around it.

pub mod cache;
pub mod domain;
pub mod engine;
pub mod feed;
pub mod web;
