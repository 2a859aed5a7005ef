//! The resolution engine.
//!
//! Pure, synchronous, side-effect-free functions shared by every display
//! surface: running-day resolution, the perturbation overlay, platform
//! precedence, timeline interpolation, and board assembly. Surfaces pass
//! in already-fetched data and render what comes back; nothing in here
//! performs I/O.

mod board;
mod calendar;
mod config;
mod overlay;
mod platform;
mod timeline;

pub use board::{Board, BoardEntry, BoardKind, BoardRequest, BoardSources, assemble_board};
pub use calendar::runs_on_date;
pub use config::BoardConfig;
pub use overlay::{StatusMapping, find_perturbation, map_status, resolve};
pub use platform::{arrivals_heuristic_platform, resolve_platform};
pub use timeline::{Progress, StopState, TimelineClock, TimelineModel, TimelinePoint};
