//! Web layer: JSON boundary over the engine.

pub mod dto;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
