//! HTTP surface for the widget.

pub mod routes;

pub use routes::{AppState, coach_routes};
