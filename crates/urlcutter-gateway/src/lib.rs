//! HTTP front end for urlcutter.
//!
//! Routes:
//! - `POST /create` with form field `url` answers the new short code
//! - `GET /{key}` answers `301 Moved Permanently` to the stored URL
//! - `GET /health` answers `{"status":"ok"}`

pub mod app;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;
pub mod telemetry;

pub use app::{shutdown_signal, App};
pub use state::AppState;
