//! URL shortener service implementation.
//!
//! This crate provides [`ShortenerService`], which validates incoming URLs
//! and drives any [`Repository`](urlcutter_core::Repository) for code
//! assignment and lookup. Core types are re-exported from `urlcutter_core`.

pub mod service;

pub use service::ShortenerService;
pub use urlcutter_core::{Shortener, ShortenerError};
