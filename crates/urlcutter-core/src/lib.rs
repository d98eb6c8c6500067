//! Core types and traits for the urlcutter URL shortener.
//!
//! This crate provides the short code type and its base58 codec, the stored
//! record, and the repository and shortener contracts shared by the storage,
//! service and HTTP crates.

pub mod base58;
pub mod error;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use error::{CodecError, ShortenerError, StorageError};
pub use repository::{ReadRepository, Repository, UrlRecord, URL_SCHEME_PREFIX};
pub use shortcode::ShortCode;
pub use shortener::Shortener;
