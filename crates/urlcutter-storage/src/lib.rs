//! Repository implementations for urlcutter.
//!
//! [`RedbRepository`] is the durable store used in production: a single redb
//! file holding one collection of records plus the collection's counter.
//! [`InMemoryRepository`] follows the same counter rules without touching
//! disk and is meant for tests and local runs.

pub mod embedded;
pub mod memory;

pub use embedded::{RedbRepository, StoreSettings, DEFAULT_COLLECTION};
pub use memory::InMemoryRepository;
pub use urlcutter_core::{ReadRepository, Repository, StorageError};
