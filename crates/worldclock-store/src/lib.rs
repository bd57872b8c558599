//! Preference persistence for the world clock.
//!
//! Preferences live in a flat string key-value store, the same model as
//! browser local storage. Every key is owned by the [`PersistenceGateway`],
//! which encodes values as JSON and recovers from missing or corrupt values
//! by returning documented defaults.
//!
//! ```text
//! ClockApp
//!     |
//!     +-- typed save/load --> PersistenceGateway
//!                                 |
//!                                 +-- raw strings --> dyn KeyValueStore
//!                                                       |-- MemoryStore
//!                                                       +-- JsonFileStore
//! ```
//!
//! # Modules
//!
//! - [`kv`] -- The [`KeyValueStore`] trait and its backends
//! - [`gateway`] -- Namespaced keys and typed preference access
//! - [`error`] -- Shared error types

pub mod error;
pub mod gateway;
pub mod kv;

// Re-export primary types for convenience.
pub use error::StoreError;
pub use gateway::{DEFAULT_NAMESPACE, DEFAULT_THEME_NAME, PersistenceGateway, StorageKeys};
pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};
