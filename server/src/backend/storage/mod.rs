//! # Storage Module
//!
//! Handles all data persistence for Família Fin.
//!
//! Four collections (users, expenses, budgets, withdrawals) are kept as JSON
//! arrays under fixed keys of a key-value store. The domain layer only sees the
//! repository traits and the [`Connection`] factory, so the backing store can
//! be a data directory on disk or plain memory.
//!
//! ## Layers
//!
//! - **key_value**: raw text blobs by key (`FileStore`, `MemoryStore`)
//! - **json**: typed collections with revision-checked writes, repositories and
//!   the first-run seeder
//! - **traits**: repository interfaces used by the domain services

pub mod json;
pub mod key_value;
pub mod traits;

pub use json::JsonConnection;
pub use key_value::{FileStore, KeyValueStore, MemoryStore};
pub use traits::*;
