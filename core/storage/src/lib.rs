//! Profile store abstraction for Keysafe.
//!
//! The unlock pipeline reads three kinds of rows: one profile, the items
//! belonging to it, and the per-item detail payloads. This module provides
//! a trait-based interface over wherever those rows live, plus a SQLite
//! backend for real vault files and an in-memory backend for tests.
//!
//! # Design Principles
//! - Read-only: stores never write vault contents
//! - Async operations: row fetches are the pipeline's only I/O
//! - Explicit location: backends are given their storage path, never
//!   discover it from the environment

pub mod memory;
pub mod provider;
pub mod sqlite;

pub use memory::MemoryProfileStore;
pub use provider::{DetailRecord, ItemId, ItemRecord, ProfileRecord, ProfileStore};
pub use sqlite::{SqliteProfileStore, SCHEMA};
