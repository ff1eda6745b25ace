//! Common utilities and types shared across Keysafe modules.
//!
//! This module provides the error taxonomy used by every stage of the
//! unlock pipeline, plus small newtypes that keep identifiers and secret
//! buffers type safe.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{ProfileName, SensitiveBytes, DEFAULT_PROFILE};
