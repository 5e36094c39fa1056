//! Common utilities for the Wren style engine.
//!
//! This crate provides shared infrastructure used by all engine components:
//! - **Warning System** - colored, de-duplicated terminal output for dropped input
//! - **Exceptions** - the error type returned when an API is misused

pub mod exception;
pub mod warning;

pub use exception::DomException;
