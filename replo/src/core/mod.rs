//! Deterministic, pure logic behind a session.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! strings and return deterministic outputs suitable for tests.

pub mod classifier;
pub mod render;
pub mod types;
