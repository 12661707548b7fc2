//! Stable exit codes for the replo CLI.

/// Session ended normally.
pub const OK: i32 = 0;
/// Invalid config, unusable terminal, or another fatal error.
pub const INVALID: i32 = 1;
