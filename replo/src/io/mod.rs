//! Side-effecting helpers: config, history, staging and process execution.

pub mod backend;
pub mod config;
pub mod history;
pub mod process;
