//! Interactive Go scratchpad.
//!
//! The user types statements and imports into a buffer; every run classifies
//! the whole buffer, renders it into a complete program, and builds-and-runs
//! it in a throwaway directory. The architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (classification, rendering).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config, history, staging, process
//!   execution). Isolated behind [`io::backend::Backend`] for tests.
//!
//! [`session`] composes the two, and [`repl`] drives a session from a
//! [`frontend::Frontend`].

pub mod core;
pub mod exit_codes;
pub mod frontend;
pub mod io;
pub mod logging;
pub mod repl;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
