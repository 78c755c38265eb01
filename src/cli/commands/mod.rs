//! CLI command implementations
//!
//! This module contains all CLI command implementations.
//!
//! Exit codes: 0 success, 2 configuration error, 4 connection error,
//! 5 fatal pipeline error.

pub mod init;
pub mod run;
pub mod status;
pub mod validate;
