//! Result type alias shared across the workspace.
//!
//! Defaults the error type to the common `RfqError`, so functions can simply
//! return `Result<T>`.
use crate::error::RfqError;

/// Workspace-wide `Result` alias with `RfqError` as the default error.
pub type Result<T, E = RfqError> = std::result::Result<T, E>;
