//! Worker thread that owns the tokio runtime and the async collaborators.

pub mod commands;
pub mod runtime;
