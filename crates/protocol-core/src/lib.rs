//! Shared domain types for the lap protocol tools.
//!
//! Holds the lap, session and standings models, the error type, the engine
//! configuration, CLI settings and the lap-time parsing/formatting helpers
//! used by every other crate in the workspace.

pub mod config;
pub mod error;
pub mod formatting;
pub mod lap_time;
pub mod models;
pub mod settings;

pub use error::{ProtocolError, Result};
