//! Data layer for the lap protocol tools.
//!
//! Responsible for discovering and reading timing exports, building
//! time-attack sessions, reducing trackday laps, ranking classes and running
//! the top-level analysis pipeline.

pub mod analysis;
pub mod analyzer;
pub mod ranker;
pub mod reader;
pub mod reducer;

pub use protocol_core as core;
