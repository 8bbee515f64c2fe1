//! Presentation layer for the lap protocol tools.
//!
//! Lays ranked standings out as protocol sheets and delivers them as CSV
//! files, a workbook, plain-text tables or an interactive [`ratatui`] viewer.

pub mod app;
pub mod export;
pub mod sheet;
pub mod table_view;
pub mod text;
pub mod themes;

pub use protocol_data as data;
