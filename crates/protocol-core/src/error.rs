use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the lap protocol tools.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output file could not be created.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader or writer failed outside of a single bad row.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The protocol workbook could not be assembled or saved.
    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    /// A JSON document could not be parsed or written.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A lap-time cell did not match `[[h:]m:]s[.fraction]`.
    #[error("Invalid lap time: {0:?}")]
    LapTimeParse(String),

    /// A CSV row lacks the columns a lap record needs.
    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    /// An input path given on the command line does not exist.
    #[error("Input path not found: {0}")]
    InputNotFound(PathBuf),

    /// No CSV exports were found under the given directory.
    #[error("No CSV files found in {0}")]
    NoInputFiles(PathBuf),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the protocol crates.
pub type Result<T> = std::result::Result<T, ProtocolError>;
