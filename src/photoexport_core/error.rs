use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not format date: {0}")]
    Format(#[from] time::error::Format),

    // Destination errors
    #[error("The export path {path} is invalid: {reason}")]
    InvalidExportPath { path: String, reason: String },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    // Argument errors
    #[error("Date parsing error: {0}")]
    InvalidDateFormat(String),

    // Library errors
    #[error("Photos library not found at {0}")]
    LibraryNotFound(PathBuf),

    #[error("Invalid Photos library: no usable database at {0}")]
    InvalidLibrary(PathBuf),

    #[error("Could not determine the active Photos library")]
    NoActiveLibrary,

    // Asset errors
    #[error("Original file for {0} is missing from the library")]
    MissingAsset(String),

    #[error("Refusing to export to unsafe file name {0:?}")]
    UnsafeFilename(String),
}

/// Result type for photoexport operations.
pub type Result<T> = std::result::Result<T, ExportError>;
