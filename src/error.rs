use image::ImageError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PadError {
    #[error("Multiple must be a positive integer, got {0}")]
    InvalidMultiple(u32),

    #[error("Invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Not a directory: '{}'", .0.display())]
    NotADirectory(PathBuf),

    #[error("No directory given and no recent directory in config")]
    NoDirectory,

    #[error("Failed to open image '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to decode image '{}': {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("Failed to save image '{}': {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("Failed to replace image '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Padded canvas would be too large for a {width}x{height} image")]
    CanvasTooLarge { width: u32, height: u32 },

    #[error("Failed to write config '{}': {source}", path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type PadResult<T> = Result<T, PadError>;
