//! Error types shared by the store, the log, and the form controller.

use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the tagger
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between the form and the files on disk
#[derive(Error, Debug)]
pub enum Error {
    /// Reading or writing a file failed (permissions, missing directory, disk full...)
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file exists but its content is not the JSON we expect
    #[error("could not parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The datasheet content could not be encoded as JSON
    #[error("could not serialize datasheet {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The operator's input was rejected before anything was written
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No relative path exists between the two paths (e.g. different drives)
    #[error("{} cannot be expressed relative to {}", path.display(), base.display())]
    NotRelative { base: PathBuf, path: PathBuf },

    /// Module ids may only contain lowercase letters and hyphens
    #[error("invalid module id {0:?}: only lowercase letters and '-' are allowed")]
    InvalidModuleId(String),

    /// Configuration file or taxonomy could not be loaded
    #[error("configuration error: {0}")]
    Config(String),

    /// An image could not be decoded for the preview
    #[error("could not load image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Reasons a form submission is refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("please choose image 1 first")]
    MissingPrimaryImage,

    #[error("please enter a label")]
    MissingLabel,

    #[error("scale must be a whole number, got {0:?}")]
    ScaleNotInteger(String),

    #[error("scale must be between {min} and {max}, got {value}")]
    ScaleOutOfRange { value: i64, min: u8, max: u8 },
}
