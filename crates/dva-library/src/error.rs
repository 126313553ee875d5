use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("invalid file pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Extension not supported: {0}")]
    UnsupportedExtension(String),

    #[error("unknown batch operation: {0}")]
    UnknownOperation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
