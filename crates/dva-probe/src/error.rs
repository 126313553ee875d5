use std::path::PathBuf;

use thiserror::Error;

use crate::backend::ffprobe::FfprobeError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported audio input: {0}")]
    UnsupportedInput(String),

    #[error("invalid sample buffer: {0}")]
    InvalidBuffer(String),

    #[error("audio file path was not provided")]
    EmptyPath,

    #[error("audio file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("path is not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("audio file is empty: {}", .0.display())]
    EmptyFile(PathBuf),

    #[error("no duration backend available")]
    NoBackend,

    #[error("could not determine duration")]
    UnknownDuration,

    #[error(transparent)]
    Ffprobe(#[from] FfprobeError),

    #[cfg(feature = "lofty")]
    #[error("lofty: {0}")]
    Lofty(#[from] lofty::error::LoftyError),

    #[cfg(feature = "symphonia")]
    #[error(transparent)]
    Decode(#[from] crate::audio::decoder::DecodeError),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}
