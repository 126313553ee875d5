use thiserror::Error;

use crate::value::ValueType;

/// Fallos al validar entradas o al ejecutar un nodo.
#[derive(Error, Debug)]
pub enum NodeError {
    #[error("unknown node: {0}")]
    UnknownNode(String),

    #[error("missing required input `{0}`")]
    MissingInput(String),

    #[error("input `{name}` expects {expected}, got {found}")]
    InvalidType {
        name: String,
        expected: ValueType,
        found: ValueType,
    },

    #[error("input `{name}` does not accept `{value}`")]
    InvalidOption { name: String, value: String },

    #[error(transparent)]
    Probe(#[from] dva_probe::Error),

    #[error(transparent)]
    Library(#[from] dva_library::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] config::ConfigError),

    #[error(transparent)]
    Paths(#[from] dva_paths::Error),
}
