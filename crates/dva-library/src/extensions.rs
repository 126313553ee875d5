use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Extensiones que se ofrecen en el selector de ficheros de entrada
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SupportedExtension {
    Wav,
    Mp3,
    Aac,
    Flac,
    Ogg,
    M4a,
    Wma,
    Webm,
}

impl SupportedExtension {
    pub const ALL: &'static [SupportedExtension] = &[
        SupportedExtension::Wav,
        SupportedExtension::Mp3,
        SupportedExtension::Aac,
        SupportedExtension::Flac,
        SupportedExtension::Ogg,
        SupportedExtension::M4a,
        SupportedExtension::Wma,
        SupportedExtension::Webm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SupportedExtension::Wav => "wav",
            SupportedExtension::Mp3 => "mp3",
            SupportedExtension::Aac => "aac",
            SupportedExtension::Flac => "flac",
            SupportedExtension::Ogg => "ogg",
            SupportedExtension::M4a => "m4a",
            SupportedExtension::Wma => "wma",
            SupportedExtension::Webm => "webm",
        }
    }

    /// Extensión de la ruta si está soportada, sin distinguir mayúsculas.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }
}

impl std::str::FromStr for SupportedExtension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim_start_matches('.').to_ascii_lowercase();
        SupportedExtension::ALL
            .iter()
            .find(|ext| ext.as_str() == lower)
            .copied()
            .ok_or_else(|| Error::UnsupportedExtension(s.to_string()))
    }
}

impl std::fmt::Display for SupportedExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
