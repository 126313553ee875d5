//! Backends de duración y su orden de consulta.

pub mod decode;
pub mod ffprobe;
pub mod tags;

use std::{fmt, path::Path, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use ffprobe::FfprobeRunner;

bitflags::bitflags! {
    /// Backends disponibles en este proceso.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capabilities: u32 {
        const TAGS    = 1 << 0;
        const DECODE  = 1 << 1;
        const FFPROBE = 1 << 2;
        const ALL = Self::TAGS.bits()
                  | Self::DECODE.bits()
                  | Self::FFPROBE.bits();
    }
}

impl Capabilities {
    /// Backends compilados (features de cargo), sin comprobar ffprobe.
    pub fn compiled() -> Self {
        let mut caps = Capabilities::empty();
        if cfg!(feature = "lofty") {
            caps |= Capabilities::TAGS;
        }
        if cfg!(feature = "symphonia") {
            caps |= Capabilities::DECODE;
        }
        caps
    }

    /// Backends compilados más ffprobe si responde a `-version` dentro del plazo.
    pub fn detect(runner: &FfprobeRunner, timeout: Duration) -> Self {
        let mut caps = Self::compiled();
        if runner.version(timeout).is_some() {
            caps |= Capabilities::FFPROBE;
        }
        caps
    }
}

/// Estado de una dependencia para el informe de bienvenida.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyStatus {
    pub name: &'static str,
    pub available: bool,
    pub detail: Option<String>,
}

/// Informe de disponibilidad de cada backend.
pub fn dependency_report(runner: &FfprobeRunner, timeout: Duration) -> Vec<DependencyStatus> {
    let compiled = Capabilities::compiled();
    let ffprobe_version = runner.version(timeout);

    vec![
        DependencyStatus {
            name: BackendKind::Tags.name(),
            available: compiled.contains(Capabilities::TAGS),
            detail: None,
        },
        DependencyStatus {
            name: BackendKind::Decode.name(),
            available: compiled.contains(Capabilities::DECODE),
            detail: None,
        },
        DependencyStatus {
            name: BackendKind::Ffprobe.name(),
            available: ffprobe_version.is_some(),
            detail: ffprobe_version,
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Propiedades de cabecera (lofty).
    Tags,
    /// Decodificación completa (symphonia).
    Decode,
    Ffprobe,
}

impl BackendKind {
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Tags => "lofty",
            BackendKind::Decode => "symphonia",
            BackendKind::Ffprobe => "ffprobe",
        }
    }

    pub fn capability(self) -> Capabilities {
        match self {
            BackendKind::Tags => Capabilities::TAGS,
            BackendKind::Decode => Capabilities::DECODE,
            BackendKind::Ffprobe => Capabilities::FFPROBE,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculationMode {
    Accurate,
    Fast,
    #[default]
    Auto,
}

impl CalculationMode {
    pub const ALL: [CalculationMode; 3] = [CalculationMode::Accurate, CalculationMode::Fast, CalculationMode::Auto];

    pub fn as_str(self) -> &'static str {
        match self {
            CalculationMode::Accurate => "accurate",
            CalculationMode::Fast => "fast",
            CalculationMode::Auto => "auto",
        }
    }
}

impl fmt::Display for CalculationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalculationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accurate" => Ok(CalculationMode::Accurate),
            "fast" => Ok(CalculationMode::Fast),
            "auto" => Ok(CalculationMode::Auto),
            other => Err(Error::UnsupportedInput(format!("calculation mode `{other}`"))),
        }
    }
}

/// Formatos comprimidos cuya cabecera basta para una duración fiable.
const HEADER_FRIENDLY: [&str; 3] = ["mp3", "aac", "m4a"];

/// Modo efectivo para `auto` según la extensión y los backends disponibles.
pub fn auto_mode(ext: Option<&str>, caps: Capabilities) -> CalculationMode {
    let header_friendly = ext
        .map(|e| HEADER_FRIENDLY.iter().any(|h| e.eq_ignore_ascii_case(h)))
        .unwrap_or(false);

    if header_friendly && caps.contains(Capabilities::TAGS) {
        CalculationMode::Fast
    } else {
        CalculationMode::Accurate
    }
}

/// Resuelve el modo y devuelve los backends disponibles en orden de preferencia.
/// Las cabeceras solo se consultan en modo `fast`; ffprobe siempre cierra la lista.
pub fn backend_order(
    ext: Option<&str>,
    caps: Capabilities,
    mode: CalculationMode,
) -> (CalculationMode, Vec<BackendKind>) {
    let mode = match mode {
        CalculationMode::Auto => auto_mode(ext, caps),
        m => m,
    };

    let mut order = match mode {
        CalculationMode::Fast => vec![BackendKind::Tags, BackendKind::Decode, BackendKind::Ffprobe],
        _ => vec![BackendKind::Decode, BackendKind::Ffprobe],
    };

    order.retain(|k| caps.contains(k.capability()));
    (mode, order)
}

/// Datos técnicos que acompañan a una duración calculada.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BackendMetadata {
    pub method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bit_depth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_samples: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffprobe_data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendOutcome {
    pub duration: f64,
    pub metadata: BackendMetadata,
}

pub trait DurationBackend {
    fn kind(&self) -> BackendKind;
    fn probe(&self, path: &Path) -> Result<BackendOutcome, Error>;
}

pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_prefers_headers_for_compressed_formats() {
        assert_eq!(auto_mode(Some("mp3"), Capabilities::ALL), CalculationMode::Fast);
        assert_eq!(auto_mode(Some("M4A"), Capabilities::ALL), CalculationMode::Fast);
        assert_eq!(auto_mode(Some("wav"), Capabilities::ALL), CalculationMode::Accurate);
        assert_eq!(auto_mode(None, Capabilities::ALL), CalculationMode::Accurate);
    }

    #[test]
    fn auto_without_tags_is_accurate() {
        let caps = Capabilities::DECODE | Capabilities::FFPROBE;
        assert_eq!(auto_mode(Some("mp3"), caps), CalculationMode::Accurate);
    }

    #[test]
    fn preferred_backend_first_and_ffprobe_last() {
        let (mode, order) = backend_order(Some("mp3"), Capabilities::ALL, CalculationMode::Fast);
        assert_eq!(mode, CalculationMode::Fast);
        assert_eq!(order, vec![BackendKind::Tags, BackendKind::Decode, BackendKind::Ffprobe]);

        let (mode, order) = backend_order(Some("wav"), Capabilities::ALL, CalculationMode::Auto);
        assert_eq!(mode, CalculationMode::Accurate);
        assert_eq!(order, vec![BackendKind::Decode, BackendKind::Ffprobe]);
    }

    #[test]
    fn accurate_never_falls_back_to_headers() {
        let caps = Capabilities::TAGS | Capabilities::FFPROBE;
        let (mode, order) = backend_order(Some("wav"), caps, CalculationMode::Accurate);
        assert_eq!(mode, CalculationMode::Accurate);
        assert_eq!(order, vec![BackendKind::Ffprobe]);

        let (_, order) = backend_order(Some("wav"), Capabilities::TAGS, CalculationMode::Accurate);
        assert!(order.is_empty());
    }

    #[test]
    fn unavailable_backends_are_dropped() {
        let (_, order) = backend_order(Some("flac"), Capabilities::FFPROBE, CalculationMode::Accurate);
        assert_eq!(order, vec![BackendKind::Ffprobe]);

        let (_, order) = backend_order(Some("flac"), Capabilities::empty(), CalculationMode::Fast);
        assert!(order.is_empty());
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("FAST".parse::<CalculationMode>().unwrap(), CalculationMode::Fast);
        assert_eq!(" auto ".parse::<CalculationMode>().unwrap(), CalculationMode::Auto);
        assert!("precise".parse::<CalculationMode>().is_err());
        assert_eq!(CalculationMode::Accurate.to_string(), "accurate");
    }

    #[test]
    fn metadata_skips_empty_fields() {
        let meta = BackendMetadata {
            method: "lofty",
            sample_rate: Some(44_100),
            ..Default::default()
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json, serde_json::json!({"method": "lofty", "sample_rate": 44100}));
    }
}
