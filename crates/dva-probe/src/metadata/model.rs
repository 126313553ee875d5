use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::format::short_clock;

/// Registro completo de metadatos. Las secciones ausentes no se serializan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioMetadata {
    pub file_info: FileInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical: Option<TechnicalInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub name: String,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_mb: Option<f64>,
    /// Fecha local ISO-8601 sin zona.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
}

/// Sección `format` de ffprobe, conservando todos sus campos.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FormatInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            format_name: Some(name.into()),
            extra: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalInfo {
    pub duration_seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate_bps: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bits_per_sample: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_samples: Option<u64>,
}

impl AudioMetadata {
    pub fn format_name(&self) -> Option<&str> {
        self.format.as_ref().and_then(|f| f.format_name.as_deref())
    }

    pub fn duration_seconds(&self) -> f64 {
        self.technical.as_ref().map(|t| t.duration_seconds).unwrap_or(0.0)
    }

    /// `nombre (X MB) | Duration: m:ss.s | N Hz | Nch`, omitiendo lo que falte.
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "{} ({:.2} MB)",
            self.file_info.name,
            self.file_info.size_mb.unwrap_or(0.0)
        )];

        if let Some(tech) = &self.technical {
            if tech.duration_seconds > 0.0 {
                parts.push(format!("Duration: {}", short_clock(tech.duration_seconds)));
            }
            if let Some(sr) = tech.sample_rate.filter(|sr| *sr > 0) {
                parts.push(format!("{sr} Hz"));
            }
            if let Some(ch) = tech.channels.filter(|ch| *ch > 0) {
                parts.push(format!("{ch}ch"));
            }
        }

        parts.join(" | ")
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

pub fn bytes_to_mb(bytes: u64) -> f64 {
    let mb = bytes as f64 / (1024.0 * 1024.0);
    (mb * 100.0).round() / 100.0
}
