use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::analysis::silence::DEFAULT_WINDOW_MS;

/// Frecuencia asumida para buffers que no la declaran.
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub ffprobe_path: PathBuf,
    /// Plazo para `ffprobe -version`.
    pub availability_timeout_secs: u64,
    pub metadata_timeout_secs: u64,
    pub duration_timeout_secs: u64,
    pub default_sample_rate: u32,
    pub silence_window_ms: u32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            ffprobe_path: PathBuf::from("ffprobe"),
            availability_timeout_secs: 5,
            metadata_timeout_secs: 10,
            duration_timeout_secs: 30,
            default_sample_rate: DEFAULT_SAMPLE_RATE,
            silence_window_ms: DEFAULT_WINDOW_MS,
        }
    }
}

impl ProbeConfig {
    pub fn availability_timeout(&self) -> Duration {
        Duration::from_secs(self.availability_timeout_secs)
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata_timeout_secs)
    }

    pub fn duration_timeout(&self) -> Duration {
        Duration::from_secs(self.duration_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: ProbeConfig = serde_json::from_str(r#"{"metadata_timeout_secs": 2}"#).unwrap();
        assert_eq!(cfg.metadata_timeout(), Duration::from_secs(2));
        assert_eq!(cfg.duration_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.default_sample_rate, 24_000);
        assert_eq!(cfg.ffprobe_path, PathBuf::from("ffprobe"));
    }
}
