use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use derive_builder::Builder;
use dva_paths::HostDirs;
use dva_probe::pipeline::config::ProbeConfig;
use serde::{Deserialize, Serialize};
use tracing::{Level, debug, instrument};

use crate::error::ConfigError;

/// Prefijo de las variables de entorno (`DVA_BASE_DIR`, `DVA_PROBE__FFPROBE_PATH`, ...).
pub const ENV_PREFIX: &str = "DVA";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
#[serde(default)]
pub struct PluginConfig {
    /// Raíz de `input/`, `output/` y `temp/`. Sin ella se usan las carpetas
    /// de datos del usuario.
    pub base_dir: Option<PathBuf>,
    /// Registrar el informe de bienvenida al cargar.
    pub welcome: bool,
    pub probe: ProbeConfig,
}

impl Default for PluginConfig {
    fn default() -> Self {
        PluginConfig {
            base_dir: None,
            welcome: true,
            probe: ProbeConfig::default(),
        }
    }
}

impl PluginConfig {
    pub fn builder() -> PluginConfigBuilder {
        PluginConfigBuilder::default()
    }

    /// Lee un TOML obligatorio, sin variables de entorno.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_string_lossy().into_owned();
        let cfg = Config::builder()
            .add_source(File::new(&path, FileFormat::Toml))
            .build()?;
        Ok(cfg.try_deserialize::<PluginConfig>()?)
    }

    /// TOML opcional más overrides `DVA_*`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    #[instrument(level = Level::DEBUG, err)]
    fn load_with_prefix(path: Option<&Path>, prefix: &str) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            let path = path.to_string_lossy().into_owned();
            builder = builder.add_source(File::new(&path, FileFormat::Toml));
        }

        let cfg = builder
            .add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded = cfg.try_deserialize::<PluginConfig>()?;
        debug!(?loaded, "plugin configuration loaded");
        Ok(loaded)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Carpetas del host según `base_dir`, creándolas si hace falta.
    pub fn host_dirs(&self) -> Result<HostDirs, ConfigError> {
        let dirs = match &self.base_dir {
            Some(base) => HostDirs::with_base(base)?,
            None => HostDirs::new()?,
        };
        Ok(dirs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_without_sources() {
        let cfg = PluginConfig::load_with_prefix(None, "DVA_TEST_EMPTY").unwrap();
        assert_eq!(cfg, PluginConfig::default());
        assert_eq!(cfg.probe.duration_timeout_secs, 30);
    }

    #[test]
    fn toml_round_trip_through_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("conf/dva.toml");

        let cfg = PluginConfig::builder()
            .base_dir(tmp.path().join("base"))
            .welcome(false)
            .build()
            .unwrap();
        cfg.save(&path).unwrap();

        let loaded = PluginConfig::from_file(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("dva.toml");
        std::fs::write(&path, "[probe]\nffprobe_path = \"/opt/ffmpeg/bin/ffprobe\"\nmetadata_timeout_secs = 3\n").unwrap();

        let cfg = PluginConfig::load_with_prefix(Some(&path), "DVA_TEST_PARTIAL").unwrap();
        assert_eq!(cfg.probe.ffprobe_path, PathBuf::from("/opt/ffmpeg/bin/ffprobe"));
        assert_eq!(cfg.probe.metadata_timeout_secs, 3);
        assert_eq!(cfg.probe.duration_timeout_secs, 30);
        assert!(cfg.welcome);
    }

    #[test]
    fn environment_overrides_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("dva.toml");
        std::fs::write(&path, "[probe]\ndefault_sample_rate = 16000\n").unwrap();

        unsafe { std::env::set_var("DVA_TEST_ENV_PROBE__DEFAULT_SAMPLE_RATE", "48000") };
        let cfg = PluginConfig::load_with_prefix(Some(&path), "DVA_TEST_ENV");
        unsafe { std::env::remove_var("DVA_TEST_ENV_PROBE__DEFAULT_SAMPLE_RATE") };

        assert_eq!(cfg.unwrap().probe.default_sample_rate, 48_000);
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let err = PluginConfig::from_file("/no/such/dva.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn host_dirs_from_base() {
        let tmp = tempdir().unwrap();
        let cfg = PluginConfig::builder().base_dir(tmp.path()).build().unwrap();
        let dirs = cfg.host_dirs().unwrap();
        assert_eq!(dirs.input_dir, tmp.path().join("input"));
    }
}
