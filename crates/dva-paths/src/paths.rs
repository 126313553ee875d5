use std::{
    env,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use tracing::debug;

use crate::{errors::Error, fs_utils};

/// Nombre de la ENV var para override de ruta base (modo “portable”)
pub const ENV_BASE_DIR: &str = "DVA_BASE_DIR";

/// Carpetas que el host gestiona: entradas subidas, salidas y temporales
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDirs {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub temp_dir: PathBuf,
}

impl HostDirs {
    /// Usa `DVA_BASE_DIR` si existe; si no, las carpetas de datos del usuario.
    pub fn new() -> Result<Self, Error> {
        if let Ok(base) = env::var(ENV_BASE_DIR) {
            return Self::with_base(base);
        }

        let proj = ProjectDirs::from("com", "DVA", "AudioNodes").ok_or(Error::NoHome)?;
        let data_dir = proj.data_dir();
        let dirs = HostDirs {
            input_dir: data_dir.join("input"),
            output_dir: data_dir.join("output"),
            temp_dir: proj.cache_dir().join("temp"),
        };

        dirs.ensure_structure()?;
        Ok(dirs)
    }

    /// Estructura `<base>/input`, `<base>/output`, `<base>/temp`.
    pub fn with_base(base: impl Into<PathBuf>) -> Result<Self, Error> {
        let base = base.into();
        let dirs = HostDirs {
            input_dir: base.join("input"),
            output_dir: base.join("output"),
            temp_dir: base.join("temp"),
        };

        dirs.ensure_structure()?;
        dirs.validate_structure()?;
        Ok(dirs)
    }

    /// Se asegura de que todas las carpetas existen.
    pub fn ensure_structure(&self) -> Result<(), Error> {
        for dir in self.search_order() {
            fs_utils::ensure_dir(dir)?;
        }
        Ok(())
    }

    /// Valida que cada carpeta existe Y es escribible. Si falta, la intenta crear.
    pub fn validate_structure(&self) -> Result<(), Error> {
        for dir in self.search_order() {
            if !dir.exists() {
                fs_utils::ensure_dir(dir)?;
            }
            fs_utils::check_writable(dir)?;
        }
        Ok(())
    }

    /// Orden en el que se buscan nombres relativos.
    pub fn search_order(&self) -> [&Path; 3] {
        [&self.input_dir, &self.output_dir, &self.temp_dir]
    }

    /// Resuelve una ruta tal cual o, si no existe, relativa a input/output/temp.
    pub fn resolve(&self, candidate: impl AsRef<Path>) -> Option<PathBuf> {
        let candidate = candidate.as_ref();
        if candidate.as_os_str().is_empty() {
            return None;
        }
        if candidate.exists() {
            return Some(candidate.to_path_buf());
        }
        if candidate.is_absolute() {
            return None;
        }

        let found = self
            .search_order()
            .into_iter()
            .map(|dir| dir.join(candidate))
            .find(|p| p.exists());

        if let Some(p) = &found {
            debug!(candidate = %candidate.display(), resolved = %p.display(), "resolved host path");
        }
        found
    }

    /// Ruta dentro de la carpeta de entradas.
    pub fn input_path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.input_dir.join(name)
    }
}
