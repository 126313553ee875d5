use std::path::{Path, PathBuf};

use dva_paths::HostDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{audio::SampleBuffer, error::Error};

/// Registro `{file_path, filename}` producido por el nodo de carga.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRecord {
    pub file_path: PathBuf,
    pub filename: String,
}

impl AudioRecord {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        let file_path = file_path.into();
        let filename = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { file_path, filename }
    }

    pub fn is_empty(&self) -> bool {
        self.file_path.as_os_str().is_empty() && self.filename.is_empty()
    }
}

/// Entrada de audio tal como llega del grafo.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioRef {
    Buffer(SampleBuffer),
    Record(AudioRecord),
    Path(PathBuf),
    /// Solo se usa el primer elemento.
    List(Vec<AudioRef>),
}

impl From<SampleBuffer> for AudioRef {
    fn from(buffer: SampleBuffer) -> Self {
        AudioRef::Buffer(buffer)
    }
}

impl From<AudioRecord> for AudioRef {
    fn from(record: AudioRecord) -> Self {
        AudioRef::Record(record)
    }
}

impl From<PathBuf> for AudioRef {
    fn from(path: PathBuf) -> Self {
        AudioRef::Path(path)
    }
}

impl From<&Path> for AudioRef {
    fn from(path: &Path) -> Self {
        AudioRef::Path(path.to_path_buf())
    }
}

impl From<&str> for AudioRef {
    fn from(path: &str) -> Self {
        AudioRef::Path(PathBuf::from(path))
    }
}

/// Resultado de normalizar un [`AudioRef`].
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedAudio<'a> {
    Buffer(&'a SampleBuffer),
    File(PathBuf),
}

impl AudioRef {
    pub fn kind(&self) -> &'static str {
        match self {
            AudioRef::Buffer(_) => "buffer",
            AudioRef::Record(_) => "record",
            AudioRef::Path(_) => "path",
            AudioRef::List(_) => "list",
        }
    }

    /// Normaliza la entrada a un buffer o a una ruta. Las rutas relativas que no
    /// existen tal cual se buscan en las carpetas del host.
    pub fn resolve(&self, dirs: Option<&HostDirs>) -> Result<ResolvedAudio<'_>, Error> {
        match self {
            AudioRef::Buffer(buf) => Ok(ResolvedAudio::Buffer(buf)),
            AudioRef::Path(path) => resolve_path(path, dirs).map(ResolvedAudio::File),
            AudioRef::Record(record) => {
                let candidate = if record.file_path.as_os_str().is_empty() {
                    Path::new(&record.filename)
                } else {
                    record.file_path.as_path()
                };
                resolve_path(candidate, dirs).map(ResolvedAudio::File)
            }
            AudioRef::List(items) => {
                let first = items
                    .first()
                    .ok_or_else(|| Error::UnsupportedInput("empty list".into()))?;
                if items.len() > 1 {
                    debug!(len = items.len(), "audio list has several items, using the first one");
                }
                first.resolve(dirs)
            }
        }
    }
}

fn resolve_path(path: &Path, dirs: Option<&HostDirs>) -> Result<PathBuf, Error> {
    if path.as_os_str().is_empty() {
        return Err(Error::EmptyPath);
    }

    Ok(dirs
        .and_then(|d| d.resolve(path))
        .unwrap_or_else(|| path.to_path_buf()))
}

/// Comprueba que la ruta es un fichero regular no vacío y devuelve su tamaño.
pub fn validate_file(path: &Path) -> Result<u64, Error> {
    if path.as_os_str().is_empty() {
        return Err(Error::EmptyPath);
    }
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    let meta = std::fs::metadata(path)?;
    if !meta.is_file() {
        return Err(Error::NotAFile(path.to_path_buf()));
    }
    if meta.len() == 0 {
        return Err(Error::EmptyFile(path.to_path_buf()));
    }

    Ok(meta.len())
}
