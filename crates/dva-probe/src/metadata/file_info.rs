use std::{fs, io, path::Path, time::SystemTime};

use chrono::{DateTime, Local};

use crate::{
    error::Error,
    metadata::model::{FileInfo, bytes_to_mb},
};

impl FileInfo {
    /// Lee tamaño y fecha de modificación del sistema de ficheros.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let metadata = fs::metadata(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                Error::NotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;

        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            path: Some(path.to_string_lossy().into_owned()),
            name,
            size_bytes: metadata.len(),
            size_mb: Some(bytes_to_mb(metadata.len())),
            modified: metadata.modified().ok().map(local_iso),
        })
    }

    /// Sección sintética para buffers en memoria.
    pub fn for_buffer(size_bytes: u64) -> Self {
        Self {
            path: None,
            name: "audio_tensor".to_string(),
            size_bytes,
            size_mb: Some(bytes_to_mb(size_bytes)),
            modified: None,
        }
    }
}

fn local_iso(time: SystemTime) -> String {
    let local: DateTime<Local> = time.into();
    local.naive_local().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
