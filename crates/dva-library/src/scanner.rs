use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use dva_paths::HostDirs;
use tracing::{debug, instrument, warn, Level};
use walkdir::{DirEntry, WalkDir};

use crate::error::Error;
use crate::extensions::SupportedExtension;
use crate::pattern::PatternSet;

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().map(|s| s.starts_with('.')).unwrap_or(false)
}

/// Ficheros de audio bajo la carpeta de entrada del host, como rutas relativas
/// ordenadas (con `/` como separador).
#[instrument(level = Level::DEBUG, skip(dirs))]
pub fn list_input_files(dirs: &HostDirs) -> Vec<String> {
    list_audio_files(&dirs.input_dir)
}

pub fn list_audio_files(root: &Path) -> Vec<String> {
    if !root.is_dir() {
        warn!(root = %root.display(), "input directory does not exist");
        return Vec::new();
    }

    let mut files: Vec<String> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(|res| match res {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| SupportedExtension::from_path(entry.path()).is_some())
        .filter_map(|entry| {
            entry.path().strip_prefix(root).ok().map(|rel| {
                rel.components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/")
            })
        })
        .collect();

    files.sort();
    files
}

/// Busca ficheros cuyo nombre coincida con algún patrón. El resultado está
/// ordenado y sin duplicados.
///
/// En modo recursivo se recorren también carpetas ocultas; en modo plano un
/// comodín inicial no coincide con ficheros ocultos, como en el shell.
#[instrument(level = Level::DEBUG, skip(patterns), err)]
pub fn find_files(dir: &Path, patterns: &PatternSet, recursive: bool) -> Result<Vec<PathBuf>, Error> {
    if !dir.is_dir() {
        return Err(Error::DirectoryNotFound(dir.to_path_buf()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut found = BTreeSet::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(max_depth) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if !recursive && is_hidden(&entry) {
            let explicit_dot = patterns.patterns().iter().any(|p| p.as_str().starts_with('.'));
            if !explicit_dot {
                continue;
            }
        }

        let Some(name) = entry.file_name().to_str() else {
            debug!(path = %entry.path().display(), "skipping non UTF-8 file name");
            continue;
        };
        if patterns.matches(name) {
            found.insert(entry.into_path());
        }
    }

    debug!(count = found.len(), "files matched");
    Ok(found.into_iter().collect())
}
