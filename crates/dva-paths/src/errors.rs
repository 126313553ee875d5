use std::{io, path::PathBuf};

/// Errores del crate de rutas del host
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// No se pudo determinar el directorio base (HOME, XDG, etc)
    #[error(
        "Could not determine the host directories, the call to ProjectDirs failed, \
         the system probably does not provide a valid $HOME path."
    )]
    NoHome,

    /// La ruta existe pero no es un directorio
    #[error("Not a directory: {0:?}")]
    NotADirectory(PathBuf),

    /// Error de IO al crear o validar carpetas
    #[error(transparent)]
    Io(#[from] io::Error),
}
