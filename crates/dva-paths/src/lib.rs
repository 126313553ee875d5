//! Crate `dva_paths`: carpetas del host (input/output/temp) y resolución de nombres

mod errors;
mod fs_utils;
mod paths;

pub use errors::Error;
pub use fs_utils::regular_file_len;
pub use paths::{ENV_BASE_DIR, HostDirs};
