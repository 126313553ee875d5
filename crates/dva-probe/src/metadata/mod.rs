pub mod extract;
pub mod file_info;
pub mod model;

pub use extract::{MetadataReport, Sections};
pub use model::{AudioMetadata, FileInfo, FormatInfo, TechnicalInfo};
