pub mod batch;
pub mod error;
pub mod extensions;
pub mod pattern;
pub mod scanner;

pub use batch::{BatchOperation, BatchOutput, BatchProcessor, BatchReport, BatchRequest, FileResult, FileStatus};
pub use error::Error;
pub use extensions::SupportedExtension;
pub use pattern::{DEFAULT_PATTERNS, FilePattern, PatternSet};
pub use scanner::{find_files, list_audio_files, list_input_files};
