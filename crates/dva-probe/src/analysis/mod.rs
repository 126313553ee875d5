pub mod silence;

pub use silence::{SilenceError, SilenceReport, analyze_buffer, analyze_stream};
