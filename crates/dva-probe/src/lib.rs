pub mod analysis;
pub mod audio;
pub mod backend;
pub mod duration;
pub mod error;
pub mod format;
pub mod metadata;
pub mod pipeline;

pub use error::Error;

pub mod prelude {
    pub use crate::audio::{AudioRecord, AudioRef, ResolvedAudio, SampleBuffer};
    pub use crate::backend::{BackendKind, CalculationMode, Capabilities, DependencyStatus};
    pub use crate::duration::{DurationReport, DurationRequest};
    pub use crate::format::{adaptive_total, format_duration, round_to};
    pub use crate::metadata::{AudioMetadata, MetadataReport, Sections};
    pub use crate::pipeline::{
        config::ProbeConfig,
        probe::{Probe, ProbeBuilder},
    };
}
