//! Los cuatro nodos del plugin.

mod batch;
mod duration;
mod load;
mod metadata;

use std::sync::Arc;

use dva_probe::pipeline::probe::Probe;

use crate::registry::NodeRegistry;

pub use batch::BatchNode;
pub use duration::DurationNode;
pub use load::LoadAudioNode;
pub use metadata::MetadataNode;

pub const CATEGORY_INPUT: &str = "🎵 Audio/Input";
pub const CATEGORY_ANALYSIS: &str = "🎵 Audio/Analysis";
pub const CATEGORY_BATCH: &str = "🎵 Audio/Batch";

/// Registra todos los nodos compartiendo el mismo [`Probe`].
pub fn register_all(registry: &mut NodeRegistry, probe: Arc<Probe>) {
    registry.register(Arc::new(LoadAudioNode::new(probe.clone())));
    registry.register(Arc::new(DurationNode::new(probe.clone())));
    registry.register(Arc::new(MetadataNode::new(probe.clone())));
    registry.register(Arc::new(BatchNode::new(probe)));
}
