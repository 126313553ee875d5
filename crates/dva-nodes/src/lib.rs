//! Crate `dva_nodes`: contrato con el host (nodos, esquemas, registro) y carga
//! del plugin.

pub mod config;
pub mod error;
pub mod node;
pub mod nodes;
pub mod plugin;
pub mod registry;
pub mod schema;
pub mod value;
pub mod welcome;

pub use config::{PluginConfig, PluginConfigBuilder};
pub use error::{ConfigError, NodeError};
pub use node::{Inputs, Node};
pub use plugin::Plugin;
pub use registry::{NodeInfo, NodeRegistry};
pub use schema::{InputKind, InputSchema, InputSpec, OutputSpec};
pub use value::{Value, ValueType};
