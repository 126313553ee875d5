use std::{collections::BTreeMap, sync::Arc};

use dva_probe::{backend::DependencyStatus, pipeline::probe::Probe};
use tracing::{Level, info, instrument};

use crate::{
    config::PluginConfig,
    error::{ConfigError, NodeError},
    nodes::register_all,
    registry::NodeRegistry,
    value::Value,
    welcome,
};

/// Plugin cargado: configuración, backends detectados y registro de nodos.
pub struct Plugin {
    probe: Arc<Probe>,
    registry: NodeRegistry,
    dependencies: Vec<DependencyStatus>,
}

impl Plugin {
    /// Prepara las carpetas del host, detecta backends y registra los nodos.
    #[instrument(skip_all, level = Level::DEBUG, err)]
    pub fn load(config: PluginConfig) -> Result<Self, ConfigError> {
        let dirs = config.host_dirs()?;
        let probe = Probe::builder().config(config.probe.clone()).host_dirs(dirs).build();

        let plugin = Self::with_probe(probe);
        if config.welcome {
            info!("{}", plugin.welcome());
        }
        Ok(plugin)
    }

    pub fn with_probe(probe: Probe) -> Self {
        let probe = Arc::new(probe);
        let dependencies = probe.dependency_report();

        let mut registry = NodeRegistry::new();
        register_all(&mut registry, probe.clone());
        info!(nodes = registry.len(), caps = ?probe.capabilities(), "plugin loaded");

        Self {
            probe,
            registry,
            dependencies,
        }
    }

    pub fn probe(&self) -> &Probe {
        &self.probe
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn dependencies(&self) -> &[DependencyStatus] {
        &self.dependencies
    }

    pub fn welcome(&self) -> String {
        welcome::render(&self.registry, &self.dependencies)
    }

    pub fn invoke(&self, id: &str, inputs: BTreeMap<String, Value>) -> Result<Vec<Value>, NodeError> {
        self.registry.invoke(id, inputs)
    }
}
