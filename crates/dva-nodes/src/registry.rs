//! Registro de nodos: identificador → implementación, y un mapa paralelo de
//! nombres visibles.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use serde::Serialize;
use serde_json::Value as Json;
use tracing::{Level, debug, instrument, warn};

use crate::{
    error::NodeError,
    node::{Inputs, Node},
    value::{Value, ValueType},
};

/// Resumen serializable de un nodo registrado.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInfo {
    pub id: &'static str,
    pub display_name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub input: Json,
    pub output: Vec<ValueType>,
    pub output_name: Vec<&'static str>,
}

#[derive(Clone, Default)]
pub struct NodeRegistry {
    nodes: BTreeMap<&'static str, Arc<dyn Node>>,
    display_names: BTreeMap<&'static str, &'static str>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra un nodo. Un identificador repetido sustituye al anterior.
    pub fn register(&mut self, node: Arc<dyn Node>) {
        let id = node.id();
        if self.nodes.contains_key(id) {
            warn!(node = id, "node registered twice, replacing");
        }
        self.display_names.insert(id, node.display_name());
        self.nodes.insert(id, node);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Node>> {
        self.nodes.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.nodes.keys().copied()
    }

    pub fn display_names(&self) -> &BTreeMap<&'static str, &'static str> {
        &self.display_names
    }

    pub fn categories(&self) -> BTreeSet<&'static str> {
        self.nodes.values().map(|n| n.category()).collect()
    }

    pub fn info(&self) -> Vec<NodeInfo> {
        self.nodes
            .values()
            .map(|n| NodeInfo {
                id: n.id(),
                display_name: n.display_name(),
                category: n.category(),
                description: n.description(),
                input: n.input_schema().to_json(),
                output: n.outputs().iter().map(|o| o.ty).collect(),
                output_name: n.outputs().iter().map(|o| o.name).collect(),
            })
            .collect()
    }

    /// Invoca un nodo con entradas con nombre. Los fallos de validación y de
    /// ejecución se convierten en la tupla de error del nodo; solo un
    /// identificador desconocido sale como `Err`.
    #[instrument(level = Level::DEBUG, skip(self, inputs))]
    pub fn invoke(&self, id: &str, inputs: BTreeMap<String, Value>) -> Result<Vec<Value>, NodeError> {
        let node = self.get(id).ok_or_else(|| NodeError::UnknownNode(id.to_string()))?;

        let outputs = Inputs::bind(&node.binding_schema(), inputs).and_then(|bound| node.run(&bound));
        match outputs {
            Ok(values) => {
                debug!(node = id, outputs = values.len(), "node finished");
                Ok(values)
            }
            Err(e) => {
                warn!(node = id, error = %e, "node failed");
                Ok(node.error_outputs(&e.to_string()))
            }
        }
    }
}
