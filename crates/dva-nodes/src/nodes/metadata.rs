use std::sync::Arc;

use dva_probe::{metadata::Sections, pipeline::probe::Probe};

use crate::{
    error::NodeError,
    node::{Inputs, Node},
    nodes::CATEGORY_ANALYSIS,
    schema::{InputKind, InputSchema, OutputSpec},
    value::{Value, ValueType},
};

pub const ID: &str = "DVA_Audio_Metadata_Extractor";

const OUTPUTS: &[OutputSpec] = &[
    OutputSpec::new("metadata", ValueType::Json),
    OutputSpec::new("summary", ValueType::String),
    OutputSpec::new("format", ValueType::String),
    OutputSpec::new("duration", ValueType::Float),
];

pub struct MetadataNode {
    probe: Arc<Probe>,
}

impl MetadataNode {
    pub fn new(probe: Arc<Probe>) -> Self {
        Self { probe }
    }
}

impl Node for MetadataNode {
    fn id(&self) -> &'static str {
        ID
    }

    fn display_name(&self) -> &'static str {
        "DVA 🎵 Audio - Metadata Extraction"
    }

    fn category(&self) -> &'static str {
        CATEGORY_ANALYSIS
    }

    fn description(&self) -> &'static str {
        "Extracts file, format, technical and tag metadata"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .required("audio", InputKind::Audio)
            .required("extract_format", InputKind::Boolean { default: true })
            .required("extract_technical", InputKind::Boolean { default: true })
            .required("extract_tags", InputKind::Boolean { default: false })
    }

    fn outputs(&self) -> &'static [OutputSpec] {
        OUTPUTS
    }

    fn run(&self, inputs: &Inputs) -> Result<Vec<Value>, NodeError> {
        let sections = Sections::from_toggles(
            inputs.bool("extract_format")?,
            inputs.bool("extract_technical")?,
            inputs.bool("extract_tags")?,
        );
        let (metadata, summary, format, duration) = self.probe.metadata(inputs.audio("audio")?, sections).into_tuple();

        Ok(vec![
            Value::Json(metadata),
            Value::String(summary),
            Value::String(format),
            Value::Float(duration),
        ])
    }

    fn error_outputs(&self, message: &str) -> Vec<Value> {
        vec![
            Value::Json("{}".into()),
            Value::String(format!("Error: {message}")),
            Value::String("error".into()),
            Value::Float(0.0),
        ]
    }
}
