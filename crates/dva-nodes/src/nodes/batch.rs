use std::sync::Arc;

use dva_library::{BatchOperation, BatchProcessor, BatchRequest, DEFAULT_PATTERNS};
use dva_probe::pipeline::probe::Probe;

use crate::{
    error::NodeError,
    node::{Inputs, Node},
    nodes::CATEGORY_BATCH,
    schema::{InputKind, InputSchema, OutputSpec},
    value::{Value, ValueType},
};

pub const ID: &str = "DVA_Audio_Batch_Processor";

const OUTPUTS: &[OutputSpec] = &[
    OutputSpec::new("results", ValueType::Json),
    OutputSpec::new("summary", ValueType::String),
    OutputSpec::new("file_list", ValueType::List),
];

pub struct BatchNode {
    probe: Arc<Probe>,
}

impl BatchNode {
    pub fn new(probe: Arc<Probe>) -> Self {
        Self { probe }
    }
}

impl Node for BatchNode {
    fn id(&self) -> &'static str {
        ID
    }

    fn display_name(&self) -> &'static str {
        "DVA 🎵 Audio - Batch Processing"
    }

    fn category(&self) -> &'static str {
        CATEGORY_BATCH
    }

    fn description(&self) -> &'static str {
        "Runs duration and/or metadata extraction over a directory"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .required(
                "directory_path",
                InputKind::String {
                    default: String::new(),
                    multiline: false,
                },
            )
            .required(
                "file_pattern",
                InputKind::String {
                    default: DEFAULT_PATTERNS.to_string(),
                    multiline: false,
                },
            )
            .required(
                "operation",
                InputKind::combo(
                    BatchOperation::ALL.iter().map(|o| o.as_str()),
                    Some(BatchOperation::Both.as_str()),
                ),
            )
            .required("recursive", InputKind::Boolean { default: true })
    }

    fn outputs(&self) -> &'static [OutputSpec] {
        OUTPUTS
    }

    fn run(&self, inputs: &Inputs) -> Result<Vec<Value>, NodeError> {
        let request = BatchRequest {
            patterns: inputs.str("file_pattern")?.to_string(),
            operation: inputs.str("operation")?.parse()?,
            recursive: inputs.bool("recursive")?,
            ..BatchRequest::new(inputs.str("directory_path")?.trim())
        };

        let (results, summary, files) = BatchProcessor::new(&self.probe).run(&request).into_tuple();
        Ok(vec![Value::Json(results), Value::String(summary), Value::List(files)])
    }

    fn error_outputs(&self, message: &str) -> Vec<Value> {
        vec![
            Value::Json("{}".into()),
            Value::String(format!("Error: {message}")),
            Value::List("[]".into()),
        ]
    }
}
