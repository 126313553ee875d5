use std::sync::Arc;

use dva_probe::{
    analysis::silence::{DEFAULT_THRESHOLD_DB, MAX_THRESHOLD_DB, MIN_THRESHOLD_DB},
    backend::CalculationMode,
    duration::DurationRequest,
    format::{MAX_PRECISION, format_duration},
    pipeline::probe::Probe,
};

use crate::{
    error::NodeError,
    node::{Inputs, Node},
    nodes::CATEGORY_ANALYSIS,
    schema::{InputKind, InputSchema, OutputSpec},
    value::{Value, ValueType},
};

pub const ID: &str = "DVA_Audio_Duration_Calculator";

const OUTPUTS: &[OutputSpec] = &[
    OutputSpec::new("duration_seconds", ValueType::Float),
    OutputSpec::new("duration_formatted", ValueType::String),
    OutputSpec::new("status", ValueType::String),
    OutputSpec::new("metadata", ValueType::Json),
];

pub struct DurationNode {
    probe: Arc<Probe>,
}

impl DurationNode {
    pub fn new(probe: Arc<Probe>) -> Self {
        Self { probe }
    }

    fn request(inputs: &Inputs) -> Result<DurationRequest, NodeError> {
        let mode: CalculationMode = inputs.str("calculation_mode")?.parse()?;
        let precision = inputs.int("time_precision")?.clamp(0, i64::from(MAX_PRECISION)) as u8;

        Ok(DurationRequest {
            mode,
            precision,
            include_silence: inputs.bool("include_silence")?,
            silence_threshold_db: inputs.float("silence_threshold_db")?,
        })
    }
}

impl Node for DurationNode {
    fn id(&self) -> &'static str {
        ID
    }

    fn display_name(&self) -> &'static str {
        "DVA 🎵 Audio - Duration Analysis"
    }

    fn category(&self) -> &'static str {
        CATEGORY_ANALYSIS
    }

    fn description(&self) -> &'static str {
        "Computes the duration of an audio buffer or file"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .required("audio", InputKind::Audio)
            .required(
                "calculation_mode",
                InputKind::combo(
                    CalculationMode::ALL.iter().map(|m| m.as_str()),
                    Some(CalculationMode::Auto.as_str()),
                ),
            )
            .required(
                "time_precision",
                InputKind::Int {
                    default: 3,
                    min: 0,
                    max: i64::from(MAX_PRECISION),
                    step: 1,
                },
            )
            .optional("include_silence", InputKind::Boolean { default: true })
            .optional(
                "silence_threshold_db",
                InputKind::Float {
                    default: DEFAULT_THRESHOLD_DB,
                    min: MIN_THRESHOLD_DB,
                    max: MAX_THRESHOLD_DB,
                    step: 1.0,
                },
            )
    }

    fn outputs(&self) -> &'static [OutputSpec] {
        OUTPUTS
    }

    fn run(&self, inputs: &Inputs) -> Result<Vec<Value>, NodeError> {
        let request = Self::request(inputs)?;
        let (seconds, formatted, status, metadata) = self
            .probe
            .duration(inputs.audio("audio")?, &request)
            .into_tuple();

        Ok(vec![
            Value::Float(seconds),
            Value::String(formatted),
            Value::String(status),
            Value::Json(metadata),
        ])
    }

    fn error_outputs(&self, message: &str) -> Vec<Value> {
        vec![
            Value::Float(0.0),
            Value::String(format_duration(0.0)),
            Value::String(format!("error: {message}")),
            Value::Json("{}".into()),
        ]
    }
}
