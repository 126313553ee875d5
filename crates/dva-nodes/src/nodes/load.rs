use std::{
    path::{Component, Path},
    sync::Arc,
};

use dva_library::{SupportedExtension, list_input_files};
use dva_paths::regular_file_len;
use dva_probe::{
    audio::{AudioRecord, AudioRef},
    pipeline::probe::Probe,
};
use tracing::{error, info};

use crate::{
    error::NodeError,
    node::{Inputs, Node},
    nodes::CATEGORY_INPUT,
    schema::{InputKind, InputSchema, OutputSpec},
    value::{Value, ValueType},
};

pub const ID: &str = "DVA_Load_Audio_File";

const OUTPUTS: &[OutputSpec] = &[
    OutputSpec::new("audio", ValueType::Audio),
    OutputSpec::new("file_path", ValueType::String),
];

/// Elige un fichero de la carpeta de entrada y lo entrega como registro.
pub struct LoadAudioNode {
    probe: Arc<Probe>,
}

impl LoadAudioNode {
    pub fn new(probe: Arc<Probe>) -> Self {
        Self { probe }
    }

    fn empty() -> Vec<Value> {
        vec![
            Value::Audio(AudioRef::Record(AudioRecord::default())),
            Value::String(String::new()),
        ]
    }
}

impl Node for LoadAudioNode {
    fn id(&self) -> &'static str {
        ID
    }

    fn display_name(&self) -> &'static str {
        "DVA 🎵 Audio - Load File"
    }

    fn category(&self) -> &'static str {
        CATEGORY_INPUT
    }

    fn description(&self) -> &'static str {
        "Loads an audio file from the input directory"
    }

    fn input_schema(&self) -> InputSchema {
        let options = self.probe.dirs().map(list_input_files).unwrap_or_default();
        InputSchema::new().required(
            "audio_file",
            InputKind::Combo {
                options,
                default: None,
                audio_upload: true,
            },
        )
    }

    /// Al invocar no se recorre la carpeta de entrada: el nombre se comprueba
    /// directamente contra el disco en `run`.
    fn binding_schema(&self) -> InputSchema {
        InputSchema::new().required(
            "audio_file",
            InputKind::String {
                default: String::new(),
                multiline: false,
            },
        )
    }

    fn outputs(&self) -> &'static [OutputSpec] {
        OUTPUTS
    }

    fn run(&self, inputs: &Inputs) -> Result<Vec<Value>, NodeError> {
        let name = inputs.str("audio_file")?;
        let Some(dirs) = self.probe.dirs() else {
            error!(file = name, "host directories are not configured");
            return Ok(Self::empty());
        };

        // solo nombres relativos dentro de la carpeta de entrada
        let inside_input = Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if name.is_empty() || !inside_input {
            error!(file = name, "audio file is outside the input directory");
            return Ok(Self::empty());
        }
        if SupportedExtension::from_path(Path::new(name)).is_none() {
            error!(file = name, "not a supported audio file");
            return Ok(Self::empty());
        }

        let path = dirs.input_path(name);
        let Some(size_bytes) = regular_file_len(&path) else {
            error!(path = %path.display(), "audio file not found");
            return Ok(Self::empty());
        };

        info!(path = %path.display(), size_bytes, "audio file loaded");
        let file_path = path.to_string_lossy().into_owned();
        Ok(vec![
            Value::Audio(AudioRef::Record(AudioRecord::new(path))),
            Value::String(file_path),
        ])
    }

    fn error_outputs(&self, _message: &str) -> Vec<Value> {
        Self::empty()
    }
}
