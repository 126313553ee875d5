//! Declaración de entradas y salidas de un nodo.
//!
//! El JSON que produce [`InputSchema::to_json`] sigue la forma que espera el
//! host: `{"required": {nombre: [TIPO, {opciones}]}, "optional": {...}}`. Los
//! combos van como `[[op1, op2, ...], {opciones}]`.

use serde_json::{Map, Value as Json, json};

use crate::value::{Value, ValueType};

#[derive(Debug, Clone, PartialEq)]
pub enum InputKind {
    Audio,
    Int {
        default: i64,
        min: i64,
        max: i64,
        step: i64,
    },
    Float {
        default: f64,
        min: f64,
        max: f64,
        step: f64,
    },
    Boolean {
        default: bool,
    },
    String {
        default: String,
        multiline: bool,
    },
    Combo {
        options: Vec<String>,
        default: Option<String>,
        /// El host muestra un botón de subida de audio junto al selector.
        audio_upload: bool,
    },
}

impl InputKind {
    pub fn combo<I, S>(options: I, default: Option<&str>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        InputKind::Combo {
            options: options.into_iter().map(Into::into).collect(),
            default: default.map(str::to_string),
            audio_upload: false,
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            InputKind::Audio => ValueType::Audio,
            InputKind::Int { .. } => ValueType::Int,
            InputKind::Float { .. } => ValueType::Float,
            InputKind::Boolean { .. } => ValueType::Boolean,
            InputKind::String { .. } => ValueType::String,
            InputKind::Combo { .. } => ValueType::Combo,
        }
    }

    /// Valor usado cuando la entrada no llega. Un combo sin default toma su
    /// primera opción.
    pub fn default_value(&self) -> Option<Value> {
        match self {
            InputKind::Audio => None,
            InputKind::Int { default, .. } => Some(Value::Int(*default)),
            InputKind::Float { default, .. } => Some(Value::Float(*default)),
            InputKind::Boolean { default } => Some(Value::Boolean(*default)),
            InputKind::String { default, .. } => Some(Value::String(default.clone())),
            InputKind::Combo { options, default, .. } => default
                .as_ref()
                .or_else(|| options.first())
                .map(|s| Value::String(s.clone())),
        }
    }

    fn to_json(&self) -> Json {
        match self {
            InputKind::Audio => json!([ValueType::Audio.as_str()]),
            InputKind::Int {
                default,
                min,
                max,
                step,
            } => json!([
                ValueType::Int.as_str(),
                {"default": default, "min": min, "max": max, "step": step}
            ]),
            InputKind::Float {
                default,
                min,
                max,
                step,
            } => json!([
                ValueType::Float.as_str(),
                {"default": default, "min": min, "max": max, "step": step}
            ]),
            InputKind::Boolean { default } => json!([ValueType::Boolean.as_str(), {"default": default}]),
            InputKind::String { default, multiline } => json!([
                ValueType::String.as_str(),
                {"default": default, "multiline": multiline}
            ]),
            InputKind::Combo {
                options,
                default,
                audio_upload,
            } => {
                let mut opts = Map::new();
                if let Some(d) = default {
                    opts.insert("default".into(), json!(d));
                }
                if *audio_upload {
                    opts.insert("audio_upload".into(), json!(true));
                }
                json!([options, opts])
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputSpec {
    pub name: &'static str,
    pub kind: InputKind,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSchema {
    pub required: Vec<InputSpec>,
    pub optional: Vec<InputSpec>,
}

impl InputSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, name: &'static str, kind: InputKind) -> Self {
        self.required.push(InputSpec { name, kind });
        self
    }

    pub fn optional(mut self, name: &'static str, kind: InputKind) -> Self {
        self.optional.push(InputSpec { name, kind });
        self
    }

    /// Todas las entradas, primero las obligatorias.
    pub fn iter(&self) -> impl Iterator<Item = (&InputSpec, bool)> {
        self.required
            .iter()
            .map(|s| (s, true))
            .chain(self.optional.iter().map(|s| (s, false)))
    }

    pub fn get(&self, name: &str) -> Option<&InputSpec> {
        self.iter().map(|(s, _)| s).find(|s| s.name == name)
    }

    pub fn to_json(&self) -> Json {
        let section = |specs: &[InputSpec]| {
            specs
                .iter()
                .map(|s| (s.name.to_string(), s.kind.to_json()))
                .collect::<Map<_, _>>()
        };

        let mut out = Map::new();
        out.insert("required".into(), Json::Object(section(&self.required)));
        if !self.optional.is_empty() {
            out.insert("optional".into(), Json::Object(section(&self.optional)));
        }
        Json::Object(out)
    }
}

/// Salida con nombre y tipo fijos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSpec {
    pub name: &'static str,
    pub ty: ValueType,
}

impl OutputSpec {
    pub const fn new(name: &'static str, ty: ValueType) -> Self {
        Self { name, ty }
    }
}
