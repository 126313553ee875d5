use std::collections::BTreeMap;

use dva_probe::audio::AudioRef;
use tracing::debug;

use crate::{
    error::NodeError,
    schema::{InputKind, InputSchema, OutputSpec},
    value::{Value, ValueType},
};

/// Unidad de cálculo registrable en el host.
pub trait Node: Send + Sync {
    /// Identificador interno, estable entre versiones.
    fn id(&self) -> &'static str;

    fn display_name(&self) -> &'static str;

    fn category(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn input_schema(&self) -> InputSchema;

    /// Esquema con el que se validan las entradas al invocar. Por defecto el
    /// mismo que se publica; un nodo cuyas opciones son caras de listar puede
    /// relajarlo y validar en [`Node::run`].
    fn binding_schema(&self) -> InputSchema {
        self.input_schema()
    }

    fn outputs(&self) -> &'static [OutputSpec];

    /// Ejecuta el nodo con entradas ya validadas. La longitud del resultado
    /// coincide con [`Node::outputs`].
    fn run(&self, inputs: &Inputs) -> Result<Vec<Value>, NodeError>;

    /// Tupla uniforme que se devuelve cuando algo falla.
    fn error_outputs(&self, message: &str) -> Vec<Value>;
}

/// Entradas de una invocación tras aplicar defaults y comprobar tipos.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs {
    values: BTreeMap<String, Value>,
}

impl Inputs {
    pub fn bind(schema: &InputSchema, mut provided: BTreeMap<String, Value>) -> Result<Self, NodeError> {
        let mut values = BTreeMap::new();

        for (spec, required) in schema.iter() {
            let value = match provided.remove(spec.name) {
                Some(v) => check(spec.name, &spec.kind, v)?,
                None => match spec.kind.default_value() {
                    Some(d) => d,
                    None if required => return Err(NodeError::MissingInput(spec.name.to_string())),
                    None => continue,
                },
            };
            values.insert(spec.name.to_string(), value);
        }

        for extra in provided.keys() {
            debug!(input = %extra, "ignoring undeclared input");
        }

        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Result<&Value, NodeError> {
        self.values
            .get(name)
            .ok_or_else(|| NodeError::MissingInput(name.to_string()))
    }

    pub fn audio(&self, name: &str) -> Result<&AudioRef, NodeError> {
        let v = self.get(name)?;
        v.as_audio().ok_or_else(|| mismatch(name, ValueType::Audio, v))
    }

    pub fn int(&self, name: &str) -> Result<i64, NodeError> {
        let v = self.get(name)?;
        v.as_int().ok_or_else(|| mismatch(name, ValueType::Int, v))
    }

    pub fn float(&self, name: &str) -> Result<f64, NodeError> {
        let v = self.get(name)?;
        v.as_float().ok_or_else(|| mismatch(name, ValueType::Float, v))
    }

    pub fn bool(&self, name: &str) -> Result<bool, NodeError> {
        let v = self.get(name)?;
        v.as_bool().ok_or_else(|| mismatch(name, ValueType::Boolean, v))
    }

    pub fn str(&self, name: &str) -> Result<&str, NodeError> {
        let v = self.get(name)?;
        v.as_str().ok_or_else(|| mismatch(name, ValueType::String, v))
    }
}

fn mismatch(name: &str, expected: ValueType, found: &Value) -> NodeError {
    NodeError::InvalidType {
        name: name.to_string(),
        expected,
        found: found.value_type(),
    }
}

fn check(name: &str, kind: &InputKind, value: Value) -> Result<Value, NodeError> {
    let expected = kind.value_type();
    if !value.fits(expected) {
        return Err(mismatch(name, expected, &value));
    }

    match (kind, value) {
        (InputKind::Float { .. }, Value::Int(i)) => Ok(Value::Float(i as f64)),
        (InputKind::Combo { options, .. }, Value::String(s)) => {
            if options.iter().any(|o| o == &s) {
                Ok(Value::String(s))
            } else {
                Err(NodeError::InvalidOption {
                    name: name.to_string(),
                    value: s,
                })
            }
        }
        (_, v) => Ok(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> InputSchema {
        InputSchema::new()
            .required("audio", InputKind::Audio)
            .required("mode", InputKind::combo(["fast", "auto"], Some("auto")))
            .optional(
                "threshold",
                InputKind::Float {
                    default: -60.0,
                    min: -100.0,
                    max: 0.0,
                    step: 1.0,
                },
            )
    }

    fn provided(pairs: Vec<(&str, Value)>) -> BTreeMap<String, Value> {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn defaults_fill_missing_inputs() {
        let inputs = Inputs::bind(&schema(), provided(vec![("audio", AudioRef::from("a.wav").into())])).unwrap();
        assert_eq!(inputs.str("mode").unwrap(), "auto");
        assert_eq!(inputs.float("threshold").unwrap(), -60.0);
    }

    #[test]
    fn missing_audio_is_reported() {
        let err = Inputs::bind(&schema(), BTreeMap::new()).unwrap_err();
        assert!(matches!(err, NodeError::MissingInput(n) if n == "audio"));
    }

    #[test]
    fn int_is_promoted_in_float_slot() {
        let inputs = Inputs::bind(
            &schema(),
            provided(vec![("audio", AudioRef::from("a.wav").into()), ("threshold", Value::Int(-40))]),
        )
        .unwrap();
        assert_eq!(inputs.get("threshold").unwrap(), &Value::Float(-40.0));
    }

    #[test]
    fn wrong_type_and_unknown_option() {
        let err = Inputs::bind(&schema(), provided(vec![("audio", Value::Int(1))])).unwrap_err();
        assert!(matches!(
            err,
            NodeError::InvalidType {
                expected: ValueType::Audio,
                found: ValueType::Int,
                ..
            }
        ));

        let err = Inputs::bind(
            &schema(),
            provided(vec![("audio", AudioRef::from("a.wav").into()), ("mode", "slow".into())]),
        )
        .unwrap_err();
        assert!(matches!(err, NodeError::InvalidOption { value, .. } if value == "slow"));
    }
}
