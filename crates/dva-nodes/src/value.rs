//! Valores que viajan entre nodos.

use std::fmt;

use dva_probe::audio::AudioRef;
use serde::Serialize;

/// Tipos de socket que entiende el host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValueType {
    Audio,
    Int,
    Float,
    Boolean,
    String,
    Combo,
    Json,
    List,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Audio => "AUDIO",
            ValueType::Int => "INT",
            ValueType::Float => "FLOAT",
            ValueType::Boolean => "BOOLEAN",
            ValueType::String => "STRING",
            ValueType::Combo => "COMBO",
            ValueType::Json => "JSON",
            ValueType::List => "LIST",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Audio(AudioRef),
    Int(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    /// Documento JSON ya serializado.
    Json(String),
    /// Array JSON serializado.
    List(String),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Audio(_) => ValueType::Audio,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Boolean(_) => ValueType::Boolean,
            Value::String(_) => ValueType::String,
            Value::Json(_) => ValueType::Json,
            Value::List(_) => ValueType::List,
        }
    }

    /// `true` si el valor sirve para un socket de tipo `ty`. Un entero vale
    /// como flotante y un texto como opción de un combo.
    pub fn fits(&self, ty: ValueType) -> bool {
        matches!(
            (self, ty),
            (Value::Audio(_), ValueType::Audio)
                | (Value::Int(_), ValueType::Int | ValueType::Float)
                | (Value::Float(_), ValueType::Float)
                | (Value::Boolean(_), ValueType::Boolean)
                | (Value::String(_), ValueType::String | ValueType::Combo)
                | (Value::Json(_), ValueType::Json)
                | (Value::List(_), ValueType::List)
        )
    }

    pub fn as_audio(&self) -> Option<&AudioRef> {
        match self {
            Value::Audio(audio) => Some(audio),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Json(s) | Value::List(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Audio(audio) => write!(f, "<audio {}>", audio.kind()),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::String(s) | Value::Json(s) | Value::List(s) => f.write_str(s),
        }
    }
}

impl From<AudioRef> for Value {
    fn from(audio: AudioRef) -> Self {
        Value::Audio(audio)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_coerces_to_float_but_not_back() {
        assert_eq!(Value::Int(3).as_float(), Some(3.0));
        assert_eq!(Value::Float(3.0).as_int(), None);
        assert!(Value::Int(3).fits(ValueType::Float));
        assert!(!Value::Float(3.0).fits(ValueType::Int));
    }

    #[test]
    fn strings_fit_combos() {
        assert!(Value::from("auto").fits(ValueType::Combo));
        assert!(!Value::Json("{}".into()).fits(ValueType::String));
    }

    #[test]
    fn display_shows_raw_text() {
        assert_eq!(Value::Json("{\"a\":1}".into()).to_string(), "{\"a\":1}");
        assert_eq!(Value::from(AudioRef::from("x.wav")).to_string(), "<audio path>");
    }
}
