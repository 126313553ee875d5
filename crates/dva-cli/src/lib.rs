use dva_nodes::{OutputSpec, Value};
use dva_probe::audio::AudioRef;
use serde_json::{Map, Value as Json, json};

/// Inicializa `tracing` para el binario. `RUST_LOG` manda; por defecto `info`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Empareja las salidas de un nodo con sus nombres en un objeto JSON. Las
/// salidas JSON y LIST se incrustan ya parseadas.
pub fn outputs_to_json(specs: &[OutputSpec], values: &[Value]) -> Json {
    specs
        .iter()
        .zip(values)
        .map(|(spec, value)| (spec.name.to_string(), value_to_json(value)))
        .collect::<Map<_, _>>()
        .into()
}

fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Audio(audio) => audio_to_json(audio),
        Value::Int(v) => json!(v),
        Value::Float(v) => json!(v),
        Value::Boolean(v) => json!(v),
        Value::String(s) => json!(s),
        Value::Json(s) | Value::List(s) => serde_json::from_str(s).unwrap_or_else(|_| json!(s)),
    }
}

fn audio_to_json(audio: &AudioRef) -> Json {
    match audio {
        AudioRef::Buffer(buf) => json!({"shape": buf.shape(), "sample_rate": buf.sample_rate()}),
        AudioRef::Record(record) => json!({
            "file_path": record.file_path.to_string_lossy(),
            "filename": record.filename,
        }),
        AudioRef::Path(path) => json!(path.to_string_lossy()),
        AudioRef::List(items) => Json::Array(items.iter().map(audio_to_json).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dva_nodes::ValueType;
    use dva_probe::audio::AudioRecord;

    #[test]
    fn embeds_json_outputs() {
        let specs = [
            OutputSpec::new("results", ValueType::Json),
            OutputSpec::new("summary", ValueType::String),
            OutputSpec::new("file_list", ValueType::List),
        ];
        let values = [
            Value::Json("{\"a\":1}".into()),
            Value::from("ok"),
            Value::List("[\"x.wav\"]".into()),
        ];

        assert_eq!(
            outputs_to_json(&specs, &values),
            json!({"results": {"a": 1}, "summary": "ok", "file_list": ["x.wav"]})
        );
    }

    #[test]
    fn broken_json_stays_a_string() {
        let specs = [OutputSpec::new("metadata", ValueType::Json)];
        assert_eq!(
            outputs_to_json(&specs, &[Value::Json("{oops".into())]),
            json!({"metadata": "{oops"})
        );
    }

    #[test]
    fn records_show_path_and_name() {
        let specs = [OutputSpec::new("audio", ValueType::Audio)];
        let record = AudioRef::Record(AudioRecord::new("/in/a.wav"));
        assert_eq!(
            outputs_to_json(&specs, &[Value::Audio(record)]),
            json!({"audio": {"file_path": "/in/a.wav", "filename": "a.wav"}})
        );
    }
}
