use std::{collections::BTreeMap, fs, path::Path};

use dva_nodes::{Plugin, Value};
use dva_paths::HostDirs;
use dva_probe::{
    audio::{AudioRecord, AudioRef, SampleBuffer},
    backend::Capabilities,
    pipeline::probe::Probe,
};
use tempfile::TempDir;

fn write_silent_wav(path: &Path, sample_rate: u32, frames: u32) {
    let data_len = frames * 2;
    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVEfmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.resize(out.len() + data_len as usize, 0);
    fs::write(path, out).unwrap();
}

fn plugin() -> (TempDir, HostDirs, Plugin) {
    let tmp = tempfile::tempdir().unwrap();
    let dirs = HostDirs::with_base(tmp.path()).unwrap();
    let probe = Probe::builder()
        .capabilities(Capabilities::compiled())
        .host_dirs(dirs.clone())
        .build();
    (tmp, dirs, Plugin::with_probe(probe))
}

fn inputs(pairs: Vec<(&str, Value)>) -> BTreeMap<String, Value> {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[test]
fn registers_the_four_nodes() {
    let (_tmp, _dirs, plugin) = plugin();
    let ids: Vec<_> = plugin.registry().ids().collect();
    assert_eq!(
        ids,
        vec![
            "DVA_Audio_Batch_Processor",
            "DVA_Audio_Duration_Calculator",
            "DVA_Audio_Metadata_Extractor",
            "DVA_Load_Audio_File",
        ]
    );
    assert_eq!(plugin.registry().categories().len(), 3);

    let info = plugin.registry().info();
    let duration = info.iter().find(|i| i.id == "DVA_Audio_Duration_Calculator").unwrap();
    assert_eq!(
        duration.output_name,
        vec!["duration_seconds", "duration_formatted", "status", "metadata"]
    );
    assert_eq!(duration.input["required"]["calculation_mode"][1]["default"], "auto");
    assert_eq!(duration.input["optional"]["silence_threshold_db"][1]["min"], -100.0);
}

#[test]
fn duration_of_a_mono_buffer() {
    let (_tmp, _dirs, plugin) = plugin();
    let audio = AudioRef::from(SampleBuffer::mono(vec![0.0; 24_000]));

    let out = plugin
        .invoke("DVA_Audio_Duration_Calculator", inputs(vec![("audio", audio.into())]))
        .unwrap();

    assert_eq!(out[0], Value::Float(1.0));
    assert_eq!(out[1], Value::from("00:01.000"));
    assert_eq!(out[2], Value::from("success"));
    let meta: serde_json::Value = serde_json::from_str(out[3].as_str().unwrap()).unwrap();
    assert_eq!(meta["calculation_method"], "tensor_direct");
    assert_eq!(meta["sample_rate"], 24_000);
}

#[test]
fn precision_above_six_is_clamped() {
    let (_tmp, _dirs, plugin) = plugin();
    let audio = AudioRef::from(SampleBuffer::mono(vec![0.0]).with_sample_rate(3));

    let out = plugin
        .invoke(
            "DVA_Audio_Duration_Calculator",
            inputs(vec![("audio", audio.into()), ("time_precision", Value::Int(9))]),
        )
        .unwrap();
    assert_eq!(out[0], Value::Float(0.333333));
}

#[test]
fn duration_errors_use_the_uniform_tuple() {
    let (_tmp, _dirs, plugin) = plugin();

    let out = plugin
        .invoke(
            "DVA_Audio_Duration_Calculator",
            inputs(vec![("audio", AudioRef::from("/no/such/file.wav").into())]),
        )
        .unwrap();
    assert_eq!(out[0], Value::Float(0.0));
    assert_eq!(out[1], Value::from("00:00:00.000"));
    assert!(out[2].as_str().unwrap().starts_with("error: "));
    assert_eq!(out[3], Value::Json("{}".into()));

    let out = plugin
        .invoke(
            "DVA_Audio_Duration_Calculator",
            inputs(vec![
                ("audio", AudioRef::from("/no/such/file.wav").into()),
                ("calculation_mode", "slow".into()),
            ]),
        )
        .unwrap();
    assert_eq!(out[2], Value::from("error: input `calculation_mode` does not accept `slow`"));

    let out = plugin
        .invoke("DVA_Audio_Duration_Calculator", BTreeMap::new())
        .unwrap();
    assert_eq!(out[2], Value::from("error: missing required input `audio`"));
}

#[test]
fn duration_of_a_wav_in_the_input_dir() {
    let (_tmp, dirs, plugin) = plugin();
    write_silent_wav(&dirs.input_path("clip.wav"), 8000, 12_000);

    let out = plugin
        .invoke(
            "DVA_Audio_Duration_Calculator",
            inputs(vec![("audio", AudioRef::from("clip.wav").into())]),
        )
        .unwrap();

    if !Capabilities::compiled().contains(Capabilities::DECODE) {
        assert_eq!(out[2], Value::from("error: no duration backend available"));
    } else {
        assert_eq!(out[0], Value::Float(1.5));
        assert_eq!(out[2], Value::from("success"));
    }
}

#[test]
fn metadata_with_every_section_off() {
    let (tmp, _dirs, plugin) = plugin();
    let path = tmp.path().join("tone.wav");
    write_silent_wav(&path, 8000, 8000);

    let out = plugin
        .invoke(
            "DVA_Audio_Metadata_Extractor",
            inputs(vec![
                ("audio", AudioRef::from(path.as_path()).into()),
                ("extract_format", false.into()),
                ("extract_technical", false.into()),
                ("extract_tags", false.into()),
            ]),
        )
        .unwrap();

    let meta: serde_json::Value = serde_json::from_str(out[0].as_str().unwrap()).unwrap();
    let keys: Vec<_> = meta.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["file_info"]);
    assert_eq!(meta["file_info"]["name"], "tone.wav");
    assert!(out[1].as_str().unwrap().starts_with("tone.wav ("));
}

#[test]
fn metadata_of_a_missing_record() {
    let (_tmp, _dirs, plugin) = plugin();
    let audio = AudioRef::Record(AudioRecord::default());

    let out = plugin
        .invoke("DVA_Audio_Metadata_Extractor", inputs(vec![("audio", audio.into())]))
        .unwrap();
    assert_eq!(
        out,
        vec![
            Value::Json("{}".into()),
            Value::from("Error: Audio file not found"),
            Value::from("unknown"),
            Value::Float(0.0),
        ]
    );
}

#[test]
fn load_lists_and_loads_input_files() {
    let (_tmp, dirs, plugin) = plugin();
    write_silent_wav(&dirs.input_path("take1.wav"), 8000, 800);
    fs::write(dirs.input_path("notes.txt"), b"not audio").unwrap();

    let node = plugin.registry().get("DVA_Load_Audio_File").unwrap();
    let schema = node.input_schema().to_json();
    assert_eq!(
        schema["required"]["audio_file"],
        serde_json::json!([["take1.wav"], {"audio_upload": true}])
    );

    let out = plugin
        .invoke("DVA_Load_Audio_File", inputs(vec![("audio_file", "take1.wav".into())]))
        .unwrap();
    let expected = dirs.input_path("take1.wav");
    assert_eq!(out[0], Value::Audio(AudioRef::Record(AudioRecord::new(expected.clone()))));
    assert_eq!(out[1], Value::String(expected.to_string_lossy().into_owned()));
}

#[test]
fn load_checks_the_name_without_listing_the_input_dir() {
    let (tmp, dirs, plugin) = plugin();
    write_silent_wav(&tmp.path().join("outside.wav"), 8000, 800);
    fs::write(dirs.input_path("notes.txt"), b"not audio").unwrap();
    fs::create_dir(dirs.input_path("sub")).unwrap();
    write_silent_wav(&dirs.input_path("sub/late.wav"), 8000, 800);

    let node = plugin.registry().get("DVA_Load_Audio_File").unwrap();
    assert_eq!(
        node.binding_schema().to_json()["required"]["audio_file"][0],
        "STRING"
    );

    // añadido tras construir el registro, sin volver a listar la carpeta
    let out = plugin
        .invoke("DVA_Load_Audio_File", inputs(vec![("audio_file", "sub/late.wav".into())]))
        .unwrap();
    assert_eq!(out[1], Value::String(dirs.input_path("sub/late.wav").to_string_lossy().into_owned()));

    for name in ["../outside.wav", "notes.txt", ""] {
        let out = plugin
            .invoke("DVA_Load_Audio_File", inputs(vec![("audio_file", name.into())]))
            .unwrap();
        assert_eq!(out[1], Value::from(""), "{name}");
    }
}

#[test]
fn load_of_an_unknown_file_returns_an_empty_record() {
    let (_tmp, _dirs, plugin) = plugin();

    let out = plugin
        .invoke("DVA_Load_Audio_File", inputs(vec![("audio_file", "gone.wav".into())]))
        .unwrap();
    assert_eq!(out[0], Value::Audio(AudioRef::Record(AudioRecord::default())));
    assert_eq!(out[1], Value::from(""));
}

#[test]
fn batch_over_a_directory() {
    let (tmp, _dirs, plugin) = plugin();
    let dir = tmp.path().join("batch");
    fs::create_dir(&dir).unwrap();
    write_silent_wav(&dir.join("a.wav"), 8000, 8000);
    write_silent_wav(&dir.join("b.wav"), 8000, 8000);
    fs::write(dir.join("c.txt"), b"skip").unwrap();

    let out = plugin
        .invoke(
            "DVA_Audio_Batch_Processor",
            inputs(vec![
                ("directory_path", Value::String(dir.to_string_lossy().into_owned())),
                ("file_pattern", "*.wav".into()),
                ("operation", "metadata".into()),
            ]),
        )
        .unwrap();

    assert_eq!(out[1], Value::from("Processed 2/2 files"));
    let files: Vec<String> = serde_json::from_str(out[2].as_str().unwrap()).unwrap();
    assert_eq!(files.len(), 2);
}

#[test]
fn batch_without_directory() {
    let (_tmp, _dirs, plugin) = plugin();

    let out = plugin
        .invoke(
            "DVA_Audio_Batch_Processor",
            inputs(vec![("directory_path", "/no/such/dir".into())]),
        )
        .unwrap();
    assert_eq!(
        out,
        vec![
            Value::Json("{}".into()),
            Value::from("Error: Directory not found"),
            Value::List("[]".into()),
        ]
    );
}

#[test]
fn welcome_mentions_every_node() {
    let (_tmp, _dirs, plugin) = plugin();
    let text = plugin.welcome();
    for name in plugin.registry().display_names().values() {
        assert!(text.contains(name), "{name} missing from:\n{text}");
    }
}
