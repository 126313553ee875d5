use std::{fs, path::Path};

use dva_library::{BatchOperation, BatchOutput, BatchProcessor, BatchRequest};
use dva_probe::{backend::Capabilities, pipeline::probe::Probe};

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

#[test]
fn three_matching_files_out_of_four() {
    let tmp = tempfile::tempdir().unwrap();
    fs::create_dir(tmp.path().join("nested")).unwrap();
    write_silent_wav(&tmp.path().join("a.wav"), 8000, 8000);
    write_silent_wav(&tmp.path().join("b.wav"), 8000, 4000);
    write_silent_wav(&tmp.path().join("nested/c.wav"), 8000, 16_000);
    write_silent_wav(&tmp.path().join("ignored.aiff"), 8000, 8000);

    let probe = Probe::builder().capabilities(Capabilities::compiled()).build();
    let request = BatchRequest {
        patterns: "*.wav".into(),
        operation: BatchOperation::Both,
        ..BatchRequest::new(tmp.path())
    };

    let BatchOutput::Completed(report) = BatchProcessor::new(&probe).run(&request) else {
        panic!("expected a completed batch");
    };

    assert_eq!(report.results.len(), 3);
    assert!(report.summary.starts_with("Processed "), "{}", report.summary);
    assert!(report.summary.contains("/3 files"), "{}", report.summary);

    if Capabilities::compiled().contains(Capabilities::DECODE) {
        assert_eq!(report.summary, "Processed 3/3 files | Total duration: 3.5s");
        assert_eq!(report.results[0].duration_seconds, Some(1.0));
        assert_eq!(report.results[0].duration_formatted.as_deref(), Some("00:01.000"));
    }
}

#[test]
fn flat_batch_ignores_subdirectories() {
    let tmp = tempfile::tempdir().unwrap();
    fs::create_dir(tmp.path().join("nested")).unwrap();
    write_silent_wav(&tmp.path().join("top.wav"), 8000, 800);
    write_silent_wav(&tmp.path().join("nested/deep.wav"), 8000, 800);

    let probe = Probe::builder().capabilities(Capabilities::empty()).build();
    let request = BatchRequest {
        patterns: "*.wav".into(),
        operation: BatchOperation::Metadata,
        recursive: false,
        ..BatchRequest::new(tmp.path())
    };

    let (_, summary, files) = BatchProcessor::new(&probe).run(&request).into_tuple();
    assert_eq!(summary, "Processed 1/1 files");
    let files: Vec<String> = serde_json::from_str(&files).unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("top.wav"));
}
