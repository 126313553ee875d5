use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use dva_probe::{
    audio::AudioRef,
    duration::DurationRequest,
    format::adaptive_total,
    metadata::{AudioMetadata, Sections},
    pipeline::probe::Probe,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn, Level};

use crate::{
    error::Error,
    pattern::{DEFAULT_PATTERNS, PatternSet},
    scanner::find_files,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchOperation {
    Duration,
    Metadata,
    #[default]
    Both,
}

impl BatchOperation {
    pub const ALL: [BatchOperation; 3] = [BatchOperation::Duration, BatchOperation::Metadata, BatchOperation::Both];

    pub fn as_str(self) -> &'static str {
        match self {
            BatchOperation::Duration => "duration",
            BatchOperation::Metadata => "metadata",
            BatchOperation::Both => "both",
        }
    }

    pub fn wants_duration(self) -> bool {
        matches!(self, BatchOperation::Duration | BatchOperation::Both)
    }

    pub fn wants_metadata(self) -> bool {
        matches!(self, BatchOperation::Metadata | BatchOperation::Both)
    }
}

impl fmt::Display for BatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchOperation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BatchOperation::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownOperation(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub directory: PathBuf,
    /// Patrones separados por comas.
    pub patterns: String,
    pub operation: BatchOperation,
    pub recursive: bool,
}

impl BatchRequest {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            patterns: DEFAULT_PATTERNS.to_string(),
            operation: BatchOperation::default(),
            recursive: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileResult {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    pub status: FileStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_formatted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AudioMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileResult {
    fn failed(file: &Path, error: impl fmt::Display) -> Self {
        Self {
            file: file.to_string_lossy().into_owned(),
            filename: None,
            size_bytes: None,
            status: FileStatus::Failed,
            duration_seconds: None,
            duration_formatted: None,
            duration_error: None,
            metadata: None,
            metadata_error: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == FileStatus::Success
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub results: Vec<FileResult>,
    pub summary: String,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutput {
    Completed(BatchReport),
    DirectoryNotFound,
    NoFiles,
    Failed(String),
}

impl BatchOutput {
    /// `(resultados JSON, resumen, lista de ficheros JSON)`.
    pub fn into_tuple(self) -> (String, String, String) {
        match self {
            BatchOutput::Completed(report) => {
                let results = serde_json::to_string_pretty(&report.results).unwrap_or_else(|_| "[]".to_string());
                let files: Vec<String> = report.files.iter().map(|p| p.to_string_lossy().into_owned()).collect();
                let files = serde_json::to_string(&files).unwrap_or_else(|_| "[]".to_string());
                (results, report.summary, files)
            }
            BatchOutput::DirectoryNotFound => ("{}".into(), "Error: Directory not found".into(), "[]".into()),
            BatchOutput::NoFiles => ("{}".into(), "No audio files found".into(), "[]".into()),
            BatchOutput::Failed(msg) => ("{}".into(), format!("Error: {msg}"), "[]".into()),
        }
    }
}

/// Procesa ficheros uno a uno; un fallo en un fichero no detiene el lote.
pub struct BatchProcessor<'a> {
    probe: &'a Probe,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(probe: &'a Probe) -> Self {
        Self { probe }
    }

    #[instrument(level = Level::INFO, skip(self))]
    pub fn run(&self, request: &BatchRequest) -> BatchOutput {
        if request.directory.as_os_str().is_empty() || !request.directory.is_dir() {
            return BatchOutput::DirectoryNotFound;
        }

        let patterns = match PatternSet::parse(&request.patterns) {
            Ok(p) => p,
            Err(e) => return BatchOutput::Failed(e.to_string()),
        };

        let files = match find_files(&request.directory, &patterns, request.recursive) {
            Ok(files) => files,
            Err(Error::DirectoryNotFound(_)) => return BatchOutput::DirectoryNotFound,
            Err(e) => return BatchOutput::Failed(e.to_string()),
        };

        if files.is_empty() {
            info!("no audio files matched");
            return BatchOutput::NoFiles;
        }

        let results: Vec<FileResult> = files
            .iter()
            .map(|file| self.process_file(file, request.operation))
            .collect();
        let summary = summarize(&results, request.operation);
        info!(%summary, "batch finished");

        BatchOutput::Completed(BatchReport { results, summary, files })
    }

    pub fn process_file(&self, file: &Path, operation: BatchOperation) -> FileResult {
        let size_bytes = match std::fs::metadata(file) {
            Ok(meta) => meta.len(),
            Err(e) => {
                warn!(file = %file.display(), error = %e, "cannot stat file");
                return FileResult::failed(file, e);
            }
        };

        let mut result = FileResult {
            file: file.to_string_lossy().into_owned(),
            filename: file.file_name().map(|n| n.to_string_lossy().into_owned()),
            size_bytes: Some(size_bytes),
            status: FileStatus::Success,
            duration_seconds: None,
            duration_formatted: None,
            duration_error: None,
            metadata: None,
            metadata_error: None,
            error: None,
        };

        if operation.wants_duration() {
            let report = self
                .probe
                .duration(&AudioRef::from(file), &DurationRequest::default());
            if report.is_success() {
                result.duration_seconds = Some(report.duration_seconds);
                result.duration_formatted = Some(report.duration_formatted);
            } else {
                let reason = report.status.strip_prefix("error: ").unwrap_or(&report.status);
                result.duration_error = Some(reason.to_string());
                result.status = FileStatus::Failed;
            }
        }

        if operation.wants_metadata() {
            match self.probe.extract_file_metadata(file, Sections::default()) {
                Ok(meta) => result.metadata = Some(meta),
                Err(e) => {
                    result.metadata_error = Some(e.to_string());
                    result.status = FileStatus::Failed;
                }
            }
        }

        result
    }
}

/// `Processed X/N files`, más el total de duración si se pidió.
pub fn summarize(results: &[FileResult], operation: BatchOperation) -> String {
    let total = results.len();
    let successful = results.iter().filter(|r| r.is_success()).count();

    if operation.wants_duration() {
        let total_duration = results
            .iter()
            .filter_map(|r| r.duration_seconds)
            .fold(0.0, |acc, d| acc + d);
        format!(
            "Processed {successful}/{total} files | Total duration: {}",
            adaptive_total(total_duration)
        )
    } else {
        format!("Processed {successful}/{total} files")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dva_probe::backend::Capabilities;
    use std::fs;
    use tempfile::tempdir;

    fn probe() -> Probe {
        Probe::builder().capabilities(Capabilities::empty()).build()
    }

    #[test]
    fn operation_parsing() {
        assert_eq!("Both".parse::<BatchOperation>().unwrap(), BatchOperation::Both);
        assert!("everything".parse::<BatchOperation>().is_err());
        assert!(BatchOperation::Duration.wants_duration());
        assert!(!BatchOperation::Duration.wants_metadata());
    }

    #[test]
    fn missing_directory_tuple() {
        let probe = probe();
        let out = BatchProcessor::new(&probe).run(&BatchRequest::new("/no/such/dir"));
        assert_eq!(
            out.into_tuple(),
            ("{}".into(), "Error: Directory not found".into(), "[]".into())
        );

        let out = BatchProcessor::new(&probe).run(&BatchRequest::new(""));
        assert_eq!(out, BatchOutput::DirectoryNotFound);
    }

    #[test]
    fn no_matches_tuple() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("readme.txt"), b"hi").unwrap();

        let probe = probe();
        let out = BatchProcessor::new(&probe).run(&BatchRequest::new(tmp.path()));
        assert_eq!(out.into_tuple(), ("{}".into(), "No audio files found".into(), "[]".into()));
    }

    #[test]
    fn metadata_only_batch_counts_files() {
        let tmp = tempdir().unwrap();
        for name in ["a.wav", "b.mp3", "c.flac", "d.txt"] {
            fs::write(tmp.path().join(name), b"data").unwrap();
        }

        let probe = probe();
        let request = BatchRequest {
            operation: BatchOperation::Metadata,
            ..BatchRequest::new(tmp.path())
        };
        let BatchOutput::Completed(report) = BatchProcessor::new(&probe).run(&request) else {
            panic!("expected a completed batch");
        };

        assert_eq!(report.results.len(), 3);
        assert_eq!(report.summary, "Processed 3/3 files");
        assert_eq!(report.results[0].filename.as_deref(), Some("a.wav"));
        assert_eq!(report.results[0].metadata.as_ref().unwrap().file_info.size_bytes, 4);
    }

    #[test]
    fn duration_failures_are_isolated() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("a.wav"), b"data").unwrap();
        fs::write(tmp.path().join("b.wav"), b"").unwrap();

        let probe = probe();
        let request = BatchRequest {
            operation: BatchOperation::Duration,
            ..BatchRequest::new(tmp.path())
        };
        let (results, summary, files) = BatchProcessor::new(&probe).run(&request).into_tuple();

        assert_eq!(summary, "Processed 0/2 files | Total duration: 0.0s");
        let results: serde_json::Value = serde_json::from_str(&results).unwrap();
        assert_eq!(results[0]["status"], "failed");
        assert_eq!(results[0]["duration_error"], "no duration backend available");
        assert!(results[1]["duration_error"].as_str().unwrap().contains("empty"));
        let files: Vec<String> = serde_json::from_str(&files).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn summary_totals_durations() {
        let ok = |secs: f64| FileResult {
            duration_seconds: Some(secs),
            status: FileStatus::Success,
            ..FileResult::failed(Path::new("x.wav"), "")
        };
        let results = vec![ok(30.0), ok(60.0)];
        assert_eq!(
            summarize(&results, BatchOperation::Both),
            "Processed 2/2 files | Total duration: 1.5m"
        );
    }

    #[test]
    fn unreadable_file_is_failed_entry() {
        let probe = probe();
        let result = BatchProcessor::new(&probe).process_file(Path::new("/no/such/file.wav"), BatchOperation::Both);
        assert_eq!(result.status, FileStatus::Failed);
        assert!(result.error.is_some());
        assert!(result.filename.is_none());
    }
}
