//! Backend basado en el ejecutable externo `ffprobe`.

use std::{
    io::Read,
    path::{Path, PathBuf},
    process::{Child, Command, Stdio},
    thread,
    time::{Duration, Instant},
};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use crate::backend::{BackendKind, BackendMetadata, BackendOutcome, DurationBackend, extension_of};
use crate::error::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum FfprobeError {
    #[error("failed to run {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("FFprobe error ({status}): {stderr}")]
    Failed { status: String, stderr: String },

    #[error("FFprobe timeout after {0:?}")]
    Timeout(Duration),

    #[error("FFprobe JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O while waiting for ffprobe: {0}")]
    Wait(#[source] std::io::Error),
}

/// Salida de `-show_format -show_streams`. Todos los campos son opcionales:
/// ffprobe omite lo que no conoce y serializa muchos números como texto.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FfprobeOutput {
    #[serde(default)]
    pub format: Option<FfprobeFormat>,
    #[serde(default)]
    pub streams: Vec<FfprobeStream>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FfprobeFormat {
    pub duration: Option<String>,
    pub bit_rate: Option<String>,
    pub size: Option<String>,
    pub format_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FfprobeStream {
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub duration: Option<String>,
    pub sample_rate: Option<String>,
    pub channels: Option<u32>,
    pub bits_per_sample: Option<u32>,
}

impl FfprobeOutput {
    /// `format.duration`, o el máximo de `streams[].duration`.
    pub fn duration(&self) -> Option<f64> {
        let from_format = self
            .format
            .as_ref()
            .and_then(|f| f.duration.as_deref())
            .and_then(|d| d.trim().parse::<f64>().ok());

        from_format.or_else(|| {
            self.streams
                .iter()
                .filter_map(|s| s.duration.as_deref())
                .filter_map(|d| d.trim().parse::<f64>().ok())
                .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |a| a.max(d))))
        })
    }

    pub fn audio_stream(&self) -> Option<&FfprobeStream> {
        self.streams.iter().find(|s| s.codec_type.as_deref() == Some("audio"))
    }

    /// Primer stream que declare frecuencia, sea o no de tipo audio.
    fn first_stream(&self) -> Option<&FfprobeStream> {
        self.audio_stream().or_else(|| self.streams.first())
    }
}

#[derive(Debug, Clone)]
pub struct FfprobeRunner {
    program: PathBuf,
}

impl FfprobeRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Primera línea de `ffprobe -version`, si el ejecutable responde.
    pub fn version(&self, timeout: Duration) -> Option<String> {
        let (stdout, _) = self.run(&["-version"], timeout).ok()?;
        let text = String::from_utf8_lossy(&stdout);
        Some(text.lines().next().unwrap_or("unknown").trim().to_string())
    }

    /// Consulta mínima para calcular duración.
    pub fn probe_duration(&self, path: &Path, timeout: Duration) -> Result<(FfprobeOutput, Value), FfprobeError> {
        let path = path.to_string_lossy();
        let args = [
            "-v",
            "error",
            "-show_entries",
            "format=duration:stream=duration,sample_rate,channels,codec_name",
            "-of",
            "json",
            path.as_ref(),
        ];
        self.run_json(&args, timeout)
    }

    /// Consulta completa de contenedor y streams.
    pub fn probe_full(&self, path: &Path, timeout: Duration) -> Result<(FfprobeOutput, Value), FfprobeError> {
        let path = path.to_string_lossy();
        let args = [
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
            path.as_ref(),
        ];
        self.run_json(&args, timeout)
    }

    fn run_json(&self, args: &[&str], timeout: Duration) -> Result<(FfprobeOutput, Value), FfprobeError> {
        debug!(program = %self.program.display(), ?args, "running ffprobe");
        let (stdout, _) = self.run(args, timeout)?;
        let raw: Value = serde_json::from_slice(&stdout)?;
        let parsed: FfprobeOutput = serde_json::from_value(raw.clone())?;
        Ok((parsed, raw))
    }

    /// Ejecuta con espera acotada; al vencer el plazo el proceso se mata.
    fn run(&self, args: &[&str], timeout: Duration) -> Result<(Vec<u8>, Vec<u8>), FfprobeError> {
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| FfprobeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = wait_with_deadline(&mut child, timeout)?;

        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr).trim().to_string();
            error!(%status, %stderr, "ffprobe failed");
            return Err(FfprobeError::Failed {
                status: status.to_string(),
                stderr,
            });
        }

        Ok((stdout, stderr))
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Result<std::process::ExitStatus, FfprobeError> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().map_err(FfprobeError::Wait)? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            error!(?timeout, "ffprobe timed out, process killed");
            return Err(FfprobeError::Timeout(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

pub struct FfprobeBackend {
    runner: FfprobeRunner,
    timeout: Duration,
}

impl FfprobeBackend {
    pub fn new(runner: FfprobeRunner, timeout: Duration) -> Self {
        Self { runner, timeout }
    }
}

impl DurationBackend for FfprobeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Ffprobe
    }

    fn probe(&self, path: &Path) -> Result<BackendOutcome, Error> {
        let (parsed, raw) = self.runner.probe_duration(path, self.timeout)?;

        let duration = parsed.duration().unwrap_or(0.0);
        if duration <= 0.0 {
            return Err(Error::UnknownDuration);
        }

        let stream = parsed.first_stream();
        let metadata = BackendMetadata {
            method: BackendKind::Ffprobe.name(),
            sample_rate: stream
                .and_then(|s| s.sample_rate.as_deref())
                .and_then(|sr| sr.parse().ok()),
            channels: stream.and_then(|s| s.channels),
            codec: stream.and_then(|s| s.codec_name.clone()),
            format: extension_of(path),
            file_size_bytes: std::fs::metadata(path).ok().map(|m| m.len()),
            ffprobe_data: Some(raw),
            ..Default::default()
        };

        debug!(duration, "ffprobe computed duration");
        Ok(BackendOutcome { duration, metadata })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn duration_prefers_format_section() {
        let out: FfprobeOutput = serde_json::from_value(json!({
            "format": {"duration": "12.500000"},
            "streams": [{"duration": "99.0"}]
        }))
        .unwrap();
        assert_eq!(out.duration(), Some(12.5));
    }

    #[test]
    fn duration_falls_back_to_longest_stream() {
        let out: FfprobeOutput = serde_json::from_value(json!({
            "format": {},
            "streams": [{"duration": "3.0"}, {"duration": "4.25"}, {"codec_type": "video"}]
        }))
        .unwrap();
        assert_eq!(out.duration(), Some(4.25));
    }

    #[test]
    fn duration_missing_everywhere() {
        let out: FfprobeOutput = serde_json::from_value(json!({"streams": []})).unwrap();
        assert_eq!(out.duration(), None);
    }

    #[test]
    fn audio_stream_skips_video() {
        let out: FfprobeOutput = serde_json::from_value(json!({
            "streams": [
                {"codec_type": "video", "codec_name": "mjpeg"},
                {"codec_type": "audio", "codec_name": "mp3", "sample_rate": "44100", "channels": 2}
            ]
        }))
        .unwrap();
        let audio = out.audio_stream().unwrap();
        assert_eq!(audio.codec_name.as_deref(), Some("mp3"));
        assert_eq!(audio.channels, Some(2));
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let runner = FfprobeRunner::new("/nonexistent/dva-ffprobe");
        let err = runner
            .probe_full(Path::new("whatever.wav"), Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, FfprobeError::Spawn { .. }));
        assert!(runner.version(Duration::from_secs(1)).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn slow_process_times_out() {
        let runner = FfprobeRunner::new("sh");
        let err = runner.run(&["-c", "sleep 5"], Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, FfprobeError::Timeout(_)));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_reported() {
        let runner = FfprobeRunner::new("sh");
        let err = runner
            .run(&["-c", "echo boom >&2; exit 3"], Duration::from_secs(5))
            .unwrap_err();
        match err {
            FfprobeError::Failed { stderr, .. } => assert_eq!(stderr, "boom"),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn malformed_json_is_reported() {
        let runner = FfprobeRunner::new("sh");
        let err = runner
            .run_json(&["-c", "echo not-json"], Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, FfprobeError::Json(_)));
    }
}
