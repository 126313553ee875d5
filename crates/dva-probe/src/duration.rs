//! Cálculo de duración para buffers y ficheros.

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{Level, debug, info, instrument, warn};

use crate::{
    analysis::silence::{self, MAX_THRESHOLD_DB, MIN_THRESHOLD_DB},
    audio::{AudioRef, ResolvedAudio, SampleBuffer, reference::validate_file},
    backend::{CalculationMode, backend_order, extension_of},
    error::Error,
    format::{MAX_PRECISION, format_duration, round_to},
    pipeline::probe::Probe,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DurationRequest {
    pub mode: CalculationMode,
    /// Decimales del resultado, 0..=6.
    pub precision: u8,
    pub include_silence: bool,
    pub silence_threshold_db: f64,
}

impl Default for DurationRequest {
    fn default() -> Self {
        Self {
            mode: CalculationMode::Auto,
            precision: 3,
            include_silence: true,
            silence_threshold_db: silence::DEFAULT_THRESHOLD_DB,
        }
    }
}

impl DurationRequest {
    fn normalized(&self) -> Self {
        Self {
            precision: self.precision.min(MAX_PRECISION),
            silence_threshold_db: self.silence_threshold_db.clamp(MIN_THRESHOLD_DB, MAX_THRESHOLD_DB),
            ..*self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationReport {
    pub duration_seconds: f64,
    pub duration_formatted: String,
    pub status: String,
    pub metadata: Value,
}

impl DurationReport {
    fn success(duration: f64, precision: u8, metadata: Value) -> Self {
        let rounded = round_to(duration.max(0.0), precision);
        Self {
            duration_seconds: rounded,
            duration_formatted: format_duration(rounded),
            status: "success".to_string(),
            metadata,
        }
    }

    pub fn error(reason: impl std::fmt::Display) -> Self {
        Self {
            duration_seconds: 0.0,
            duration_formatted: format_duration(0.0),
            status: format!("error: {reason}"),
            metadata: Value::Object(Map::new()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// Metadatos como JSON indentado; `{}` en caso de error.
    pub fn metadata_json(&self) -> String {
        match &self.metadata {
            Value::Object(map) if map.is_empty() => "{}".to_string(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| "{}".to_string()),
        }
    }

    pub fn into_tuple(self) -> (f64, String, String, String) {
        let metadata = self.metadata_json();
        (self.duration_seconds, self.duration_formatted, self.status, metadata)
    }
}

impl Probe {
    /// Nunca falla: los errores se devuelven como informe con estado `error: ...`.
    #[instrument(level = Level::DEBUG, skip(self, audio), fields(kind = audio.kind()))]
    pub fn duration(&self, audio: &AudioRef, request: &DurationRequest) -> DurationReport {
        let request = request.normalized();
        let outcome = audio
            .resolve(self.dirs())
            .and_then(|resolved| match resolved {
                ResolvedAudio::Buffer(buf) => Ok(self.buffer_duration(buf, &request)),
                ResolvedAudio::File(path) => self.file_duration(&path, &request),
            });

        match outcome {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "duration calculation failed");
                DurationReport::error(e)
            }
        }
    }

    fn buffer_duration(&self, buf: &SampleBuffer, request: &DurationRequest) -> DurationReport {
        let sample_rate = buf.sample_rate().unwrap_or(self.config().default_sample_rate);
        let mut duration = buf.duration_at(sample_rate);
        if duration == 0.0 {
            warn!(shape = ?buf.shape(), sample_rate, "buffer has no samples along the time axis");
        }

        let mut metadata = json!({
            "calculation_method": "tensor_direct",
            "sample_rate": sample_rate,
            "waveform_shape": buf.shape(),
            "time_precision": request.precision,
            "include_silence": request.include_silence,
            "silence_threshold_db": request.silence_threshold_db,
            "total_samples": buf.total_samples(),
        });

        if !request.include_silence && duration > 0.0 {
            match silence::analyze_buffer(
                buf,
                sample_rate,
                self.config().silence_window_ms,
                request.silence_threshold_db,
            ) {
                Ok(report) => {
                    metadata["silence_removed_seconds"] = json!(report.silent_seconds());
                    duration = report.voiced_seconds;
                }
                Err(e) => warn!(error = %e, "silence analysis failed, keeping total duration"),
            }
        }

        info!(duration, "buffer duration");
        DurationReport::success(duration, request.precision, metadata)
    }

    fn file_duration(&self, path: &Path, request: &DurationRequest) -> Result<DurationReport, Error> {
        let size = validate_file(path)?;
        let ext = extension_of(path);

        let (mode, order) = backend_order(ext.as_deref(), self.capabilities(), request.mode);
        debug!(%mode, ?order, "backend order");

        let backend = order
            .into_iter()
            .find_map(|kind| self.backend(kind))
            .ok_or(Error::NoBackend)?;

        let outcome = backend.probe(path)?;
        let mut duration = outcome.duration;

        let mut metadata = match serde_json::to_value(&outcome.metadata)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        if !request.include_silence && duration > 0.0 {
            if let Some(voiced) = self.file_voiced_seconds(path, request) {
                metadata.insert("silence_removed_seconds".into(), json!((duration - voiced).max(0.0)));
                duration = voiced;
            }
        }

        metadata.insert("calculation_mode".into(), json!(mode));
        metadata.insert("backend".into(), json!(backend.kind().name()));
        metadata.insert("time_precision".into(), json!(request.precision));
        metadata.insert("include_silence".into(), json!(request.include_silence));
        metadata.insert("silence_threshold_db".into(), json!(request.silence_threshold_db));
        metadata.insert("file_path".into(), json!(path.to_string_lossy()));
        metadata.insert("file_size_bytes".into(), json!(size));

        info!(path = %path.display(), duration, backend = %backend.kind(), "file duration");
        Ok(DurationReport::success(duration, request.precision, Value::Object(metadata)))
    }

    #[cfg(feature = "symphonia")]
    fn file_voiced_seconds(&self, path: &Path, request: &DurationRequest) -> Option<f64> {
        let analyzed = crate::audio::decoder::SymphoniaPcmStream::open(path)
            .map_err(|e| e.to_string())
            .and_then(|mut stream| {
                silence::analyze_stream(
                    &mut stream,
                    self.config().silence_window_ms,
                    request.silence_threshold_db,
                )
                .map_err(|e| e.to_string())
            });

        match analyzed {
            Ok(report) => Some(report.voiced_seconds),
            Err(e) => {
                warn!(error = %e, "silence analysis failed, keeping total duration");
                None
            }
        }
    }

    #[cfg(not(feature = "symphonia"))]
    fn file_voiced_seconds(&self, _path: &Path, _request: &DurationRequest) -> Option<f64> {
        warn!("silence exclusion needs the symphonia feature, keeping total duration");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Capabilities;

    fn probe(caps: Capabilities) -> Probe {
        Probe::builder().capabilities(caps).build()
    }

    #[test]
    fn buffer_duration_uses_declared_rate() {
        let buf = SampleBuffer::mono(vec![0.0; 22_050]).with_sample_rate(44_100);
        let report = probe(Capabilities::empty()).duration(&buf.into(), &DurationRequest::default());

        assert!(report.is_success());
        assert_eq!(report.duration_seconds, 0.5);
        assert_eq!(report.duration_formatted, "00:00.500");
        assert_eq!(report.metadata["calculation_method"], "tensor_direct");
        assert_eq!(report.metadata["total_samples"], 22_050);
    }

    #[test]
    fn buffer_without_rate_uses_default() {
        let buf = SampleBuffer::mono(vec![0.0; 48_000]);
        let report = probe(Capabilities::empty()).duration(&buf.into(), &DurationRequest::default());
        assert_eq!(report.duration_seconds, 2.0);
        assert_eq!(report.metadata["sample_rate"], 24_000);
    }

    #[test]
    fn precision_is_clamped_and_applied() {
        let buf = SampleBuffer::mono(vec![0.0; 1]).with_sample_rate(3);
        let req = DurationRequest {
            precision: 2,
            ..Default::default()
        };
        let report = probe(Capabilities::empty()).duration(&buf.clone().into(), &req);
        assert_eq!(report.duration_seconds, 0.33);

        let req = DurationRequest {
            precision: 42,
            ..Default::default()
        };
        let report = probe(Capabilities::empty()).duration(&buf.into(), &req);
        assert_eq!(report.duration_seconds, 0.333333);
        assert_eq!(report.metadata["time_precision"], 6);
    }

    #[test]
    fn zero_samples_is_still_success() {
        let buf = SampleBuffer::new(vec![], vec![2, 0]).unwrap();
        let report = probe(Capabilities::empty()).duration(&buf.into(), &DurationRequest::default());
        assert!(report.is_success());
        assert_eq!(report.duration_seconds, 0.0);
        assert_eq!(report.duration_formatted, "00:00:00.000");
    }

    #[test]
    fn silence_can_be_excluded_from_buffers() {
        let mut samples = vec![0.5f32; 1000];
        samples.extend(vec![0.0f32; 1000]);
        let buf = SampleBuffer::mono(samples).with_sample_rate(1000);
        let req = DurationRequest {
            include_silence: false,
            ..Default::default()
        };

        let report = probe(Capabilities::empty()).duration(&buf.into(), &req);
        assert_eq!(report.duration_seconds, 1.0);
        assert_eq!(report.metadata["silence_removed_seconds"], 1.0);
    }

    #[test]
    fn missing_file_gives_uniform_error() {
        let report = probe(Capabilities::ALL).duration(&AudioRef::from("/definitely/not/here.wav"), &DurationRequest::default());
        let (secs, formatted, status, metadata) = report.into_tuple();
        assert_eq!(secs, 0.0);
        assert_eq!(formatted, "00:00:00.000");
        assert!(status.starts_with("error: "), "{status}");
        assert!(status.contains("not found"), "{status}");
        assert_eq!(metadata, "{}");
    }

    #[test]
    fn empty_file_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("empty.wav");
        std::fs::write(&path, b"").unwrap();

        let report = probe(Capabilities::ALL).duration(&path.as_path().into(), &DurationRequest::default());
        assert!(report.status.contains("empty"), "{}", report.status);
        assert_eq!(report.duration_seconds, 0.0);
    }

    #[test]
    fn no_backend_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("clip.wav");
        std::fs::write(&path, b"RIFF0000WAVE").unwrap();

        let report = probe(Capabilities::empty()).duration(&path.as_path().into(), &DurationRequest::default());
        assert_eq!(report.status, "error: no duration backend available");
    }

    #[test]
    fn empty_list_is_an_input_error() {
        let report = probe(Capabilities::empty()).duration(&AudioRef::List(vec![]), &DurationRequest::default());
        assert!(report.status.starts_with("error: unsupported audio input"), "{}", report.status);
    }
}
