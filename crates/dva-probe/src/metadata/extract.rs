use std::{collections::BTreeMap, path::Path};

use tracing::{Level, debug, instrument, warn};

use crate::{
    audio::{AudioRef, ResolvedAudio, SampleBuffer},
    backend::{
        BackendKind, Capabilities, extension_of,
        ffprobe::{FfprobeOutput, FfprobeStream},
    },
    error::Error,
    metadata::model::{AudioMetadata, FileInfo, FormatInfo, TechnicalInfo},
    pipeline::probe::Probe,
};

bitflags::bitflags! {
    /// Secciones opcionales a extraer. `file_info` siempre está presente.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Sections: u32 {
        const FORMAT    = 1 << 0;
        const TECHNICAL = 1 << 1;
        const TAGS      = 1 << 2;
    }
}

impl Default for Sections {
    fn default() -> Self {
        Sections::FORMAT | Sections::TECHNICAL
    }
}

impl Sections {
    pub fn from_toggles(format: bool, technical: bool, tags: bool) -> Self {
        let mut s = Sections::empty();
        s.set(Sections::FORMAT, format);
        s.set(Sections::TECHNICAL, technical);
        s.set(Sections::TAGS, tags);
        s
    }
}

/// Resultado de extracción listo para el host.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataReport {
    pub metadata: Option<AudioMetadata>,
    pub summary: String,
    pub format_name: String,
    pub duration: f64,
}

impl MetadataReport {
    fn from_metadata(metadata: AudioMetadata) -> Self {
        Self {
            summary: metadata.summary(),
            format_name: metadata.format_name().unwrap_or("unknown").to_string(),
            duration: metadata.duration_seconds(),
            metadata: Some(metadata),
        }
    }

    pub fn error(reason: impl std::fmt::Display) -> Self {
        Self {
            metadata: None,
            summary: format!("Error: {reason}"),
            format_name: "error".to_string(),
            duration: 0.0,
        }
    }

    pub fn not_found() -> Self {
        Self {
            metadata: None,
            summary: "Error: Audio file not found".to_string(),
            format_name: "unknown".to_string(),
            duration: 0.0,
        }
    }

    pub fn metadata_json(&self) -> String {
        self.metadata
            .as_ref()
            .map(AudioMetadata::to_json_pretty)
            .unwrap_or_else(|| "{}".to_string())
    }

    pub fn into_tuple(self) -> (String, String, String, f64) {
        let json = self.metadata_json();
        (json, self.summary, self.format_name, self.duration)
    }
}

impl Probe {
    #[instrument(level = Level::DEBUG, skip(self, audio), fields(kind = audio.kind()))]
    pub fn metadata(&self, audio: &AudioRef, sections: Sections) -> MetadataReport {
        let resolved = match audio.resolve(self.dirs()) {
            Ok(r) => r,
            Err(Error::EmptyPath) => return MetadataReport::not_found(),
            Err(e) => return MetadataReport::error(e),
        };

        match resolved {
            ResolvedAudio::Buffer(buf) => {
                let sample_rate = buf.sample_rate().unwrap_or(self.config().default_sample_rate);
                MetadataReport {
                    format_name: "tensor".to_string(),
                    duration: buf.duration_at(sample_rate),
                    ..MetadataReport::from_metadata(self.buffer_metadata(buf, sections))
                }
            }
            ResolvedAudio::File(path) if !path.exists() => {
                warn!(path = %path.display(), "audio file not found");
                MetadataReport::not_found()
            }
            ResolvedAudio::File(path) => match self.extract_file_metadata(&path, sections) {
                Ok(meta) => MetadataReport::from_metadata(meta),
                Err(e) => {
                    warn!(error = %e, "metadata extraction failed");
                    MetadataReport::error(e)
                }
            },
        }
    }

    pub fn buffer_metadata(&self, buf: &SampleBuffer, sections: Sections) -> AudioMetadata {
        let sample_rate = buf.sample_rate().unwrap_or(self.config().default_sample_rate);

        AudioMetadata {
            file_info: FileInfo::for_buffer(buf.byte_size() as u64),
            format: sections
                .contains(Sections::FORMAT)
                .then(|| FormatInfo::named("tensor").with("sample_rate", sample_rate)),
            technical: sections.contains(Sections::TECHNICAL).then(|| TechnicalInfo {
                duration_seconds: buf.duration_at(sample_rate),
                sample_rate: Some(sample_rate),
                channels: Some(buf.channels() as u32),
                total_samples: Some(buf.total_samples() as u64),
                ..Default::default()
            }),
            tags: None,
        }
    }

    /// Extrae las secciones pedidas de un fichero existente.
    #[instrument(level = Level::TRACE, skip(self), err)]
    pub fn extract_file_metadata(&self, path: &Path, sections: Sections) -> Result<AudioMetadata, Error> {
        let file_info = FileInfo::from_path(path)?;
        let mut metadata = AudioMetadata {
            file_info,
            ..Default::default()
        };

        if sections.intersects(Sections::FORMAT | Sections::TECHNICAL) {
            let (format, technical) = match self.ffprobe_full(path) {
                Some((parsed, raw)) => {
                    let format = raw
                        .get("format")
                        .cloned()
                        .and_then(|v| serde_json::from_value::<FormatInfo>(v).ok())
                        .unwrap_or_default();
                    (format, technical_from_ffprobe(&parsed))
                }
                None => self.library_fallback(path),
            };

            if sections.contains(Sections::FORMAT) {
                metadata.format = Some(format);
            }
            if sections.contains(Sections::TECHNICAL) {
                metadata.technical = Some(technical);
            }
        }

        if sections.contains(Sections::TAGS) {
            metadata.tags = self.read_tags(path);
        }

        Ok(metadata)
    }

    fn ffprobe_full(&self, path: &Path) -> Option<(FfprobeOutput, serde_json::Value)> {
        if !self.capabilities().contains(Capabilities::FFPROBE) {
            return None;
        }
        match self.runner().probe_full(path, self.config().metadata_timeout()) {
            Ok(out) => Some(out),
            Err(e) => {
                warn!(error = %e, path = %path.display(), "ffprobe metadata failed");
                None
            }
        }
    }

    /// Sin ffprobe: `format` con la extensión y `technical` desde el primer
    /// backend de biblioteca que responda.
    fn library_fallback(&self, path: &Path) -> (FormatInfo, TechnicalInfo) {
        let format = extension_of(path).map(FormatInfo::named).unwrap_or_default();

        let outcome = [BackendKind::Tags, BackendKind::Decode]
            .into_iter()
            .filter_map(|kind| self.backend(kind))
            .find_map(|backend| match backend.probe(path) {
                Ok(outcome) => Some(outcome),
                Err(e) => {
                    debug!(backend = %backend.kind(), error = %e, "fallback backend failed");
                    None
                }
            });

        let technical = match outcome {
            Some(o) => TechnicalInfo {
                duration_seconds: o.duration,
                bitrate_bps: o.metadata.bitrate.map(|kbps| u64::from(kbps) * 1000),
                size_bytes: o.metadata.file_size_bytes,
                sample_rate: o.metadata.sample_rate,
                channels: o.metadata.channels,
                codec: o.metadata.codec,
                bits_per_sample: o.metadata.bit_depth,
                total_samples: o.metadata.duration_samples,
            },
            None => TechnicalInfo::default(),
        };

        (format, technical)
    }

    #[cfg(feature = "lofty")]
    fn read_tags(&self, path: &Path) -> Option<BTreeMap<String, String>> {
        if !self.capabilities().contains(Capabilities::TAGS) {
            return None;
        }
        match crate::backend::tags::TagReader::new().read(path) {
            Ok(tags) => Some(tags),
            Err(e) => {
                warn!(error = %e, "tag reader failed");
                Some(BTreeMap::new())
            }
        }
    }

    #[cfg(not(feature = "lofty"))]
    fn read_tags(&self, _path: &Path) -> Option<BTreeMap<String, String>> {
        None
    }
}

fn technical_from_ffprobe(out: &FfprobeOutput) -> TechnicalInfo {
    let format = out.format.clone().unwrap_or_default();
    let mut tech = TechnicalInfo {
        duration_seconds: parse_num(format.duration.as_deref()).unwrap_or(0.0),
        bitrate_bps: Some(parse_num(format.bit_rate.as_deref()).unwrap_or(0.0) as u64),
        size_bytes: Some(parse_num(format.size.as_deref()).unwrap_or(0.0) as u64),
        ..Default::default()
    };

    if let Some(stream) = out.audio_stream() {
        apply_stream(&mut tech, stream);
    }
    tech
}

fn apply_stream(tech: &mut TechnicalInfo, stream: &FfprobeStream) {
    tech.sample_rate = Some(parse_num(stream.sample_rate.as_deref()).unwrap_or(0.0) as u32);
    tech.channels = Some(stream.channels.unwrap_or(1));
    tech.codec = Some(stream.codec_name.clone().unwrap_or_else(|| "unknown".to_string()));
    tech.bits_per_sample = Some(stream.bits_per_sample.unwrap_or(0));
}

fn parse_num(s: Option<&str>) -> Option<f64> {
    s.and_then(|s| s.trim().parse::<f64>().ok())
}
