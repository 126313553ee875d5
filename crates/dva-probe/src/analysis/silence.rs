use thiserror::Error;

use crate::audio::{PcmStream, SampleBuffer};

// =================== Config / Constantes ===================

pub const DEFAULT_WINDOW_MS: u32 = 20;
pub const DEFAULT_THRESHOLD_DB: f64 = -60.0;
pub const MIN_THRESHOLD_DB: f64 = -100.0;
pub const MAX_THRESHOLD_DB: f64 = 0.0;

// evita log10(0)
const RMS_FLOOR: f64 = 1e-10;

// =================== Error / Resultados ===================

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SilenceError {
    #[error("stream format unavailable (sample_rate/channels)")]
    MissingFormat,

    #[error("failed to read from PCM stream: {0}")]
    StreamRead(String),

    #[error("invalid channel count: {0}")]
    InvalidChannels(u16),

    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(u32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilenceReport {
    pub total_seconds: f64,
    pub voiced_seconds: f64,
    pub windows: usize,
    pub silent_windows: usize,
}

impl SilenceReport {
    pub fn silent_seconds(&self) -> f64 {
        (self.total_seconds - self.voiced_seconds).max(0.0)
    }
}

/// Acumula energía por frame y clasifica ventanas fijas por su nivel RMS en dBFS.
#[derive(Debug)]
struct Detector {
    window_frames: usize,
    threshold_db: f64,
    acc_energy: f64,
    acc_frames: usize,
    total_frames: u64,
    voiced_frames: u64,
    windows: usize,
    silent_windows: usize,
}

impl Detector {
    fn new(sample_rate: u32, window_ms: u32, threshold_db: f64) -> Self {
        let window_frames = ((sample_rate as u64 * window_ms.max(1) as u64) / 1000).max(1) as usize;
        Self {
            window_frames,
            threshold_db: threshold_db.clamp(MIN_THRESHOLD_DB, MAX_THRESHOLD_DB),
            acc_energy: 0.0,
            acc_frames: 0,
            total_frames: 0,
            voiced_frames: 0,
            windows: 0,
            silent_windows: 0,
        }
    }

    /// `energy` es la media de cuadrados de todos los canales del frame.
    fn push(&mut self, energy: f64) {
        self.acc_energy += energy;
        self.acc_frames += 1;
        self.total_frames += 1;
        if self.acc_frames == self.window_frames {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if self.acc_frames == 0 {
            return;
        }
        let rms = (self.acc_energy / self.acc_frames as f64).sqrt();
        let db = 20.0 * rms.max(RMS_FLOOR).log10();

        self.windows += 1;
        if db < self.threshold_db {
            self.silent_windows += 1;
        } else {
            self.voiced_frames += self.acc_frames as u64;
        }
        self.acc_energy = 0.0;
        self.acc_frames = 0;
    }

    fn finish(mut self, sample_rate: u32) -> SilenceReport {
        self.flush();
        let sr = sample_rate as f64;
        SilenceReport {
            total_seconds: self.total_frames as f64 / sr,
            voiced_seconds: self.voiced_frames as f64 / sr,
            windows: self.windows,
            silent_windows: self.silent_windows,
        }
    }
}

// ============== API pública ==============

/// Lee chunks PCM intercalados hasta agotar el stream.
pub fn analyze_stream(
    stream: &mut (dyn PcmStream + Send),
    window_ms: u32,
    threshold_db: f64,
) -> Result<SilenceReport, SilenceError> {
    let info = stream.format().ok_or(SilenceError::MissingFormat)?;
    if info.channels == 0 {
        return Err(SilenceError::InvalidChannels(info.channels));
    }
    if info.sample_rate == 0 {
        return Err(SilenceError::InvalidSampleRate(info.sample_rate));
    }

    let mut detector = Detector::new(info.sample_rate, window_ms, threshold_db);
    let mut sample_rate = info.sample_rate;
    let mut ch = info.channels as usize;

    loop {
        let chunk = stream
            .next_chunk()
            .map_err(|e| SilenceError::StreamRead(e.to_string()))?;
        let Some(interleaved) = chunk else { break };

        // el decoder puede corregir el formato tras el primer paquete
        if let Some(current) = stream.format() {
            if current.channels > 0 {
                ch = current.channels as usize;
            }
            if current.sample_rate > 0 {
                sample_rate = current.sample_rate;
            }
        }

        for frame in interleaved.chunks_exact(ch) {
            let energy = frame.iter().map(|s| (*s as f64) * (*s as f64)).sum::<f64>() / ch as f64;
            detector.push(energy);
        }
    }

    Ok(detector.finish(sample_rate))
}

pub fn analyze_buffer(
    buffer: &SampleBuffer,
    sample_rate: u32,
    window_ms: u32,
    threshold_db: f64,
) -> Result<SilenceReport, SilenceError> {
    if sample_rate == 0 {
        return Err(SilenceError::InvalidSampleRate(sample_rate));
    }

    let mut detector = Detector::new(sample_rate, window_ms, threshold_db);
    for energy in buffer.frame_energies() {
        detector.push(energy);
    }
    Ok(detector.finish(sample_rate))
}
