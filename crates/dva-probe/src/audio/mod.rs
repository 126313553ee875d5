pub mod buffer;
pub mod decoder;
pub mod reference;

use crate::error::Error;

pub use buffer::SampleBuffer;
pub use reference::{AudioRecord, AudioRef, ResolvedAudio};

pub trait PcmStream {
    /// Devuelve frames intercalados (interleaved) en f32 [-1, 1].
    fn next_chunk(&mut self) -> Result<Option<Vec<f32>>, Error>;
    /// Info opcional: sample_rate, channels, etc.
    fn format(&self) -> Option<StreamInfo> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Stream en memoria, útil para alimentar el análisis desde buffers ya decodificados.
pub struct VecPcmStream {
    chunks: std::vec::IntoIter<Vec<f32>>,
    info: StreamInfo,
}

impl VecPcmStream {
    pub fn new(chunks: Vec<Vec<f32>>, info: StreamInfo) -> Self {
        Self {
            chunks: chunks.into_iter(),
            info,
        }
    }
}

impl PcmStream for VecPcmStream {
    fn next_chunk(&mut self) -> Result<Option<Vec<f32>>, Error> {
        Ok(self.chunks.next())
    }

    fn format(&self) -> Option<StreamInfo> {
        Some(self.info)
    }
}
