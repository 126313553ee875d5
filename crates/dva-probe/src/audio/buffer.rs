//! Buffers de muestras en memoria tal como los entrega el host.
//!
//! El host no declara el layout de los ejes, así que el eje temporal y los
//! canales se deducen del rango del tensor:
//!
//! | rango | layout asumido                 | eje temporal |
//! |-------|--------------------------------|--------------|
//! | 1     | `[samples]`                    | 0            |
//! | 2     | `[channels, samples]` si dim0 ≤ 2, si no `[batch, samples]` | 1 |
//! | 3     | `[batch, channels, samples]`   | 2            |
//! | 4     | `[batch, channels, samples, _]`| 2            |
//! | otro  | último eje                     | rango - 1    |
//!
//! Un batch de tamaño ≤ 2 en rango 2 es indistinguible de audio estéreo; en ambos
//! casos el eje temporal es el mismo, solo cambia el número de canales reportado.

use serde::Serialize;

use crate::error::Error;

/// Cómo se interpretó un tensor de rango 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    Mono,
    ChannelsFirst,
    BatchFirst,
    Batched,
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    shape: Vec<usize>,
    sample_rate: Option<u32>,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f32>, shape: Vec<usize>) -> Result<Self, Error> {
        let Some(expected) = shape.iter().try_fold(1usize, |acc, d| acc.checked_mul(*d)) else {
            return Err(Error::InvalidBuffer(format!("shape {:?} overflows usize", shape)));
        };
        if expected != samples.len() {
            return Err(Error::InvalidBuffer(format!(
                "shape {:?} needs {} samples, got {}",
                shape,
                expected,
                samples.len()
            )));
        }

        Ok(Self {
            samples,
            shape,
            sample_rate: None,
        })
    }

    pub fn mono(samples: Vec<f32>) -> Self {
        let shape = vec![samples.len()];
        Self {
            samples,
            shape,
            sample_rate: None,
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }

    pub fn layout(&self) -> Layout {
        match self.shape.as_slice() {
            [_] => Layout::Mono,
            [c, _] if *c <= 2 => Layout::ChannelsFirst,
            [_, _] => Layout::BatchFirst,
            [_, _, _] | [_, _, _, _] => Layout::Batched,
            _ => Layout::Unknown,
        }
    }

    pub fn time_axis(&self) -> Option<usize> {
        match self.rank() {
            0 => None,
            1 => Some(0),
            2 => Some(1),
            3 | 4 => Some(2),
            r => Some(r - 1),
        }
    }

    /// Muestras a lo largo del eje temporal.
    pub fn total_samples(&self) -> usize {
        self.time_axis().map(|axis| self.shape[axis]).unwrap_or(0)
    }

    pub fn channels(&self) -> usize {
        match self.shape.as_slice() {
            [] | [_] => 1,
            [c, _] => {
                if *c <= 2 {
                    *c
                } else {
                    1
                }
            }
            [_, c, ..] => {
                if *c <= 2 {
                    *c
                } else {
                    1
                }
            }
        }
    }

    pub fn byte_size(&self) -> usize {
        self.samples.len() * std::mem::size_of::<f32>()
    }

    /// `total_samples / sample_rate`; 0 si alguno de los dos es 0.
    pub fn duration_at(&self, sample_rate: u32) -> f64 {
        let n = self.total_samples();
        if n == 0 || sample_rate == 0 {
            return 0.0;
        }
        n as f64 / sample_rate as f64
    }

    /// Energía media (media de cuadrados) de cada instante del eje temporal,
    /// agregando todos los demás ejes.
    pub fn frame_energies(&self) -> Vec<f64> {
        let Some(axis) = self.time_axis() else {
            return Vec::new();
        };

        let len = self.shape[axis];
        if len == 0 {
            return Vec::new();
        }

        let stride: usize = self.shape[axis + 1..].iter().product();
        let mut sums = vec![0.0f64; len];
        for (i, s) in self.samples.iter().enumerate() {
            let t = (i / stride) % len;
            sums[t] += (*s as f64) * (*s as f64);
        }

        let per_frame = (self.samples.len() / len).max(1) as f64;
        sums.iter_mut().for_each(|v| *v /= per_frame);
        sums
    }
}
