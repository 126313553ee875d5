#[cfg(feature = "symphonia")]
pub use self::symphonia_impl::{DecodeError, SymphoniaPcmStream};

#[cfg(feature = "symphonia")]
mod symphonia_impl {
    use std::fs::File;
    use std::path::{Path, PathBuf};

    use symphonia::core::audio::SampleBuffer as SymphoniaSampleBuffer;
    use symphonia::core::codecs::{CODEC_TYPE_NULL, CodecType, Decoder, DecoderOptions};
    use symphonia::core::errors::Error as SymphoniaError;
    use symphonia::core::formats::{FormatOptions, FormatReader};
    use symphonia::core::io::MediaSourceStream;
    use symphonia::core::meta::MetadataOptions;
    use symphonia::core::probe::Hint;
    use thiserror::Error;
    use tracing::warn;

    use crate::audio::{PcmStream, StreamInfo};
    use crate::error::Error;

    #[derive(Debug, Error)]
    pub enum DecodeError {
        #[error("Failed to open file: {}", path.display())]
        FileOpen {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },

        #[error("Failed to probe file format: {0}")]
        ProbeFormat(#[source] SymphoniaError),

        #[error("No compatible audio track found in the file")]
        NoCompatibleTrack,

        #[error("Failed to create decoder for codec: {codec:?}")]
        CreateDecoder {
            codec: CodecType,
            #[source]
            source: SymphoniaError,
        },

        #[error("Failed to read audio packet: {0}")]
        PacketRead(#[source] SymphoniaError),

        #[error("Unrecoverable decoder error: {0}")]
        Decoder(#[source] SymphoniaError),
    }

    pub struct SymphoniaPcmStream {
        format: Box<dyn FormatReader>,
        decoder: Box<dyn Decoder>,
        track_id: u32,
        info: StreamInfo,
        codec: CodecType,
        bits_per_sample: Option<u32>,
        eof: bool,
    }

    impl SymphoniaPcmStream {
        pub fn open(path: &Path) -> Result<Self, Error> {
            let file = File::open(path).map_err(|e| DecodeError::FileOpen {
                path: path.to_path_buf(),
                source: e,
            })?;

            let mss = MediaSourceStream::new(Box::new(file), Default::default());
            let mut hint = Hint::new();
            if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                hint.with_extension(ext);
            }

            let probed = symphonia::default::get_probe()
                .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
                .map_err(DecodeError::ProbeFormat)?;

            let format = probed.format;
            let track = format
                .tracks()
                .iter()
                .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
                .ok_or(DecodeError::NoCompatibleTrack)?;

            let params = &track.codec_params;
            let decoder = symphonia::default::get_codecs()
                .make(params, &DecoderOptions::default())
                .map_err(|e| DecodeError::CreateDecoder {
                    codec: params.codec,
                    source: e,
                })?;

            let info = StreamInfo {
                sample_rate: params.sample_rate.unwrap_or(0),
                channels: params.channels.map(|c| c.count() as u16).unwrap_or(1),
            };
            let track_id = track.id;
            let codec = params.codec;
            let bits_per_sample = params.bits_per_sample;

            Ok(Self {
                format,
                decoder,
                track_id,
                info,
                codec,
                bits_per_sample,
                eof: false,
            })
        }

        pub fn info(&self) -> StreamInfo {
            self.info
        }

        pub fn codec_name(&self) -> Option<&'static str> {
            symphonia::default::get_codecs()
                .get_codec(self.codec)
                .map(|d| d.short_name)
        }

        pub fn bits_per_sample(&self) -> Option<u32> {
            self.bits_per_sample
        }

        /// Decodifica todo el stream contando frames, sin copiar muestras.
        pub fn count_frames(&mut self) -> Result<u64, Error> {
            let mut frames = 0u64;
            while let Some(packet) = self.next_packet()? {
                match self.decoder.decode(&packet) {
                    Ok(decoded) => {
                        let spec = decoded.spec();
                        self.info.sample_rate = spec.rate;
                        self.info.channels = spec.channels.count() as u16;
                        frames += decoded.frames() as u64;
                    }
                    Err(SymphoniaError::DecodeError(e)) => warn!(error = e, "skipping undecodable packet"),
                    Err(SymphoniaError::IoError(_)) => break,
                    Err(e) => return Err(DecodeError::Decoder(e).into()),
                }
            }
            self.eof = true;
            Ok(frames)
        }

        fn next_packet(&mut self) -> Result<Option<symphonia::core::formats::Packet>, Error> {
            if self.eof {
                return Ok(None);
            }
            loop {
                match self.format.next_packet() {
                    Ok(packet) if packet.track_id() == self.track_id => return Ok(Some(packet)),
                    Ok(_) => continue,
                    Err(SymphoniaError::IoError(ref err)) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                        self.eof = true;
                        return Ok(None);
                    }
                    Err(SymphoniaError::ResetRequired) => {
                        self.eof = true;
                        return Ok(None);
                    }
                    Err(err) => return Err(DecodeError::PacketRead(err).into()),
                }
            }
        }
    }

    impl PcmStream for SymphoniaPcmStream {
        fn next_chunk(&mut self) -> Result<Option<Vec<f32>>, Error> {
            while let Some(packet) = self.next_packet()? {
                match self.decoder.decode(&packet) {
                    Ok(decoded) => {
                        if decoded.frames() == 0 {
                            continue;
                        }
                        let spec = *decoded.spec();
                        self.info.sample_rate = spec.rate;
                        self.info.channels = spec.channels.count() as u16;

                        let mut buf = SymphoniaSampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                        buf.copy_interleaved_ref(decoded);
                        return Ok(Some(buf.samples().to_vec()));
                    }
                    Err(SymphoniaError::DecodeError(e)) => warn!(error = e, "skipping undecodable packet"),
                    Err(SymphoniaError::IoError(_)) => {
                        self.eof = true;
                        return Ok(None);
                    }
                    Err(e) => return Err(DecodeError::Decoder(e).into()),
                }
            }
            Ok(None)
        }

        fn format(&self) -> Option<StreamInfo> {
            Some(self.info)
        }
    }
}
