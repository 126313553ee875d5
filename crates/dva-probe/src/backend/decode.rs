//! Backend preciso: decodifica el fichero entero y cuenta frames.

#[cfg(feature = "symphonia")]
pub use self::symphonia_impl::DecodeBackend;

#[cfg(feature = "symphonia")]
mod symphonia_impl {
    use std::path::Path;

    use tracing::{Level, debug, instrument};

    use crate::audio::decoder::SymphoniaPcmStream;
    use crate::backend::{BackendKind, BackendMetadata, BackendOutcome, DurationBackend, extension_of};
    use crate::error::Error;

    #[derive(Debug, Default, Clone, Copy)]
    pub struct DecodeBackend;

    impl DurationBackend for DecodeBackend {
        fn kind(&self) -> BackendKind {
            BackendKind::Decode
        }

        #[instrument(level = Level::TRACE, skip(self), err)]
        fn probe(&self, path: &Path) -> Result<BackendOutcome, Error> {
            let mut stream = SymphoniaPcmStream::open(path)?;
            let frames = stream.count_frames()?;
            let info = stream.info();

            if frames == 0 || info.sample_rate == 0 {
                return Err(Error::UnknownDuration);
            }

            let duration = frames as f64 / info.sample_rate as f64;
            let metadata = BackendMetadata {
                method: BackendKind::Decode.name(),
                sample_rate: Some(info.sample_rate),
                channels: Some(u32::from(info.channels)),
                bit_depth: stream.bits_per_sample(),
                duration_samples: Some(frames),
                codec: stream.codec_name().map(str::to_string),
                format: extension_of(path),
                file_size_bytes: std::fs::metadata(path).ok().map(|m| m.len()),
                ..Default::default()
            };

            debug!(frames, sample_rate = info.sample_rate, duration, "decoded duration");
            Ok(BackendOutcome { duration, metadata })
        }
    }
}
