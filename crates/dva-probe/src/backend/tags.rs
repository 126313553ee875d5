//! Lectura de cabeceras y etiquetas con lofty.
//!
//! Es el backend rápido: la duración sale de las propiedades del contenedor,
//! sin decodificar audio.

#[cfg(feature = "lofty")]
pub use self::lofty_impl::{TagReader, TagsBackend};

/// Claves que ya cubre la sección técnica y no se repiten en `tags`.
pub const TECHNICAL_KEYS: [&str; 5] = ["format_name", "duration", "bit_rate", "sample_rate", "channels"];

/// `TrackTitle` → `track_title`.
pub fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(feature = "lofty")]
mod lofty_impl {
    use std::collections::BTreeMap;
    use std::path::Path;

    use lofty::{
        file::{AudioFile, TaggedFile, TaggedFileExt},
        probe::Probe,
        tag::{ItemKey, ItemValue, Tag, TagType},
    };
    use tracing::{debug, instrument, Level};

    use super::{TECHNICAL_KEYS, snake_case};
    use crate::backend::{BackendKind, BackendMetadata, BackendOutcome, DurationBackend, extension_of};
    use crate::error::Error;

    #[derive(Debug, Default, Clone, Copy)]
    pub struct TagsBackend;

    impl DurationBackend for TagsBackend {
        fn kind(&self) -> BackendKind {
            BackendKind::Tags
        }

        #[instrument(level = Level::TRACE, skip(self), err)]
        fn probe(&self, path: &Path) -> Result<BackendOutcome, Error> {
            let tagged = Probe::open(path)?.read()?;
            let props = tagged.properties();

            let duration = props.duration().as_secs_f64();
            if duration <= 0.0 {
                return Err(Error::UnknownDuration);
            }

            let sample_rate = props.sample_rate();
            let metadata = BackendMetadata {
                method: BackendKind::Tags.name(),
                sample_rate,
                channels: props.channels().map(u32::from),
                bit_depth: props.bit_depth().map(u32::from),
                bitrate: props.overall_bitrate().or_else(|| props.audio_bitrate()),
                duration_samples: sample_rate.map(|sr| (duration * sr as f64).round() as u64),
                format: extension_of(path),
                file_size_bytes: std::fs::metadata(path).ok().map(|m| m.len()),
                ..Default::default()
            };

            debug!(duration, file_type = ?tagged.file_type(), "header duration");
            Ok(BackendOutcome { duration, metadata })
        }
    }

    #[derive(Debug, Default, Clone, Copy)]
    pub struct TagReader;

    impl TagReader {
        pub fn new() -> Self {
            Self
        }

        fn find_best_tag<'a>(&self, tagged: &'a TaggedFile) -> Option<&'a Tag> {
            tagged
                .primary_tag()
                .filter(|t| matches!(t.tag_type(), TagType::Id3v2 | TagType::Ape | TagType::VorbisComments))
                .or_else(|| tagged.tags().iter().find(|t| t.tag_type() == TagType::Id3v2))
                .or_else(|| tagged.first_tag())
        }

        /// Etiquetas de texto del fichero. Un fichero sin etiquetas da un mapa vacío.
        #[instrument(level = Level::TRACE, skip(self), err)]
        pub fn read(&self, path: &Path) -> Result<BTreeMap<String, String>, Error> {
            let tagged = Probe::open(path)?.read()?;
            let Some(tag) = self.find_best_tag(&tagged) else {
                return Ok(BTreeMap::new());
            };

            let mut out = BTreeMap::new();
            for item in tag.items() {
                let ItemValue::Text(text) = item.value() else {
                    continue;
                };
                let key = match item.key() {
                    ItemKey::Unknown(k) => k.to_lowercase(),
                    other => snake_case(&format!("{other:?}")),
                };
                if TECHNICAL_KEYS.contains(&key.as_str()) {
                    continue;
                }
                // Las claves repetidas (varios artistas, etc.) se concatenan.
                out.entry(key)
                    .and_modify(|v: &mut String| {
                        v.push_str("; ");
                        v.push_str(text);
                    })
                    .or_insert_with(|| text.clone());
            }

            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_splits_words() {
        assert_eq!(snake_case("TrackTitle"), "track_title");
        assert_eq!(snake_case("Genre"), "genre");
        assert_eq!(snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn technical_keys_are_listed() {
        assert!(TECHNICAL_KEYS.contains(&"bit_rate"));
        assert!(!TECHNICAL_KEYS.contains(&"title"));
    }
}
