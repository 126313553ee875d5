//! Patrones de nombre de fichero estilo shell (`*`, `?`, `[seq]`, `[!seq]`).
//!
//! Se traducen a una expresión regular anclada. La comparación distingue
//! mayúsculas y se hace sobre el nombre del fichero, no sobre la ruta.

use regex::Regex;

use crate::error::Error;

pub const DEFAULT_PATTERNS: &str = "*.mp3,*.wav,*.flac";

#[derive(Debug, Clone)]
pub struct FilePattern {
    raw: String,
    regex: Regex,
}

impl FilePattern {
    pub fn new(pattern: &str) -> Result<Self, Error> {
        let regex = Regex::new(&translate(pattern)).map_err(|source| Error::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            raw: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// Lista de patrones separados por comas.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<FilePattern>,
}

impl PatternSet {
    /// Una lista vacía equivale a [`DEFAULT_PATTERNS`].
    pub fn parse(list: &str) -> Result<Self, Error> {
        let mut parts: Vec<&str> = list.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
        if parts.is_empty() {
            parts = DEFAULT_PATTERNS.split(',').collect();
        }

        let patterns = parts.into_iter().map(FilePattern::new).collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn patterns(&self) -> &[FilePattern] {
        &self.patterns
    }

    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(name))
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        // los patrones por defecto son válidos
        Self {
            patterns: DEFAULT_PATTERNS
                .split(',')
                .filter_map(|p| FilePattern::new(p).ok())
                .collect(),
        }
    }
}

fn translate(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("^(?s:");
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                out.push_str(".*");
                // `**` equivale a `*`
                while i + 1 < chars.len() && chars[i + 1] == '*' {
                    i += 1;
                }
            }
            '?' => out.push('.'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push_str(&translate_class(&chars[i + 1..end]));
                    i = end;
                }
                None => out.push_str(r"\["),
            },
            c => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
        i += 1;
    }

    out.push_str(")$");
    out
}

/// Índice del `]` que cierra la clase abierta en `start`.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    // un `]` inicial es literal
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    while j < chars.len() {
        if chars[j] == ']' {
            return Some(j);
        }
        j += 1;
    }
    None
}

fn translate_class(body: &[char]) -> String {
    let (negated, body) = match body.split_first() {
        Some(('!', rest)) => (true, rest),
        _ => (false, body),
    };

    let mut out = String::from(if negated { "[^" } else { "[" });
    for (k, c) in body.iter().enumerate() {
        let is_range = *c == '-' && k > 0 && k + 1 < body.len() && body[k - 1] != '-';
        if is_range {
            out.push('-');
        } else {
            out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
        }
    }
    out.push(']');
    out
}
