//! Formateo de duraciones para humanos.

pub const MAX_PRECISION: u8 = 6;

/// `HH:MM:SS.mmm` si hay horas, si no `MM:SS.mmm`.
pub fn format_duration(seconds: f64) -> String {
    if seconds.is_nan() || seconds <= 0.0 {
        return "00:00:00.000".to_string();
    }

    // redondear a milisegundos antes de partir, para no producir `00:60.000`
    let millis = (seconds * 1000.0).round() as u64;
    let hours = millis / 3_600_000;
    let minutes = (millis % 3_600_000) / 60_000;
    let secs = (millis % 60_000) / 1000;
    let ms = millis % 1000;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}.{ms:03}")
    } else {
        format!("{minutes:02}:{secs:02}.{ms:03}")
    }
}

/// Redondea a `precision` decimales (máximo 6).
pub fn round_to(value: f64, precision: u8) -> f64 {
    let factor = 10f64.powi(i32::from(precision.min(MAX_PRECISION)));
    (value * factor).round() / factor
}

/// Reloj corto para resúmenes: `m:ss.s` o `h:mm:ss.s`.
pub fn short_clock(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let hours = (seconds / 3600.0).floor() as u64;
    let minutes = ((seconds % 3600.0) / 60.0).floor() as u64;
    let secs = seconds % 60.0;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:04.1}")
    } else {
        format!("{minutes}:{secs:04.1}")
    }
}

/// Total de un lote: `42.0s`, `3.5m` o `1.2h`.
pub fn adaptive_total(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{seconds:.1}s")
    } else if seconds < 3600.0 {
        format!("{:.1}m", seconds / 60.0)
    } else {
        format!("{:.1}h", seconds / 3600.0)
    }
}
