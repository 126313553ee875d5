//! Informe que se muestra al cargar el plugin.

use std::fmt::Write;

use dva_probe::backend::{BackendKind, DependencyStatus};
use indoc::{indoc, writedoc};

use crate::registry::NodeRegistry;

const WIDTH: usize = 60;

const FFPROBE_HINTS: &str = indoc! {"
    ⚠️  ffprobe not found:
       • Ubuntu/Debian: sudo apt install ffmpeg
       • Windows: download it from ffmpeg.org and add it to PATH
       • macOS: brew install ffmpeg
"};

pub fn render(registry: &NodeRegistry, dependencies: &[DependencyStatus]) -> String {
    let border = "=".repeat(WIDTH);
    let mut out = String::new();

    // escribir en un String no falla
    let _ = writedoc!(
        out,
        "

        {border}
        {title:^width$}
        {border}

        📊 Nodes loaded: {count}
        ",
        title = "🎵 DVA AUDIO NODES - LOADED 🎵",
        count = registry.len(),
        width = WIDTH,
    );
    for name in registry.display_names().values() {
        let _ = writeln!(out, "   • {name}");
    }

    let _ = writeln!(out, "\n🔧 Dependencies:");
    for dep in dependencies {
        let status = if dep.available { "✅ available" } else { "❌ missing" };
        let _ = match &dep.detail {
            Some(detail) => writeln!(out, "   • {:<10} : {status} ({detail})", dep.name.to_uppercase()),
            None => writeln!(out, "   • {:<10} : {status}", dep.name.to_uppercase()),
        };
    }

    let missing_features: Vec<&str> = dependencies
        .iter()
        .filter(|d| !d.available && d.name != BackendKind::Ffprobe.name())
        .map(|d| d.name)
        .collect();
    if !missing_features.is_empty() {
        let _ = writeln!(out, "\n⚠️  Recommendations:");
        for name in missing_features {
            let _ = writeln!(out, "   • Rebuild dva-probe with the `{name}` feature");
        }
    }

    let ffprobe_missing = dependencies
        .iter()
        .any(|d| d.name == BackendKind::Ffprobe.name() && !d.available);
    if ffprobe_missing {
        out.push('\n');
        out.push_str(FFPROBE_HINTS);
    }

    let _ = writeln!(out, "\n📁 Categories:");
    for category in registry.categories() {
        let _ = writeln!(out, "   • {category}");
    }

    let _ = writedoc!(
        out,
        "

        {border}
        {footer:^width$}
        {border}
        ",
        footer = "🎧 Ready. Restart the host if the nodes are not visible.",
        width = WIDTH,
    );
    out
}
