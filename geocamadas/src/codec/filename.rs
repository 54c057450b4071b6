//! Noms de fichiers dérivés des noms de couches

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Nom utilisé quand rien d'alphanumérique ne subsiste
pub const FALLBACK_FILENAME: &str = "camada";

fn separator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static regex"))
}

/// Minuscules, accents retirés (décomposition NFD), séquences non
/// alphanumériques réduites à un seul `_`, sans `_` en début ni en fin.
pub fn sanitize_filename(name: &str) -> String {
    let lowered: String = name
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    let collapsed = separator_regex().replace_all(&lowered, "_");
    let trimmed = collapsed.trim_matches('_');

    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}
