//! Display names for the `lang` codes posts carry.

use isolang::Language;

/// Retired two-letter codes some exports still use, mapped to their current form.
const LEGACY_CODES: [(&str, &str); 3] = [("in", "id"), ("iw", "he"), ("ji", "yi")];

/// English display name for an ISO 639-1 code (`en` → `English`).
/// Anything else (`und`, `qht`, `qam`, `zxx`, ...) is returned unchanged.
pub fn language_name(code: &str) -> String {
    let norm = code.trim().to_lowercase();
    let norm = LEGACY_CODES
        .iter()
        .find(|(old, _)| *old == norm)
        .map(|(_, new)| new.to_string())
        .unwrap_or(norm);
    if norm.len() != 2 {
        return code.to_string();
    }
    match Language::from_639_1(&norm) {
        Some(lang) => lang.to_name().to_string(),
        None => code.to_string(),
    }
}
