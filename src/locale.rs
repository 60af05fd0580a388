//! Locale string catalog.
//!
//! Catalogs are `key=value` line files embedded at build time. A `Catalog`
//! is parsed once at startup and passed explicitly into everything that
//! composes user-facing text; there is no ambient locale state.

use std::collections::HashMap;

pub const FALLBACK_LOCALE: &str = "english";

const CATALOGS: &[(&str, &str)] = &[
    ("english", include_str!("../assets/i18n/english.txt")),
    ("schinese", include_str!("../assets/i18n/schinese.txt")),
    ("tchinese", include_str!("../assets/i18n/tchinese.txt")),
    ("japanese", include_str!("../assets/i18n/japanese.txt")),
    ("koreana", include_str!("../assets/i18n/koreana.txt")),
];

/// Display name shown in the language selector, and the locale code it
/// selects. Codes follow the platform client's naming.
pub const LANGUAGES: &[(&str, &str)] = &[
    ("English", "english"),
    ("简体中文 (Simplified Chinese)", "schinese"),
    ("繁體中文 (Traditional Chinese)", "tchinese"),
    ("日本語 (Japanese)", "japanese"),
    ("한국어 (Korean)", "koreana"),
    ("ไทย (Thai)", "thai"),
    ("Български (Bulgarian)", "bulgarian"),
    ("Čeština (Czech)", "czech"),
    ("Dansk (Danish)", "danish"),
    ("Deutsch (German)", "german"),
    ("Español - España (Spanish - Spain)", "spanish"),
    ("Español - Latinoamérica (Spanish - Latin America)", "latam"),
    ("Ελληνικά (Greek)", "greek"),
    ("Français (French)", "french"),
    ("Italiano (Italian)", "italian"),
    ("Bahasa Indonesia (Indonesian)", "indonesian"),
    ("Magyar (Hungarian)", "hungarian"),
    ("Nederlands (Dutch)", "dutch"),
    ("Norsk (Norwegian)", "norwegian"),
    ("Polski (Polish)", "polish"),
    ("Português (Portugal)", "portuguese"),
    ("Português - Brasil (Portuguese - Brazil)", "brazilian"),
    ("Română (Romanian)", "romanian"),
    ("Русский (Russian)", "russian"),
    ("Suomi (Finnish)", "finnish"),
    ("Svenska (Swedish)", "swedish"),
    ("Türkçe (Turkish)", "turkish"),
    ("Tiếng Việt (Vietnamese)", "vietnamese"),
    ("Українська (Ukrainian)", "ukrainian"),
];

/// Immutable locale-string lookup for one install attempt.
#[derive(Debug, Clone)]
pub struct Catalog {
    code: String,
    strings: HashMap<String, String>,
}

impl Catalog {
    /// Load the catalog for a locale code or a free-form language name.
    /// Unknown locales fall back to English.
    pub fn load(locale: &str) -> Self {
        let code = normalize(locale);
        let raw = CATALOGS
            .iter()
            .find(|(name, _)| *name == code)
            .or_else(|| CATALOGS.iter().find(|(name, _)| *name == FALLBACK_LOCALE))
            .map(|(_, raw)| *raw)
            .unwrap_or_default();
        Self {
            code,
            strings: parse(raw),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Look up a key, trying the exact form then its lowercase form, and
    /// returning the key itself when the catalog has no entry.
    pub fn text<'a>(&'a self, key: &'a str) -> &'a str {
        if let Some(value) = self.strings.get(key) {
            return value;
        }
        if let Some(value) = self.strings.get(&key.to_lowercase()) {
            return value;
        }
        key
    }
}

fn parse(raw: &str) -> HashMap<String, String> {
    let mut strings = HashMap::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.split_once('=') {
            Some((key, value)) => {
                strings.insert(key.trim().to_string(), value.trim().to_string());
            }
            // a bare key maps to itself
            None => {
                strings.insert(line.to_string(), line.to_string());
            }
        }
    }
    strings
}

/// Reduce a locale code or an English language name ("Chinese (Simplified)",
/// "Portuguese - Brazil", …) to a catalog code.
pub fn normalize(locale: &str) -> String {
    let lower = locale.to_lowercase();
    if lower.contains("chinese") {
        if lower.contains("simplified") || lower == "schinese" {
            return "schinese".into();
        }
        return "tchinese".into();
    }
    if lower.contains("spanish") {
        if lower.contains("latin") {
            return "latam".into();
        }
        return "spanish".into();
    }
    if lower.contains("portuguese") {
        if lower.contains("brazil") {
            return "brazilian".into();
        }
        return "portuguese".into();
    }
    if lower.contains("korean") {
        return "koreana".into();
    }
    lower
}

/// Display names for the language selector. English and the two Chinese
/// entries are pinned to the top, the rest sorts alphabetically.
pub fn language_names() -> Vec<&'static str> {
    let pinned = [
        "English",
        "简体中文 (Simplified Chinese)",
        "繁體中文 (Traditional Chinese)",
    ];
    let mut rest: Vec<&'static str> = LANGUAGES
        .iter()
        .map(|(name, _)| *name)
        .filter(|name| !pinned.contains(name))
        .collect();
    rest.sort_unstable();
    pinned.into_iter().chain(rest).collect()
}

/// Locale code for a selector display name; unknown names select English.
pub fn code_for_language(display: &str) -> &'static str {
    LANGUAGES
        .iter()
        .find(|(name, _)| *name == display)
        .map(|(_, code)| *code)
        .unwrap_or(FALLBACK_LOCALE)
}

/// Position of a locale code within `language_names()`, for pre-selecting
/// the detected UI language. Unknown codes land on the first entry.
pub fn index_of_code(code: &str) -> usize {
    language_names()
        .iter()
        .position(|name| code_for_language(name) == code)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_catalog_maps_keys_to_themselves() {
        let catalog = Catalog::load("english");
        assert_eq!(catalog.text("Install"), "Install");
        assert_eq!(catalog.text("Create Directory"), "Create Directory");
    }

    #[test]
    fn translated_catalog_resolves_values() {
        let catalog = Catalog::load("schinese");
        assert_eq!(catalog.text("Install"), "安装");
        // missing keys fall back to the key itself
        assert_eq!(catalog.text("No Such Key"), "No Such Key");
    }

    #[test]
    fn unknown_locale_falls_back_to_english() {
        let catalog = Catalog::load("klingon");
        assert_eq!(catalog.code(), "klingon");
        assert_eq!(catalog.text("Install"), "Install");
    }

    #[test]
    fn normalization_resolves_compound_names() {
        assert_eq!(normalize("Chinese (Simplified)"), "schinese");
        assert_eq!(normalize("Chinese (Traditional)"), "tchinese");
        assert_eq!(normalize("Spanish - Latin America"), "latam");
        assert_eq!(normalize("Portuguese - Brazil"), "brazilian");
        assert_eq!(normalize("Korean"), "koreana");
        assert_eq!(normalize("English"), "english");
    }

    #[test]
    fn selector_pins_english_and_chinese_first() {
        let names = language_names();
        assert_eq!(names[0], "English");
        assert_eq!(names[1], "简体中文 (Simplified Chinese)");
        assert_eq!(names[2], "繁體中文 (Traditional Chinese)");
        assert_eq!(names.len(), LANGUAGES.len());
    }

    #[test]
    fn selector_round_trips_codes() {
        assert_eq!(code_for_language("日本語 (Japanese)"), "japanese");
        assert_eq!(code_for_language("not a language"), "english");
        let idx = index_of_code("japanese");
        assert_eq!(code_for_language(language_names()[idx]), "japanese");
    }
}
