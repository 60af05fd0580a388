//! Host identity and UI-language probing.
//!
//! Both are opaque input providers as far as the orchestrator is concerned:
//! the host name seeds the obfuscation keys, the UI language pre-selects the
//! wizard's language entry.

use sysinfo::System;

use crate::locale::FALLBACK_LOCALE;

/// Used when the host reports no name; the obfuscation key must still be
/// reproducible on the same machine.
pub const FALLBACK_HOST: &str = "forgekit-host";

pub fn host_name() -> String {
    System::host_name().unwrap_or_else(|| FALLBACK_HOST.to_string())
}

/// Best-effort locale code for the user's UI language, from the standard
/// locale environment variables. Unknown or unset environments select
/// English.
pub fn ui_language() -> String {
    for var in ["LC_ALL", "LC_MESSAGES", "LANG"] {
        if let Ok(value) = std::env::var(var) {
            if let Some(code) = locale_code_for(&value) {
                return code.to_string();
            }
        }
    }
    FALLBACK_LOCALE.to_string()
}

fn locale_code_for(tag: &str) -> Option<&'static str> {
    // "zh_CN.UTF-8" → "zh_CN"; "pt_BR" → "pt_BR"; "C" and "POSIX" → None
    let tag = tag.split('.').next().unwrap_or(tag).replace('-', "_");
    let (lang, region) = match tag.split_once('_') {
        Some((lang, region)) => (lang.to_lowercase(), Some(region.to_uppercase())),
        None => (tag.to_lowercase(), None),
    };
    let code = match (lang.as_str(), region.as_deref()) {
        ("zh", Some("CN") | Some("SG")) => "schinese",
        ("zh", _) => "tchinese",
        ("ja", _) => "japanese",
        ("ko", _) => "koreana",
        ("th", _) => "thai",
        ("bg", _) => "bulgarian",
        ("cs", _) => "czech",
        ("da", _) => "danish",
        ("de", _) => "german",
        ("es", Some("ES")) | ("es", None) => "spanish",
        ("es", _) => "latam",
        ("el", _) => "greek",
        ("fr", _) => "french",
        ("it", _) => "italian",
        ("id", _) => "indonesian",
        ("hu", _) => "hungarian",
        ("nl", _) => "dutch",
        ("no", _) | ("nb", _) | ("nn", _) => "norwegian",
        ("pl", _) => "polish",
        ("pt", Some("BR")) => "brazilian",
        ("pt", _) => "portuguese",
        ("ro", _) => "romanian",
        ("ru", _) => "russian",
        ("fi", _) => "finnish",
        ("sv", _) => "swedish",
        ("tr", _) => "turkish",
        ("vi", _) => "vietnamese",
        ("uk", _) => "ukrainian",
        ("en", _) => "english",
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_tags_map_onto_catalog_codes() {
        assert_eq!(locale_code_for("zh_CN.UTF-8"), Some("schinese"));
        assert_eq!(locale_code_for("zh_TW"), Some("tchinese"));
        assert_eq!(locale_code_for("pt_BR.UTF-8"), Some("brazilian"));
        assert_eq!(locale_code_for("pt_PT"), Some("portuguese"));
        assert_eq!(locale_code_for("es_MX"), Some("latam"));
        assert_eq!(locale_code_for("es_ES"), Some("spanish"));
        assert_eq!(locale_code_for("en_US.UTF-8"), Some("english"));
        assert_eq!(locale_code_for("C"), None);
        assert_eq!(locale_code_for("POSIX"), None);
    }

    #[test]
    fn host_name_is_never_empty() {
        assert!(!host_name().is_empty());
    }
}
