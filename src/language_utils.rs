use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Language utilities for free-form language names
///
/// Users name languages the way they speak about them ("japanese", "German").
/// Backends want short codes. Known names resolve through a closed table;
/// anything else is handed to the backend verbatim.
static LANGUAGE_CODES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("english", "en"),
        ("japanese", "ja"),
        ("chinese", "zh"),
        ("korean", "ko"),
        ("french", "fr"),
        ("german", "de"),
        ("spanish", "es"),
        ("italian", "it"),
        ("portuguese", "pt"),
        ("russian", "ru"),
    ])
});

/// Resolve a language name to the code the backends expect
///
/// Lookup is case-insensitive. Unknown names are returned unchanged so that
/// callers can pass codes (or exotic names) straight through.
pub fn resolve_language_code(name: &str) -> String {
    let trimmed = name.trim();
    LANGUAGE_CODES
        .get(trimmed.to_lowercase().as_str())
        .map(|code| code.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Human readable name for a language identifier
///
/// Accepts either a known name or a known code and returns the capitalized
/// English name; anything else is echoed back.
pub fn get_language_name(identifier: &str) -> String {
    let lowered = identifier.trim().to_lowercase();
    let name = if LANGUAGE_CODES.contains_key(lowered.as_str()) {
        Some(lowered.as_str())
    } else {
        LANGUAGE_CODES
            .iter()
            .find(|(_, code)| **code == lowered)
            .map(|(name, _)| *name)
    };

    match name {
        Some(name) => {
            let mut chars = name.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
        None => identifier.trim().to_string(),
    }
}
