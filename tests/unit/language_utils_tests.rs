/*!
 * Tests for language name resolution
 */

use pdftrans::language_utils::{get_language_name, resolve_language_code};

#[test]
fn test_resolveLanguageCode_withKnownNames_shouldReturnCodes() {
    let expected = [
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
    ];
    for (name, code) in expected {
        assert_eq!(resolve_language_code(name), code, "name: {}", name);
    }
}

#[test]
fn test_resolveLanguageCode_shouldIgnoreCase() {
    assert_eq!(resolve_language_code("Japanese"), "ja");
    assert_eq!(resolve_language_code("  GERMAN "), "de");
}

#[test]
fn test_resolveLanguageCode_withUnknownName_shouldPassThrough() {
    assert_eq!(resolve_language_code("klingon"), "klingon");
    assert_eq!(resolve_language_code("zh-TW"), "zh-TW");
}

#[test]
fn test_getLanguageName_shouldAcceptNamesAndCodes() {
    assert_eq!(get_language_name("ja"), "Japanese");
    assert_eq!(get_language_name("french"), "French");
    assert_eq!(get_language_name("xx"), "xx");
}
