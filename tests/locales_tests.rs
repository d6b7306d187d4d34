//! Shipped locale files must parse and cover every user-facing error key.

use pixelforge_bot::error::BotError;
use pixelforge_bot::i18n::I18n;

#[test]
fn shipped_locales_load_and_substitute() {
    let i18n = I18n::load("locales").unwrap();
    let text = i18n.get_with("en", "welcome", &[("credits", "5".into())]);
    assert!(text.contains('5'));
    assert!(!text.contains("{credits}"));
    // Indonesian falls back to English for a key it never defines.
    assert_eq!(i18n.get("id", "totally_missing"), "totally_missing");
}

#[test]
fn every_error_key_has_an_english_string() {
    let i18n = I18n::load("locales").unwrap();
    let errors = [
        BotError::InsufficientCredits,
        BotError::UploadLimitReached { current: 5, max: 5 },
        BotError::SourceUnavailable("x".into()),
        BotError::UploadFailed {
            status: 500,
            body: "x".into(),
        },
        BotError::InvalidImageUrl("x".into()),
        BotError::InvalidRouteFormat("x".into()),
        BotError::GenerationFailed("x".into()),
        BotError::GenerationTimedOut(150),
    ];
    for err in errors {
        let key = err.user_message_key().expect("user-visible error");
        let text = i18n.get("en", key);
        assert_ne!(text, key, "missing locale entry for `{key}`");
    }
}
