//! # Localization Tests
//!
//! This module contains unit tests for the localization functionality,
//! testing message retrieval and formatting with various edge cases.

use fitbot::localization::{detect_language, t_args_lang, t_lang, LocalizationManager};
use std::collections::HashMap;

const EN_SOURCE: &str = include_str!("../locales/en/main.ftl");
const RU_SOURCE: &str = include_str!("../locales/ru/main.ftl");

/// Message identifiers declared at the start of a line
fn message_keys(source: &str) -> Vec<&str> {
    source
        .lines()
        .filter(|line| !line.starts_with(' ') && !line.starts_with('#'))
        .filter_map(|line| line.split_once(" = ").map(|(key, _)| key.trim()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_localization() -> LocalizationManager {
        // Create a new localization manager for each test
        LocalizationManager::new().expect("Failed to create localization manager")
    }

    #[test]
    fn test_get_message_existing_key() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("help-text", "en", None);
        assert!(message.contains("/start"));
        assert!(message.contains("/cancel"));
    }

    #[test]
    fn test_get_message_nonexistent_key() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("nonexistent-key", "en", None);
        assert!(message.starts_with("Missing translation:"));
    }

    #[test]
    fn test_get_message_unsupported_language() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("menu-profile", "de", None);
        // Should fall back to English
        assert_eq!(message, "👤 My profile");
    }

    #[test]
    fn test_get_message_with_args() {
        let manager = setup_localization();

        let mut args = HashMap::new();
        args.insert("name", "Alex");

        let message = manager.get_message_in_language("welcome", "ru", Some(&args));
        assert!(message.contains("Alex"));
        // No bidi isolation marks around arguments
        assert!(!message.contains('\u{2068}'));
    }

    #[test]
    fn test_russian_and_english_differ() {
        let manager = setup_localization();

        let translations = manager.all_translations("menu-kbju");
        assert_eq!(translations.len(), 2);
        assert_ne!(translations[0], translations[1]);
    }

    #[test]
    fn test_every_english_key_has_russian_translation() {
        let en_keys = message_keys(EN_SOURCE);
        let ru_keys = message_keys(RU_SOURCE);

        assert!(en_keys.len() > 40);
        for key in &en_keys {
            assert!(ru_keys.contains(key), "missing Russian translation for {key}");
        }
        assert_eq!(en_keys.len(), ru_keys.len());
    }

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language(Some("ru")), "ru");
        assert_eq!(detect_language(Some("en-US")), "en");
        assert_eq!(detect_language(Some("fr")), "en");
        assert_eq!(detect_language(None), "en");
    }

    #[test]
    fn test_global_helpers() {
        assert_eq!(t_lang("btn-cancel", Some("ru")), "❌ Отмена");
        let message = t_args_lang("goal-updated", &[("goal", "Muscle gain")], Some("en"));
        assert!(message.contains("Muscle gain"));
    }
}
