//! Menu module resolving commands and keyboard buttons to actions.
//!
//! Both tables are evaluated top to bottom and the first match wins.

use crate::localization::get_localization_manager;

/// Slash commands understood in every state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
    Cancel,
}

const COMMAND_ROUTES: &[(&str, BotCommand)] = &[
    ("/start", BotCommand::Start),
    ("/help", BotCommand::Help),
    ("/cancel", BotCommand::Cancel),
];

/// Main menu buttons
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Profile,
    Kbju,
    ChangeGoal,
    DiaryAdd,
    DiaryShow,
    ProgressAdd,
    ProgressShow,
    Help,
    Cancel,
}

/// Button label keys in the order they are matched
pub const MENU_ROUTES: &[(&str, MenuAction)] = &[
    ("menu-profile", MenuAction::Profile),
    ("menu-kbju", MenuAction::Kbju),
    ("menu-change-goal", MenuAction::ChangeGoal),
    ("menu-diary", MenuAction::DiaryAdd),
    ("menu-diary-show", MenuAction::DiaryShow),
    ("menu-progress", MenuAction::ProgressAdd),
    ("menu-progress-show", MenuAction::ProgressShow),
    ("menu-help", MenuAction::Help),
    ("btn-cancel", MenuAction::Cancel),
];

/// Parse a slash command, ignoring arguments and a `@botname` suffix
pub fn parse_command(text: &str) -> Option<BotCommand> {
    let first = text.split_whitespace().next()?;
    let command = first.split('@').next().unwrap_or(first).to_lowercase();

    COMMAND_ROUTES
        .iter()
        .find(|(name, _)| *name == command)
        .map(|(_, action)| *action)
}

/// Resolve a button label in any supported language
pub fn resolve_menu_action(text: &str) -> Option<MenuAction> {
    let text = text.trim();
    let manager = get_localization_manager();

    MENU_ROUTES
        .iter()
        .find(|(key, _)| manager.all_translations(key).iter().any(|label| label == text))
        .map(|(_, action)| *action)
}

/// Whether the text is the cancel button in any language
pub fn is_cancel(text: &str) -> bool {
    matches!(parse_command(text), Some(BotCommand::Cancel))
        || resolve_menu_action(text) == Some(MenuAction::Cancel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("/start"), Some(BotCommand::Start));
        assert_eq!(parse_command("/START@fit_bot"), Some(BotCommand::Start));
        assert_eq!(parse_command("/help me"), Some(BotCommand::Help));
        assert_eq!(parse_command("/unknown"), None);
        assert_eq!(parse_command("start"), None);
    }

    #[test]
    fn test_resolve_menu_action_both_languages() {
        assert_eq!(resolve_menu_action("👤 My profile"), Some(MenuAction::Profile));
        assert_eq!(resolve_menu_action("🔢 Рассчитать КБЖУ"), Some(MenuAction::Kbju));
        assert_eq!(resolve_menu_action("How much protein?"), None);
    }

    #[test]
    fn test_cancel_detection() {
        assert!(is_cancel("/cancel"));
        assert!(is_cancel("❌ Cancel"));
        assert!(is_cancel("❌ Отмена"));
        assert!(!is_cancel("cancel my gym membership"));
    }

    #[test]
    fn test_menu_routes_are_unique() {
        for (i, (key, _)) in MENU_ROUTES.iter().enumerate() {
            assert!(
                MENU_ROUTES[i + 1..].iter().all(|(other, _)| other != key),
                "duplicate route {key}"
            );
        }
    }
}
