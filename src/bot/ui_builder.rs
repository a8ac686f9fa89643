//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{KeyboardButton, KeyboardMarkup, KeyboardRemove, ReplyMarkup};

use crate::localization::{t_args_lang, t_lang};
use crate::nutrition::KbjuEstimate;
use crate::onboarding::OnboardingStep;
use crate::profile::UserProfile;
use crate::store::JournalEntry;

fn keyboard(rows: Vec<Vec<String>>) -> KeyboardMarkup {
    KeyboardMarkup::new(
        rows.into_iter()
            .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>())
            .collect::<Vec<_>>(),
    )
    .resize_keyboard()
}

/// Main menu keyboard shown after onboarding
pub fn create_main_menu_keyboard(language_code: Option<&str>) -> KeyboardMarkup {
    let t = |key| t_lang(key, language_code);
    keyboard(vec![
        vec![t("menu-profile"), t("menu-kbju")],
        vec![t("menu-diary"), t("menu-diary-show")],
        vec![t("menu-progress"), t("menu-progress-show")],
        vec![t("menu-change-goal"), t("menu-help")],
    ])
}

/// Single cancel button used while waiting for a free-text value
pub fn create_cancel_keyboard(language_code: Option<&str>) -> KeyboardMarkup {
    keyboard(vec![vec![t_lang("btn-cancel", language_code)]])
}

pub fn create_goal_keyboard(language_code: Option<&str>) -> KeyboardMarkup {
    let t = |key| t_lang(key, language_code);
    keyboard(vec![
        vec![t("btn-goal-loss")],
        vec![t("btn-goal-maintain")],
        vec![t("btn-goal-gain")],
    ])
}

/// Goal choices plus a cancel button, for changing the goal later
pub fn create_goal_change_keyboard(language_code: Option<&str>) -> KeyboardMarkup {
    let t = |key| t_lang(key, language_code);
    keyboard(vec![
        vec![t("btn-goal-loss")],
        vec![t("btn-goal-maintain")],
        vec![t("btn-goal-gain")],
        vec![t("btn-cancel")],
    ])
}

/// Reply markup accompanying an onboarding question
pub fn onboarding_markup(step: OnboardingStep, language_code: Option<&str>) -> ReplyMarkup {
    let t = |key| t_lang(key, language_code);
    match step {
        OnboardingStep::Gender => keyboard(vec![vec![t("btn-male"), t("btn-female")]]).into(),
        OnboardingStep::Goal => create_goal_keyboard(language_code).into(),
        OnboardingStep::Activity => keyboard(vec![
            vec![t("btn-activity-minimal")],
            vec![t("btn-activity-light")],
            vec![t("btn-activity-moderate")],
            vec![t("btn-activity-high")],
            vec![t("btn-activity-extreme")],
        ])
        .into(),
        _ => KeyboardRemove::new().into(),
    }
}

/// Profile summary, or a hint to run /start when onboarding is not done
pub fn format_profile(profile: &UserProfile, language_code: Option<&str>) -> String {
    let params = match &profile.params {
        Some(params) => params,
        None => return t_lang("profile-not-ready", language_code),
    };

    let activity = params.activity_factor.to_string();
    let body = t_args_lang(
        "profile-body",
        &[
            ("gender", &params.gender),
            ("weight", &params.weight),
            ("height", &params.height),
            ("age", &params.age),
            ("health", &params.health),
            ("goal", &params.goal),
            ("activity", &activity),
            ("subscription", profile.subscription.as_str()),
        ],
        language_code,
    );

    format!("{}\n\n{}", t_lang("profile-title", language_code), body)
}

/// KBJU targets rounded to whole numbers
pub fn format_kbju(estimate: &KbjuEstimate, language_code: Option<&str>) -> String {
    let round = |value: f64| format!("{:.0}", value);
    t_args_lang(
        "kbju-result",
        &[
            ("calories", &round(estimate.calories)),
            ("protein", &round(estimate.protein_g)),
            ("fat", &round(estimate.fat_g)),
            ("carbs", &round(estimate.carbs_g)),
            ("bmr", &round(estimate.bmr)),
            ("tdee", &round(estimate.tdee)),
        ],
        language_code,
    )
}

/// Journal listing, newest first
pub fn format_journal(title: &str, entries: &[JournalEntry]) -> String {
    let mut result = format!("{title}\n\n");

    for entry in entries {
        result.push_str(&format!(
            "• {} - {}\n",
            entry.created_at.format("%d.%m.%Y %H:%M"),
            entry.text
        ));
    }

    result
}
