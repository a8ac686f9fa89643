//! # Fitness Assistant Telegram Bot
//!
//! A Telegram bot that onboards users with a short questionnaire, keeps
//! their body parameters and goal, calculates daily calorie and macro
//! targets, and answers fitness and nutrition questions with a language
//! model after filtering out unrelated topics.

pub mod advisor;
pub mod bot;
pub mod circuit_breaker;
pub mod config;
pub mod db;
pub mod dialogue;
pub mod errors;
pub mod llm;
pub mod localization;
pub mod nutrition;
pub mod onboarding;
pub mod profile;
pub mod store;
pub mod text_format;
pub mod topic_filter;
pub mod topic_patterns;
