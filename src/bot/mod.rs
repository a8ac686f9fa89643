//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules for better organization:
//! - `message_handler`: Entry point, command and state routing
//! - `menu`: Ordered command and keyboard button tables
//! - `dialogue_manager`: Onboarding, goal change and journal inputs
//! - `chat_handler`: Topic gate and model replies for free-form questions
//! - `ui_builder`: Creates keyboards and formats messages
//! - `context`: Dependencies shared by all handlers

pub mod chat_handler;
pub mod context;
pub mod dialogue_manager;
pub mod menu;
pub mod message_handler;
pub mod ui_builder;

// Re-export main handler function for use in main.rs
pub use context::BotContext;
pub use message_handler::message_handler;
