//! Shared dependencies injected into every handler

use std::sync::Arc;

use crate::config::ChatSettings;
use crate::llm::LlmClient;
use crate::store::UserStore;
use crate::topic_filter::TopicFilter;

/// Clients and settings handed to handlers through the dispatcher
#[derive(Clone)]
pub struct BotContext {
    pub store: Arc<dyn UserStore>,
    pub llm: Arc<dyn LlmClient>,
    pub topic_filter: TopicFilter,
    pub settings: ChatSettings,
}

impl BotContext {
    pub fn new(store: Arc<dyn UserStore>, llm: Arc<dyn LlmClient>, settings: ChatSettings) -> Self {
        let topic_filter = TopicFilter::new(Arc::clone(&llm), settings.classifier_history_turns);
        Self {
            store,
            llm,
            topic_filter,
            settings,
        }
    }
}
