//! Storefront assistant behind the Reply Service.
//!
//! Each turn gathers context from the [`catalog`] and the [`faq`], builds a
//! system prompt and asks the model for a reply. Without a configured model
//! the gathered context is returned directly.

pub mod catalog;
pub mod faq;
pub mod prompt;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::llm::LlmDriver;
use crate::session::Session;

pub use catalog::{Catalog, Product};
pub use faq::FaqTopic;

/// Reply sent when the model call fails.
pub const APOLOGY: &str = "Sorry, something went wrong. Please try again later.";

/// Answers customer messages.
#[derive(Debug, Clone)]
pub struct Assistant {
    catalog: Catalog,
    store_name: String,
    llm: Option<Arc<dyn LlmDriver>>,
}

impl Assistant {
    #[must_use]
    pub fn new(catalog: Catalog, store_name: impl Into<String>) -> Self {
        Self {
            catalog,
            store_name: store_name.into(),
            llm: None,
        }
    }

    /// Answer with a model instead of the gathered context alone.
    #[must_use]
    pub fn with_llm(mut self, llm: Arc<dyn LlmDriver>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Produce the reply to `message` within `session`.
    ///
    /// Never fails: model errors become [`APOLOGY`].
    pub async fn reply(&self, session: &Session, message: &str) -> String {
        let faq_text = faq::classify(message).map(FaqTopic::answer).unwrap_or_default();
        let product_text = self
            .catalog
            .find_mentioned(message)
            .map(Product::card)
            .unwrap_or_default();

        debug!(
            session_id = %session.id(),
            faq = !faq_text.is_empty(),
            product = !product_text.is_empty(),
            "Context gathered"
        );

        session.add_user_message(message);

        let Some(llm) = &self.llm else {
            let reply = self.offline_reply(faq_text, &product_text);
            session.add_assistant_message(reply.clone());
            return reply;
        };

        let product_list = self.catalog.available_listing();
        let system_prompt = prompt::build_system_prompt(&prompt::PromptContext {
            store_name: &self.store_name,
            product_list: &product_list,
            user_message: message,
            faq_text,
            product_text: &product_text,
        });

        match llm.complete(&session.messages_with_system(&system_prompt)).await {
            Ok(reply) => {
                session.add_assistant_message(reply.clone());
                reply
            }
            Err(e) => {
                warn!(name: "assistant.llm.failed", error = %e, "LLM call failed");
                APOLOGY.to_string()
            }
        }
    }

    fn offline_reply(&self, faq_text: &str, product_text: &str) -> String {
        match (product_text.is_empty(), faq_text.is_empty()) {
            (false, false) => format!("{product_text}\n\n{faq_text}"),
            (false, true) => product_text.to_string(),
            (true, false) => faq_text.to_string(),
            (true, true) => {
                let names: Vec<&str> = self
                    .catalog
                    .available()
                    .map(|p| p.name.as_str())
                    .collect();
                format!(
                    "Welcome to {}! Ask me about any of our watches: **{}**.",
                    self.store_name,
                    names.join("**, **")
                )
            }
        }
    }
}
