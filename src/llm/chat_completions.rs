//! `OpenAI` Chat Completions API driver.
//!
//! Implements [`LlmDriver`] against `/v1/chat/completions` without streaming.

use serde::Deserialize;

use super::{LlmDriver, LlmError, LlmSettings, Message};

/// Driver for the `OpenAI` Chat Completions API.
#[derive(Clone)]
pub struct ChatCompletionsDriver {
    http: reqwest::Client,
    settings: LlmSettings,
    app_title: String,
}

impl std::fmt::Debug for ChatCompletionsDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsDriver")
            .field("base_url", &self.settings.base_url)
            .field("model", &self.settings.model)
            .field("provider", &self.settings.provider)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsDriver {
    /// Create a new Chat Completions driver with the given settings.
    #[must_use]
    pub fn new(settings: LlmSettings, app_title: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
            app_title: app_title.into(),
        }
    }

    fn request_body(&self, messages: &[Message]) -> serde_json::Value {
        serde_json::json!({
            "model": self.settings.model,
            "messages": messages,
        })
    }
}

#[async_trait::async_trait]
impl LlmDriver for ChatCompletionsDriver {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        let url = self.settings.provider.build_chat_url(&self.settings.base_url);

        let mut rb = self.http.post(&url).json(&self.request_body(messages));
        if let Some(k) = &self.settings.api_key {
            rb = if self.settings.provider.uses_api_key_header() {
                rb.header("api-key", k)
            } else {
                rb.bearer_auth(k)
            };
        }
        for (name, value) in self.settings.provider.extra_headers(&self.app_title) {
            rb = rb.header(name, value);
        }

        let resp = rb.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: CompletionResponse = resp.json().await?;
        extract_content(body)
    }
}

fn extract_content(body: CompletionResponse) -> Result<String, LlmError> {
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or(LlmError::EmptyCompletion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Provider;

    fn settings() -> LlmSettings {
        LlmSettings {
            base_url: "https://openrouter.ai/api".to_string(),
            api_key: Some("sk-test".to_string()),
            model: "deepseek/deepseek-r1:free".to_string(),
            provider: Provider::OpenRouter,
        }
    }

    #[test]
    fn test_request_body() {
        let driver = ChatCompletionsDriver::new(settings(), "The Brands");
        let body = driver.request_body(&[Message::system("rules"), Message::user("hi")]);
        assert_eq!(body["model"], "deepseek/deepseek-r1:free");
        assert_eq!(body["messages"][1]["role"], "user");
        assert!(body.get("stream").is_none());
    }

    #[test]
    fn test_extract_first_choice() {
        let body: CompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"Hello!"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_content(body).unwrap(), "Hello!");
    }

    #[test]
    fn test_empty_choices_is_error() {
        let body: CompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            extract_content(body),
            Err(LlmError::EmptyCompletion)
        ));

        let body: CompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(
            extract_content(body),
            Err(LlmError::EmptyCompletion)
        ));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let driver = ChatCompletionsDriver::new(settings(), "x");
        assert!(!format!("{driver:?}").contains("sk-test"));
    }
}
