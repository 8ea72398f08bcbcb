//! Text generation contract and HTTP client (chat-completions shape).

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ServiceError;
use crate::http::parse_response;

/// Natural-language completion over an optional reference image.
#[async_trait]
pub trait TextGeneration: Send + Sync {
    /// Run one completion and return the reply text verbatim. Callers
    /// own retry and refusal handling.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        image_url: Option<&str>,
    ) -> Result<String, ServiceError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Wire shape of chat-completions responses (only the fields we read).
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP client for the text-generation service.
pub struct HttpTextGeneration {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
    model: String,
}

impl HttpTextGeneration {
    /// Create a client for the completion API.
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        api_token: String,
        model: String,
    ) -> Self {
        Self {
            client,
            base_url,
            api_token,
            model,
        }
    }
}

#[async_trait]
impl TextGeneration for HttpTextGeneration {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        image_url: Option<&str>,
    ) -> Result<String, ServiceError> {
        let mut user_content = vec![serde_json::json!({
            "type": "text",
            "text": user_prompt,
        })];
        if let Some(url) = image_url {
            user_content.push(serde_json::json!({
                "type": "image_url",
                "image_url": { "url": url },
            }));
        }

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_content },
            ],
        });

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await?;

        let completion: CompletionResponse = parse_response(response).await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ServiceError::MissingField("choices[0].message.content"))
    }
}
