//! reqwest binding to the hosted Assistants API.
//!
//! Every call carries the bearer credential and the `OpenAI-Beta`
//! feature opt-in header. Non-2xx responses keep the upstream error body.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use rxlens_core::{AssistantService, RunStatus, RxError};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const BETA_HEADER: &str = "OpenAI-Beta";
const BETA_VALUE: &str = "assistants=v2";

/// Assistants-API implementation of [`AssistantService`].
pub struct OpenAiAssistant {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiAssistant {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .header(BETA_HEADER, BETA_VALUE)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .header(BETA_HEADER, BETA_VALUE)
    }
}

#[derive(Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Deserialize)]
struct RunStatusResponse {
    status: String,
}

#[derive(Deserialize)]
struct MessageList {
    data: Vec<ThreadMessage>,
}

#[derive(Deserialize)]
struct ThreadMessage {
    content: Vec<MessagePart>,
}

#[derive(Deserialize)]
struct MessagePart {
    #[serde(default)]
    text: Option<MessageText>,
}

#[derive(Deserialize)]
struct MessageText {
    value: String,
}

fn transport(e: reqwest::Error) -> RxError {
    RxError::Transport(e.to_string())
}

/// Turn a non-2xx response into a Transport error carrying the body.
async fn reject(resp: reqwest::Response) -> RxError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    RxError::Transport(format!("{status}: {body}"))
}

#[async_trait]
impl AssistantService for OpenAiAssistant {
    async fn upload_file(
        &self,
        file_name: &str,
        mime_type: &str,
        data: Vec<u8>,
    ) -> Result<String, RxError> {
        let part = reqwest::multipart::Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(mime_type)
            .map_err(|e| RxError::Upload(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("purpose", "assistants")
            .part("file", part);

        let resp = self
            .post("/files")
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(RxError::Upload(format!("{status}: {body}")));
        }

        let parsed: IdResponse = resp.json().await.map_err(transport)?;
        debug!(file_id = %parsed.id, "File uploaded");
        Ok(parsed.id)
    }

    async fn create_thread(&self) -> Result<String, RxError> {
        let resp = self
            .post("/threads")
            .json(&json!({}))
            .send()
            .await
            .map_err(transport)?;
        if !resp.status().is_success() {
            return Err(reject(resp).await);
        }
        let parsed: IdResponse = resp.json().await.map_err(transport)?;
        Ok(parsed.id)
    }

    async fn add_user_message(
        &self,
        thread_id: &str,
        text: &str,
        image_file_id: Option<&str>,
    ) -> Result<(), RxError> {
        let content = match image_file_id {
            Some(file_id) => json!([
                { "type": "text", "text": text },
                { "type": "image_file", "image_file": { "file_id": file_id } },
            ]),
            None => json!(text),
        };

        let resp = self
            .post(&format!("/threads/{thread_id}/messages"))
            .json(&json!({ "role": "user", "content": content }))
            .send()
            .await
            .map_err(transport)?;
        if !resp.status().is_success() {
            return Err(reject(resp).await);
        }
        Ok(())
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<String, RxError> {
        let resp = self
            .post(&format!("/threads/{thread_id}/runs"))
            .json(&json!({ "assistant_id": assistant_id }))
            .send()
            .await
            .map_err(transport)?;
        if !resp.status().is_success() {
            return Err(reject(resp).await);
        }
        let parsed: IdResponse = resp.json().await.map_err(transport)?;
        Ok(parsed.id)
    }

    async fn run_status(&self, thread_id: &str, run_id: &str) -> Result<RunStatus, RxError> {
        let resp = self
            .get(&format!("/threads/{thread_id}/runs/{run_id}"))
            .send()
            .await
            .map_err(transport)?;
        if !resp.status().is_success() {
            return Err(reject(resp).await);
        }
        let parsed: RunStatusResponse = resp.json().await.map_err(transport)?;
        Ok(RunStatus::from(parsed.status.as_str()))
    }

    async fn latest_message_text(&self, thread_id: &str) -> Result<String, RxError> {
        let resp = self
            .get(&format!("/threads/{thread_id}/messages?limit=1"))
            .send()
            .await
            .map_err(transport)?;
        if !resp.status().is_success() {
            return Err(reject(resp).await);
        }
        let parsed: MessageList = resp.json().await.map_err(transport)?;

        parsed
            .data
            .first()
            .and_then(|message| message.content.iter().find_map(|part| part.text.as_ref()))
            .map(|text| text.value.clone())
            .ok_or_else(|| RxError::Transport("thread has no text message".to_string()))
    }
}
