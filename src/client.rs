use crate::chat::schema::ChatResponse;
use crate::config::BackendConfig;
use crate::error::Result;
use crate::history::HistoryEntry;
use crate::upload::schema::{PendingFile, UploadResult};
use crate::upload::validate::guess_mime_type;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

/// The question-answering service behind the widget.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /chat` with a form-encoded `message`.
    async fn ask(&self, question: &str) -> Result<ChatResponse>;

    /// `POST /upload`, one multipart part per file under `field`.
    async fn upload(&self, field: &str, files: &[PendingFile]) -> Result<UploadResult>;

    /// `GET /history`.
    async fn history(&self) -> Result<Vec<HistoryEntry>>;
}

/// Percent-encode a question the way `encodeURIComponent` does for the
/// characters that matter here (spaces become `%20`, not `+`).
pub fn encode_message_body(text: &str) -> String {
    format!("message={}", urlencoding::encode(text))
}

#[derive(Deserialize)]
struct HistoryEnvelope {
    #[serde(default)]
    history: Vec<HistoryEntry>,
}

/// [`Backend`] over HTTP. Response bodies are decoded as JSON whatever the
/// status code; a body that is not the expected JSON is a transport-class
/// failure.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn ask(&self, question: &str) -> Result<ChatResponse> {
        tracing::debug!(chars = question.chars().count(), "POST /chat");
        let body = self
            .client
            .post(self.url("/chat"))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(encode_message_body(question))
            .send()
            .await?
            .bytes()
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn upload(&self, field: &str, files: &[PendingFile]) -> Result<UploadResult> {
        let mut form = Form::new();
        for file in files {
            let data = tokio::fs::read(&file.path).await?;
            let part = Part::bytes(data)
                .file_name(file.name.clone())
                .mime_str(guess_mime_type(&file.name))?;
            form = form.part(field.to_string(), part);
        }
        tracing::debug!(files = files.len(), field, "POST /upload");
        let body = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await?
            .bytes()
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>> {
        tracing::debug!("GET /history");
        let body = self.client.get(self.url("/history")).send().await?.bytes().await?;
        let envelope: HistoryEnvelope = serde_json::from_slice(&body)?;
        Ok(envelope.history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_like_encode_uri_component() {
        assert_eq!(
            encode_message_body("¿Cuál es el horario?"),
            "message=%C2%BFCu%C3%A1l%20es%20el%20horario%3F"
        );
        assert_eq!(encode_message_body("a&b=c"), "message=a%26b%3Dc");
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let backend = HttpBackend::new(&BackendConfig {
            base_url: "http://kb.local/".into(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(backend.url("/chat"), "http://kb.local/chat");
    }
}
