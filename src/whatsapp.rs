//! WhatsApp Cloud API client: media upload and message send.

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::WhatsAppConfig;

/// Outbound message payload for `POST /{phone_number_id}/messages`.
///
/// `message_type` mirrors the Cloud API contract: `text` when only a text
/// body is present, `document` whenever a media id is attached (a document
/// takes precedence over text), omitted entirely when the payload carries
/// neither.
#[derive(Debug, Clone, Serialize)]
pub struct MessagePayload {
    pub messaging_product: &'static str,
    pub to: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub message_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextBody {
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentRef {
    pub id: String,
    pub filename: String,
}

impl MessagePayload {
    pub fn build(to: &str, text: Option<&str>, document: Option<DocumentRef>) -> Self {
        let mut message_type = None;
        let text = text.map(|body| {
            message_type = Some("text");
            TextBody {
                body: body.to_string(),
            }
        });
        if document.is_some() {
            message_type = Some("document");
        }
        Self {
            messaging_product: "whatsapp",
            to: to.to_string(),
            message_type,
            text,
            document,
        }
    }
}

/// Response from the media upload endpoint.
#[derive(Debug, Deserialize)]
struct MediaUploadResponse {
    id: String,
}

/// Response from the message send endpoint. Only the `messages` array is
/// inspected, and only to log whether the provider confirmed delivery.
#[derive(Debug, Deserialize)]
pub struct SendResponse {
    #[serde(default)]
    pub messages: Option<Vec<SentMessage>>,
}

#[derive(Debug, Deserialize)]
pub struct SentMessage {
    pub id: String,
}

impl SendResponse {
    pub fn delivery_confirmed(&self) -> bool {
        self.messages.as_ref().is_some_and(|m| !m.is_empty())
    }
}

pub struct WhatsAppClient {
    client: reqwest::Client,
    config: WhatsAppConfig,
}

impl WhatsAppClient {
    pub fn new(config: WhatsAppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Upload a document to the media endpoint, returning the opaque media id.
    pub async fn upload_document(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<String> {
        let file_part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .context("Failed to build file part")?;

        let form = Form::new()
            .text("messaging_product", "whatsapp")
            .text("type", "document")
            .part("file", file_part);

        let url = format!(
            "{}/{}/media",
            self.config.api_base, self.config.phone_number_id
        );

        debug!("Uploading document to WhatsApp media endpoint: {}", url);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.access_token),
            )
            .multipart(form)
            .send()
            .await
            .context("Failed to send media upload request")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("WhatsApp media upload failed ({}): {}", status, error_body);
        }

        let media: MediaUploadResponse = response
            .json()
            .await
            .context("Failed to parse media upload response")?;

        Ok(media.id)
    }

    /// Post a message payload to the message send endpoint.
    pub async fn send_message(&self, payload: &MessagePayload) -> Result<SendResponse> {
        let url = format!(
            "{}/{}/messages",
            self.config.api_base, self.config.phone_number_id
        );

        debug!("Sending message to WhatsApp endpoint: {}", url);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.access_token),
            )
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await
            .context("Failed to send message request")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("WhatsApp message send failed ({}): {}", status, error_body);
        }

        response
            .json()
            .await
            .context("Failed to parse message send response")
    }
}
