//! HTTP server and the `/send` relay handler.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::whatsapp::{DocumentRef, MessagePayload, WhatsAppClient};

/// WhatsApp caps documents at 100 MB; the framework default (2 MB) is too
/// small for real PDFs.
const MAX_BODY_BYTES: usize = 100 * 1024 * 1024;

/// Shared application state
pub struct AppState {
    pub whatsapp: WhatsAppClient,
}

impl AppState {
    pub fn new(whatsapp: WhatsAppClient) -> Self {
        Self { whatsapp }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/send", post(send))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// One uploaded file part, buffered in memory for the request's lifetime.
struct UploadedFile {
    filename: String,
    content_type: String,
    bytes: Bytes,
}

#[derive(Default)]
struct SendForm {
    number: Option<String>,
    message: Option<String>,
    pdf: Option<UploadedFile>,
}

async fn collect_form(mut multipart: Multipart) -> Result<SendForm> {
    let mut form = SendForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .context("Failed to read multipart field")?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "number" => {
                form.number = Some(field.text().await.context("Failed to read number field")?);
            }
            "message" => {
                form.message = Some(field.text().await.context("Failed to read message field")?);
            }
            "pdf" => {
                let filename = field.file_name().unwrap_or("document.pdf").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.context("Failed to read pdf field")?;
                form.pdf = Some(UploadedFile {
                    filename,
                    content_type,
                    bytes,
                });
            }
            // Unknown fields are ignored.
            _ => {}
        }
    }

    Ok(form)
}

async fn send(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let form = match collect_form(multipart).await {
        Ok(form) => form,
        Err(err) => {
            error!("Error in /send route: {err:#}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            );
        }
    };

    info!(
        "Incoming /send request: number={}, message={}, pdf={}",
        form.number.as_deref().unwrap_or("<missing>"),
        form.message.is_some(),
        form.pdf
            .as_ref()
            .map(|f| f.filename.as_str())
            .unwrap_or("<none>"),
    );

    let number = match form.number.as_deref() {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Recipient number is required" })),
            );
        }
    };

    // Upload must succeed before the send step may run.
    let mut document = None;
    if let Some(file) = form.pdf {
        match state
            .whatsapp
            .upload_document(file.bytes.to_vec(), &file.filename, &file.content_type)
            .await
        {
            Ok(media_id) => {
                info!("Uploaded {} as media id {}", file.filename, media_id);
                document = Some(DocumentRef {
                    id: media_id,
                    filename: file.filename,
                });
            }
            Err(err) => {
                error!("Error uploading media: {err:#}");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to upload PDF" })),
                );
            }
        }
    }

    // An empty message field is treated as absent.
    let text = form.message.as_deref().filter(|m| !m.is_empty());
    let payload = MessagePayload::build(&number, text, document);

    match state.whatsapp.send_message(&payload).await {
        Ok(response) => {
            // Delivery confirmation is logged only, never surfaced.
            if response.delivery_confirmed() {
                info!("Message sent to WhatsApp number: {}", number);
            } else {
                warn!("Message not delivered. Check WhatsApp account settings or message format.");
            }
            (
                StatusCode::OK,
                Json(json!({ "success": "PDF and/or message sent successfully" })),
            )
        }
        Err(err) => {
            error!("Error sending message: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to send message" })),
            )
        }
    }
}
