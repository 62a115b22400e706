//! Preview, generate and plan handlers.
//!
//! All three take a multipart form. The `spec` field holds the TOML text and
//! `image` the template image; any other field becomes a project asset.

use axum::{
    Json,
    extract::{Multipart, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::engine::{CancelToken, Engine};
use crate::error::StampError;
use crate::output::{MemorySink, encode_pdf, encode_png};
use crate::plan::StackPlan;
use crate::project::Assets;
use crate::spec::Spec;

use super::super::state::AppState;

/// Error body: `{"success": false, "error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<StampError> for ApiError {
    fn from(e: StampError) -> Self {
        match e {
            StampError::Config(_) | StampError::Parse(_) => Self::bad_request(e.to_string()),
            _ => Self::internal(format!("Render failed: {}", e)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        log::warn!("Request failed ({}): {}", self.status, self.message);
        (
            self.status,
            Json(json!({ "success": false, "error": self.message })),
        )
            .into_response()
    }
}

/// The fields of one upload form.
#[derive(Debug, Default)]
struct Upload {
    spec: Option<String>,
    image: Option<Vec<u8>>,
    assets: BTreeMap<String, Vec<u8>>,
}

impl Upload {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut upload = Upload::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Multipart error: {}", e)))?
        {
            let name = field.name().unwrap_or("").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read '{}': {}", name, e)))?;

            match name.as_str() {
                "spec" => {
                    let text = String::from_utf8(bytes.to_vec())
                        .map_err(|_| ApiError::bad_request("spec is not valid UTF-8"))?;
                    upload.spec = Some(text);
                }
                // An empty file input still submits the field.
                "image" if !bytes.is_empty() => upload.image = Some(bytes.to_vec()),
                "image" | "" => {}
                _ => {
                    upload.assets.insert(name.clone(), bytes.to_vec());
                }
            }
        }

        Ok(upload)
    }

    fn spec(&self) -> Result<Spec, ApiError> {
        let text = self
            .spec
            .as_deref()
            .ok_or_else(|| ApiError::bad_request("No spec field found"))?;
        Ok(Spec::from_toml_str(text)?)
    }

    fn into_engine(self, state: &AppState) -> Result<Engine, ApiError> {
        let spec = self.spec()?;
        let bytes = self
            .image
            .ok_or_else(|| ApiError::bad_request("No image field found"))?;
        let source = image::load_from_memory(&bytes)
            .map_err(|e| ApiError::bad_request(format!("Failed to decode image: {}", e)))?;

        Ok(Engine::new(spec, source)
            .with_assets(Assets::Archive(Arc::new(self.assets)))
            .with_font_config(state.fonts.clone()))
    }
}

fn task_error(e: tokio::task::JoinError) -> ApiError {
    ApiError::internal(format!("Task error: {}", e))
}

/// POST /api/preview - render the first page as PNG.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let engine = Upload::read(multipart).await?.into_engine(&state)?;

    let png = tokio::task::spawn_blocking(move || -> Result<Option<Vec<u8>>, StampError> {
        match engine.generate_preview()? {
            Some(page) => encode_png(&page).map(Some),
            None => Ok(None),
        }
    })
    .await
    .map_err(task_error)??;

    Ok(match png {
        Some(png) => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// POST /api/generate - render every page into one PDF.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let engine = Upload::read(multipart).await?.into_engine(&state)?;

    let pdf = tokio::task::spawn_blocking(move || -> Result<Option<Vec<u8>>, StampError> {
        let mut sink = MemorySink::default();
        engine.generate_into(&mut sink, &mut |_| {}, &CancelToken::new())?;
        if sink.pages.is_empty() {
            return Ok(None);
        }
        encode_pdf(&sink.pages).map(Some)
    })
    .await
    .map_err(task_error)??;

    Ok(match pdf {
        Some(pdf) => (
            [
                (header::CONTENT_TYPE, "application/pdf"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"tickets.pdf\""),
            ],
            pdf,
        )
            .into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// POST /api/plan - page and stack counts for a spec.
pub async fn plan(multipart: Multipart) -> Result<Json<StackPlan>, ApiError> {
    let spec = Upload::read(multipart).await?.spec()?;
    Ok(Json(StackPlan::new(
        spec.value_space().count(),
        spec.layout.grid_area(),
        spec.stack_size,
    )))
}
