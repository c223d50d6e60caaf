use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::debug;
use validator::Validate;

use crate::core::error::AppError;
use crate::core::extractor::AppJson;
use crate::features::tools::dtos::{
    EditImageForm, GeneratedImageDto, ImageUploadForm, TextToImageDto, UploadedImage,
    YoutubeThumbnailForm,
};
use crate::features::tools::models::ToolKind;
use crate::features::tools::services::{GenerationService, ToolRequest};
use crate::modules::provider::ImageSize;
use crate::shared::types::ErrorResponse;

/// Decoded multipart form shared by the upload-based tools
#[derive(Debug, Default)]
struct ToolForm {
    image: Option<UploadedImage>,
    prompt: Option<String>,
    current_image: Option<String>,
}

async fn read_tool_form(mut multipart: Multipart) -> Result<ToolForm, AppError> {
    let mut form = ToolForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "image" => {
                let original_filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                form.image = Some(UploadedImage {
                    original_filename,
                    bytes: data.to_vec(),
                });
            }
            "prompt" => {
                form.prompt = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read prompt field: {}", e))
                })?);
            }
            "current_image" => {
                form.current_image = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read current_image field: {}", e))
                })?);
            }
            _ => {
                // Ignore unknown fields
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    Ok(form)
}

/// Generate an image from a text prompt
#[utoipa::path(
    post,
    path = "/api/generate-text-to-image",
    tag = "tools",
    request_body = TextToImageDto,
    responses(
        (status = 200, description = "Image generated", body = GeneratedImageDto),
        (status = 400, description = "Missing or empty prompt", body = ErrorResponse),
        (status = 405, description = "Method not allowed", body = ErrorResponse),
        (status = 500, description = "Provider failure", body = ErrorResponse)
    )
)]
pub async fn generate_text_to_image(
    State(service): State<Arc<GenerationService>>,
    AppJson(dto): AppJson<TextToImageDto>,
) -> Result<Json<GeneratedImageDto>, AppError> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let request = ToolRequest {
        prompt: Some(dto.prompt),
        size: Some(ImageSize::parse(dto.size.as_deref().unwrap_or("square"))),
        ..Default::default()
    };

    let response = service.run(ToolKind::TextToImage, request).await?;
    Ok(Json(response))
}

/// Enhance a product photo into a studio-quality ad shot
#[utoipa::path(
    post,
    path = "/api/enhance-product-ad",
    tag = "tools",
    request_body(
        content = ImageUploadForm,
        content_type = "multipart/form-data",
        description = "Product photo to enhance"
    ),
    responses(
        (status = 200, description = "Enhanced image generated", body = GeneratedImageDto),
        (status = 400, description = "Missing or invalid image upload", body = ErrorResponse),
        (status = 405, description = "Method not allowed", body = ErrorResponse),
        (status = 500, description = "Provider failure", body = ErrorResponse)
    )
)]
pub async fn enhance_product_ad(
    State(service): State<Arc<GenerationService>>,
    multipart: Multipart,
) -> Result<Json<GeneratedImageDto>, AppError> {
    let form = read_tool_form(multipart).await?;

    let request = ToolRequest {
        upload: form.image,
        ..Default::default()
    };

    let response = service.run(ToolKind::ProductAdEnhancer, request).await?;
    Ok(Json(response))
}

/// Turn a hand-drawn sketch into a photorealistic image
#[utoipa::path(
    post,
    path = "/api/generate-sketch-to-image",
    tag = "tools",
    request_body(
        content = ImageUploadForm,
        content_type = "multipart/form-data",
        description = "Sketch to transform"
    ),
    responses(
        (status = 200, description = "Image generated from sketch", body = GeneratedImageDto),
        (status = 400, description = "Missing or invalid sketch upload", body = ErrorResponse),
        (status = 405, description = "Method not allowed", body = ErrorResponse),
        (status = 500, description = "Provider failure", body = ErrorResponse)
    )
)]
pub async fn generate_sketch_to_image(
    State(service): State<Arc<GenerationService>>,
    multipart: Multipart,
) -> Result<Json<GeneratedImageDto>, AppError> {
    let form = read_tool_form(multipart).await?;

    let request = ToolRequest {
        upload: form.image,
        ..Default::default()
    };

    let response = service.run(ToolKind::SketchToImage, request).await?;
    Ok(Json(response))
}

/// Edit an image with a free-form text prompt
///
/// The source is either a fresh `image` upload or `current_image`, the
/// filename of a previously generated image, which allows chained edits.
#[utoipa::path(
    post,
    path = "/api/edit-image",
    tag = "tools",
    request_body(
        content = EditImageForm,
        content_type = "multipart/form-data",
        description = "Edit instruction plus an upload or a prior-image reference"
    ),
    responses(
        (status = 200, description = "Edited image generated", body = GeneratedImageDto),
        (status = 400, description = "Missing prompt or source image", body = ErrorResponse),
        (status = 405, description = "Method not allowed", body = ErrorResponse),
        (status = 500, description = "Provider failure", body = ErrorResponse)
    )
)]
pub async fn edit_image(
    State(service): State<Arc<GenerationService>>,
    multipart: Multipart,
) -> Result<Json<GeneratedImageDto>, AppError> {
    let form = read_tool_form(multipart).await?;

    let request = ToolRequest {
        prompt: form.prompt,
        upload: form.image,
        current_image: form.current_image,
        ..Default::default()
    };

    let response = service.run(ToolKind::ImageEditor, request).await?;
    Ok(Json(response))
}

/// Generate a YouTube thumbnail from a reference photo and a description
#[utoipa::path(
    post,
    path = "/api/generate-youtube-thumbnail",
    tag = "tools",
    request_body(
        content = YoutubeThumbnailForm,
        content_type = "multipart/form-data",
        description = "Reference photo plus thumbnail description"
    ),
    responses(
        (status = 200, description = "Thumbnail generated", body = GeneratedImageDto),
        (status = 400, description = "Missing description or reference image", body = ErrorResponse),
        (status = 405, description = "Method not allowed", body = ErrorResponse),
        (status = 500, description = "Provider failure", body = ErrorResponse)
    )
)]
pub async fn generate_youtube_thumbnail(
    State(service): State<Arc<GenerationService>>,
    multipart: Multipart,
) -> Result<Json<GeneratedImageDto>, AppError> {
    let form = read_tool_form(multipart).await?;

    let request = ToolRequest {
        prompt: form.prompt,
        upload: form.image,
        ..Default::default()
    };

    let response = service.run(ToolKind::YoutubeThumbnail, request).await?;
    Ok(Json(response))
}

/// Fallback for non-POST requests to the API routes
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
