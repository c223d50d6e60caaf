use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::post, Router};

use crate::features::tools::dtos::MAX_UPLOAD_SIZE;
use crate::features::tools::handlers;
use crate::features::tools::services::GenerationService;

/// Create routes for the image tools API
///
/// Every endpoint is POST-only; other methods fall through to a 405 with
/// the JSON error envelope. Upload endpoints allow bodies up to the upload
/// limit plus a buffer for multipart overhead.
pub fn routes(service: Arc<GenerationService>) -> Router {
    let upload_limit = DefaultBodyLimit::max(MAX_UPLOAD_SIZE + 1024 * 1024);

    Router::new()
        .route(
            "/api/generate-text-to-image",
            post(handlers::generate_text_to_image).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/enhance-product-ad",
            post(handlers::enhance_product_ad)
                .fallback(handlers::method_not_allowed)
                .layer(upload_limit.clone()),
        )
        .route(
            "/api/generate-sketch-to-image",
            post(handlers::generate_sketch_to_image)
                .fallback(handlers::method_not_allowed)
                .layer(upload_limit.clone()),
        )
        .route(
            "/api/edit-image",
            post(handlers::edit_image)
                .fallback(handlers::method_not_allowed)
                .layer(upload_limit.clone()),
        )
        .route(
            "/api/generate-youtube-thumbnail",
            post(handlers::generate_youtube_thumbnail)
                .fallback(handlers::method_not_allowed)
                .layer(upload_limit),
        )
        .with_state(service)
}
