use utoipa::{Modify, OpenApi};

use crate::features::tools::{dtos as tools_dtos, handlers as tools_handlers};
use crate::shared::types::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        tools_handlers::generate_text_to_image,
        tools_handlers::enhance_product_ad,
        tools_handlers::generate_sketch_to_image,
        tools_handlers::edit_image,
        tools_handlers::generate_youtube_thumbnail,
    ),
    components(schemas(
        tools_dtos::TextToImageDto,
        tools_dtos::ImageUploadForm,
        tools_dtos::EditImageForm,
        tools_dtos::YoutubeThumbnailForm,
        tools_dtos::GeneratedImageDto,
        ErrorResponse,
    )),
    tags(
        (name = "tools", description = "AI image generation tools")
    ),
    info(
        title = "ImageTools API",
        version = "0.1.0",
        description = "API documentation for the AI image tools",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
