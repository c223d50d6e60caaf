use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for the text-to-image tool
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TextToImageDto {
    /// Free-text description of the image to generate
    #[validate(length(min = 1, message = "Prompt is required"))]
    #[schema(example = "a red bicycle leaning against a brick wall")]
    pub prompt: String,
    /// Output size: "square" (default), "horizontal" or "vertical"
    #[serde(default)]
    #[schema(example = "square")]
    pub size: Option<String>,
}

/// Multipart form for tools taking a single image upload.
/// Note: This struct is for Swagger UI documentation only.
/// The actual handlers use axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct ImageUploadForm {
    /// The image to process
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: String,
}

/// Multipart form for the image editor (documentation only)
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct EditImageForm {
    /// Fresh image upload; omit when chaining from a previous edit
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: Option<String>,
    /// Free-text edit instruction
    #[schema(example = "make the sky stormy")]
    pub prompt: String,
    /// Filename of a previously generated image to edit instead of uploading
    #[schema(example = "edited_image_0a1b2c.png")]
    pub current_image: Option<String>,
}

/// Multipart form for the YouTube thumbnail tool (documentation only)
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct YoutubeThumbnailForm {
    /// Reference image of the person to feature
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: String,
    /// Description of the thumbnail concept
    #[schema(example = "shocked reaction to a giant pumpkin")]
    pub prompt: String,
}

/// Successful generation response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GeneratedImageDto {
    /// Always `true`
    pub success: bool,
    /// Public URL of the generated PNG
    pub image_url: String,
    /// Bare filename, accepted as `current_image` by the image editor
    pub filename: String,
}

/// An uploaded image carried through the pipeline
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub original_filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    /// Lower-cased extension including the leading dot. A filename that is
    /// nothing but an extension (".png") counts as having none.
    pub fn extension(&self) -> Option<String> {
        self.original_filename
            .rfind('.')
            .filter(|&idx| idx > 0)
            .map(|idx| self.original_filename[idx..].to_lowercase())
    }
}

/// Allowed extensions for image uploads
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp"];

/// Maximum upload size in bytes (10MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Check if an upload extension is allowed
pub fn is_extension_allowed(extension: &str) -> bool {
    ALLOWED_IMAGE_EXTENSIONS.contains(&extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str) -> UploadedImage {
        UploadedImage {
            original_filename: name.to_string(),
            bytes: Vec::new(),
        }
    }

    #[test]
    fn test_extension_is_lowercased_with_dot() {
        assert_eq!(upload("photo.PNG").extension().as_deref(), Some(".png"));
        assert_eq!(upload("a.b.jpeg").extension().as_deref(), Some(".jpeg"));
    }

    #[test]
    fn test_missing_extension() {
        assert_eq!(upload("noext").extension(), None);
        assert_eq!(upload(".png").extension(), None);
    }

    #[test]
    fn test_allowed_extensions() {
        for ext in [".jpg", ".jpeg", ".png", ".webp"] {
            assert!(is_extension_allowed(ext));
        }
        assert!(!is_extension_allowed(".gif"));
        assert!(!is_extension_allowed(".svg"));
        assert!(!is_extension_allowed("png"));
    }
}
