use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::tools::dtos::{
    is_extension_allowed, GeneratedImageDto, UploadedImage, ALLOWED_IMAGE_EXTENSIONS,
    MAX_UPLOAD_SIZE,
};
use crate::features::tools::models::{PromptSource, ProviderOp, SourcePolicy, ToolKind};
use crate::modules::provider::{EditOptions, GenerateOptions, ImageProvider, ImageSize};
use crate::modules::storage::MediaStore;
use crate::shared::prompts::render_template_simple;
use crate::shared::validation::MEDIA_FILENAME_REGEX;

/// Input to the generation pipeline, as decoded by a handler
#[derive(Debug, Default)]
pub struct ToolRequest {
    pub prompt: Option<String>,
    pub size: Option<ImageSize>,
    pub upload: Option<UploadedImage>,
    /// Filename of a previously generated image to use as the source
    pub current_image: Option<String>,
}

/// Where the pipeline found the source image for a request
enum SourceImage {
    None,
    /// Scratch copy of a fresh upload; removed after the provider call
    Staged(PathBuf),
    /// Previously generated image referenced by filename; left in place
    Existing(PathBuf),
}

impl SourceImage {
    fn path(&self) -> Option<&Path> {
        match self {
            Self::None => None,
            Self::Staged(path) | Self::Existing(path) => Some(path),
        }
    }
}

/// The request pipeline shared by all five tools:
/// validate -> stage -> call provider -> persist -> respond.
///
/// Per-tool differences (prompt source, source-image policy, provider
/// operation, output size, filename prefixes) come from [`ToolKind`].
pub struct GenerationService {
    media: Arc<MediaStore>,
    provider: Arc<dyn ImageProvider>,
}

impl GenerationService {
    pub fn new(media: Arc<MediaStore>, provider: Arc<dyn ImageProvider>) -> Self {
        Self { media, provider }
    }

    pub async fn run(&self, tool: ToolKind, request: ToolRequest) -> Result<GeneratedImageDto> {
        let prompt = resolve_prompt(tool, &request)?;
        let source = self.resolve_source(tool, &request).await?;
        let size = request.size.unwrap_or_else(|| tool.default_size());

        let outcome = self.invoke_provider(tool, &prompt, &source, size).await;

        // The scratch copy is removed whether the provider call succeeded
        // or not; referenced prior outputs stay where they are.
        if let SourceImage::Staged(path) = &source {
            self.media.discard_staged(path).await;
        }

        let image_bytes = outcome?;

        let stored = self
            .media
            .persist_image(tool.output_prefix(), &image_bytes)
            .await?;

        tracing::info!("Generated {} via {}", stored.filename, tool.slug());

        Ok(GeneratedImageDto {
            success: true,
            image_url: stored.url,
            filename: stored.filename,
        })
    }

    async fn resolve_source(&self, tool: ToolKind, request: &ToolRequest) -> Result<SourceImage> {
        match tool.source_policy() {
            SourcePolicy::NoImage => Ok(SourceImage::None),

            SourcePolicy::UploadRequired => {
                let upload = request
                    .upload
                    .as_ref()
                    .ok_or_else(|| AppError::Validation(tool.missing_image_error().to_string()))?;
                Ok(SourceImage::Staged(self.stage_validated(tool, upload).await?))
            }

            SourcePolicy::UploadOrCurrent => {
                if let Some(upload) = &request.upload {
                    return Ok(SourceImage::Staged(self.stage_validated(tool, upload).await?));
                }

                let reference = request
                    .current_image
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty());

                if let Some(reference) = reference {
                    if !MEDIA_FILENAME_REGEX.is_match(reference) {
                        return Err(AppError::Validation(
                            "Invalid image reference".to_string(),
                        ));
                    }

                    let path = self.media.generated_path(reference);
                    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                        return Err(AppError::Validation(
                            "Referenced image not found. Please upload a new image.".to_string(),
                        ));
                    }

                    return Ok(SourceImage::Existing(path));
                }

                Err(AppError::Validation(
                    "No image provided. Please upload an image or reference an existing one."
                        .to_string(),
                ))
            }
        }
    }

    /// Validate an upload's extension and size, then write it to scratch
    async fn stage_validated(&self, tool: ToolKind, upload: &UploadedImage) -> Result<PathBuf> {
        let extension = upload
            .extension()
            .filter(|e| is_extension_allowed(e))
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Invalid file type. Allowed: {}",
                    ALLOWED_IMAGE_EXTENSIONS.join(", ")
                ))
            })?;

        if upload.bytes.len() > MAX_UPLOAD_SIZE {
            return Err(AppError::Validation(
                "File size too large. Maximum size is 10MB.".to_string(),
            ));
        }

        self.media
            .stage_upload(tool.staging_prefix(), &extension, &upload.bytes)
            .await
    }

    async fn invoke_provider(
        &self,
        tool: ToolKind,
        prompt: &str,
        source: &SourceImage,
        size: ImageSize,
    ) -> Result<Vec<u8>> {
        match tool.provider_op() {
            ProviderOp::Generate => {
                let reference_images = source
                    .path()
                    .map(|p| vec![p.to_path_buf()])
                    .unwrap_or_default();

                let options = GenerateOptions {
                    size,
                    reference_images,
                    model: None,
                };
                self.provider.generate(prompt, &options).await
            }

            ProviderOp::Edit => {
                let path = source.path().ok_or_else(|| {
                    AppError::Internal("Edit operation requires a source image".to_string())
                })?;

                let options = EditOptions { size, model: None };
                self.provider.edit(path, prompt, &options).await
            }
        }
    }
}

fn resolve_prompt(tool: ToolKind, request: &ToolRequest) -> Result<String> {
    match tool.prompt_source() {
        PromptSource::UserPrompt => user_prompt(tool, request).map(str::to_string),

        PromptSource::Template(name) => {
            let ctx = HashMap::new();
            render_template_simple(name, &ctx).map_err(|e| AppError::Internal(e.to_string()))
        }

        PromptSource::TemplateWithPrompt(name) => {
            let user = user_prompt(tool, request)?;
            let mut ctx = HashMap::new();
            ctx.insert("user_prompt", user);
            render_template_simple(name, &ctx).map_err(|e| AppError::Internal(e.to_string()))
        }
    }
}

fn user_prompt<'a>(tool: ToolKind, request: &'a ToolRequest) -> Result<&'a str> {
    request
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation(tool.missing_prompt_error().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::provider::ImageSize;
    use crate::shared::test_helpers::{test_media_store, RecordedCall, RecordingProvider};

    fn upload(name: &str, bytes: &[u8]) -> UploadedImage {
        UploadedImage {
            original_filename: name.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    fn service_with(
        media: Arc<MediaStore>,
        provider: Arc<RecordingProvider>,
    ) -> GenerationService {
        GenerationService::new(media, provider)
    }

    #[tokio::test]
    async fn test_text_to_image_success() {
        let dir = tempfile::tempdir().unwrap();
        let media = Arc::new(test_media_store(dir.path()).await);
        let provider = Arc::new(RecordingProvider::returning(b"png-bytes".to_vec()));
        let service = service_with(Arc::clone(&media), Arc::clone(&provider));

        let response = service
            .run(
                ToolKind::TextToImage,
                ToolRequest {
                    prompt: Some("a red bicycle".to_string()),
                    size: Some(ImageSize::Square),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(response.success);
        assert!(response.filename.starts_with("text_to_image_"));
        assert!(response.image_url.ends_with(".png"));
        assert!(media.generated_path(&response.filename).exists());

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            RecordedCall::Generate { prompt, options } => {
                assert_eq!(prompt, "a red bicycle");
                assert_eq!(options.size, ImageSize::Square);
                assert!(options.reference_images.is_empty());
            }
            other => panic!("unexpected provider call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_identical_requests_produce_unique_filenames() {
        let dir = tempfile::tempdir().unwrap();
        let media = Arc::new(test_media_store(dir.path()).await);
        let provider = Arc::new(RecordingProvider::returning(b"png".to_vec()));
        let service = service_with(media, provider);

        let request = || ToolRequest {
            prompt: Some("same prompt".to_string()),
            ..Default::default()
        };

        let first = service.run(ToolKind::TextToImage, request()).await.unwrap();
        let second = service.run(ToolKind::TextToImage, request()).await.unwrap();

        assert_ne!(first.filename, second.filename);
    }

    #[tokio::test]
    async fn test_empty_prompt_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let media = Arc::new(test_media_store(dir.path()).await);
        let provider = Arc::new(RecordingProvider::returning(b"png".to_vec()));
        let service = service_with(media, provider.clone());

        let result = service
            .run(
                ToolKind::TextToImage,
                ToolRequest {
                    prompt: Some("   ".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_product_ad_stages_upload_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let media = Arc::new(test_media_store(dir.path()).await);
        let provider = Arc::new(RecordingProvider::returning(b"enhanced".to_vec()));
        let service = service_with(Arc::clone(&media), Arc::clone(&provider));

        let response = service
            .run(
                ToolKind::ProductAdEnhancer,
                ToolRequest {
                    upload: Some(upload("product.jpg", b"jpeg-bytes")),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(response.filename.starts_with("product_enhancer_"));

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        let staged = match &calls[0] {
            RecordedCall::Edit { source, prompt, options } => {
                assert!(!prompt.trim().is_empty());
                assert_eq!(options.size, ImageSize::Horizontal);
                source.clone()
            }
            other => panic!("unexpected provider call: {:?}", other),
        };

        // The provider saw the staged scratch copy, which is gone afterwards
        assert!(staged.starts_with(media.uploads_dir()));
        assert!(!staged.exists());
    }

    #[tokio::test]
    async fn test_scratch_file_removed_when_provider_fails() {
        let dir = tempfile::tempdir().unwrap();
        let media = Arc::new(test_media_store(dir.path()).await);
        let provider = Arc::new(RecordingProvider::failing("model overloaded"));
        let service = service_with(Arc::clone(&media), Arc::clone(&provider));

        let result = service
            .run(
                ToolKind::SketchToImage,
                ToolRequest {
                    upload: Some(upload("sketch.png", b"sketch")),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Provider(_))));

        let mut entries = tokio::fs::read_dir(media.uploads_dir()).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sketch_passes_upload_as_reference_image() {
        let dir = tempfile::tempdir().unwrap();
        let media = Arc::new(test_media_store(dir.path()).await);
        let provider = Arc::new(RecordingProvider::returning(b"photo".to_vec()));
        let service = service_with(media, Arc::clone(&provider));

        service
            .run(
                ToolKind::SketchToImage,
                ToolRequest {
                    upload: Some(upload("sketch.webp", b"sketch")),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        match &provider.calls()[0] {
            RecordedCall::Generate { options, .. } => {
                assert_eq!(options.reference_images.len(), 1);
            }
            other => panic!("unexpected provider call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_disallowed_extension_rejected_before_provider_call() {
        let dir = tempfile::tempdir().unwrap();
        let media = Arc::new(test_media_store(dir.path()).await);
        let provider = Arc::new(RecordingProvider::returning(b"x".to_vec()));
        let service = service_with(media, Arc::clone(&provider));

        let result = service
            .run(
                ToolKind::ProductAdEnhancer,
                ToolRequest {
                    upload: Some(upload("script.svg", b"<svg/>")),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let media = Arc::new(test_media_store(dir.path()).await);
        let provider = Arc::new(RecordingProvider::returning(b"x".to_vec()));
        let service = service_with(media, Arc::clone(&provider));

        let result = service
            .run(
                ToolKind::ProductAdEnhancer,
                ToolRequest {
                    upload: Some(upload("big.png", &vec![0u8; MAX_UPLOAD_SIZE + 1])),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_edit_requires_some_source() {
        let dir = tempfile::tempdir().unwrap();
        let media = Arc::new(test_media_store(dir.path()).await);
        let provider = Arc::new(RecordingProvider::returning(b"x".to_vec()));
        let service = service_with(media, provider);

        let result = service
            .run(
                ToolKind::ImageEditor,
                ToolRequest {
                    prompt: Some("make it blue".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_edit_with_missing_current_image_reference() {
        let dir = tempfile::tempdir().unwrap();
        let media = Arc::new(test_media_store(dir.path()).await);
        let provider = Arc::new(RecordingProvider::returning(b"x".to_vec()));
        let service = service_with(media, provider);

        let result = service
            .run(
                ToolKind::ImageEditor,
                ToolRequest {
                    prompt: Some("make it blue".to_string()),
                    current_image: Some("edited_image_doesnotexist.png".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_edit_rejects_path_traversal_references() {
        let dir = tempfile::tempdir().unwrap();
        let media = Arc::new(test_media_store(dir.path()).await);
        let provider = Arc::new(RecordingProvider::returning(b"x".to_vec()));
        let service = service_with(media, Arc::clone(&provider));

        let result = service
            .run(
                ToolKind::ImageEditor,
                ToolRequest {
                    prompt: Some("make it blue".to_string()),
                    current_image: Some("../uploads/secret.png".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_edit_chains_from_previously_generated_image() {
        let dir = tempfile::tempdir().unwrap();
        let media = Arc::new(test_media_store(dir.path()).await);
        let provider = Arc::new(RecordingProvider::returning(b"v2".to_vec()));
        let service = service_with(Arc::clone(&media), Arc::clone(&provider));

        let prior = media.persist_image("edited_image", b"v1").await.unwrap();

        let response = service
            .run(
                ToolKind::ImageEditor,
                ToolRequest {
                    prompt: Some("add a hat".to_string()),
                    current_image: Some(prior.filename.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        match &provider.calls()[0] {
            RecordedCall::Edit { source, .. } => assert_eq!(source, &prior.path),
            other => panic!("unexpected provider call: {:?}", other),
        }

        // Chaining must not consume the referenced image
        assert!(prior.path.exists());
        assert_ne!(response.filename, prior.filename);
    }

    #[tokio::test]
    async fn test_thumbnail_prompt_combines_template_and_user_text() {
        let dir = tempfile::tempdir().unwrap();
        let media = Arc::new(test_media_store(dir.path()).await);
        let provider = Arc::new(RecordingProvider::returning(b"thumb".to_vec()));
        let service = service_with(media, Arc::clone(&provider));

        service
            .run(
                ToolKind::YoutubeThumbnail,
                ToolRequest {
                    prompt: Some("me reacting to a rocket launch".to_string()),
                    upload: Some(upload("face.jpg", b"face")),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        match &provider.calls()[0] {
            RecordedCall::Generate { prompt, options } => {
                assert!(prompt.contains("me reacting to a rocket launch"));
                assert!(prompt.len() > "me reacting to a rocket launch".len());
                assert_eq!(options.reference_images.len(), 1);
            }
            other => panic!("unexpected provider call: {:?}", other),
        }
    }
}
