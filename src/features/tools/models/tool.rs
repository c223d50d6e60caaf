use crate::modules::provider::ImageSize;

/// How a tool's prompt is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptSource {
    /// The user's prompt is forwarded verbatim
    UserPrompt,
    /// A fixed template rendered without variables
    Template(&'static str),
    /// A template with the user's prompt substituted in
    TemplateWithPrompt(&'static str),
}

/// Where the source image for a tool comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePolicy {
    /// Text-only tool, no image input
    NoImage,
    /// A fresh upload is mandatory
    UploadRequired,
    /// Either a fresh upload or a previously generated image reference
    UploadOrCurrent,
}

/// Which provider operation the tool maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderOp {
    /// `generate`, with any source image passed as a reference image
    Generate,
    /// `edit`, with the source image as the edit target
    Edit,
}

/// The five image tools, as data driving the shared generation pipeline.
/// Everything that differs between endpoints lives here; the pipeline
/// itself is written once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    TextToImage,
    ProductAdEnhancer,
    SketchToImage,
    ImageEditor,
    YoutubeThumbnail,
}

impl ToolKind {
    pub fn slug(&self) -> &'static str {
        match self {
            Self::TextToImage => "text-to-image",
            Self::ProductAdEnhancer => "product-ad-enhancer",
            Self::SketchToImage => "sketch-to-image",
            Self::ImageEditor => "image-editor",
            Self::YoutubeThumbnail => "youtube-thumbnail",
        }
    }

    /// Prefix of persisted output filenames
    pub fn output_prefix(&self) -> &'static str {
        match self {
            Self::TextToImage => "text_to_image",
            Self::ProductAdEnhancer => "product_enhancer",
            Self::SketchToImage => "sketch_to_image",
            Self::ImageEditor => "edited_image",
            Self::YoutubeThumbnail => "youtube_thumbnail",
        }
    }

    /// Prefix of scratch filenames while an upload is being processed
    pub fn staging_prefix(&self) -> &'static str {
        match self {
            Self::TextToImage | Self::ProductAdEnhancer => "upload",
            Self::SketchToImage => "sketch",
            Self::ImageEditor => "edit_upload",
            Self::YoutubeThumbnail => "thumbnail_ref",
        }
    }

    pub fn prompt_source(&self) -> PromptSource {
        match self {
            Self::TextToImage | Self::ImageEditor => PromptSource::UserPrompt,
            Self::ProductAdEnhancer => PromptSource::Template("product_ad_enhancer.jinja"),
            Self::SketchToImage => PromptSource::Template("sketch_to_image.jinja"),
            Self::YoutubeThumbnail => {
                PromptSource::TemplateWithPrompt("youtube_thumbnail.jinja")
            }
        }
    }

    pub fn source_policy(&self) -> SourcePolicy {
        match self {
            Self::TextToImage => SourcePolicy::NoImage,
            Self::ProductAdEnhancer | Self::SketchToImage | Self::YoutubeThumbnail => {
                SourcePolicy::UploadRequired
            }
            Self::ImageEditor => SourcePolicy::UploadOrCurrent,
        }
    }

    pub fn provider_op(&self) -> ProviderOp {
        match self {
            Self::TextToImage | Self::SketchToImage | Self::YoutubeThumbnail => {
                ProviderOp::Generate
            }
            Self::ProductAdEnhancer | Self::ImageEditor => ProviderOp::Edit,
        }
    }

    /// Output size when the request does not choose one
    pub fn default_size(&self) -> ImageSize {
        match self {
            Self::TextToImage => ImageSize::Square,
            _ => ImageSize::Horizontal,
        }
    }

    pub fn missing_prompt_error(&self) -> &'static str {
        match self {
            Self::ImageEditor => "Edit prompt is required",
            Self::YoutubeThumbnail => "Thumbnail description is required",
            _ => "Prompt is required",
        }
    }

    pub fn missing_image_error(&self) -> &'static str {
        match self {
            Self::SketchToImage => "No sketch image uploaded",
            Self::YoutubeThumbnail => "No reference image uploaded",
            _ => "No image file uploaded",
        }
    }
}
