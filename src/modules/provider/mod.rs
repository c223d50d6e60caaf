//! Image provider module
//!
//! The external generative-image service is an opaque collaborator exposing
//! exactly two operations: generate an image from a prompt (optionally
//! conditioned on reference images) and edit an existing image.

mod gemini_client;

pub use gemini_client::GeminiImageClient;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::core::error::Result;

/// Output dimensions requested from the provider, expressed to the API as
/// an aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageSize {
    #[default]
    Square,
    Horizontal,
    Vertical,
}

impl ImageSize {
    /// Parse a user-supplied size string. Unknown values fall back to square.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "horizontal" => Self::Horizontal,
            "vertical" => Self::Vertical,
            _ => Self::Square,
        }
    }

    pub fn aspect_ratio(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Horizontal => "16:9",
            Self::Vertical => "9:16",
        }
    }
}

/// Options for prompt-driven generation
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub size: ImageSize,
    /// Images the generation is conditioned on (e.g. a sketch)
    pub reference_images: Vec<PathBuf>,
    /// Overrides the client's configured model when set
    pub model: Option<String>,
}

/// Options for editing an existing image
#[derive(Debug, Clone, Default)]
pub struct EditOptions {
    pub size: ImageSize,
    /// Overrides the client's configured model when set
    pub model: Option<String>,
}

/// External generative-image provider.
///
/// Both operations are blocking network calls that return the bytes of a
/// single generated PNG. Failures surface as an opaque provider error with
/// a human-readable message; no retries happen at this layer.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<Vec<u8>>;

    async fn edit(&self, source: &Path, prompt: &str, options: &EditOptions) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_size_parse() {
        assert_eq!(ImageSize::parse("square"), ImageSize::Square);
        assert_eq!(ImageSize::parse("HORIZONTAL"), ImageSize::Horizontal);
        assert_eq!(ImageSize::parse(" vertical "), ImageSize::Vertical);
        // Unknown values fall back to square
        assert_eq!(ImageSize::parse("banner"), ImageSize::Square);
        assert_eq!(ImageSize::parse(""), ImageSize::Square);
    }

    #[test]
    fn test_aspect_ratios() {
        assert_eq!(ImageSize::Square.aspect_ratio(), "1:1");
        assert_eq!(ImageSize::Horizontal.aspect_ratio(), "16:9");
        assert_eq!(ImageSize::Vertical.aspect_ratio(), "9:16");
    }
}
