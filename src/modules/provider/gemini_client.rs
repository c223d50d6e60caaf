use async_trait::async_trait;
use base64::prelude::*;
use serde_json::{json, Value};
use std::path::Path;

use crate::core::config::ProviderConfig;
use crate::core::error::{AppError, Result};

use super::{EditOptions, GenerateOptions, ImageProvider, ImageSize};

/// Client for a Gemini-style `generateContent` image API.
///
/// Text-only generation uses the configured default model; edits and
/// reference-conditioned generation use the configured edit model, which
/// accepts inline image parts.
pub struct GeminiImageClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    edit_model: String,
}

impl GeminiImageClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key: config.api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model,
            edit_model: config.edit_model,
        }
    }

    async fn invoke(&self, model: &str, parts: Vec<Value>, size: ImageSize) -> Result<Vec<u8>> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);

        let body = json!({
            "contents": [{
                "role": "user",
                "parts": parts
            }],
            "generationConfig": {
                "responseModalities": ["IMAGE"],
                "imageConfig": {
                    "aspectRatio": size.aspect_ratio()
                }
            }
        });

        tracing::debug!("Calling image provider: model={}", model);

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Image provider request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "Image provider returned {}: {}",
                status, body
            )));
        }

        let payload = response.json::<Value>().await.map_err(|e| {
            AppError::Provider(format!("Failed to parse provider response: {}", e))
        })?;

        extract_image_bytes(&payload)
            .ok_or_else(|| AppError::Provider("No image data in provider response".to_string()))
    }

    /// Build an inline base64 image part from a file on disk
    async fn inline_image_part(path: &Path) -> Result<Value> {
        let bytes = tokio::fs::read(path).await?;

        Ok(json!({
            "inlineData": {
                "mimeType": mime_type_for(path),
                "data": BASE64_STANDARD.encode(&bytes)
            }
        }))
    }
}

fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

/// Extract the first inline image payload from a `generateContent` response
fn extract_image_bytes(payload: &Value) -> Option<Vec<u8>> {
    let parts = payload
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    for part in parts {
        if let Some(data) = part
            .get("inlineData")
            .and_then(|d| d.get("data"))
            .and_then(|v| v.as_str())
        {
            if !data.is_empty() {
                if let Ok(bytes) = BASE64_STANDARD.decode(data) {
                    return Some(bytes);
                }
            }
        }
    }

    None
}

#[async_trait]
impl ImageProvider for GeminiImageClient {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<Vec<u8>> {
        let mut parts = vec![json!({ "text": prompt })];
        for image in &options.reference_images {
            parts.push(Self::inline_image_part(image).await?);
        }

        let model = options.model.as_deref().unwrap_or(if options.reference_images.is_empty() {
            &self.model
        } else {
            &self.edit_model
        });

        self.invoke(model, parts, options.size).await
    }

    async fn edit(&self, source: &Path, prompt: &str, options: &EditOptions) -> Result<Vec<u8>> {
        let parts = vec![
            Self::inline_image_part(source).await?,
            json!({ "text": prompt }),
        ];

        let model = options.model.as_deref().unwrap_or(&self.edit_model);

        self.invoke(model, parts, options.size).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> GeminiImageClient {
        GeminiImageClient::new(ProviderConfig {
            api_key: "test-key".to_string(),
            base_url: server.uri(),
            model: "test-model".to_string(),
            edit_model: "test-edit-model".to_string(),
        })
    }

    fn image_response(data: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "here you go" },
                        { "inlineData": { "mimeType": "image/png", "data": data } }
                    ]
                }
            }]
        })
    }

    #[tokio::test]
    async fn test_generate_decodes_inline_image() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/test-model:generateContent"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(image_response(&BASE64_STANDARD.encode(b"png-bytes"))),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let bytes = client
            .generate("a red bicycle", &GenerateOptions::default())
            .await
            .unwrap();

        assert_eq!(bytes, b"png-bytes");
    }

    #[tokio::test]
    async fn test_upstream_error_maps_to_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let result = client
            .generate("a red bicycle", &GenerateOptions::default())
            .await;

        assert!(matches!(result, Err(AppError::Provider(_))));
    }

    #[tokio::test]
    async fn test_response_without_image_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "sorry" }] } }]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let result = client
            .generate("a red bicycle", &GenerateOptions::default())
            .await;

        assert!(matches!(result, Err(AppError::Provider(_))));
    }

    #[tokio::test]
    async fn test_edit_sends_inline_source_and_uses_edit_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/test-edit-model:generateContent"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(image_response(&BASE64_STANDARD.encode(b"edited"))),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.jpg");
        tokio::fs::write(&source, b"jpeg-bytes").await.unwrap();

        let client = test_client(&server);
        let bytes = client
            .edit(&source, "remove the background", &EditOptions::default())
            .await
            .unwrap();
        assert_eq!(bytes, b"edited");

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(
            parts[0]["inlineData"]["data"],
            BASE64_STANDARD.encode(b"jpeg-bytes")
        );
        assert_eq!(parts[1]["text"], "remove the background");
    }

    #[test]
    fn test_mime_type_for_extension() {
        assert_eq!(mime_type_for(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(mime_type_for(Path::new("a.JPEG")), "image/jpeg");
        assert_eq!(mime_type_for(Path::new("a.webp")), "image/webp");
        assert_eq!(mime_type_for(Path::new("a.png")), "image/png");
        assert_eq!(mime_type_for(Path::new("noext")), "image/png");
    }
}
