use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub media: MediaConfig,
    pub provider: ProviderConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

/// Media storage configuration: where scratch uploads and generated images
/// live on disk, and the URL prefix they are served under.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Root directory for media files
    pub root: PathBuf,
    /// URL path prefix under which generated images are served
    pub url_prefix: String,
}

/// Configuration for the external generative-image provider
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API key sent with every provider request
    pub api_key: String,
    /// Provider API base URL
    pub base_url: String,
    /// Model used for text-only generation
    pub model: String,
    /// Model used for image-conditioned operations (edits and
    /// reference-image generation)
    pub edit_model: String,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            // Only error if it's not "file not found" - that's acceptable
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            media: MediaConfig::from_env()?,
            provider: ProviderConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl MediaConfig {
    pub fn from_env() -> Result<Self, String> {
        let root = env::var("MEDIA_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./media"));

        let url_prefix = env::var("MEDIA_URL")
            .unwrap_or_else(|_| "/media".to_string())
            .trim_end_matches('/')
            .to_string();

        if !url_prefix.starts_with('/') {
            return Err("MEDIA_URL must be an absolute URL path (e.g. /media)".to_string());
        }

        Ok(Self { root, url_prefix })
    }
}

impl ProviderConfig {
    const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com";
    const DEFAULT_MODEL: &'static str = "gemini-3-pro-image";
    const DEFAULT_EDIT_MODEL: &'static str = "gemini-3-pro-image-preview";

    pub fn from_env() -> Result<Self, String> {
        let api_key = env::var("GEMINI_API_KEY")
            .map_err(|_| "GEMINI_API_KEY environment variable is required".to_string())?;

        let base_url =
            env::var("GEMINI_BASE_URL").unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string());

        let model =
            env::var("GEMINI_IMAGE_MODEL").unwrap_or_else(|_| Self::DEFAULT_MODEL.to_string());

        let edit_model = env::var("GEMINI_IMAGE_EDIT_MODEL")
            .unwrap_or_else(|_| Self::DEFAULT_EDIT_MODEL.to_string());

        Ok(Self {
            api_key,
            base_url,
            model,
            edit_model,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "ImageTools API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "API documentation for the AI image tools".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}
