/// Subdirectory of the media root holding scratch copies of uploads
pub const UPLOADS_DIR: &str = "uploads";

/// Subdirectory of the media root holding generated images
pub const GENERATED_IMAGES_DIR: &str = "generated_images";
