use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating generated-image filename references
    /// (the `current_image` form field). Plain filenames only, no path
    /// separators, must not start with a dot.
    /// - Valid: "edited_image_0a1b2c.png", "x.webp"
    /// - Invalid: "../secret.png", "a/b.png", ".hidden", ""
    pub static ref MEDIA_FILENAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_filename_regex_valid() {
        assert!(MEDIA_FILENAME_REGEX.is_match("edited_image_0a1b2c.png"));
        assert!(MEDIA_FILENAME_REGEX.is_match("x.webp"));
        assert!(MEDIA_FILENAME_REGEX.is_match("youtube_thumbnail_abc123.png"));
        assert!(MEDIA_FILENAME_REGEX.is_match("a"));
    }

    #[test]
    fn test_media_filename_regex_invalid() {
        assert!(!MEDIA_FILENAME_REGEX.is_match("../secret.png")); // traversal
        assert!(!MEDIA_FILENAME_REGEX.is_match("a/b.png")); // separator
        assert!(!MEDIA_FILENAME_REGEX.is_match("a\\b.png")); // separator
        assert!(!MEDIA_FILENAME_REGEX.is_match(".hidden")); // leading dot
        assert!(!MEDIA_FILENAME_REGEX.is_match("")); // empty
        assert!(!MEDIA_FILENAME_REGEX.is_match("a b.png")); // space
    }
}
