//! Storage module for media files
//!
//! Local-filesystem store for scratch copies of uploads and for generated
//! images, with public URL construction for the latter.

mod media_store;

pub use media_store::{MediaStore, StoredImage};
