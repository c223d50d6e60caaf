//! Prompt template management module.
//!
//! The fixed prompt text behind each image tool lives in
//! `templates/prompts/` as Jinja templates rather than in code, so tuning
//! a prompt never touches the pipeline.
//!
//! # Usage
//!
//! ```ignore
//! use std::collections::HashMap;
//! use crate::shared::prompts::render_template_simple;
//!
//! let mut ctx = HashMap::new();
//! ctx.insert("user_prompt", "a mountain sunrise");
//!
//! let prompt = render_template_simple("youtube_thumbnail.jinja", &ctx)?;
//! ```

pub mod engine;

pub use engine::{render_template, render_template_simple, TemplateError};
