//! Template engine for prompt management using Jinja2 syntax.
//!
//! Templates are loaded once from `templates/prompts/` and rendered with a
//! caller-supplied variable context.

use minijinja::{Environment, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Template directory relative to the project root
const TEMPLATE_DIR: &str = "templates/prompts";

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

/// Initialize the template environment with all templates from the templates directory.
///
/// This function is called automatically on first use of `render_template`.
fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();

    let template_path = Path::new(TEMPLATE_DIR);

    if template_path.exists() {
        load_templates_recursive(&mut env, template_path, template_path);
    }

    env
}

/// Recursively load all .jinja templates from a directory
fn load_templates_recursive(env: &mut Environment<'static>, base_path: &Path, current_path: &Path) {
    if let Ok(entries) = std::fs::read_dir(current_path) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                load_templates_recursive(env, base_path, &path);
            } else if path.extension().is_some_and(|ext| ext == "jinja") {
                // Create template name from relative path
                if let Ok(relative) = path.strip_prefix(base_path) {
                    let template_name = relative.to_string_lossy().to_string();
                    if let Ok(content) = std::fs::read_to_string(&path) {
                        // Convert to 'static str by leaking (safe for long-lived templates)
                        let static_name: &'static str =
                            Box::leak(template_name.clone().into_boxed_str());
                        let static_content: &'static str = Box::leak(content.into_boxed_str());
                        if let Err(e) = env.add_template(static_name, static_content) {
                            tracing::warn!("Failed to load template {}: {}", template_name, e);
                        } else {
                            tracing::debug!("Loaded template: {}", template_name);
                        }
                    }
                }
            }
        }
    }
}

/// Get the global template environment
fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a template with the given context.
///
/// # Arguments
/// * `template_name` - The template path relative to `templates/prompts/` (e.g., "sketch_to_image.jinja")
/// * `ctx` - A HashMap of variable names to values
pub fn render_template(
    template_name: &str,
    ctx: &HashMap<&str, Value>,
) -> Result<String, TemplateError> {
    let env = get_environment();

    let template = env
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    let render_ctx = Value::from_iter(ctx.iter().map(|(k, v)| (*k, v.clone())));

    template
        .render(render_ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

/// Render a template with a simpler string-only context.
///
/// For templates that only need string variables, this is more convenient.
pub fn render_template_simple(
    template_name: &str,
    ctx: &HashMap<&str, &str>,
) -> Result<String, TemplateError> {
    let value_ctx: HashMap<&str, Value> = ctx.iter().map(|(k, v)| (*k, Value::from(*v))).collect();

    render_template(template_name, &value_ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_template_is_not_found() {
        let ctx = HashMap::new();
        let result = render_template_simple("nonexistent.jinja", &ctx);
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_fixed_templates_render_non_empty() {
        let ctx = HashMap::new();
        for name in ["product_ad_enhancer.jinja", "sketch_to_image.jinja"] {
            let rendered = render_template_simple(name, &ctx).unwrap();
            assert!(!rendered.trim().is_empty(), "{} rendered empty", name);
        }
    }

    #[test]
    fn test_thumbnail_template_embeds_user_prompt() {
        let mut ctx = HashMap::new();
        ctx.insert("user_prompt", "dramatic volcano timelapse");

        let rendered = render_template_simple("youtube_thumbnail.jinja", &ctx).unwrap();
        assert!(rendered.contains("dramatic volcano timelapse"));
    }
}
