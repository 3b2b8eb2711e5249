//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, info};

use super::embedded;

/// Template names the correction oracle renders
const TEMPLATES: &[&str] = &["correct-system", "correct-user"];

/// Variables available to the correction templates
#[derive(Debug, Clone, Serialize)]
pub struct CorrectionContext<'a> {
    /// Kind of document, e.g. "historical newspaper"
    pub source_kind: &'a str,
    /// The chunk to correct (empty for the system prompt)
    pub text: &'a str,
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    handlebars: Handlebars<'static>,
}

impl PromptLoader {
    /// Load every template, preferring files under `override_dir`
    pub fn new(override_dir: Option<&Path>) -> Result<Self> {
        debug!(?override_dir, "PromptLoader::new: called");
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        // OCR text is not HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        for name in TEMPLATES {
            let source = Self::load_source(name, override_dir)?;
            handlebars
                .register_template_string(name, source)
                .map_err(|e| eyre!("Invalid template '{}': {}", name, e))?;
        }

        Ok(Self { handlebars })
    }

    /// Loader with the default override directory `.ocrclean/prompts`
    pub fn with_default_overrides() -> Result<Self> {
        let dir = PathBuf::from(".ocrclean").join("prompts");
        Self::new(Some(&dir))
    }

    fn load_source(name: &str, override_dir: Option<&Path>) -> Result<String> {
        if let Some(dir) = override_dir {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                info!(template = %name, path = %path.display(), "Using prompt override");
                return std::fs::read_to_string(&path).map_err(|e| eyre!("Failed to read {}: {}", path.display(), e));
            }
        }

        embedded::get_embedded(name)
            .map(str::to_string)
            .ok_or_else(|| eyre!("No template named '{}'", name))
    }

    /// Render a template with the given context
    pub fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<String> {
        debug!(%name, "PromptLoader::render: called");
        self.handlebars
            .render(name, context)
            .map_err(|e| eyre!("Failed to render '{}': {}", name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_user_prompt_without_escaping() {
        let loader = PromptLoader::new(None).unwrap();
        let ctx = CorrectionContext {
            source_kind: "historical newspaper",
            text: "Tbe \"Herald\" & <Mail>",
        };

        let rendered = loader.render("correct-user", &ctx).unwrap();
        assert!(rendered.starts_with("Correct the following historical newspaper OCR text:"));
        assert!(rendered.ends_with("Tbe \"Herald\" & <Mail>\n"));
    }

    #[test]
    fn test_override_file_wins() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("correct-user.pmt"), "FIX: {{text}}").unwrap();

        let loader = PromptLoader::new(Some(temp.path())).unwrap();
        let ctx = CorrectionContext {
            source_kind: "x",
            text: "abc",
        };
        assert_eq!(loader.render("correct-user", &ctx).unwrap(), "FIX: abc");
        // Untouched template still comes from the binary
        assert!(loader.render("correct-system", &ctx).unwrap().contains("OCR"));
    }

    #[test]
    fn test_unknown_template_errors() {
        let loader = PromptLoader::new(None).unwrap();
        let ctx = CorrectionContext { source_kind: "x", text: "" };
        assert!(loader.render("nope", &ctx).is_err());
    }
}
