//! Formula templates
//!
//! Templates use `{{ name }}` placeholders. Whitespace inside the braces is
//! ignored; any other text (including Ruby's `#{...}`) is copied verbatim.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ReleaseError, Result, TemplateError};

mod formula;

pub use formula::FormulaVariables;

/// Template compiled into the binary
pub const EMBEDDED_FORMULA_TEMPLATE: &str = include_str!("../../templates/formula.rb.tmpl");

/// A parsed-on-render text template
#[derive(Debug, Clone)]
pub struct FormulaTemplate {
    source: String,
}

impl FormulaTemplate {
    /// Create a template from a string
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// The built-in Homebrew formula template
    pub fn embedded() -> Self {
        Self::new(EMBEDDED_FORMULA_TEMPLATE)
    }

    /// Load a template from disk
    pub fn from_file(path: &Path) -> std::result::Result<Self, TemplateError> {
        let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded formula template");
        Ok(Self::new(source))
    }

    /// Template text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render, resolving each placeholder through `resolve`
    pub fn render_with<F>(&self, mut resolve: F) -> std::result::Result<String, TemplateError>
    where
        F: FnMut(&str) -> std::result::Result<String, TemplateError>,
    {
        let mut output = String::with_capacity(self.source.len());
        let mut rest = self.source.as_str();
        let mut offset = 0;

        while let Some(start) = rest.find("{{") {
            output.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after
                .find("}}")
                .ok_or(TemplateError::Unterminated {
                    offset: offset + start,
                })?;
            output.push_str(&resolve(after[..end].trim())?);

            let consumed = start + 2 + end + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }

        output.push_str(rest);
        Ok(output)
    }

    /// Render against formula variables
    pub fn render(&self, vars: &FormulaVariables) -> std::result::Result<String, TemplateError> {
        self.render_with(|name| vars.resolve(name))
    }
}

/// Write a rendered formula, creating parent directories
pub fn write_formula(path: &Path, content: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ReleaseError::file(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| ReleaseError::file(path, e))?;
    debug!(path = %path.display(), bytes = content.len(), "wrote formula");
    Ok(path.to_path_buf())
}
