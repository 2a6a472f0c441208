//! Files served under `/ui`.
//!
//! HTML pages are rendered through `minijinja` when a template context is
//! supplied, so the viewer page can be pointed at the live API description.

use minijinja::Environment;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StaticError {
    #[error("path escapes the asset directory: {0}")]
    Forbidden(String),
    #[error("asset not found: {0}")]
    NotFound(String),
    #[error("failed to read asset: {0}")]
    Io(#[from] io::Error),
    #[error("failed to render template: {0}")]
    Template(#[from] minijinja::Error),
}

#[derive(Debug, Clone)]
pub struct StaticFiles {
    base_dir: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            base_dir: base.into(),
        }
    }

    /// Resolve a url path below the base directory. Only plain components
    /// are accepted; `..`, roots and prefixes are rejected.
    fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        let mut resolved = self.base_dir.clone();
        for comp in Path::new(url_path.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => resolved.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(resolved)
    }

    fn content_type(path: &Path) -> &'static str {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "html" | "htm" => "text/html",
            "css" => "text/css",
            "js" => "application/javascript",
            "json" => "application/json",
            "yaml" | "yml" => "application/yaml",
            "svg" => "image/svg+xml",
            "png" => "image/png",
            "ico" => "image/x-icon",
            "txt" => "text/plain",
            _ => "application/octet-stream",
        }
    }

    /// Load an asset, rendering HTML with `ctx` when given.
    pub fn load(
        &self,
        url_path: &str,
        ctx: Option<&Value>,
    ) -> Result<(Vec<u8>, &'static str), StaticError> {
        let path = self
            .resolve(url_path)
            .ok_or_else(|| StaticError::Forbidden(url_path.to_string()))?;
        if !path.is_file() {
            return Err(StaticError::NotFound(url_path.to_string()));
        }
        let content_type = Self::content_type(&path);
        match ctx {
            Some(ctx) if content_type == "text/html" => {
                let source = fs::read_to_string(&path)?;
                let env = Environment::new();
                let rendered = env.render_str(&source, ctx)?;
                Ok((rendered.into_bytes(), content_type))
            }
            _ => Ok((fs::read(&path)?, content_type)),
        }
    }
}
