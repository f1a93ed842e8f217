//! Sidebar configuration.
//!
//! `SidebarConfig` is shared by every page of a book and can be loaded from a
//! JSON file; `PageContext` is what a single page supplies when the sidebar
//! is attached.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::layout::Viewport;

pub const DEFAULT_ELEMENT_NAME: &str = "mdbook-sidebar-scrollbox";
pub const DEFAULT_STORAGE_KEY: &str = "sidebar-scroll";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidebarConfig {
    /// Custom element the generated script registers.
    pub element_name: String,
    /// Session-storage key holding the scroll offset between pages.
    pub storage_key: String,
    pub viewport: Viewport,
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            element_name: DEFAULT_ELEMENT_NAME.to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            viewport: Viewport::default(),
        }
    }
}

impl SidebarConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let txt = fs::read_to_string(path)
            .with_context(|| format!("reading sidebar config {}", path.display()))?;
        let config: Self = serde_json::from_str(&txt)
            .with_context(|| format!("parsing sidebar config {}", path.display()))?;
        tracing::info!("loaded sidebar config from {}", path.display());
        Ok(config)
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

/// Per-page inputs of an activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    /// Full location of the page being viewed.
    pub location: String,
    /// Relative prefix from this page back to the book root, e.g. `../`.
    #[serde(default)]
    pub path_to_root: String,
}

impl PageContext {
    pub fn new(location: impl Into<String>, path_to_root: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            path_to_root: path_to_root.into(),
        }
    }
}
