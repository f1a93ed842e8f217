use serde::Serialize;

/// Outline of the book this sidebar ships with, as emitted by the book
/// builder.
pub const DEFAULT_OUTLINE: &str = include_str!("../static/outline.html");

/// How the scroll offset was settled during an activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScrollRestore {
    /// The offset saved by the previous page was consumed and applied.
    Restored { offset: u32 },
    /// No saved offset; the active entry was centred.
    Centered { chapter: ChapterId, offset: u32 },
    /// Nothing saved and nothing active (or the active entry is hidden).
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivationReport {
    pub current_page: String,
    pub active: Option<ChapterId>,
    pub links_resolved: usize,
    pub scroll: ScrollRestore,
}

pub mod config;
pub mod error;
pub mod generator;
pub mod layout;
pub mod location;
pub mod outline;
pub mod parser;
pub mod preview;
pub mod render;
pub mod sidebar;
pub mod storage;
pub mod templates;

pub use config::{PageContext, SidebarConfig};
pub use error::OutlineError;
pub use outline::{Chapter, ChapterId, NavItem, Outline};
pub use parser::parse_outline;
pub use render::render_outline;
pub use sidebar::{ClickTarget, SidebarScrollbox};
pub use storage::{JsonFileStorage, MemoryStorage, SessionStorage};
