//! The sidebar scrollbox: the mount point the outline is injected into, and
//! the single activation routine run once per page view.

use crate::config::{PageContext, SidebarConfig};
use crate::layout::Viewport;
use crate::location::normalize_page_url;
use crate::outline::{ChapterId, Outline};
use crate::render::render_outline;
use crate::storage::SessionStorage;
use crate::{ActivationReport, ScrollRestore};

/// What a click inside the sidebar landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// A chapter link; the browser navigates away after the handler runs.
    Link(ChapterId),
    /// The fold toggle of a chapter item.
    Toggle(ChapterId),
    Other,
}

#[derive(Debug, Clone)]
pub struct SidebarScrollbox {
    storage_key: String,
    viewport: Viewport,
    outline: Outline,
    scroll_top: u32,
}

impl SidebarScrollbox {
    pub fn new(config: &SidebarConfig) -> Self {
        Self {
            storage_key: config.storage_key.clone(),
            viewport: config.viewport,
            outline: Outline::new(Vec::new()),
            scroll_top: 0,
        }
    }

    /// Populates the sidebar for one page view.
    ///
    /// Injects a copy of `outline`, rewrites root-relative links for the
    /// page depth, marks the entry for the current page and opens its
    /// ancestors, then restores the scroll offset saved by the previous
    /// page (consuming it) or centres the active entry.
    pub fn activate<S: SessionStorage + ?Sized>(
        &mut self,
        outline: &Outline,
        page: &PageContext,
        storage: &mut S,
    ) -> ActivationReport {
        self.outline = outline.clone();

        let current_page = normalize_page_url(&page.location);
        let links_resolved = self.outline.resolve_links(&page.path_to_root);
        let active = self
            .outline
            .mark_active(&page.location, &current_page, &page.path_to_root);
        if let Some(id) = active {
            self.outline.expand_ancestors(id);
        }

        let scroll = self.restore_scroll(storage);

        tracing::info!(
            page = %current_page,
            active = ?active.map(|id| id.0),
            links = links_resolved,
            scroll = ?scroll,
            "sidebar activated"
        );

        ActivationReport {
            current_page,
            active,
            links_resolved,
            scroll,
        }
    }

    fn restore_scroll<S: SessionStorage + ?Sized>(&mut self, storage: &mut S) -> ScrollRestore {
        let saved = storage.take_item(&self.storage_key);
        if let Some(raw) = saved.as_deref().filter(|v| !v.is_empty()) {
            let offset = coerce_offset(raw).unwrap_or_else(|| {
                tracing::warn!("unreadable scroll offset {:?}, scrolling to top", raw);
                0
            });
            self.scroll_top = offset;
            return ScrollRestore::Restored { offset };
        }

        let first_active = self.outline.active_chapters().into_iter().next();
        match first_active.and_then(|id| self.viewport.center_offset(&self.outline, id).map(|o| (id, o))) {
            Some((chapter, offset)) => {
                self.scroll_top = offset;
                ScrollRestore::Centered { chapter, offset }
            }
            None => ScrollRestore::Unchanged,
        }
    }

    /// Click handler for the whole scrollbox. Link clicks save the current
    /// offset so the next page can restore it; toggle clicks fold.
    pub fn handle_click<S: SessionStorage + ?Sized>(&mut self, target: ClickTarget, storage: &mut S) {
        match target {
            ClickTarget::Link(id) => {
                tracing::debug!("link {} clicked at offset {}", id.0, self.scroll_top);
                storage.set_item(&self.storage_key, self.scroll_top.to_string());
            }
            ClickTarget::Toggle(id) => {
                self.toggle(id);
            }
            ClickTarget::Other => {}
        }
    }

    /// Flips the expanded state of a chapter that has a fold toggle.
    /// Chapters without one have no handler and are left alone.
    pub fn toggle(&mut self, id: ChapterId) -> Option<bool> {
        if !self.outline.chapter(id)?.toggle {
            return None;
        }
        let expanded = self.outline.toggle_expanded(id)?;
        tracing::debug!("chapter {} expanded={}", id.0, expanded);
        Some(expanded)
    }

    pub fn scroll_to(&mut self, offset: u32) {
        self.scroll_top = offset;
    }

    pub fn scroll_top(&self) -> u32 {
        self.scroll_top
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn active(&self) -> Option<ChapterId> {
        self.outline.active_chapters().into_iter().next()
    }

    /// Current markup of the scrollbox content.
    pub fn render(&self) -> String {
        render_outline(&self.outline)
    }
}

/// Reads a stored offset the way assigning it to `scrollTop` would.
/// Fractions are rounded and negatives clamp to the top. `None` means the
/// text is not a number at all, which a browser also treats as the top.
fn coerce_offset(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<u32>() {
        return Some(v);
    }
    let v = raw.parse::<f64>().ok().filter(|v| !v.is_nan())?;
    Some(v.round().clamp(0.0, f64::from(u32::MAX)) as u32)
}
