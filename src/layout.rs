//! Row geometry of the sidebar, used to scroll an entry into the vertical
//! centre of the scrollbox without a browser layout engine.

use serde::{Deserialize, Serialize};

use crate::outline::{ChapterId, NavItem, Outline};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    /// Visible height of the scrollbox.
    pub height: u32,
    /// Height of a chapter or part-title row.
    pub row_height: u32,
    pub spacer_height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            height: 600,
            row_height: 30,
            spacer_height: 12,
        }
    }
}

/// A visible row: its top offset and height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    pub chapter: Option<ChapterId>,
    pub top: u32,
    pub height: u32,
}

impl Viewport {
    /// Rows currently shown, top to bottom.
    ///
    /// Items of a section are hidden when the `<li>` before the section is
    /// not expanded; children nested inside a chapter are hidden when that
    /// chapter is not expanded.
    pub fn rows(&self, outline: &Outline) -> Vec<Row> {
        let mut state = RowWalk {
            viewport: self,
            next_chapter: 0,
            top: 0,
            rows: Vec::new(),
        };
        state.walk(&outline.items, true);
        state.rows
    }

    pub fn content_height(&self, outline: &Outline) -> u32 {
        self.rows(outline).last().map_or(0, |r| r.top + r.height)
    }

    /// Scroll offset that puts `chapter` in the middle of the viewport,
    /// clamped to the scrollable range. `None` when the chapter is hidden.
    pub fn center_offset(&self, outline: &Outline, chapter: ChapterId) -> Option<u32> {
        let rows = self.rows(outline);
        let row = rows.iter().find(|r| r.chapter == Some(chapter))?;
        let content = rows.last().map_or(0, |r| r.top + r.height);
        let max_scroll = content.saturating_sub(self.height);
        let wanted = (row.top + row.height / 2).saturating_sub(self.height / 2);
        Some(wanted.min(max_scroll))
    }
}

struct RowWalk<'a> {
    viewport: &'a Viewport,
    next_chapter: usize,
    top: u32,
    rows: Vec<Row>,
}

impl RowWalk<'_> {
    fn push(&mut self, chapter: Option<ChapterId>, height: u32, visible: bool) {
        if visible {
            self.rows.push(Row { chapter, top: self.top, height });
            self.top += height;
        }
    }

    // Chapter ids are counted for hidden items too so they stay in
    // document order.
    fn walk(&mut self, items: &[NavItem], visible: bool) {
        for (i, item) in items.iter().enumerate() {
            match item {
                NavItem::Chapter(chapter) => {
                    let id = ChapterId(self.next_chapter);
                    self.next_chapter += 1;
                    self.push(Some(id), self.viewport.row_height, visible);
                    self.walk(&chapter.children, visible && chapter.is_expanded());
                }
                NavItem::Section { items: inner } => {
                    let open = i == 0 || items[i - 1].is_expanded();
                    self.walk(inner, visible && open);
                }
                NavItem::PartTitle { .. } => self.push(None, self.viewport.row_height, visible),
                NavItem::Spacer => self.push(None, self.viewport.spacer_height, visible),
            }
        }
    }
}
