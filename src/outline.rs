//! Typed navigation tree for the book outline.
//!
//! The outline is an ordered list of `<li>` items. A chapter owns its
//! subsection list either as the `<li>` right after it (a [`NavItem::Section`]
//! wrapping `<ol class="section">`) or nested inside its own `<li>`. Both
//! shapes are kept as authored so the renderer can put them back verbatim.

use serde::Serialize;

use crate::location::{normalize_page_url, page_base, prefix_href, resolve_against};

pub const CHAPTER_ITEM: &str = "chapter-item";
pub const EXPANDED: &str = "expanded";
pub const ACTIVE: &str = "active";

/// Whitespace-separated class tokens that keep the authored attribute text
/// until the first mutation, after which tokens are re-serialized with
/// single spaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClassList(String);

impl ClassList {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.split_whitespace().any(|t| t == token)
    }

    pub fn add(&mut self, token: &str) {
        let mut tokens = self.tokens();
        if !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
        self.0 = tokens.join(" ");
    }

    pub fn remove(&mut self, token: &str) {
        let tokens: Vec<String> = self.tokens().into_iter().filter(|t| t != token).collect();
        self.0 = tokens.join(" ");
    }

    /// Returns whether the token is present afterwards.
    pub fn toggle(&mut self, token: &str) -> bool {
        if self.contains(token) {
            self.remove(token);
            false
        } else {
            self.add(token);
            true
        }
    }

    fn tokens(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for t in self.0.split_whitespace() {
            if !out.iter().any(|o| o == t) {
                out.push(t.to_string());
            }
        }
        out
    }
}

/// A chapter entry: `<li class="chapter-item ...">` holding a link (or a
/// `<div>` for drafts), an optional fold toggle and optional nested items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chapter {
    pub number: Option<String>,
    /// Inline markup of the label after the number.
    pub title: String,
    pub href: Option<String>,
    pub item_class: ClassList,
    pub link_class: ClassList,
    pub toggle: bool,
    pub children: Vec<NavItem>,
    /// Whether `children` came from an `<ol class="section">` inside this `<li>`.
    pub nested: bool,
}

impl Chapter {
    pub fn is_chapter_item(&self) -> bool {
        self.item_class.contains(CHAPTER_ITEM)
    }

    pub fn is_expanded(&self) -> bool {
        self.item_class.contains(EXPANDED)
    }

    pub fn is_active(&self) -> bool {
        self.link_class.contains(ACTIVE)
    }

    pub fn is_draft(&self) -> bool {
        self.href.is_none()
    }

    /// Number and title as a reader sees them, e.g. `18.1. 第4章 初識區塊鏈`.
    pub fn label(&self) -> String {
        match &self.number {
            Some(n) => format!("{} {}", n, self.title),
            None => self.title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NavItem {
    Chapter(Chapter),
    /// `<li><ol class="section">..</ol></li>` following its owning chapter.
    Section { items: Vec<NavItem> },
    PartTitle { title: String },
    Spacer,
}

impl NavItem {
    fn children(&self) -> Option<&[NavItem]> {
        match self {
            NavItem::Chapter(c) => Some(&c.children),
            NavItem::Section { items } => Some(items),
            _ => None,
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<NavItem>> {
        match self {
            NavItem::Chapter(c) => Some(&mut c.children),
            NavItem::Section { items } => Some(items),
            _ => None,
        }
    }

    pub fn as_chapter(&self) -> Option<&Chapter> {
        match self {
            NavItem::Chapter(c) => Some(c),
            _ => None,
        }
    }

    fn as_chapter_mut(&mut self) -> Option<&mut Chapter> {
        match self {
            NavItem::Chapter(c) => Some(c),
            _ => None,
        }
    }

    /// Only chapters carry an `expanded` class.
    pub fn is_expanded(&self) -> bool {
        self.as_chapter().is_some_and(Chapter::is_expanded)
    }
}

/// Position of a chapter in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ChapterId(pub usize);

/// Index path from the outline root to an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ItemPath(pub Vec<usize>);

impl ItemPath {
    fn child(&self, index: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(index);
        Self(steps)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outline {
    /// Class of the root `<ol>`, normally `chapter`.
    pub class: ClassList,
    pub items: Vec<NavItem>,
}

impl Outline {
    pub fn new(items: Vec<NavItem>) -> Self {
        Self {
            class: ClassList::new("chapter"),
            items,
        }
    }

    pub fn item(&self, path: &ItemPath) -> Option<&NavItem> {
        let (first, rest) = path.0.split_first()?;
        let mut node = self.items.get(*first)?;
        for &i in rest {
            node = node.children()?.get(i)?;
        }
        Some(node)
    }

    fn item_mut(&mut self, path: &ItemPath) -> Option<&mut NavItem> {
        let (first, rest) = path.0.split_first()?;
        let mut node = self.items.get_mut(*first)?;
        for &i in rest {
            node = node.children_mut()?.get_mut(i)?;
        }
        Some(node)
    }

    /// Paths of every chapter in document order; index is the [`ChapterId`].
    pub fn chapter_paths(&self) -> Vec<ItemPath> {
        fn walk(items: &[NavItem], at: &ItemPath, out: &mut Vec<ItemPath>) {
            for (i, item) in items.iter().enumerate() {
                let path = at.child(i);
                if matches!(item, NavItem::Chapter(_)) {
                    out.push(path.clone());
                }
                if let Some(children) = item.children() {
                    walk(children, &path, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.items, &ItemPath::default(), &mut out);
        out
    }

    pub fn chapters(&self) -> Vec<(ChapterId, &Chapter)> {
        self.chapter_paths()
            .iter()
            .enumerate()
            .filter_map(|(i, p)| self.item(p).and_then(NavItem::as_chapter).map(|c| (ChapterId(i), c)))
            .collect()
    }

    pub fn chapter(&self, id: ChapterId) -> Option<&Chapter> {
        let path = self.chapter_paths().into_iter().nth(id.0)?;
        self.item(&path).and_then(NavItem::as_chapter)
    }

    pub fn chapter_mut(&mut self, id: ChapterId) -> Option<&mut Chapter> {
        let path = self.chapter_paths().into_iter().nth(id.0)?;
        self.item_mut(&path).and_then(NavItem::as_chapter_mut)
    }

    pub fn path_of(&self, id: ChapterId) -> Option<ItemPath> {
        self.chapter_paths().into_iter().nth(id.0)
    }

    /// Chapters that render an `<a href>`, in document order.
    pub fn anchors(&self) -> Vec<(ChapterId, &Chapter)> {
        self.chapters().into_iter().filter(|(_, c)| c.href.is_some()).collect()
    }

    pub fn active_chapters(&self) -> Vec<ChapterId> {
        self.chapters()
            .into_iter()
            .filter(|(_, c)| c.is_active())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn find_by_href(&self, href: &str) -> Option<ChapterId> {
        self.chapters()
            .into_iter()
            .find(|(_, c)| c.href.as_deref() == Some(href))
            .map(|(id, _)| id)
    }

    /// Prefixes every root-relative href with `path_to_root`. Returns how
    /// many links were rewritten.
    pub fn resolve_links(&mut self, path_to_root: &str) -> usize {
        fn walk(items: &mut [NavItem], path_to_root: &str, count: &mut usize) {
            for item in items.iter_mut() {
                if let NavItem::Chapter(chapter) = item {
                    let rewritten = chapter
                        .href
                        .as_deref()
                        .and_then(|href| prefix_href(path_to_root, href));
                    if let Some(href) = rewritten {
                        chapter.href = Some(href);
                        *count += 1;
                    }
                }
                if let Some(children) = item.children_mut() {
                    walk(children, path_to_root, count);
                }
            }
        }
        let mut count = 0;
        walk(&mut self.items, path_to_root, &mut count);
        count
    }

    /// Marks the anchor for `current_page` active. `location` is the full
    /// page location links are resolved against; `current_page` is its
    /// normalized form.
    ///
    /// The first anchor also stands for the book index when the page sits
    /// at the root (`path_to_root` empty) and is an `index.html`. Only the
    /// first match in document order is marked.
    pub fn mark_active(&mut self, location: &str, current_page: &str, path_to_root: &str) -> Option<ChapterId> {
        let base = page_base(location);
        let index_alias = path_to_root.is_empty() && current_page.ends_with("/index.html");

        let found = self.anchors().into_iter().enumerate().find_map(|(i, (id, chapter))| {
            let href = chapter.href.as_deref()?;
            let resolved = resolve_against(base.as_ref(), href);
            (resolved == current_page || (i == 0 && index_alias)).then_some(id)
        });

        if let Some(id) = found {
            if let Some(chapter) = self.chapter_mut(id) {
                chapter.link_class.add(ACTIVE);
            }
        }
        found
    }

    /// Opens everything needed to reveal `id`. Every `<li>` on the way up to
    /// the root is visited, starting with the chapter's own: chapter items
    /// on the path are opened (the chapter itself and any chapter whose
    /// nested list holds it), as is a chapter item directly preceding one.
    pub fn expand_ancestors(&mut self, id: ChapterId) {
        let Some(path) = self.path_of(id) else {
            return;
        };

        for depth in (1..=path.0.len()).rev() {
            if let Some(NavItem::Chapter(owner)) = self.item_mut(&ItemPath(path.0[..depth].to_vec())) {
                if owner.is_chapter_item() {
                    owner.item_class.add(EXPANDED);
                }
            }

            let index = path.0[depth - 1];
            if index == 0 {
                continue;
            }
            let mut sibling = path.0[..depth].to_vec();
            sibling[depth - 1] = index - 1;
            if let Some(NavItem::Chapter(prev)) = self.item_mut(&ItemPath(sibling)) {
                if prev.is_chapter_item() {
                    prev.item_class.add(EXPANDED);
                }
            }
        }
    }

    /// Flips the `expanded` class on a chapter. Returns the new state.
    pub fn toggle_expanded(&mut self, id: ChapterId) -> Option<bool> {
        self.chapter_mut(id).map(|c| c.item_class.toggle(EXPANDED))
    }

    /// Runs link resolution, matching and expansion for one page view.
    pub fn activate_for(&mut self, location: &str, path_to_root: &str) -> Option<ChapterId> {
        let current_page = normalize_page_url(location);
        self.resolve_links(path_to_root);
        let active = self.mark_active(location, &current_page, path_to_root)?;
        self.expand_ancestors(active);
        Some(active)
    }
}
