use std::sync::OnceLock;

use regex::Regex;

use crate::error::{OutlineError, Result};
use crate::outline::{Chapter, ClassList, NavItem, Outline};

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<(/)?([A-Za-z][A-Za-z0-9-]*)([^>]*)>").expect("static pattern"))
}

fn attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
            .expect("static pattern")
    })
}

#[derive(Debug, Clone)]
enum Token {
    Open {
        name: String,
        attrs: Vec<(String, String)>,
        start: usize,
    },
    Close {
        name: String,
        start: usize,
    },
    Text {
        start: usize,
        end: usize,
    },
}

impl Token {
    fn start(&self) -> usize {
        match self {
            Token::Open { start, .. } | Token::Close { start, .. } | Token::Text { start, .. } => *start,
        }
    }

    fn describe(&self, src: &str) -> String {
        match self {
            Token::Open { name, .. } => format!("<{name}>"),
            Token::Close { name, .. } => format!("</{name}>"),
            Token::Text { start, end } => format!("text {:?}", &src[*start..*end]),
        }
    }

    fn attr(&self, key: &str) -> Option<&str> {
        match self {
            Token::Open { attrs, .. } => attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    fn is_open(&self, tag: &str) -> bool {
        matches!(self, Token::Open { name, .. } if name == tag)
    }

    fn is_close(&self, tag: &str) -> bool {
        matches!(self, Token::Close { name, .. } if name == tag)
    }
}

pub(crate) fn decode_entities(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

fn tokenize(src: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for caps in tag_regex().captures_iter(src) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            tokens.push(Token::Text { start: last, end: whole.start() });
        }
        let name = caps[2].to_ascii_lowercase();
        if caps.get(1).is_some() {
            tokens.push(Token::Close { name, start: whole.start() });
        } else {
            let raw_attrs = caps.get(3).map_or("", |m| m.as_str()).trim_end_matches('/');
            let attrs = attr_regex()
                .captures_iter(raw_attrs)
                .map(|a| {
                    let value = a
                        .get(2)
                        .or_else(|| a.get(3))
                        .or_else(|| a.get(4))
                        .map_or(String::new(), |m| decode_entities(m.as_str()));
                    (a[1].to_ascii_lowercase(), value)
                })
                .collect();
            tokens.push(Token::Open { name, attrs, start: whole.start() });
        }
        last = whole.end();
    }
    if last < src.len() {
        tokens.push(Token::Text { start: last, end: src.len() });
    }
    tokens
}

/// Reads the pre-rendered outline markup into a typed [`Outline`].
pub struct OutlineParser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> OutlineParser<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, tokens: tokenize(src), pos: 0 }
    }

    pub fn parse(mut self) -> Result<Outline> {
        self.skip_blank();
        let open = self.next().ok_or(OutlineError::Empty)?;
        if !open.is_open("ol") {
            return Err(self.unexpected("<ol>", &open));
        }
        let class = ClassList::new(open.attr("class").unwrap_or_default());
        let items = self.parse_items()?;
        self.expect_close("ol")?;
        self.skip_blank();
        if let Some(rest) = self.peek() {
            return Err(OutlineError::TrailingContent(rest.start()));
        }

        let outline = Outline { class, items };
        tracing::debug!("parsed outline with {} chapters", outline.chapter_paths().len());
        Ok(outline)
    }

    fn parse_items(&mut self) -> Result<Vec<NavItem>> {
        let mut items = Vec::new();
        loop {
            self.skip_blank();
            match self.peek() {
                Some(t) if t.is_close("ol") => return Ok(items),
                Some(t) if t.is_open("li") => {
                    let open = t.clone();
                    self.pos += 1;
                    items.push(self.parse_li(&open)?);
                }
                Some(t) => {
                    let t = t.clone();
                    return Err(self.unexpected("<li>", &t));
                }
                None => return Err(OutlineError::Unclosed("ol".into())),
            }
        }
    }

    fn parse_li(&mut self, open: &Token) -> Result<NavItem> {
        let class = ClassList::new(open.attr("class").unwrap_or_default());

        if class.contains("spacer") {
            self.skip_blank();
            self.expect_close("li")?;
            return Ok(NavItem::Spacer);
        }
        if class.contains("part-title") {
            let title = self.raw_until_close("li")?;
            return Ok(NavItem::PartTitle { title: title.to_string() });
        }

        self.skip_blank();
        let Some(first) = self.next() else {
            return Err(OutlineError::Unclosed("li".into()));
        };

        if first.is_open("ol") {
            let items = self.parse_items()?;
            self.expect_close("ol")?;
            self.skip_blank();
            self.expect_close("li")?;
            return Ok(NavItem::Section { items });
        }

        let (href, link_class, tag) = if first.is_open("a") {
            (
                first.attr("href").map(str::to_string),
                ClassList::new(first.attr("class").unwrap_or_default()),
                "a",
            )
        } else if first.is_open("div") {
            (None, ClassList::default(), "div")
        } else {
            return Err(self.unexpected("<a>, <div> or <ol>", &first));
        };
        let (number, title) = self.parse_label(tag)?;

        let mut chapter = Chapter {
            number,
            title,
            href,
            item_class: class,
            link_class,
            toggle: false,
            children: Vec::new(),
            nested: false,
        };

        loop {
            self.skip_blank();
            let Some(next) = self.next() else {
                return Err(OutlineError::Unclosed("li".into()));
            };
            if next.is_close("li") {
                break;
            }
            if next.is_open("a") && next.attr("class").is_some_and(|c| c.split_whitespace().any(|t| t == "toggle")) {
                self.raw_until_close("a")?;
                chapter.toggle = true;
            } else if next.is_open("ol") {
                chapter.children = self.parse_items()?;
                chapter.nested = true;
                self.expect_close("ol")?;
            } else {
                return Err(self.unexpected("</li>", &next));
            }
        }

        Ok(NavItem::Chapter(chapter))
    }

    /// `<strong aria-hidden="true">N.</strong> Title` up to the closing tag.
    fn parse_label(&mut self, tag: &str) -> Result<(Option<String>, String)> {
        let save = self.pos;
        self.skip_blank();
        let number = if self.peek().is_some_and(|t| t.is_open("strong")) {
            self.pos += 1;
            let inner = self.raw_until_close("strong")?;
            Some(inner.trim().to_string())
        } else {
            self.pos = save;
            None
        };
        let raw = self.raw_until_close(tag)?;
        let title = if number.is_some() { raw.strip_prefix(' ').unwrap_or(raw) } else { raw };
        Ok((number, title.to_string()))
    }

    /// Consumes tokens through the matching close tag and returns the raw
    /// inner markup.
    fn raw_until_close(&mut self, tag: &str) -> Result<&'a str> {
        let src = self.src;
        let inner_start = self.tokens.get(self.pos).map_or(src.len(), Token::start);
        let mut depth = 0usize;
        while let Some(t) = self.next() {
            match t {
                Token::Open { ref name, .. } if name == tag => depth += 1,
                Token::Close { ref name, start, .. } if name == tag => {
                    if depth == 0 {
                        return Ok(&src[inner_start..start]);
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
        Err(OutlineError::Unclosed(tag.to_string()))
    }

    fn expect_close(&mut self, tag: &'static str) -> Result<()> {
        self.skip_blank();
        match self.next() {
            Some(t) if t.is_close(tag) => Ok(()),
            Some(t) => Err(self.unexpected(close_name(tag), &t)),
            None => Err(OutlineError::Unclosed(tag.to_string())),
        }
    }

    fn unexpected(&self, expected: &'static str, found: &Token) -> OutlineError {
        OutlineError::UnexpectedTag {
            expected,
            found: found.describe(self.src),
            offset: found.start(),
        }
    }

    fn skip_blank(&mut self) {
        while let Some(Token::Text { start, end }) = self.tokens.get(self.pos) {
            if !self.src[*start..*end].trim().is_empty() {
                break;
            }
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }
}

fn close_name(tag: &str) -> &'static str {
    match tag {
        "ol" => "</ol>",
        "li" => "</li>",
        "a" => "</a>",
        _ => "closing tag",
    }
}

pub fn parse_outline(markup: &str) -> Result<Outline> {
    OutlineParser::new(markup).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::ChapterId;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_sibling_sections() {
        let outline = parse_outline(
            r#"<ol class="chapter"><li class="chapter-item expanded "><a href="part.html"><strong aria-hidden="true">2.</strong> Part</a></li><li><ol class="section"><li class="chapter-item expanded "><a href="a.html"><strong aria-hidden="true">2.1.</strong> A &amp; B</a></li></ol></li></ol>"#,
        )
        .unwrap();
        assert_eq!(outline.items.len(), 2);
        assert!(matches!(outline.items[1], NavItem::Section { .. }));
        let a = outline.chapter(ChapterId(1)).unwrap();
        assert_eq!(a.number.as_deref(), Some("2.1."));
        assert_eq!(a.title, "A &amp; B");
        assert_eq!(a.href.as_deref(), Some("a.html"));
        assert!(a.is_expanded());
    }

    #[test]
    fn reads_drafts_toggles_parts_and_spacers() {
        let outline = parse_outline(
            r#"<ol class="chapter">
                <li class="part-title">Getting started</li>
                <li class="chapter-item "><a href="x.html?a=1&amp;b=2"><strong aria-hidden="true">1.</strong> X</a><a class="toggle"><div>❱</div></a></li>
                <li><ol class="section"><li class="chapter-item "><div><strong aria-hidden="true">1.1.</strong> Soon</div></li></ol></li>
                <li class="spacer"></li>
            </ol>"#,
        )
        .unwrap();
        assert_eq!(outline.items.len(), 4);
        assert_eq!(outline.items[0], NavItem::PartTitle { title: "Getting started".into() });
        let x = outline.chapter(ChapterId(0)).unwrap();
        assert!(x.toggle);
        assert_eq!(x.href.as_deref(), Some("x.html?a=1&b=2"));
        assert!(outline.chapter(ChapterId(1)).unwrap().is_draft());
        assert_eq!(outline.items[3], NavItem::Spacer);
    }

    #[test]
    fn reads_nested_form() {
        let outline = parse_outline(
            r#"<ol class="chapter"><li class="chapter-item"><a href="p.html">P</a><ol class="section"><li class="chapter-item"><a href="p/c.html">C</a></li></ol></li></ol>"#,
        )
        .unwrap();
        let p = outline.chapter(ChapterId(0)).unwrap();
        assert!(p.nested);
        assert_eq!(p.number, None);
        assert_eq!(p.title, "P");
        assert_eq!(p.children.len(), 1);
    }

    #[test]
    fn rejects_broken_markup() {
        assert_eq!(parse_outline("  "), Err(OutlineError::Empty));
        assert_eq!(
            parse_outline(r#"<ol class="chapter"><li class="chapter-item"><a href="a.html">A</a></li>"#),
            Err(OutlineError::Unclosed("ol".into()))
        );
        assert!(matches!(
            parse_outline(r#"<ul><li></li></ul>"#),
            Err(OutlineError::UnexpectedTag { expected: "<ol>", .. })
        ));
        assert!(matches!(
            parse_outline(r#"<ol></ol><p>"#),
            Err(OutlineError::TrailingContent(9))
        ));
    }
}
