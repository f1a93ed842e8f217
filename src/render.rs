//! Materializes an [`Outline`] back into sidebar markup.

use crate::outline::{Chapter, ClassList, NavItem, Outline};

pub const TOGGLE_MARKUP: &str = r#"<a class="toggle"><div>❱</div></a>"#;

pub(crate) fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn class_attr(class: &ClassList) -> String {
    if class.as_str().is_empty() {
        String::new()
    } else {
        format!(" class=\"{}\"", escape_attr(class.as_str()))
    }
}

pub fn render_outline(outline: &Outline) -> String {
    let mut html = String::new();
    html.push_str(&format!("<ol{}>", class_attr(&outline.class)));
    render_items(&outline.items, &mut html);
    html.push_str("</ol>");
    html
}

fn render_items(items: &[NavItem], html: &mut String) {
    for item in items {
        match item {
            NavItem::Chapter(chapter) => render_chapter(chapter, html),
            NavItem::Section { items } => {
                html.push_str("<li><ol class=\"section\">");
                render_items(items, html);
                html.push_str("</ol></li>");
            }
            NavItem::PartTitle { title } => {
                html.push_str(&format!("<li class=\"part-title\">{}</li>", title));
            }
            NavItem::Spacer => html.push_str("<li class=\"spacer\"></li>"),
        }
    }
}

fn render_chapter(chapter: &Chapter, html: &mut String) {
    html.push_str(&format!("<li{}>", class_attr(&chapter.item_class)));

    let close = match &chapter.href {
        Some(href) => {
            html.push_str(&format!(
                "<a href=\"{}\"{}>",
                escape_attr(href),
                class_attr(&chapter.link_class)
            ));
            "</a>"
        }
        None => {
            html.push_str("<div>");
            "</div>"
        }
    };
    if let Some(number) = &chapter.number {
        html.push_str(&format!("<strong aria-hidden=\"true\">{}</strong> ", number));
    }
    html.push_str(&chapter.title);
    html.push_str(close);

    if chapter.toggle {
        html.push_str(TOGGLE_MARKUP);
    }
    if chapter.nested || !chapter.children.is_empty() {
        html.push_str("<ol class=\"section\">");
        render_items(&chapter.children, html);
        html.push_str("</ol>");
    }
    html.push_str("</li>");
}
