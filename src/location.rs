//! Page-location helpers: normalizing the current page and resolving
//! outline links the way a browser resolves an anchor's `href`.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

fn external_href() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:[a-z+]+:)?//").expect("static pattern"))
}

/// Key used to compare outline links against the page being viewed.
///
/// An absolute location is first put in its serialized URL form, the same
/// form resolved links take. Everything from the first `#` is dropped, then
/// everything from the first `?`. A trailing `/` is taken to mean the
/// directory index, so `index.html` is appended. The result is compared as
/// a plain string.
pub fn normalize_page_url(location: &str) -> String {
    let serialized = Url::parse(location).map(String::from);
    let location = serialized.as_deref().unwrap_or(location);
    let without_fragment = location.split('#').next().unwrap_or_default();
    let mut page = without_fragment
        .split('?')
        .next()
        .unwrap_or_default()
        .to_string();
    if page.ends_with('/') {
        page.push_str("index.html");
    }
    page
}

/// True for hrefs that must never be prefixed with the path to root:
/// in-page fragments, protocol-relative and scheme-qualified URLs.
pub fn is_external_or_fragment(href: &str) -> bool {
    href.starts_with('#') || external_href().is_match(href)
}

/// Rewrites a root-relative outline href for the current page depth.
/// Returns `None` when the href is left as authored.
pub fn prefix_href(path_to_root: &str, href: &str) -> Option<String> {
    if is_external_or_fragment(href) {
        None
    } else {
        Some(format!("{path_to_root}{href}"))
    }
}

/// Absolute form of `href` as seen from the page at `base`.
///
/// Falls back to the attribute text when `base` is not an absolute URL,
/// which keeps headless callers that pass bare paths working.
pub fn resolve_against(base: Option<&Url>, href: &str) -> String {
    match base.map(|b| b.join(href)) {
        Some(Ok(resolved)) => resolved.to_string(),
        _ => href.to_string(),
    }
}

/// Parses the page location into a base for [`resolve_against`].
pub fn page_base(location: &str) -> Option<Url> {
    match Url::parse(location) {
        Ok(url) => Some(url),
        Err(err) => {
            tracing::debug!("location {:?} is not an absolute URL: {}", location, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_query_and_fragment() {
        assert_eq!(
            normalize_page_url("https://book.test/ch/a.html?x=1#top"),
            "https://book.test/ch/a.html"
        );
        assert_eq!(
            normalize_page_url("https://book.test/a.html#frag?notquery"),
            "https://book.test/a.html"
        );
    }

    #[test]
    fn trailing_slash_aliases_index() {
        assert_eq!(
            normalize_page_url("https://book.test/guide/"),
            "https://book.test/guide/index.html"
        );
        assert_eq!(
            normalize_page_url("https://book.test/guide/?q=1"),
            "https://book.test/guide/index.html"
        );
    }

    #[test]
    fn location_is_compared_in_serialized_form() {
        assert_eq!(normalize_page_url("https://notes.example"), "https://notes.example/index.html");
        assert_eq!(
            normalize_page_url("HTTPS://Notes.Example/My Page.html"),
            "https://notes.example/My%20Page.html"
        );
        assert_eq!(normalize_page_url("guide/"), "guide/index.html");

        let base = page_base("https://Notes.Example/part/");
        assert_eq!(
            resolve_against(base.as_ref(), "My Page.html"),
            normalize_page_url("https://notes.example/part/My%20Page.html#x")
        );
    }

    #[test]
    fn external_detection() {
        for href in ["http://a.b/", "https://a.b/c", "//cdn.test/x", "#intro", "git+ssh://h/r"] {
            assert!(is_external_or_fragment(href), "{href}");
        }
        for href in ["index.html", "ch/a.html", "mailto:someone@test", "../up.html"] {
            assert!(!is_external_or_fragment(href), "{href}");
        }
    }

    #[test]
    fn prefix_leaves_absolute_alone() {
        assert_eq!(prefix_href("../", "https://x.test/"), None);
        assert_eq!(prefix_href("../", "#top"), None);
        assert_eq!(prefix_href("../", "a.html").as_deref(), Some("../a.html"));
        assert_eq!(prefix_href("", "a.html").as_deref(), Some("a.html"));
    }

    #[test]
    fn resolves_relative_links() {
        let base = page_base("https://book.test/part/ch1.html");
        assert_eq!(
            resolve_against(base.as_ref(), "../index.html"),
            "https://book.test/index.html"
        );
        assert_eq!(
            resolve_against(base.as_ref(), "ch2.html"),
            "https://book.test/part/ch2.html"
        );
        assert_eq!(resolve_against(None, "ch2.html"), "ch2.html");
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(
            path in "[a-z0-9/._-]{0,24}",
            query in proptest::option::of("[a-z0-9=&]{0,8}"),
            fragment in proptest::option::of("[a-z0-9?]{0,8}"),
        ) {
            let mut location = format!("https://book.test/{path}");
            if let Some(q) = query {
                location.push('?');
                location.push_str(&q);
            }
            if let Some(f) = fragment {
                location.push('#');
                location.push_str(&f);
            }
            let once = normalize_page_url(&location);
            prop_assert_eq!(normalize_page_url(&once), once.clone());
            prop_assert!(!once.contains('?') && !once.contains('#'));
            prop_assert!(!once.ends_with('/'));
        }

        #[test]
        fn prop_absolute_hrefs_never_prefixed(
            scheme in prop_oneof![Just("http://"), Just("https://"), Just("//"), Just("#")],
            rest in "[a-z0-9/.]{0,16}",
            prefix in "(\\.\\./){0,3}",
        ) {
            let href = format!("{scheme}{rest}");
            prop_assert_eq!(prefix_href(&prefix, &href), None);
        }
    }
}
