//! Handlebars templates for the files written next to the book pages.

pub const SCRIPT_TEMPLATE_NAME: &str = "toc.js";
pub const NOSCRIPT_TEMPLATE_NAME: &str = "toc.html";

/// Browser script that fills the sidebar element on every page.
///
/// Triple-stashed values must already be escaped for a single-quoted
/// JavaScript string.
pub const SCRIPT_TEMPLATE: &str = r##"// Populate the sidebar
//
// The outline lives in this script rather than in each page so that the
// size of the book stays linear in the number of pages.
class SidebarScrollbox extends HTMLElement {
    constructor() {
        super();
    }
    connectedCallback() {
        this.innerHTML = '{{{outline}}}';

        let currentPage = document.location.href.toString().split("#")[0].split("?")[0];
        if (currentPage.endsWith("/")) {
            currentPage += "index.html";
        }

        const links = Array.prototype.slice.call(this.querySelectorAll("a[href]"));
        let found = false;
        links.forEach((link, i) => {
            const href = link.getAttribute("href");
            if (href && !href.startsWith("#") && !/^(?:[a-z+]+:)?\/\//.test(href)) {
                link.href = path_to_root + href;
            }
            if (found) {
                return;
            }
            // The first entry doubles as the book index.
            if (link.href === currentPage || (i === 0 && path_to_root === "" && currentPage.endsWith("/index.html"))) {
                found = true;
                link.classList.add("active");
                let node = link.parentElement;
                while (node && node !== this) {
                    if (node.tagName === "LI") {
                        if (node.classList.contains("chapter-item")) {
                            node.classList.add("expanded");
                        }
                        const prev = node.previousElementSibling;
                        if (prev && prev.classList.contains("chapter-item")) {
                            prev.classList.add("expanded");
                        }
                    }
                    node = node.parentElement;
                }
            }
        });

        this.addEventListener("click", function (e) {
            if (e.target.tagName === "A") {
                sessionStorage.setItem('{{{storage_key}}}', this.scrollTop);
            }
        }, { passive: true });

        const saved = sessionStorage.getItem('{{{storage_key}}}');
        sessionStorage.removeItem('{{{storage_key}}}');
        if (saved) {
            this.scrollTop = saved;
        } else {
            const active = this.querySelector(".active");
            if (active) {
                active.scrollIntoView({ block: "center" });
            }
        }

        this.querySelectorAll("a.toggle").forEach(function (el) {
            el.addEventListener("click", function (ev) {
                ev.currentTarget.parentElement.classList.toggle("expanded");
            });
        });
    }
}
window.customElements.define('{{{element_name}}}', SidebarScrollbox);
"##;

/// Stand-alone outline page loaded in an iframe when scripts are disabled.
pub const NOSCRIPT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="{{lang}}" class="sidebar-iframe-outer">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <base target="_parent">
    <title>{{title}}</title>
    <link rel="stylesheet" href="css/chrome.css">
</head>
<body class="sidebar-iframe-inner">
{{{outline}}}
</body>
</html>
"#;
