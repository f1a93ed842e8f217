use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use handlebars::Handlebars;
use serde_json::json;

use crate::config::SidebarConfig;
use crate::parser::parse_outline;
use crate::templates::{NOSCRIPT_TEMPLATE, NOSCRIPT_TEMPLATE_NAME, SCRIPT_TEMPLATE, SCRIPT_TEMPLATE_NAME};

/// Escapes text for embedding in a single-quoted JavaScript string literal.
pub fn js_string_body(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}

/// Paths written by [`ScriptGenerator::write_bundle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub script: PathBuf,
    pub noscript: PathBuf,
}

/// Renders the sidebar files a book build ships: `toc.js` and `toc.html`.
pub struct ScriptGenerator {
    registry: Handlebars<'static>,
    config: SidebarConfig,
    title: String,
    lang: String,
}

impl ScriptGenerator {
    pub fn new(config: SidebarConfig) -> anyhow::Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry
            .register_template_string(SCRIPT_TEMPLATE_NAME, SCRIPT_TEMPLATE)
            .context("registering toc.js template")?;
        registry
            .register_template_string(NOSCRIPT_TEMPLATE_NAME, NOSCRIPT_TEMPLATE)
            .context("registering toc.html template")?;
        Ok(Self {
            registry,
            config,
            title: "Table of Contents".to_string(),
            lang: "en".to_string(),
        })
    }

    /// Title and language of the no-script page.
    pub fn with_page_meta(mut self, title: impl Into<String>, lang: impl Into<String>) -> Self {
        self.title = title.into();
        self.lang = lang.into();
        self
    }

    pub fn script(&self, outline_markup: &str) -> anyhow::Result<String> {
        let outline = parse_outline(outline_markup).context("outline markup is malformed")?;
        tracing::debug!("embedding outline with {} chapters", outline.chapters().len());

        let data = json!({
            "outline": js_string_body(outline_markup),
            "storage_key": js_string_body(&self.config.storage_key),
            "element_name": js_string_body(&self.config.element_name),
        });
        Ok(self.registry.render(SCRIPT_TEMPLATE_NAME, &data)?)
    }

    pub fn noscript_page(&self, outline_markup: &str) -> anyhow::Result<String> {
        parse_outline(outline_markup).context("outline markup is malformed")?;
        let data = json!({
            "outline": outline_markup,
            "title": self.title,
            "lang": self.lang,
        });
        Ok(self.registry.render(NOSCRIPT_TEMPLATE_NAME, &data)?)
    }

    pub fn write_bundle(&self, outline_markup: &str, output: impl AsRef<Path>) -> anyhow::Result<Bundle> {
        let output = output.as_ref();
        fs::create_dir_all(output).with_context(|| format!("creating {}", output.display()))?;

        let bundle = Bundle {
            script: output.join("toc.js"),
            noscript: output.join("toc.html"),
        };
        fs::write(&bundle.script, self.script(outline_markup)?)
            .with_context(|| format!("writing {}", bundle.script.display()))?;
        fs::write(&bundle.noscript, self.noscript_page(outline_markup)?)
            .with_context(|| format!("writing {}", bundle.noscript.display()))?;

        tracing::info!("wrote sidebar bundle to {}", output.display());
        Ok(bundle)
    }
}
