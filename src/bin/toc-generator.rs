use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use book_toc::generator::ScriptGenerator;
use book_toc::*;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Generate and inspect the book sidebar", long_about = None)]
struct Args {
    /// Sidebar config (JSON); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Outline markup; the embedded book outline when omitted
    #[arg(short, long)]
    outline: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write toc.js and toc.html
    Bundle {
        #[arg(short = 'd', long, default_value = "book")]
        output: PathBuf,
        #[arg(long, default_value = "Table of Contents")]
        title: String,
        #[arg(long, default_value = "en")]
        lang: String,
    },
    /// Activate the sidebar for a page and print the result
    Render {
        #[command(flatten)]
        page: PageArgs,
        /// Print the activation report as JSON instead of markup
        #[arg(long)]
        json: bool,
    },
    /// Activate a page, then click one of its links, saving the scroll offset
    Click {
        #[command(flatten)]
        page: PageArgs,
        /// href of the link as written in the outline
        #[arg(long)]
        href: String,
        /// Scroll offset of the sidebar at the time of the click
        #[arg(long)]
        scroll: Option<u32>,
    },
}

#[derive(clap::Args)]
struct PageArgs {
    /// Location of the page being viewed
    #[arg(short, long)]
    url: String,
    #[arg(short, long, default_value = "")]
    path_to_root: String,
    /// JSON file standing in for the browser session storage
    #[arg(short, long)]
    session: Option<PathBuf>,
}

fn open_storage(path: Option<&PathBuf>) -> Result<Box<dyn SessionStorage>> {
    Ok(match path {
        Some(p) => Box::new(JsonFileStorage::open(p)?),
        None => Box::new(MemoryStorage::new()),
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = SidebarConfig::load_or_default(args.config.as_deref())?;
    let markup = match &args.outline {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading outline {}", path.display()))?,
        None => DEFAULT_OUTLINE.to_string(),
    };

    match args.command {
        Command::Bundle { output, title, lang } => {
            println!("📝 Generating sidebar bundle into: {}", output.display());
            let bundle = ScriptGenerator::new(config)?
                .with_page_meta(title, lang)
                .write_bundle(&markup, &output)?;
            println!("  📄 {}", bundle.script.display());
            println!("  📄 {}", bundle.noscript.display());
            println!("✅ Sidebar bundle generated");
        }
        Command::Render { page, json } => {
            let outline = parse_outline(&markup)?;
            let mut storage = open_storage(page.session.as_ref())?;
            let mut sidebar = SidebarScrollbox::new(&config);
            let report = sidebar.activate(
                &outline,
                &PageContext::new(page.url, page.path_to_root),
                storage.as_mut(),
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", sidebar.render());
            }
        }
        Command::Click { page, href, scroll } => {
            let outline = parse_outline(&markup)?;
            let mut storage = open_storage(page.session.as_ref())?;
            let mut sidebar = SidebarScrollbox::new(&config);
            let prefixed = format!("{}{}", page.path_to_root, href);
            sidebar.activate(
                &outline,
                &PageContext::new(page.url, page.path_to_root),
                storage.as_mut(),
            );
            if let Some(offset) = scroll {
                sidebar.scroll_to(offset);
            }
            let target = sidebar
                .outline()
                .find_by_href(&prefixed)
                .or_else(|| sidebar.outline().find_by_href(&href))
                .with_context(|| format!("no sidebar link with href {href}"))?;
            sidebar.handle_click(ClickTarget::Link(target), storage.as_mut());
            let label = sidebar.outline().chapter(target).map(|c| c.label()).unwrap_or_default();
            println!("🔗 Clicked {} ({}) at scroll offset {}", label, href, sidebar.scroll_top());
        }
    }

    Ok(())
}
