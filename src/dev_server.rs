use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use book_toc::{preview, SidebarConfig, DEFAULT_OUTLINE};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Preview the book sidebar", long_about = None)]
struct Args {
    #[arg(long, default_value = "0.0.0.0:3000")]
    bind: String,

    /// Directory of built book pages, served under /book
    #[arg(short, long, default_value = "book")]
    book: PathBuf,

    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    outline: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = SidebarConfig::load_or_default(args.config.as_deref())?;
    let markup = match &args.outline {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading outline {}", path.display()))?,
        None => DEFAULT_OUTLINE.to_string(),
    };

    let app = preview::router(&markup, config, args.book)?;

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("binding {}", args.bind))?;
    println!("🚀 Dev server running on http://{}", args.bind);
    println!("📖 Sidebar preview available at http://{}/sidebar?url=...", args.bind);

    axum::serve(listener, app).await?;
    Ok(())
}
