//! Recipe Nabber - command line runner
//!
//! Loads a saved page, runs the content script against it and prints what
//! the host application would receive, followed by the overlay markup (or the
//! restored page with `--close`).

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueHint};
use nabber_dom::{Document, NodeId};
use nabber_engine::{
    BundledResources, ChannelReporter, Config, ContentScript, DirectoryResources, OpenOutcome,
    ResourceResolver,
};
use smol::channel::Receiver;
use smol::LocalExecutor;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, PartialEq, Parser)]
#[command(name = "nabber")]
#[command(about = "Open the recipe overlay on a saved page", long_about = None)]
struct Args {
    /// Saved HTML page
    #[arg(value_name = "PAGE", value_hint = ValueHint::FilePath)]
    page: PathBuf,

    /// Page URL used for the reported domain (defaults to the file URL)
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Directory holding RecipeCard.html and RecipeCard.css
    #[arg(long, value_name = "DIR", value_hint = ValueHint::DirPath)]
    resources: Option<PathBuf>,

    /// Close the overlay again and print the restored page
    #[arg(long)]
    close: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let html = std::fs::read_to_string(&args.page)
        .with_context(|| format!("failed to read {}", args.page.display()))?;
    let url = match &args.url {
        Some(url) => url.clone(),
        None => file_url(&args.page)?,
    };
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let document = nabber_html::parse_with_url(&html, &url);
    info!(url = %url, title = %document.title(), "page loaded");

    match &args.resources {
        Some(dir) => run(document, config, DirectoryResources::new(dir), args.close),
        None => run(document, config, BundledResources::default(), args.close),
    }
}

fn file_url(path: &Path) -> Result<String> {
    let absolute = std::fs::canonicalize(path)
        .with_context(|| format!("failed to resolve {}", path.display()))?;
    url::Url::from_file_path(&absolute)
        .map(String::from)
        .map_err(|()| anyhow!("cannot express {} as a file URL", absolute.display()))
}

fn run<R: ResourceResolver>(document: Document, config: Config, resources: R, close: bool) -> Result<()> {
    let executor = Rc::new(LocalExecutor::new());
    let document = Rc::new(RefCell::new(document));
    let (tx, outbox) = smol::channel::unbounded();
    let script = ContentScript::new(
        document.clone(),
        config,
        resources,
        ChannelReporter::new(tx),
        executor.clone(),
    )?;

    smol::block_on(executor.run(session(&script, &outbox, close)))
}

async fn session<R: ResourceResolver>(
    script: &ContentScript<R, ChannelReporter>,
    outbox: &Receiver<String>,
    close: bool,
) -> Result<()> {
    match script.open().await? {
        OpenOutcome::Opened { relocated } => info!(relocated, "recipe overlay open"),
        OpenOutcome::NoMatches | OpenOutcome::Suppressed => {
            warn!("no recipe found on this page");
            return Ok(());
        }
    }

    let message = outbox.recv().await.context("metrics were never reported")?;
    println!("{message}");

    let document = script.document();
    if close {
        script.close();
        println!("{}", document.borrow().tree.outer_html(NodeId::ROOT));
    } else if let Some(overlay) = script.overlay() {
        println!("{}", document.borrow().tree.outer_html(overlay.modal));
    }
    Ok(())
}
