//! `wpr-compat` command-line driver.
//!
//! # Commands
//! - `syntax <archive> <url>`: print the page's syntax report as JSON
//! - `list <archive>`: print one line per archived exchange
//!
//! Logs go to stderr; command output goes to stdout.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use url::Url;

use wpr_compat::config::{load_config, CompatConfig};
use wpr_compat::observability::init_logging;
use wpr_compat::{ScriptGraphResolver, SessionArchive};

#[derive(Parser)]
#[command(name = "wpr-compat")]
#[command(about = "Inspect web-page-replay archives and the ECMAScript versions their pages need", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the minimum ECMAScript version of a page
    Syntax {
        /// Archive file (gzip JSON)
        archive: PathBuf,
        /// URL the page was accessed at
        url: Url,
        /// File listing script URLs observed at runtime, one per line
        #[arg(long)]
        observed: Option<PathBuf>,
    },
    /// List archived exchanges
    List {
        /// Archive file (gzip JSON)
        archive: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => CompatConfig::default(),
    };
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("logging disabled: {e}");
    }

    match cli.command {
        Commands::Syntax { archive, url, observed } => {
            let archive = SessionArchive::load(&archive)?;
            let observed = match observed {
                Some(path) => read_observed(&path)?,
                None => Vec::new(),
            };
            let page = ScriptGraphResolver::new(&archive, &config.resolver).resolve(&url, &observed)?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        Commands::List { archive } => {
            let archive = SessionArchive::load(&archive)?;
            for exchange in archive.exchanges() {
                let method = exchange.request().method()?;
                let status = exchange.response().status_code()?;
                println!("{method:<7} {status} {}", exchange.url());
            }
        }
    }

    Ok(())
}

/// Non-blank lines not starting with `#`, each parsed as a URL.
fn read_observed(path: &Path) -> Result<Vec<Url>, Box<dyn Error>> {
    let mut urls = Vec::new();
    for line in fs::read_to_string(path)?.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        urls.push(Url::parse(line).map_err(|e| format!("observed URL {line:?}: {e}"))?);
    }
    Ok(urls)
}
