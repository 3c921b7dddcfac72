mod commands;
mod display;
mod logging;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use hfscout_core::SortMode;

#[derive(Parser)]
#[command(name = "hfscout")]
#[command(author, version, about = "Search and rank HuggingFace models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    search: SearchArgs,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// View or set configuration
    Config {
        /// Config key (e.g., "search.top_n", "hub.token")
        key: Option<String>,

        /// Value to set (if omitted, shows current value)
        value: Option<String>,
    },
}

/// One-shot search flags. Without --name or --tag the interactive menu starts.
#[derive(Args, Debug, Clone, Default)]
pub struct SearchArgs {
    /// Search by name keyword
    #[arg(long, conflicts_with = "tag")]
    pub name: Option<String>,

    /// Search by tag keyword
    #[arg(long)]
    pub tag: Option<String>,

    /// Ranking strategy
    #[arg(long, value_enum)]
    pub sort: Option<SortArg>,

    /// How many candidates to fetch before ranking
    #[arg(long)]
    pub limit: Option<usize>,

    /// How many ranked results to show
    #[arg(long)]
    pub top: Option<usize>,

    /// Only show models with downloadable weights (gguf/safetensors/bin)
    #[arg(long)]
    pub require_weights: bool,

    /// Only show models that ship GGUF files
    #[arg(long)]
    pub gguf_only: bool,

    /// Maximum size in billions of parameters (e.g. 7 for 7B)
    #[arg(long)]
    pub max_b: Option<f64>,

    /// Stop fetching metrics after this many seconds and rank what was gathered
    #[arg(long)]
    pub deadline: Option<u64>,

    /// Print results as JSON instead of the interactive list
    #[arg(long)]
    pub json: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortArg {
    /// Weighted blend of downloads, likes, recency and boosts
    Composite,
    /// Raw download count
    Downloads,
    /// Raw like count
    Likes,
}

impl From<SortArg> for SortMode {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Composite => SortMode::Composite,
            SortArg::Downloads => SortMode::Downloads,
            SortArg::Likes => SortMode::Likes,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose);

    match cli.command {
        Some(Commands::Config { key, value }) => {
            commands::config::execute(key.as_deref(), value.as_deref()).await?;
        }
        None => {
            if cli.search.name.is_some() || cli.search.tag.is_some() {
                commands::search::execute(&cli.search).await?;
            } else {
                commands::menu::execute(&cli.search).await?;
            }
        }
    }

    Ok(())
}
