use anyhow::{Context, Result};
use hfscout_core::{
    Config, HuggingFaceCatalog, ModelSearch, RankFilters, ScoredResult, SearchOptions, SearchQuery,
    SortMode,
};
use indicatif::{ProgressBar, ProgressStyle};

use super::menu;
use crate::display;
use crate::SearchArgs;

/// A configured catalog plus the options every query in this run uses.
pub struct Session {
    search: ModelSearch<HuggingFaceCatalog>,
    options: SearchOptions,
}

impl Session {
    pub fn new(args: &SearchArgs) -> Result<Self> {
        let mut config = Config::load().context("Failed to load config")?;
        if args.deadline.is_some() {
            config.search.deadline_secs = args.deadline;
        }

        let catalog =
            HuggingFaceCatalog::new(&config.hub).context("Failed to create HuggingFace client")?;

        Ok(Self {
            options: search_options(args, &config),
            search: ModelSearch::from_config(catalog, &config),
        })
    }

    /// Search, resolve metrics and rank, with a progress spinner on stderr.
    pub async fn query(&self, query: &SearchQuery) -> Result<Vec<ScoredResult>> {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} models checked {wide_msg}")?,
        );

        let outcome = self
            .search
            .run(query, &self.options, |record| {
                pb.inc(1);
                pb.set_message(record.id.clone());
            })
            .await;
        pb.finish_and_clear();

        let outcome = outcome.context("Failed to search HuggingFace")?;
        Ok(outcome.results)
    }
}

/// Config defaults, overridden by whatever flags were given.
fn search_options(args: &SearchArgs, config: &Config) -> SearchOptions {
    let defaults = SearchOptions::from_config(config);
    SearchOptions {
        fetch_limit: args.limit.unwrap_or(defaults.fetch_limit),
        top_n: args.top.unwrap_or(defaults.top_n),
        sort_mode: args.sort.map(SortMode::from).unwrap_or(defaults.sort_mode),
        filters: RankFilters {
            require_weights: args.require_weights,
            gguf_only: args.gguf_only,
            max_b: args.max_b,
        },
    }
}

pub async fn execute(args: &SearchArgs) -> Result<()> {
    let query = match (&args.name, &args.tag) {
        (Some(name), _) => SearchQuery::Name(name.clone()),
        (None, Some(tag)) => SearchQuery::Tag(tag.clone()),
        (None, None) => anyhow::bail!("Either --name or --tag is required"),
    };

    let session = Session::new(args)?;
    if !args.json {
        println!("Searching for {}...", query);
    }
    let results = session.query(&query).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    display::print_results(&results);
    menu::browse_results(&results)
}
