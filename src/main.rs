//! Cubealyzer - Main Binary
//!
//! Mana curve analysis for Magic: The Gathering cubes

use anyhow::Context;
use clap::Parser;
use cubealyzer::{
    analysis::{CurveBuilder, TypeFilter},
    config::Config,
    core::{Castability, Taxonomy, Tier},
    loader::{CardCache, CatalogClient, CubeLoader},
    report,
};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cubealyzer")]
#[command(about = "Curve analysis tool for Magic: The Gathering cubes", long_about = None)]
struct Cli {
    /// The cube file (CSV, card name in the first column)
    #[arg(value_name = "CUBEFILE")]
    cubefile: PathBuf,

    /// Card type to calculate curves for ("permanent" = any nonland permanent)
    #[arg(short = 't', value_name = "TYPE", default_value = "creature")]
    card_type: String,

    /// Card subtype to calculate curves for
    #[arg(long, value_name = "SUBTYPE")]
    subtype: Option<String>,

    /// Calculate curves for colors
    #[arg(short = 'c')]
    colors: bool,

    /// Calculate curves for guilds
    #[arg(short = 'g')]
    guilds: bool,

    /// Calculate curves for shards
    #[arg(short = 's')]
    shards: bool,

    /// Calculate curves for wedges
    #[arg(short = 'w')]
    wedges: bool,

    /// Calculate curves for nephilim
    #[arg(short = 'n')]
    nephilim: bool,

    /// Print the castability regression tests
    #[arg(long)]
    test: bool,

    /// Generate debug messages
    #[arg(short = 'd', long, conflicts_with = "verbose")]
    debug: bool,

    /// Generate verbose (but not debug) messages
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Use only the card cache, never the remote catalog
    #[arg(long)]
    offline: bool,

    /// Card cache file (default: the cube file with a .json extension)
    #[arg(long, value_name = "PATH")]
    cache: Option<PathBuf>,
}

impl Cli {
    fn log_level(&self) -> Level {
        if self.debug {
            Level::DEBUG
        } else if self.verbose {
            Level::INFO
        } else {
            Level::WARN
        }
    }

    fn tiers(&self) -> Vec<Tier> {
        let selected = [
            self.colors,
            self.guilds,
            self.shards,
            self.wedges,
            self.nephilim,
        ];
        Tier::ALL
            .into_iter()
            .zip(selected)
            .filter_map(|(tier, on)| on.then_some(tier))
            .collect()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(cli.log_level().into()))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::new(cli.cubefile.clone(), cli.cache.clone(), cli.offline);
    let taxonomy = Taxonomy::standard().context("faction table is inconsistent")?;
    let castability = Castability::new(taxonomy);

    let cube = CubeLoader::load_from_file(&config.cube_path)
        .with_context(|| format!("failed to load cube {}", config.cube_path.display()))?;
    let mut cards = CardCache::open(&config.cache_path)
        .with_context(|| format!("failed to open card cache {}", config.cache_path.display()))?;

    if config.offline {
        tracing::info!("offline, using cached cards only");
    } else {
        let client = CatalogClient::new(config.catalog.clone())?;
        let summary = client.populate(&mut cards, cube.names()).await;
        tracing::info!(
            fetched = summary.fetched,
            missing = summary.missing.len(),
            failed = summary.failed.len(),
            "catalog fetch finished"
        );
        if summary.fetched > 0 {
            cards.save().context("failed to save card cache")?;
        }
    }

    let builder = CurveBuilder::new(&cube, &cards, &castability);
    for name in builder.missing_cards() {
        tracing::warn!(card = name, "no card data, ignoring");
    }

    if cli.test {
        print!("{}", castability.render_regression_fixture());
    }

    let card_type = TypeFilter::parse(&cli.card_type);
    let subtype = cli.subtype.as_deref();
    for tier in cli.tiers() {
        let names = castability.taxonomy().factions(tier);
        print!("{}", report::card_counts(&builder, &names)?);
        print!("{}", report::type_counts(&builder, tier, &names, &card_type)?);
        let table = builder.faction_table(tier, &card_type, subtype);
        print!("{}", report::curve_table(&table, &card_type));
    }

    tracing::debug!(
        hits = castability.cache_hits(),
        misses = castability.cache_misses(),
        costs = castability.cache_len(),
        "castability cache"
    );

    Ok(())
}
