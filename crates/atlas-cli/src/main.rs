//! Atlas CLI - Command-line interface for the capital-city flashcard pipeline

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{build, catalog, codes, ids};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "atlas")]
#[command(about = "Localized capital-city flashcard decks with maps, flags and narration", long_about = None)]
#[command(version)]
struct Cli {
    /// Log progress at info level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log everything at debug level
    #[arg(long, global = true)]
    debug: bool,

    /// Read configuration from this file instead of the layered lookup
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate assets and decks for every configured language
    Build {
        /// Comma-separated language codes (e.g., "nl,en,fr")
        #[arg(long)]
        languages: Option<String>,

        /// Output root directory
        #[arg(long)]
        output: Option<String>,

        /// Path to the geographic dataset: a GeoJSON export of Natural Earth
        /// admin-0 countries (convert the .shp with `ogr2ogr -f GeoJSON`)
        #[arg(long)]
        dataset: Option<String>,

        /// Path to a country/capital catalog (TOML)
        #[arg(long)]
        catalog: Option<String>,

        /// Use the mock providers, no network access
        #[arg(long)]
        offline: bool,

        /// Bundle format (anki or json)
        #[arg(long)]
        package: Option<String>,

        /// Skip the pause between languages
        #[arg(long)]
        no_pause: bool,
    },

    /// Show deck and model identifiers per language
    Ids {
        /// Comma-separated language codes (defaults to the configured list)
        #[arg(long)]
        languages: Option<String>,
    },

    /// Show the flag code resolved for each catalog entry
    Codes {
        /// Path to a country/capital catalog (TOML)
        #[arg(long)]
        catalog: Option<String>,
    },

    /// List catalog entries
    Catalog {
        /// Path to a country/capital catalog (TOML)
        #[arg(long)]
        catalog: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter_layer = if cli.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::new("info")
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Build {
            languages,
            output,
            dataset,
            catalog,
            offline,
            package,
            no_pause,
        } => build::run(
            config,
            build::BuildOverrides {
                languages,
                output,
                dataset,
                catalog,
                offline,
                package,
                no_pause,
            },
        ),
        Commands::Ids { languages } => ids::run(config, languages.as_deref()),
        Commands::Codes { catalog } => codes::run(config, catalog.as_deref()),
        Commands::Catalog { catalog, format } => {
            catalog::run(config, catalog.as_deref(), &format)
        }
    }
}
