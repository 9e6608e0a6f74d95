//! cinedex CLI
//!
//! Command-line interface for discovering TMDB movie documents and
//! enriching them with cast and watch-provider data.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

mod commands;
mod io;

#[derive(Parser)]
#[command(name = "cinedex")]
#[command(about = "Discover and enrich TMDB movie documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Common arguments for commands that talk to the TMDB API.
#[derive(Args, Clone)]
struct ConnectionArgs {
    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 5)]
    timeout: u64,
}

/// Which enrichment kinds to run.
#[derive(ValueEnum, Clone, Copy, PartialEq, Eq, Debug)]
enum EnrichKind {
    Cast,
    Providers,
}

#[derive(Subcommand)]
enum Commands {
    /// Download popular movie documents and the genre table
    Fetch {
        /// Maximum number of pages to download (defaults to all)
        #[arg(short, long)]
        pages: Option<u32>,

        /// Output file for movie documents
        #[arg(short, long, default_value = "movies.json")]
        output: PathBuf,

        /// Output file for the genre table
        #[arg(long, default_value = "genres.json")]
        genres_output: PathBuf,

        /// TMDB language tag for titles and genre names
        #[arg(long, default_value = "en-US")]
        language: String,

        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Enrich movie documents with cast and watch-provider data
    Enrich {
        /// Enrichment kinds to run, in order
        #[arg(short, long, value_delimiter = ',', default_values = ["cast", "providers"])]
        kinds: Vec<EnrichKind>,

        /// Input movie documents
        #[arg(short, long, default_value = "movies.json")]
        input: PathBuf,

        /// Genre table for genre-name attachment (skipped when absent)
        #[arg(long, default_value = "genres.json")]
        genres: PathBuf,

        /// Output file for enriched documents
        #[arg(short, long, default_value = "movies_enriched.json")]
        output: PathBuf,

        /// Worker pool width
        #[arg(short, long, default_value_t = 10)]
        threads: usize,

        /// Persist the cache after this many completed items
        #[arg(long, default_value_t = 50)]
        checkpoint_every: usize,

        /// Fetch attempts per movie before giving up on it
        #[arg(long, default_value_t = 1)]
        max_attempts: u32,

        /// Provider regions to keep
        #[arg(long, value_delimiter = ',', default_values = ["FR", "US"])]
        regions: Vec<String>,

        /// Directory for cache files (defaults to the platform cache dir)
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Maximum number of movies to process
        #[arg(short, long)]
        limit: Option<usize>,

        /// Write a failure report next to the output
        #[arg(long)]
        report: bool,

        /// Suppress the progress bar
        #[arg(short, long)]
        quiet: bool,

        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Inspect or clear the enrichment caches
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Inspect or save TMDB credentials
    Credentials {
        #[command(subcommand)]
        action: CredentialsAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// List cache files and entry counts
    List {
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },
    /// Delete all cache files
    Clear {
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum CredentialsAction {
    /// Show where the API token comes from
    Show,
    /// Save an API token to the config file
    Set {
        /// TMDB v4 read access token
        token: String,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            pages,
            output,
            genres_output,
            language,
            connection,
        } => {
            commands::fetch::run_fetch(pages, output, genres_output, language, connection.timeout);
        }
        Commands::Enrich {
            kinds,
            input,
            genres,
            output,
            threads,
            checkpoint_every,
            max_attempts,
            regions,
            cache_dir,
            limit,
            report,
            quiet,
            connection,
        } => {
            commands::enrich::run_enrich(
                kinds,
                input,
                genres,
                output,
                threads,
                checkpoint_every,
                max_attempts,
                regions,
                cache_dir,
                limit,
                report,
                quiet,
                connection.timeout,
            );
        }
        Commands::Cache { action } => match action {
            CacheAction::List { cache_dir } => commands::cache::run_cache_list(cache_dir),
            CacheAction::Clear { cache_dir } => commands::cache::run_cache_clear(cache_dir),
        },
        Commands::Credentials { action } => match action {
            CredentialsAction::Show => commands::credentials::run_credentials_show(),
            CredentialsAction::Set { token } => commands::credentials::run_credentials_set(token),
        },
    }
}
