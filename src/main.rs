//! gameloc CLI entry point

use clap::{Parser, Subcommand};
use gameloc::commands::{
    cmd_ingest, cmd_ingest_seed_git, cmd_translate, connect_stores, install_shutdown_handler,
    ExportFormat,
};
use gameloc::config::Config;
use gameloc::error::Result;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "gameloc")]
#[command(version, about = "GraphRAG localization pipeline for wuxia MMORPG game scripts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse game files, generate embeddings, and build the knowledge graph
    Ingest {
        /// Directory of game files to index
        directory: PathBuf,
    },

    /// Translate game files through the GraphRAG pipeline
    Translate {
        /// Directory of source game files
        input_dir: PathBuf,

        /// Directory the translated tree is written under
        output_dir: PathBuf,
    },

    /// Extract a translation seed corpus from a Git diff and ingest it
    #[command(name = "ingest-seed-git")]
    IngestSeedGit {
        /// Base revision (the untranslated side)
        commit_base: String,

        /// Target revision (the translated side)
        commit_target: String,

        /// Folder to restrict the diff to
        folder: String,

        /// Export format for the seed corpus
        #[arg(long, value_enum, default_value_t = ExportFormat::Tsv)]
        export: ExportFormat,

        /// Output path for the seed corpus (without extension)
        #[arg(long, default_value = "seed_corpus")]
        output: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let token = install_shutdown_handler()?;
    let (pg, graph) = connect_stores(&config).await?;

    match cli.command {
        Commands::Ingest { directory } => {
            cmd_ingest(&config, pg, graph, &token, &directory).await?;
        }

        Commands::Translate {
            input_dir,
            output_dir,
        } => {
            cmd_translate(&config, pg, graph, &token, &input_dir, &output_dir).await?;
        }

        Commands::IngestSeedGit {
            commit_base,
            commit_target,
            folder,
            export,
            output,
        } => {
            cmd_ingest_seed_git(
                &config,
                pg,
                graph,
                &token,
                &commit_base,
                &commit_target,
                &folder,
                export,
                &output,
            )
            .await?;
        }
    }

    Ok(())
}
