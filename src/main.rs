// src/main.rs — Bio-Astra entry point

use clap::Parser;
use std::sync::Arc;

use bioastra::api::{self, ApiState};
use bioastra::chat::session::spawn_idle_sweeper;
use bioastra::chat::{ChatOrchestrator, SessionStore};
use bioastra::cli::{check, Cli, Commands};
use bioastra::corpus::Corpus;
use bioastra::infra::config::Config;
use bioastra::infra::logger;
use bioastra::provider;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: failed to load config: {e}");
            std::process::exit(1);
        }
    };
    // Respects RUST_LOG when set.
    logger::init_logging(&config.logging.level);

    if let Err(e) = run(cli, config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Check => check::run_check(&config, cli.config.as_deref()).await,
        Commands::Serve => serve(config).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let corpus = Corpus::load(&config.research_dir(), &config.searches_dir())?;
    tracing::info!(
        papers = corpus.len(),
        search_types = ?corpus.search_types(),
        "Corpus loaded"
    );

    let generator = provider::from_config(&config.generation);
    if let Some(generator) = &generator {
        if config.generation.health_check {
            if let Err(e) = provider::health_check(generator.as_ref()).await {
                tracing::error!(model = generator.model(), "Generation health check failed: {e}");
                anyhow::bail!("generation provider unusable, refusing to start: {e}");
            }
        }
    }

    let store = Arc::new(SessionStore::new(config.sessions.max_history));
    let sweeper = match config.sessions.idle_ttl()? {
        Some(ttl) => Some(spawn_idle_sweeper(
            store.clone(),
            ttl,
            std::time::Duration::from_secs(config.sessions.sweep_interval_seconds.max(1)),
        )),
        None => {
            tracing::info!("Idle session eviction disabled");
            None
        }
    };

    let state = ApiState {
        corpus: Arc::new(corpus),
        chat: Arc::new(ChatOrchestrator::new(store, generator)),
        cookie_name: config.server.cookie_name.clone(),
    };

    let result = api::start_server(&config.server, state).await;
    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    result
}
