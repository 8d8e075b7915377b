// src/cli/check.rs — Startup diagnostics

use std::path::Path;

use crate::corpus::Corpus;
use crate::infra::config::Config;
use crate::infra::paths;
use crate::provider;

/// Load everything `serve` would and print a summary. Fails on the first
/// broken piece.
pub async fn run_check(config: &Config, config_path: Option<&Path>) -> anyhow::Result<()> {
    println!("bioastra v{}", env!("CARGO_PKG_VERSION"));
    println!();

    match config_path
        .map(Path::to_path_buf)
        .or_else(paths::config_file_path)
    {
        Some(path) if path.exists() => println!("  Config:     {} (loaded)", path.display()),
        _ => println!("  Config:     (using defaults)"),
    }

    let research_dir = config.research_dir();
    let searches_dir = config.searches_dir();
    let corpus = Corpus::load(&research_dir, &searches_dir)?;
    println!(
        "  Papers:     {} from {}",
        corpus.len(),
        research_dir.display()
    );
    let search_types = corpus.search_types();
    if search_types.is_empty() {
        println!("  Searches:   (none) in {}", searches_dir.display());
    } else {
        println!("  Searches:   {}", search_types.join(", "));
    }
    println!("  Categories: {}", corpus.categories().len());

    match provider::from_config(&config.generation) {
        Some(generator) => {
            provider::health_check(generator.as_ref()).await?;
            println!("  Generator:  {}/{} (ok)", generator.id(), generator.model());
        }
        None => {
            println!(
                "  Generator:  not configured (set ${})",
                config.generation.api_key_env
            );
            anyhow::bail!("no generation credential available");
        }
    }

    println!();
    println!("All checks passed.");
    Ok(())
}
