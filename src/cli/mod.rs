// src/cli/mod.rs — CLI definition (clap derive)

pub mod check;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::infra::config::Config;

#[derive(Parser)]
#[command(
    name = "bioastra",
    about = "Space-biology paper search and paper-aware chat backend",
    version
)]
pub struct Cli {
    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Port to listen on (overrides [server].port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind (overrides [server].host)
    #[arg(long)]
    pub host: Option<String>,

    /// Directory relative corpus paths are resolved against
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP API (default)
    Serve,
    /// Validate config, corpus and provider, then exit
    Check,
}

impl Cli {
    /// Load the config this invocation points at, with flag overrides applied.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        self.apply_overrides(&mut config);
        config.sessions.idle_ttl()?;
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(dir) = &self.data_dir {
            config.base_dir = Some(dir.clone());
        }
    }
}
