// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub corpus: CorpusConfig,

    #[serde(default)]
    pub sessions: SessionsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Directory relative corpus paths are resolved against. Set on load.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed to make credentialed requests. Empty = permissive.
    pub allowed_origins: Vec<String>,
    pub cookie_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
            allowed_origins: vec![
                "http://localhost:3000".into(),
                "http://127.0.0.1:3000".into(),
            ],
            cookie_name: "bioastra_session".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Inline key, used only when the environment variable is unset.
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Issue one probe generation at startup and abort if it fails.
    pub health_check: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".into(),
            api_key_env: "GEMINI_API_KEY".into(),
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            timeout_seconds: 60,
            health_check: true,
        }
    }
}

impl GenerationConfig {
    /// Resolve the credential: environment first, then the inline key.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub research_dir: PathBuf,
    pub searches_dir: PathBuf,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            research_dir: PathBuf::from("RESEARCH_PAPER_DATA"),
            searches_dir: PathBuf::from("SEARCHES"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    pub max_history: usize,
    /// 0 disables idle eviction.
    pub idle_ttl_minutes: u64,
    pub sweep_interval_seconds: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            max_history: crate::chat::session::MAX_HISTORY,
            idle_ttl_minutes: 720,
            sweep_interval_seconds: 300,
        }
    }
}

impl SessionsConfig {
    /// Idle TTL as a signed duration, `None` when eviction is disabled.
    pub fn idle_ttl(&self) -> anyhow::Result<Option<chrono::Duration>> {
        if self.idle_ttl_minutes == 0 {
            return Ok(None);
        }
        let ttl = i64::try_from(self.idle_ttl_minutes)
            .ok()
            .and_then(chrono::Duration::try_minutes)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "[sessions].idle_ttl_minutes = {} is out of range",
                    self.idle_ttl_minutes
                )
            })?;
        Ok(Some(ttl))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Config {
    /// Load config from the default location, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        match paths::config_file_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    pub fn research_dir(&self) -> PathBuf {
        self.resolve(&self.corpus.research_dir)
    }

    pub fn searches_dir(&self) -> PathBuf {
        self.resolve(&self.corpus.searches_dir)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}
