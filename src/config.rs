use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 30;
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 5;
pub const DEFAULT_REPORTS_DIR: &str = "reports";
pub const DEFAULT_SEARCH_DELAY_MS: u64 = 500;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; SEO-Agent/1.0)";

/// Configuration file structure.
/// All fields are optional to allow partial configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Language-model backend: ollama, openai or anthropic
    pub llm_provider: Option<String>,

    pub ollama_base_url: Option<String>,
    pub ollama_model: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_model: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: Option<String>,

    /// Per-request timeout in seconds
    pub request_timeout: Option<u64>,

    /// Upper bound for concurrent competitor page fetches
    pub max_concurrent_requests: Option<usize>,

    /// Directory HTML reports are written to
    pub reports_dir: Option<String>,

    /// Pause between search-engine queries in milliseconds
    pub search_delay_ms: Option<u64>,

    pub user_agent: Option<String>,
}

/// Configuration file format based on file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                "toml" => Some(ConfigFormat::Toml),
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                _ => None,
            })
    }

    /// Get file extensions for this format
    pub fn extensions(&self) -> &[&str] {
        match self {
            ConfigFormat::Json => &["json"],
            ConfigFormat::Toml => &["toml"],
            ConfigFormat::Yaml => &["yaml", "yml"],
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let format = ConfigFormat::from_path(path)
            .with_context(|| format!("Unsupported config file format: {}", path.display()))?;

        let config = match format {
            ConfigFormat::Json => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?,
            ConfigFormat::Toml => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?,
            ConfigFormat::Yaml => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
        };

        Ok(config)
    }

    /// Get the default configuration file paths to check (in order of priority)
    /// Returns paths in order: current directory, user config directory
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        for format in &[ConfigFormat::Json, ConfigFormat::Toml, ConfigFormat::Yaml] {
            for ext in format.extensions() {
                paths.push(PathBuf::from(format!("seo-agent.{}", ext)));
            }
        }

        // Use XDG_CONFIG_HOME if set, otherwise fall back to ~/.config
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")));

        if let Some(config_home) = config_home {
            let app_config_dir = config_home.join("seo-agent");
            for format in &[ConfigFormat::Json, ConfigFormat::Toml, ConfigFormat::Yaml] {
                for ext in format.extensions() {
                    paths.push(app_config_dir.join(format!("config.{}", ext)));
                }
            }
        }

        paths
    }

    /// Try to load configuration from default paths
    /// Returns the first configuration file found, or None if no config exists
    pub fn from_default_paths() -> Result<Option<Self>> {
        for path in Self::default_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading config file");
                return Ok(Some(Self::from_file(&path)?));
            }
        }
        Ok(None)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LlmProvider {
    #[default]
    Ollama,
    OpenAi,
    Anthropic,
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            "openai" => Ok(LlmProvider::OpenAi),
            "anthropic" => Ok(LlmProvider::Anthropic),
            other => Err(format!("unknown LLM provider '{}'", other)),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LlmProvider::Ollama => "ollama",
            LlmProvider::OpenAi => "openai",
            LlmProvider::Anthropic => "anthropic",
        })
    }
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub llm_provider: LlmProvider,
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub request_timeout: u64,
    pub max_concurrent_requests: usize,
    pub reports_dir: PathBuf,
    pub search_delay_ms: u64,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm_provider: LlmProvider::Ollama,
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            openai_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            anthropic_api_key: None,
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            reports_dir: PathBuf::from(DEFAULT_REPORTS_DIR),
            search_delay_ms: DEFAULT_SEARCH_DELAY_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

fn parse_or_keep<T: FromStr>(key: &str, raw: Option<String>, current: T) -> T
where
    T::Err: fmt::Display,
{
    match raw {
        Some(value) => match value.trim().parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(key = key, value = %value, error = %e, "Ignoring invalid setting");
                current
            }
        },
        None => current,
    }
}

impl Settings {
    /// Loads `.env`, the first config file found, and the process environment.
    pub fn load() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv()
            && !e.not_found()
        {
            tracing::warn!(error = %e, "Failed to load .env file");
        }

        let file = Config::from_default_paths()?;
        Ok(Self::resolve(file.as_ref(), |key| std::env::var(key).ok()))
    }

    /// Layers defaults, then the config file, then environment variables.
    ///
    /// Empty environment values count as unset. Values that fail to parse keep
    /// the previous layer's value.
    pub fn resolve(file: Option<&Config>, env: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        let mut settings = Settings::default();

        if let Some(file) = file {
            settings.apply_file(file);
        }

        settings.llm_provider = parse_or_keep("LLM_PROVIDER", lookup("LLM_PROVIDER"), settings.llm_provider);
        if let Some(v) = lookup("OLLAMA_BASE_URL") {
            settings.ollama_base_url = v;
        }
        if let Some(v) = lookup("OLLAMA_MODEL") {
            settings.ollama_model = v;
        }
        if let Some(v) = lookup("OPENAI_API_KEY") {
            settings.openai_api_key = Some(v);
        }
        if let Some(v) = lookup("OPENAI_MODEL") {
            settings.openai_model = v;
        }
        if let Some(v) = lookup("ANTHROPIC_API_KEY") {
            settings.anthropic_api_key = Some(v);
        }
        if let Some(v) = lookup("ANTHROPIC_MODEL") {
            settings.anthropic_model = v;
        }
        settings.request_timeout =
            parse_or_keep("REQUEST_TIMEOUT", lookup("REQUEST_TIMEOUT"), settings.request_timeout);
        settings.max_concurrent_requests = parse_or_keep(
            "MAX_CONCURRENT_REQUESTS",
            lookup("MAX_CONCURRENT_REQUESTS"),
            settings.max_concurrent_requests,
        );
        if let Some(v) = lookup("SEO_AGENT_REPORTS_DIR") {
            settings.reports_dir = PathBuf::from(v);
        }

        settings.max_concurrent_requests = settings.max_concurrent_requests.max(1);
        settings
    }

    fn apply_file(&mut self, file: &Config) {
        if let Some(provider) = &file.llm_provider {
            self.llm_provider = parse_or_keep("llm_provider", Some(provider.clone()), self.llm_provider);
        }
        if let Some(v) = &file.ollama_base_url {
            self.ollama_base_url = v.clone();
        }
        if let Some(v) = &file.ollama_model {
            self.ollama_model = v.clone();
        }
        if let Some(v) = &file.openai_api_key {
            self.openai_api_key = Some(v.clone());
        }
        if let Some(v) = &file.openai_model {
            self.openai_model = v.clone();
        }
        if let Some(v) = &file.anthropic_api_key {
            self.anthropic_api_key = Some(v.clone());
        }
        if let Some(v) = &file.anthropic_model {
            self.anthropic_model = v.clone();
        }
        self.request_timeout = file.request_timeout.unwrap_or(self.request_timeout);
        self.max_concurrent_requests = file
            .max_concurrent_requests
            .unwrap_or(self.max_concurrent_requests);
        if let Some(v) = &file.reports_dir {
            self.reports_dir = PathBuf::from(v);
        }
        self.search_delay_ms = file.search_delay_ms.unwrap_or(self.search_delay_ms);
        if let Some(v) = &file.user_agent {
            self.user_agent = v.clone();
        }
    }

    /// Name of the model the selected provider will use.
    pub fn model_name(&self) -> &str {
        match self.llm_provider {
            LlmProvider::Ollama => &self.ollama_model,
            LlmProvider::OpenAi => &self.openai_model,
            LlmProvider::Anthropic => &self.anthropic_model,
        }
    }
}
