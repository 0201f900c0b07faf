use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language name (e.g. "english") or code
    pub source_language: String,

    /// Target language name (e.g. "japanese") or code
    pub target_language: String,

    /// Root directory for all translated output
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// Translation config
    pub translation: TranslationConfig,

    /// Chunking config
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation engine selector
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    // @engine: pdf2zh built-in translation service
    #[default]
    Default,
    // @engine: OpenAI chat models
    OpenAI,
    // @engine: Google Gemini
    Gemini,
    // @engine: Anthropic Claude
    Claude,
}

impl Engine {
    // @returns: Capitalized engine name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Default => "pdf2zh",
            Self::OpenAI => "OpenAI",
            Self::Gemini => "Gemini",
            Self::Claude => "Claude",
        }
    }

    // @returns: Lowercase engine identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Default => "default".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Gemini => "gemini".to_string(),
            Self::Claude => "claude".to_string(),
        }
    }

    // @returns: Whether calls through this engine consume a shared hosted quota
    pub fn is_api(&self) -> bool {
        !matches!(self, Self::Default)
    }

    // @returns: Environment variables consulted for the API key
    pub fn api_key_env_vars(&self) -> &'static [&'static str] {
        match self {
            Self::Default => &[],
            Self::OpenAI => &["OPENAI_API_KEY"],
            Self::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
            Self::Claude => &["ANTHROPIC_API_KEY"],
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for Engine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "openai" => Ok(Self::OpenAI),
            "gemini" => Ok(Self::Gemini),
            "claude" | "anthropic" => Ok(Self::Claude),
            _ => Err(anyhow!("Invalid engine type: {}", s)),
        }
    }
}

/// Engine configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    // @field: Engine type identifier
    #[serde(rename = "type")]
    pub engine_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds for HTTP calls
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl EngineConfig {
    // @param engine: Engine enum
    // @returns: Engine config with defaults
    pub fn new(engine: Engine) -> Self {
        Self {
            engine_type: engine.to_lowercase_string(),
            model: default_model(engine),
            api_key: String::new(),
            endpoint: default_endpoint(engine),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Engine to use
    #[serde(default)]
    pub engine: Engine,

    /// Configured engines
    #[serde(default)]
    pub available_engines: Vec<EngineConfig>,

    /// Settings shared by all engines
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all engines
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// System prompt template used by the connection preflight
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Fixed delay in milliseconds between chunk dispatches on API engines
    #[serde(default = "default_rate_limit_delay_ms")]
    pub rate_limit_delay_ms: u64,

    /// Command used to run PDFMathTranslate
    #[serde(default = "default_pdf2zh_command")]
    pub pdf2zh_command: String,

    /// Check that the engine answers before splitting the document
    #[serde(default = "default_true")]
    pub preflight: bool,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            rate_limit_delay_ms: default_rate_limit_delay_ms(),
            pdf2zh_command: default_pdf2zh_command(),
            preflight: true,
        }
    }
}

/// Settings that decide when and how documents are chunked
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Pages per chunk
    #[serde(default = "default_pages_per_chunk")]
    pub pages_per_chunk: usize,

    /// Documents with more pages than this are chunked automatically
    #[serde(default = "default_large_page_threshold")]
    pub large_page_threshold: usize,

    /// Documents larger than this many megabytes are chunked automatically
    #[serde(default = "default_large_size_threshold_mb")]
    pub large_size_threshold_mb: u64,

    /// Chunks translated at the same time (1 = strictly sequential)
    #[serde(default = "default_max_concurrent_chunks")]
    pub max_concurrent_chunks: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            pages_per_chunk: default_pages_per_chunk(),
            large_page_threshold: default_large_page_threshold(),
            large_size_threshold_mb: default_large_size_threshold_mb(),
            max_concurrent_chunks: default_max_concurrent_chunks(),
        }
    }
}

impl ChunkingConfig {
    /// Size threshold in bytes
    pub fn large_size_threshold_bytes(&self) -> u64 {
        self.large_size_threshold_mb.saturating_mul(1024 * 1024)
    }

    /// Whether a document of the given shape should go through the chunk pipeline
    pub fn is_large(&self, page_count: usize, file_size: u64) -> bool {
        page_count > self.large_page_threshold || file_size > self.large_size_threshold_bytes()
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_output_root() -> PathBuf {
    PathBuf::from("output")
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_rate_limit_delay_ms() -> u64 {
    500 // 500ms pause between API-backed chunk dispatches
}

fn default_pdf2zh_command() -> String {
    "pdf2zh".to_string()
}

fn default_pages_per_chunk() -> usize {
    20
}

fn default_large_page_threshold() -> usize {
    30
}

fn default_large_size_threshold_mb() -> u64 {
    10
}

fn default_max_concurrent_chunks() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_model(engine: Engine) -> String {
    match engine {
        Engine::Default => String::new(),
        Engine::OpenAI => "gpt-4o".to_string(),
        Engine::Gemini => "gemini-1.5-pro".to_string(),
        Engine::Claude => "claude-3-opus-20240229".to_string(),
    }
}

fn default_endpoint(engine: Engine) -> String {
    match engine {
        Engine::Default => String::new(),
        Engine::OpenAI => "https://api.openai.com/v1".to_string(),
        Engine::Gemini => "https://generativelanguage.googleapis.com".to_string(),
        Engine::Claude => "https://api.anthropic.com".to_string(),
    }
}

fn default_system_prompt() -> String {
    "You are a professional translator from {source_language} to {target_language}. Translate the following text accurately, preserving the original meaning, formatting, and any technical terminology. Only respond with the translated text, nothing else.".to_string()
}

impl Config {
    /// Load a configuration file, or write and return the defaults when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<(Self, bool)> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok((config, false));
        }

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;
        Ok((config, true))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.source_language.trim().is_empty() {
            return Err(anyhow!("Source language must not be empty"));
        }
        if self.target_language.trim().is_empty() {
            return Err(anyhow!("Target language must not be empty"));
        }
        if self.chunking.pages_per_chunk == 0 {
            return Err(anyhow!("pages_per_chunk must be a positive integer"));
        }
        if self.chunking.max_concurrent_chunks == 0 {
            return Err(anyhow!("max_concurrent_chunks must be at least 1"));
        }

        for engine_config in &self.translation.available_engines {
            if !engine_config.endpoint.is_empty() {
                url::Url::parse(&engine_config.endpoint).with_context(|| {
                    format!(
                        "Invalid endpoint for engine '{}': {}",
                        engine_config.engine_type, engine_config.endpoint
                    )
                })?;
            }
        }

        let engine = self.translation.engine;
        if engine.is_api() && self.translation.get_api_key().is_empty() {
            return Err(anyhow!(
                "API key is required for the {} engine (set it in the config or via {})",
                engine.display_name(),
                engine.api_key_env_vars().join(" / ")
            ));
        }

        Ok(())
    }

    /// Fill empty API keys from the engine's environment variables
    pub fn apply_env_api_keys(&mut self) {
        for engine in [Engine::OpenAI, Engine::Gemini, Engine::Claude] {
            let from_env = engine
                .api_key_env_vars()
                .iter()
                .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()));
            if let Some(key) = from_env {
                let engine_config = self.translation.get_or_insert_engine_config(engine);
                if engine_config.api_key.is_empty() {
                    engine_config.api_key = key;
                }
            }
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "english".to_string(),
            target_language: "japanese".to_string(),
            output_root: default_output_root(),
            translation: TranslationConfig::default(),
            chunking: ChunkingConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active engine configuration from the available_engines array
    pub fn get_active_engine_config(&self) -> Option<&EngineConfig> {
        self.get_engine_config(&self.engine)
    }

    /// Get a specific engine configuration by type
    pub fn get_engine_config(&self, engine: &Engine) -> Option<&EngineConfig> {
        let engine_str = engine.to_lowercase_string();
        self.available_engines.iter().find(|e| e.engine_type == engine_str)
    }

    /// Get a mutable engine configuration, adding a default entry if missing
    pub fn get_or_insert_engine_config(&mut self, engine: Engine) -> &mut EngineConfig {
        let engine_str = engine.to_lowercase_string();
        let position = match self.available_engines.iter().position(|e| e.engine_type == engine_str) {
            Some(position) => position,
            None => {
                self.available_engines.push(EngineConfig::new(engine));
                self.available_engines.len() - 1
            }
        };
        &mut self.available_engines[position]
    }

    /// Get the model for the active engine
    pub fn get_model(&self) -> String {
        if let Some(engine_config) = self.get_active_engine_config() {
            if !engine_config.model.is_empty() {
                return engine_config.model.clone();
            }
        }
        default_model(self.engine)
    }

    /// Get the API key for the active engine
    pub fn get_api_key(&self) -> String {
        self.get_active_engine_config()
            .map(|e| e.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active engine
    pub fn get_endpoint(&self) -> String {
        if let Some(engine_config) = self.get_active_engine_config() {
            if !engine_config.endpoint.is_empty() {
                return engine_config.endpoint.clone();
            }
        }
        default_endpoint(self.engine)
    }

    /// Get the HTTP timeout for the active engine
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_engine_config()
            .map(|e| e.timeout_secs)
            .filter(|t| *t > 0)
            .unwrap_or_else(default_timeout_secs)
    }

    /// Delay to interpose between chunk dispatches for the active engine
    pub fn dispatch_delay_ms(&self) -> u64 {
        if self.engine.is_api() {
            self.common.rate_limit_delay_ms
        } else {
            0
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            engine: Engine::default(),
            available_engines: vec![
                EngineConfig::new(Engine::Default),
                EngineConfig::new(Engine::OpenAI),
                EngineConfig::new(Engine::Gemini),
                EngineConfig::new(Engine::Claude),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
