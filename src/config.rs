use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Default number of characters submitted to the generation service per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 2000;
/// Default model used when `GENERATION_MODEL` is not set.
pub const DEFAULT_GENERATION_MODEL: &str = "gemini-1.5-flash";
/// Default HTTP port, matching the browser front-end.
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the Plainly server and CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Text-generation backend used for summaries and answers.
    pub generation_provider: GenerationProvider,
    /// Model identifier passed to the generation provider.
    pub generation_model: String,
    /// API key for the hosted Gemini API.
    pub gemini_api_key: Option<String>,
    /// Optional override of the Gemini API base URL.
    pub gemini_url: Option<String>,
    /// Optional override of the Ollama runtime URL.
    pub ollama_url: Option<String>,
    /// Upper bound on a single generation call, in seconds.
    pub generation_timeout_secs: u64,
    /// Number of retries for transient generation failures.
    pub generation_max_retries: u32,
    /// Characters per chunk submitted for summarization.
    pub chunk_size: usize,
    /// Maximum number of chunk summaries in flight at once.
    pub summary_concurrency: usize,
    /// Tesseract language pack used by the OCR fallback.
    pub ocr_language: String,
    /// Path or name of the `tesseract` binary.
    pub tesseract_bin: String,
    /// Path or name of the `pdftoppm` binary.
    pub pdftoppm_bin: String,
    /// Maximum number of documents kept in memory.
    pub document_store_capacity: usize,
    /// Maximum accepted upload size in bytes.
    pub upload_max_bytes: usize,
    /// HTTP server port.
    pub server_port: u16,
}

/// Supported text-generation backends.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProvider {
    /// Hosted Google Gemini API.
    Gemini,
    /// Local Ollama runtime.
    Ollama,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generation_provider: GenerationProvider::Gemini,
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            gemini_api_key: None,
            gemini_url: None,
            ollama_url: None,
            generation_timeout_secs: 60,
            generation_max_retries: 2,
            chunk_size: DEFAULT_CHUNK_SIZE,
            summary_concurrency: 1,
            ocr_language: "eng".to_string(),
            tesseract_bin: "tesseract".to_string(),
            pdftoppm_bin: "pdftoppm".to_string(),
            document_store_capacity: 32,
            upload_max_bytes: 20 * 1024 * 1024,
            server_port: DEFAULT_SERVER_PORT,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    ///
    /// Unset variables keep the values from [`Config::default`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let generation_provider = match load_env_optional("GENERATION_PROVIDER") {
            Some(value) => value
                .parse()
                .map_err(|()| ConfigError::InvalidValue("GENERATION_PROVIDER".to_string()))?,
            None => defaults.generation_provider,
        };
        let chunk_size = parse_optional("CHUNK_SIZE")?.unwrap_or(defaults.chunk_size);
        if chunk_size == 0 {
            return Err(ConfigError::InvalidValue("CHUNK_SIZE".to_string()));
        }

        Ok(Self {
            generation_provider,
            generation_model: load_env_optional("GENERATION_MODEL")
                .unwrap_or(defaults.generation_model),
            gemini_api_key: load_env_optional("GEMINI_API_KEY"),
            gemini_url: load_env_optional("GEMINI_URL"),
            ollama_url: load_env_optional("OLLAMA_URL"),
            generation_timeout_secs: parse_optional("GENERATION_TIMEOUT_SECS")?
                .unwrap_or(defaults.generation_timeout_secs),
            generation_max_retries: parse_optional("GENERATION_MAX_RETRIES")?
                .unwrap_or(defaults.generation_max_retries),
            chunk_size,
            summary_concurrency: parse_optional::<usize>("SUMMARY_CONCURRENCY")?
                .unwrap_or(defaults.summary_concurrency)
                .max(1),
            ocr_language: load_env_optional("OCR_LANGUAGE").unwrap_or(defaults.ocr_language),
            tesseract_bin: load_env_optional("TESSERACT_BIN").unwrap_or(defaults.tesseract_bin),
            pdftoppm_bin: load_env_optional("PDFTOPPM_BIN").unwrap_or(defaults.pdftoppm_bin),
            document_store_capacity: parse_optional::<usize>("DOCUMENT_STORE_CAPACITY")?
                .unwrap_or(defaults.document_store_capacity)
                .max(1),
            upload_max_bytes: parse_optional("UPLOAD_MAX_BYTES")?
                .unwrap_or(defaults.upload_max_bytes),
            server_port: parse_optional("SERVER_PORT")?.unwrap_or(defaults.server_port),
        })
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

impl std::str::FromStr for GenerationProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        provider = ?config.generation_provider,
        model = %config.generation_model,
        chunk_size = config.chunk_size,
        summary_concurrency = config.summary_concurrency,
        server_port = config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
