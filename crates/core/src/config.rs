//! Configuration management for fastrag.
//!
//! Configuration is merged from several sources, later sources winning:
//! - Built-in defaults
//! - Config file (.fastrag/config.yaml, or `FASTRAG_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric; the vector store and optional
//! prompt overrides live under `.fastrag/`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers that can serve generation requests.
pub const GENERATION_PROVIDERS: &[&str] = &["ollama"];

/// Providers that can compute embeddings.
pub const EMBEDDING_PROVIDERS: &[&str] = &["ollama", "trigram"];

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .fastrag/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Corpus location: a directory of page files or a form-feed separated file
    pub corpus: Option<PathBuf>,

    /// Vector store file; defaults to `.fastrag/store.sqlite`
    pub store_path: Option<PathBuf>,

    /// Minimum chunk length in characters
    pub chunk_size: usize,

    /// Number of chunks retrieved per query
    pub top_k: usize,

    /// Generation service settings
    pub generation: GenerationSettings,

    /// Embedding service settings
    pub embedding: EmbeddingSettings,

    /// Prompt definition to load from `.fastrag/prompts/`; built-in when unset
    pub prompt_id: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Generation service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub provider: String,
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            endpoint: DEFAULT_OLLAMA_URL.to_string(),
            model: "llama2".to_string(),
            max_tokens: 128,
            temperature: 0.0,
            timeout_secs: 120,
        }
    }
}

/// Embedding service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    pub provider: String,
    pub endpoint: String,
    pub model: String,
    pub dimensions: usize,
    pub batch_size: usize,
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            endpoint: DEFAULT_OLLAMA_URL.to_string(),
            // Ollama's packaging of all-MiniLM-L6-v2
            model: "all-minilm".to_string(),
            dimensions: 384,
            batch_size: 32,
            timeout_secs: 30,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    corpus: Option<PathSection>,
    store: Option<PathSection>,
    chunking: Option<ChunkingSection>,
    retrieval: Option<RetrievalSection>,
    generation: Option<GenerationSection>,
    embedding: Option<EmbeddingSection>,
    prompt: Option<PromptSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PathSection {
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChunkingSection {
    size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RetrievalSection {
    #[serde(rename = "topK")]
    top_k: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GenerationSection {
    provider: Option<String>,
    endpoint: Option<String>,
    model: Option<String>,
    #[serde(rename = "maxTokens")]
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    #[serde(rename = "timeoutSecs")]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmbeddingSection {
    provider: Option<String>,
    endpoint: Option<String>,
    model: Option<String>,
    dimensions: Option<usize>,
    #[serde(rename = "batchSize")]
    batch_size: Option<usize>,
    #[serde(rename = "timeoutSecs")]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PromptSection {
    id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            corpus: None,
            store_path: None,
            chunk_size: 500,
            top_k: 3,
            generation: GenerationSettings::default(),
            embedding: EmbeddingSettings::default(),
            prompt_id: None,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, the config file and
    /// defaults.
    ///
    /// Environment variables:
    /// - `FASTRAG_WORKSPACE`: Override workspace path
    /// - `FASTRAG_CONFIG`: Path to config file
    /// - `FASTRAG_CORPUS`: Corpus path
    /// - `FASTRAG_MODEL`: Generation model
    /// - `FASTRAG_EMBEDDING_PROVIDER`: Embedding provider
    /// - `OLLAMA_URL`: Endpoint for both Ollama services
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output (any value)
    ///
    /// An explicit workspace or config file (from CLI flags) wins over the
    /// environment when locating the file.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        match workspace {
            Some(workspace) => config.workspace = workspace,
            None => {
                if let Ok(workspace) = std::env::var("FASTRAG_WORKSPACE") {
                    config.workspace = PathBuf::from(workspace);
                }
            }
        }

        match config_file {
            Some(config_file) => config.config_file = Some(config_file),
            None => {
                if let Ok(config_file) = std::env::var("FASTRAG_CONFIG") {
                    config.config_file = Some(PathBuf::from(config_file));
                }
            }
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.fastrag_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(corpus) = std::env::var("FASTRAG_CORPUS") {
            config.corpus = Some(PathBuf::from(corpus));
        }

        if let Ok(model) = std::env::var("FASTRAG_MODEL") {
            config.generation.model = model;
        }

        if let Ok(provider) = std::env::var("FASTRAG_EMBEDDING_PROVIDER") {
            config.embedding.provider = provider;
        }

        if let Ok(url) = std::env::var("OLLAMA_URL") {
            config.generation.endpoint = url.clone();
            config.embedding.endpoint = url;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    ///
    /// Relative paths in the file are resolved against the workspace.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = file.corpus.and_then(|c| c.path) {
            result.corpus = Some(result.resolve(path));
        }

        if let Some(path) = file.store.and_then(|s| s.path) {
            result.store_path = Some(result.resolve(path));
        }

        if let Some(size) = file.chunking.and_then(|c| c.size) {
            result.chunk_size = size;
        }

        if let Some(top_k) = file.retrieval.and_then(|r| r.top_k) {
            result.top_k = top_k;
        }

        if let Some(generation) = file.generation {
            let target = &mut result.generation;
            if let Some(provider) = generation.provider {
                target.provider = provider;
            }
            if let Some(endpoint) = generation.endpoint {
                target.endpoint = endpoint;
            }
            if let Some(model) = generation.model {
                target.model = model;
            }
            if let Some(max_tokens) = generation.max_tokens {
                target.max_tokens = max_tokens;
            }
            if let Some(temperature) = generation.temperature {
                target.temperature = temperature;
            }
            if let Some(timeout) = generation.timeout_secs {
                target.timeout_secs = timeout;
            }
        }

        if let Some(embedding) = file.embedding {
            let target = &mut result.embedding;
            if let Some(provider) = embedding.provider {
                target.provider = provider;
            }
            if let Some(endpoint) = embedding.endpoint {
                target.endpoint = endpoint;
            }
            if let Some(model) = embedding.model {
                target.model = model;
            }
            if let Some(dimensions) = embedding.dimensions {
                target.dimensions = dimensions;
            }
            if let Some(batch_size) = embedding.batch_size {
                target.batch_size = batch_size;
            }
            if let Some(timeout) = embedding.timeout_secs {
                target.timeout_secs = timeout;
            }
        }

        if let Some(id) = file.prompt.and_then(|p| p.id) {
            result.prompt_id = Some(id);
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        corpus: Option<PathBuf>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(corpus) = corpus {
            self.corpus = Some(corpus);
        }

        if let Some(model) = model {
            self.generation.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .fastrag directory.
    pub fn fastrag_dir(&self) -> PathBuf {
        self.workspace.join(".fastrag")
    }

    /// Ensure the .fastrag directory exists.
    pub fn ensure_fastrag_dir(&self) -> AppResult<()> {
        let dir = self.fastrag_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .fastrag directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Resolved vector store location.
    pub fn store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(|| self.fastrag_dir().join("store.sqlite"))
    }

    fn resolve(&self, path: PathBuf) -> PathBuf {
        if path.is_absolute() {
            path
        } else {
            self.workspace.join(path)
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_size == 0 {
            return Err(AppError::Config(
                "chunking.size must be greater than zero".to_string(),
            ));
        }

        if self.top_k == 0 {
            return Err(AppError::Config(
                "retrieval.topK must be at least 1".to_string(),
            ));
        }

        if !GENERATION_PROVIDERS.contains(&self.generation.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown generation provider: {}. Supported: {}",
                self.generation.provider,
                GENERATION_PROVIDERS.join(", ")
            )));
        }

        if !EMBEDDING_PROVIDERS.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(AppError::Config(format!(
                "generation.temperature must be within 0.0-2.0, got {}",
                self.generation.temperature
            )));
        }

        if self.embedding.dimensions == 0 || self.embedding.batch_size == 0 {
            return Err(AppError::Config(
                "embedding.dimensions and embedding.batchSize must be greater than zero"
                    .to_string(),
            ));
        }

        if self.generation.timeout_secs == 0 || self.embedding.timeout_secs == 0 {
            return Err(AppError::Config(
                "timeouts must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
