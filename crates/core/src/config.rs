use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub router: RouterConfig,
    pub embedding: EmbeddingConfig,
    pub index: IndexConfig,
    pub search: SearchConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct RouterConfig {
    pub classifier: ClassifierKind,
}

#[derive(Clone, Debug)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProviderKind,
    pub model: String,
    pub cache_dir: PathBuf,
    pub dimensions: usize,
}

#[derive(Clone, Debug)]
pub struct IndexConfig {
    pub backend: IndexBackend,
    pub url: Option<String>,
    pub collection: String,
}

#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub result_limit: usize,
    pub candidate_pool: usize,
    pub currency_symbol: String,
    pub currency_code: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Hosted backends speak the OpenAI chat-completions dialect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    OpenAi,
    Groq,
    Ollama,
}

impl LlmProvider {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::Ollama => "http://localhost:11434/v1",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAi | Self::Groq)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    Llm,
    Rules,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProviderKind {
    Fastembed,
    Hashing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexBackend {
    Memory,
    Qdrant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub llm_provider: Option<LlmProvider>,
    pub llm_model: Option<String>,
    pub llm_api_key: Option<String>,
    pub classifier: Option<ClassifierKind>,
    pub embedding_provider: Option<EmbeddingProviderKind>,
    pub index_backend: Option<IndexBackend>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://cartwise.db?mode=rwc".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            llm: LlmConfig {
                provider: LlmProvider::Ollama,
                api_key: None,
                base_url: None,
                model: "llama3.1".to_string(),
                timeout_secs: 30,
            },
            router: RouterConfig { classifier: ClassifierKind::Llm },
            embedding: EmbeddingConfig {
                provider: EmbeddingProviderKind::Fastembed,
                model: "bge-small-en-v1.5".to_string(),
                cache_dir: PathBuf::from(".cartwise"),
                dimensions: 384,
            },
            index: IndexConfig {
                backend: IndexBackend::Memory,
                url: None,
                collection: "ecommerce_products".to_string(),
            },
            search: SearchConfig {
                result_limit: 5,
                candidate_pool: 20,
                currency_symbol: "\u{20b9}".to_string(),
                currency_code: "INR".to_string(),
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl LlmConfig {
    pub fn effective_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or_else(|| self.provider.default_base_url())
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" | "open_ai" => Ok(Self::OpenAi),
            "groq" => Ok(Self::Groq),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::Validation(format!(
                "unsupported llm provider `{other}` (expected openai|groq|ollama)"
            ))),
        }
    }
}

impl std::str::FromStr for ClassifierKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "llm" => Ok(Self::Llm),
            "rules" => Ok(Self::Rules),
            other => Err(ConfigError::Validation(format!(
                "unsupported router classifier `{other}` (expected llm|rules)"
            ))),
        }
    }
}

impl std::str::FromStr for EmbeddingProviderKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fastembed" => Ok(Self::Fastembed),
            "hashing" => Ok(Self::Hashing),
            other => Err(ConfigError::Validation(format!(
                "unsupported embedding provider `{other}` (expected fastembed|hashing)"
            ))),
        }
    }
}

impl std::str::FromStr for IndexBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "qdrant" => Ok(Self::Qdrant),
            other => Err(ConfigError::Validation(format!(
                "unsupported index backend `{other}` (expected memory|qdrant)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("cartwise.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(provider) = llm.provider {
                self.llm.provider = provider;
            }
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = Some(base_url);
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
        }

        if let Some(router) = patch.router {
            if let Some(classifier) = router.classifier {
                self.router.classifier = classifier;
            }
        }

        if let Some(embedding) = patch.embedding {
            if let Some(provider) = embedding.provider {
                self.embedding.provider = provider;
            }
            if let Some(model) = embedding.model {
                self.embedding.model = model;
            }
            if let Some(cache_dir) = embedding.cache_dir {
                self.embedding.cache_dir = cache_dir;
            }
            if let Some(dimensions) = embedding.dimensions {
                self.embedding.dimensions = dimensions;
            }
        }

        if let Some(index) = patch.index {
            if let Some(backend) = index.backend {
                self.index.backend = backend;
            }
            if let Some(url) = index.url {
                self.index.url = Some(url);
            }
            if let Some(collection) = index.collection {
                self.index.collection = collection;
            }
        }

        if let Some(search) = patch.search {
            if let Some(result_limit) = search.result_limit {
                self.search.result_limit = result_limit;
            }
            if let Some(candidate_pool) = search.candidate_pool {
                self.search.candidate_pool = candidate_pool;
            }
            if let Some(currency_symbol) = search.currency_symbol {
                self.search.currency_symbol = currency_symbol;
            }
            if let Some(currency_code) = search.currency_code {
                self.search.currency_code = currency_code;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("CARTWISE_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("CARTWISE_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("CARTWISE_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("CARTWISE_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("CARTWISE_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("CARTWISE_LLM_PROVIDER") {
            self.llm.provider = value.parse()?;
        }
        if let Some(value) = read_env("CARTWISE_LLM_API_KEY") {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("CARTWISE_LLM_BASE_URL") {
            self.llm.base_url = Some(value);
        }
        if let Some(value) = read_env("CARTWISE_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("CARTWISE_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("CARTWISE_LLM_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("CARTWISE_ROUTER_CLASSIFIER") {
            self.router.classifier = value.parse()?;
        }

        if let Some(value) = read_env("CARTWISE_EMBEDDING_PROVIDER") {
            self.embedding.provider = value.parse()?;
        }
        if let Some(value) = read_env("CARTWISE_EMBEDDING_MODEL") {
            self.embedding.model = value;
        }
        if let Some(value) = read_env("CARTWISE_EMBEDDING_CACHE_DIR") {
            self.embedding.cache_dir = PathBuf::from(value);
        }
        if let Some(value) = read_env("CARTWISE_EMBEDDING_DIMENSIONS") {
            self.embedding.dimensions = parse_usize("CARTWISE_EMBEDDING_DIMENSIONS", &value)?;
        }

        if let Some(value) = read_env("CARTWISE_INDEX_BACKEND") {
            self.index.backend = value.parse()?;
        }
        if let Some(value) = read_env("CARTWISE_INDEX_URL") {
            self.index.url = Some(value);
        }
        if let Some(value) = read_env("CARTWISE_INDEX_COLLECTION") {
            self.index.collection = value;
        }

        if let Some(value) = read_env("CARTWISE_SEARCH_RESULT_LIMIT") {
            self.search.result_limit = parse_usize("CARTWISE_SEARCH_RESULT_LIMIT", &value)?;
        }
        if let Some(value) = read_env("CARTWISE_SEARCH_CANDIDATE_POOL") {
            self.search.candidate_pool = parse_usize("CARTWISE_SEARCH_CANDIDATE_POOL", &value)?;
        }
        if let Some(value) = read_env("CARTWISE_SEARCH_CURRENCY_SYMBOL") {
            self.search.currency_symbol = value;
        }
        if let Some(value) = read_env("CARTWISE_SEARCH_CURRENCY_CODE") {
            self.search.currency_code = value;
        }

        if let Some(value) = read_env("CARTWISE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("CARTWISE_SERVER_PORT") {
            self.server.port = parse_u16("CARTWISE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("CARTWISE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("CARTWISE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level =
            read_env("CARTWISE_LOGGING_LEVEL").or_else(|| read_env("CARTWISE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("CARTWISE_LOGGING_FORMAT").or_else(|| read_env("CARTWISE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(llm_provider) = overrides.llm_provider {
            self.llm.provider = llm_provider;
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = llm_model;
        }
        if let Some(llm_api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(llm_api_key));
        }
        if let Some(classifier) = overrides.classifier {
            self.router.classifier = classifier;
        }
        if let Some(embedding_provider) = overrides.embedding_provider {
            self.embedding.provider = embedding_provider;
        }
        if let Some(index_backend) = overrides.index_backend {
            self.index.backend = index_backend;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_llm(&self.llm, self.router.classifier)?;
        validate_embedding(&self.embedding)?;
        validate_index(&self.index)?;
        validate_search(&self.search)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("cartwise.toml"), PathBuf::from("config/cartwise.toml")]
        .into_iter()
        .find(|path| path.exists())
}

/// The config file that `load` would read, if any.
pub fn detect_config_path() -> Option<PathBuf> {
    resolve_config_path(None)
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_llm(llm: &LlmConfig, classifier: ClassifierKind) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }

    if let Some(base_url) = &llm.base_url {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "llm.base_url must start with http:// or https://".to_string(),
            ));
        }
    }

    // The key only matters when the router actually talks to the backend.
    if classifier == ClassifierKind::Llm && llm.provider.requires_api_key() {
        let missing = llm
            .api_key
            .as_ref()
            .map(|value| value.expose_secret().trim().is_empty())
            .unwrap_or(true);
        if missing {
            return Err(ConfigError::Validation(
                "llm.api_key is required for openai/groq providers".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_embedding(embedding: &EmbeddingConfig) -> Result<(), ConfigError> {
    if embedding.dimensions == 0 {
        return Err(ConfigError::Validation(
            "embedding.dimensions must be greater than zero".to_string(),
        ));
    }

    if embedding.provider == EmbeddingProviderKind::Fastembed && embedding.model.trim().is_empty()
    {
        return Err(ConfigError::Validation(
            "embedding.model is required for the fastembed provider".to_string(),
        ));
    }

    Ok(())
}

fn validate_index(index: &IndexConfig) -> Result<(), ConfigError> {
    if index.collection.trim().is_empty() {
        return Err(ConfigError::Validation("index.collection must not be empty".to_string()));
    }

    if index.backend == IndexBackend::Qdrant {
        let missing = index.url.as_ref().map(|value| value.trim().is_empty()).unwrap_or(true);
        if missing {
            return Err(ConfigError::Validation(
                "index.url is required for the qdrant backend".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_search(search: &SearchConfig) -> Result<(), ConfigError> {
    if search.result_limit == 0 {
        return Err(ConfigError::Validation(
            "search.result_limit must be greater than zero".to_string(),
        ));
    }

    if search.candidate_pool < search.result_limit {
        return Err(ConfigError::Validation(
            "search.candidate_pool must be at least search.result_limit".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    llm: Option<LlmPatch>,
    router: Option<RouterPatch>,
    embedding: Option<EmbeddingPatch>,
    index: Option<IndexPatch>,
    search: Option<SearchPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    provider: Option<LlmProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RouterPatch {
    classifier: Option<ClassifierKind>,
}

#[derive(Debug, Default, Deserialize)]
struct EmbeddingPatch {
    provider: Option<EmbeddingProviderKind>,
    model: Option<String>,
    cache_dir: Option<PathBuf>,
    dimensions: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct IndexPatch {
    backend: Option<IndexBackend>,
    url: Option<String>,
    collection: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchPatch {
    result_limit: Option<usize>,
    candidate_pool: Option<usize>,
    currency_symbol: Option<String>,
    currency_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
