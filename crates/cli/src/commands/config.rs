use std::env;
use std::fs;
use std::path::Path;

use cartwise_core::config::{detect_config_path, AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

struct ConfigLine {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

impl ConfigLine {
    fn new(key: &'static str, value: impl Into<String>, env_keys: &'static [&'static str]) -> Self {
        Self { key, value: value.into(), env_keys }
    }
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for line in effective_lines(&config) {
        let source =
            field_source(line.key, line.env_keys, config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(render_line(line.key, &line.value, source));
    }

    lines.join("\n")
}

fn effective_lines(config: &AppConfig) -> Vec<ConfigLine> {
    let api_key = config
        .llm
        .api_key
        .as_ref()
        .map(|key| redact_token(key.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());

    vec![
        ConfigLine::new("database.url", &config.database.url, &["CARTWISE_DATABASE_URL"]),
        ConfigLine::new(
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["CARTWISE_DATABASE_MAX_CONNECTIONS"],
        ),
        ConfigLine::new(
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["CARTWISE_DATABASE_TIMEOUT_SECS"],
        ),
        ConfigLine::new("llm.provider", format!("{:?}", config.llm.provider), &["CARTWISE_LLM_PROVIDER"]),
        ConfigLine::new("llm.model", &config.llm.model, &["CARTWISE_LLM_MODEL"]),
        ConfigLine::new("llm.base_url", config.llm.effective_base_url(), &["CARTWISE_LLM_BASE_URL"]),
        ConfigLine::new("llm.api_key", api_key, &["CARTWISE_LLM_API_KEY"]),
        ConfigLine::new(
            "llm.timeout_secs",
            config.llm.timeout_secs.to_string(),
            &["CARTWISE_LLM_TIMEOUT_SECS"],
        ),
        ConfigLine::new(
            "router.classifier",
            format!("{:?}", config.router.classifier),
            &["CARTWISE_ROUTER_CLASSIFIER"],
        ),
        ConfigLine::new(
            "embedding.provider",
            format!("{:?}", config.embedding.provider),
            &["CARTWISE_EMBEDDING_PROVIDER"],
        ),
        ConfigLine::new("embedding.model", &config.embedding.model, &["CARTWISE_EMBEDDING_MODEL"]),
        ConfigLine::new(
            "embedding.cache_dir",
            config.embedding.cache_dir.display().to_string(),
            &["CARTWISE_EMBEDDING_CACHE_DIR"],
        ),
        ConfigLine::new(
            "embedding.dimensions",
            config.embedding.dimensions.to_string(),
            &["CARTWISE_EMBEDDING_DIMENSIONS"],
        ),
        ConfigLine::new("index.backend", format!("{:?}", config.index.backend), &["CARTWISE_INDEX_BACKEND"]),
        ConfigLine::new(
            "index.url",
            config.index.url.as_deref().unwrap_or("<unset>"),
            &["CARTWISE_INDEX_URL"],
        ),
        ConfigLine::new("index.collection", &config.index.collection, &["CARTWISE_INDEX_COLLECTION"]),
        ConfigLine::new(
            "search.result_limit",
            config.search.result_limit.to_string(),
            &["CARTWISE_SEARCH_RESULT_LIMIT"],
        ),
        ConfigLine::new(
            "search.candidate_pool",
            config.search.candidate_pool.to_string(),
            &["CARTWISE_SEARCH_CANDIDATE_POOL"],
        ),
        ConfigLine::new(
            "search.currency_symbol",
            &config.search.currency_symbol,
            &["CARTWISE_SEARCH_CURRENCY_SYMBOL"],
        ),
        ConfigLine::new(
            "search.currency_code",
            &config.search.currency_code,
            &["CARTWISE_SEARCH_CURRENCY_CODE"],
        ),
        ConfigLine::new(
            "server.bind_address",
            &config.server.bind_address,
            &["CARTWISE_SERVER_BIND_ADDRESS"],
        ),
        ConfigLine::new("server.port", config.server.port.to_string(), &["CARTWISE_SERVER_PORT"]),
        ConfigLine::new(
            "logging.level",
            &config.logging.level,
            &["CARTWISE_LOGGING_LEVEL", "CARTWISE_LOG_LEVEL"],
        ),
        ConfigLine::new(
            "logging.format",
            format!("{:?}", config.logging.format),
            &["CARTWISE_LOGGING_FORMAT", "CARTWISE_LOG_FORMAT"],
        ),
    ]
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}

#[cfg(test)]
mod tests {
    use super::{contains_path, field_source, redact_token};

    #[test]
    fn redaction_keeps_only_key_prefix() {
        assert_eq!(redact_token("sk-live-abcdef"), "sk-***");
        assert_eq!(redact_token("gsk_plainsecret"), "<redacted>");
        assert_eq!(redact_token("   "), "<empty>");
    }

    #[test]
    fn nested_paths_resolve_in_toml_documents() {
        let doc: toml::Value = "[search]\nresult_limit = 3\n".parse().expect("toml");
        assert!(contains_path(&doc, "search.result_limit"));
        assert!(!contains_path(&doc, "search.candidate_pool"));
        assert_eq!(
            field_source("search.result_limit", &["CARTWISE_TEST_UNSET_KEY"], Some(&doc), None),
            "file (config file)"
        );
        assert_eq!(field_source("index.url", &[], Some(&doc), None), "default");
    }
}
