use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use storefront_core::config::AppConfig;
use toml::Value;

use crate::commands::{load_config, CommandResult};

const REDACTED: &str = "<redacted>";
const UNSET: &str = "<unset>";

/// One reported setting: dotted key, rendered value and the env keys that
/// can override it, in precedence order.
struct Setting {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

pub fn run() -> CommandResult {
    let config = match load_config("config") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for setting in settings(&config) {
        let source = field_source(
            setting.key,
            setting.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(format!("- {} = {} (source: {source})", setting.key, setting.value));
    }

    CommandResult::success("config", lines.join("\n"))
}

fn settings(config: &AppConfig) -> Vec<Setting> {
    vec![
        setting("database.url", config.database.url.clone(), &["STOREFRONT_DATABASE_URL"]),
        setting(
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["STOREFRONT_DATABASE_MAX_CONNECTIONS"],
        ),
        setting(
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["STOREFRONT_DATABASE_TIMEOUT_SECS"],
        ),
        setting(
            "llm.api_key",
            if config.llm.has_credential() { REDACTED } else { UNSET }.to_string(),
            &["STOREFRONT_LLM_API_KEY", "LOVABLE_API_KEY", "LLM_API_KEY"],
        ),
        setting("llm.base_url", config.llm.base_url.clone(), &["STOREFRONT_LLM_BASE_URL"]),
        setting("llm.model", config.llm.model.clone(), &["STOREFRONT_LLM_MODEL"]),
        setting(
            "llm.timeout_secs",
            config.llm.timeout_secs.to_string(),
            &["STOREFRONT_LLM_TIMEOUT_SECS"],
        ),
        setting(
            "llm.temperature",
            config.llm.temperature.to_string(),
            &["STOREFRONT_LLM_TEMPERATURE"],
        ),
        setting("llm.max_tokens", config.llm.max_tokens.to_string(), &["STOREFRONT_LLM_MAX_TOKENS"]),
        setting(
            "server.bind_address",
            config.server.bind_address.clone(),
            &["STOREFRONT_SERVER_BIND_ADDRESS"],
        ),
        setting("server.port", config.server.port.to_string(), &["STOREFRONT_SERVER_PORT"]),
        setting(
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["STOREFRONT_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        setting("selection.top_n", config.selection.top_n.to_string(), &["STOREFRONT_SELECTION_TOP_N"]),
        setting("selection.default_growth", config.selection.default_growth.to_string(), &[]),
        setting(
            "selection.default_competition",
            config.selection.default_competition.to_string(),
            &[],
        ),
        setting("selection.trends", format!("{} categories", config.selection.trends.len()), &[]),
        setting(
            "logging.level",
            config.logging.level.clone(),
            &["STOREFRONT_LOGGING_LEVEL", "STOREFRONT_LOG_LEVEL"],
        ),
        setting(
            "logging.format",
            format!("{:?}", config.logging.format),
            &["STOREFRONT_LOGGING_FORMAT", "STOREFRONT_LOG_FORMAT"],
        ),
    ]
}

fn setting(key: &'static str, value: String, env_keys: &'static [&'static str]) -> Setting {
    Setting { key, value, env_keys }
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("storefront.toml"), PathBuf::from("config/storefront.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
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
