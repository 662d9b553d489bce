use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use reko_core::config::AppConfig;
use toml::Value;

pub fn run(config: &AppConfig) -> String {
    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let doc = config_file_doc.as_ref();
    let file = config_file_path.as_deref();

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "llm.provider",
        &format!("{:?}", config.llm.provider),
        field_source("llm.provider", "REKO_LLM_PROVIDER", doc, file),
    ));
    lines.push(render_line(
        "llm.model",
        &config.llm.model,
        field_source("llm.model", "REKO_LLM_MODEL", doc, file),
    ));
    lines.push(render_line(
        "llm.base_url",
        config.llm.base_url.as_deref().unwrap_or("<unset>"),
        field_source("llm.base_url", "REKO_LLM_BASE_URL", doc, file),
    ));
    let api_key = if config.llm.api_key.is_some() { "<redacted>" } else { "<unset>" };
    lines.push(render_line(
        "llm.api_key",
        api_key,
        field_source("llm.api_key", "REKO_LLM_API_KEY", doc, file),
    ));
    lines.push(render_line(
        "llm.timeout_secs",
        &config.llm.timeout_secs.to_string(),
        field_source("llm.timeout_secs", "REKO_LLM_TIMEOUT_SECS", doc, file),
    ));

    lines.push(render_line(
        "fusion.strategy_timeout_ms",
        &config.fusion.strategy_timeout_ms.to_string(),
        field_source("fusion.strategy_timeout_ms", "REKO_FUSION_STRATEGY_TIMEOUT_MS", doc, file),
    ));
    lines.push(render_line(
        "fusion.default_limit",
        &config.fusion.default_limit.to_string(),
        field_source("fusion.default_limit", "REKO_FUSION_DEFAULT_LIMIT", doc, file),
    ));
    lines.push(render_line(
        "fusion.max_limit",
        &config.fusion.max_limit.to_string(),
        field_source("fusion.max_limit", "REKO_FUSION_MAX_LIMIT", doc, file),
    ));
    lines.push(render_line(
        "fusion.diversify_after_merge",
        &config.fusion.diversify_after_merge.to_string(),
        field_source(
            "fusion.diversify_after_merge",
            "REKO_FUSION_DIVERSIFY_AFTER_MERGE",
            doc,
            file,
        ),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        field_source("logging.level", "REKO_LOGGING_LEVEL", doc, file),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        field_source("logging.format", "REKO_LOGGING_FORMAT", doc, file),
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("reko.toml"), PathBuf::from("config/reko.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if env::var_os(env_key).is_some() {
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
