//! Layered application configuration
//!
//! Precedence, lowest to highest: struct defaults, optional TOML file
//! (`reko.toml` or `config/reko.toml`), `REKO_*` environment variables,
//! programmatic overrides. Validation runs last and fails fast with an
//! actionable message.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fusion::{DEFAULT_LIMIT, MAX_LIMIT};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub fusion: FusionConfig,
    pub logging: LoggingConfig,
}

/// Text-generator client settings. The engine only sees the trait; these
/// feed whichever provider adapter the host wires in.
#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Clone, Debug)]
pub struct FusionConfig {
    /// Per-strategy retrieval timeout in milliseconds.
    pub strategy_timeout_ms: u64,
    pub default_limit: usize,
    pub max_limit: usize,
    /// Run the diversity selector on the fused list, not only on the
    /// semantic path.
    pub diversify_after_merge: bool,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    OpenAi,
    Anthropic,
    Ollama,
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
    pub llm_provider: Option<LlmProvider>,
    pub llm_model: Option<String>,
    pub log_level: Option<String>,
    pub diversify_after_merge: Option<bool>,
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
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig {
                provider: LlmProvider::Ollama,
                api_key: None,
                base_url: Some("http://localhost:11434".to_string()),
                model: "llama3.1".to_string(),
                timeout_secs: 15,
                max_retries: 2,
            },
            fusion: FusionConfig {
                strategy_timeout_ms: 2_000,
                default_limit: DEFAULT_LIMIT,
                max_limit: MAX_LIMIT,
                diversify_after_merge: true,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::Validation(format!(
                "unsupported llm provider `{other}` (expected openai|anthropic|ollama)"
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
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("reko.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(llm) = patch.llm {
            if let Some(provider) = llm.provider {
                self.llm.provider = provider;
            }
            if let Some(api_key_value) = llm.api_key {
                self.llm.api_key = Some(api_key_value.into());
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
            if let Some(max_retries) = llm.max_retries {
                self.llm.max_retries = max_retries;
            }
        }

        if let Some(fusion) = patch.fusion {
            if let Some(strategy_timeout_ms) = fusion.strategy_timeout_ms {
                self.fusion.strategy_timeout_ms = strategy_timeout_ms;
            }
            if let Some(default_limit) = fusion.default_limit {
                self.fusion.default_limit = default_limit;
            }
            if let Some(max_limit) = fusion.max_limit {
                self.fusion.max_limit = max_limit;
            }
            if let Some(diversify_after_merge) = fusion.diversify_after_merge {
                self.fusion.diversify_after_merge = diversify_after_merge;
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
        if let Some(value) = read_env("REKO_LLM_PROVIDER") {
            self.llm.provider = value.parse()?;
        }
        if let Some(value) = read_env("REKO_LLM_API_KEY") {
            self.llm.api_key = Some(value.into());
        }
        if let Some(value) = read_env("REKO_LLM_BASE_URL") {
            self.llm.base_url = Some(value);
        }
        if let Some(value) = read_env("REKO_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("REKO_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("REKO_LLM_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("REKO_LLM_MAX_RETRIES") {
            self.llm.max_retries = parse_u32("REKO_LLM_MAX_RETRIES", &value)?;
        }

        if let Some(value) = read_env("REKO_FUSION_STRATEGY_TIMEOUT_MS") {
            self.fusion.strategy_timeout_ms =
                parse_u64("REKO_FUSION_STRATEGY_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = read_env("REKO_FUSION_DEFAULT_LIMIT") {
            self.fusion.default_limit =
                parse_u64("REKO_FUSION_DEFAULT_LIMIT", &value)? as usize;
        }
        if let Some(value) = read_env("REKO_FUSION_MAX_LIMIT") {
            self.fusion.max_limit = parse_u64("REKO_FUSION_MAX_LIMIT", &value)? as usize;
        }
        if let Some(value) = read_env("REKO_FUSION_DIVERSIFY_AFTER_MERGE") {
            self.fusion.diversify_after_merge =
                parse_bool("REKO_FUSION_DIVERSIFY_AFTER_MERGE", &value)?;
        }

        let log_level = read_env("REKO_LOGGING_LEVEL").or_else(|| read_env("REKO_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = read_env("REKO_LOGGING_FORMAT").or_else(|| read_env("REKO_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(provider) = overrides.llm_provider {
            self.llm.provider = provider;
        }
        if let Some(model) = overrides.llm_model {
            self.llm.model = model;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(diversify) = overrides.diversify_after_merge {
            self.fusion.diversify_after_merge = diversify;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_llm(&self.llm)?;
        validate_fusion(&self.fusion)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("reko.toml"), PathBuf::from("config/reko.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    toml::from_str::<ConfigPatch>(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    match llm.provider {
        LlmProvider::OpenAi | LlmProvider::Anthropic => {
            let missing = llm
                .api_key
                .as_ref()
                .map(|value| value.expose_secret().trim().is_empty())
                .unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "llm.api_key is required for openai/anthropic providers".to_string(),
                ));
            }
        }
        LlmProvider::Ollama => {
            let missing =
                llm.base_url.as_ref().map(|value| value.trim().is_empty()).unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "llm.base_url is required for ollama provider".to_string(),
                ));
            }
        }
    }

    Ok(())
}

fn validate_fusion(fusion: &FusionConfig) -> Result<(), ConfigError> {
    if fusion.strategy_timeout_ms == 0 || fusion.strategy_timeout_ms > 60_000 {
        return Err(ConfigError::Validation(
            "fusion.strategy_timeout_ms must be in range 1..=60000".to_string(),
        ));
    }

    if fusion.max_limit == 0 || fusion.max_limit > MAX_LIMIT {
        return Err(ConfigError::Validation(format!(
            "fusion.max_limit must be in range 1..={MAX_LIMIT}"
        )));
    }

    if fusion.default_limit == 0 || fusion.default_limit > fusion.max_limit {
        return Err(ConfigError::Validation(
            "fusion.default_limit must be in range 1..=fusion.max_limit".to_string(),
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

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    llm: Option<LlmPatch>,
    fusion: Option<FusionPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    provider: Option<LlmProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct FusionPatch {
    strategy_timeout_ms: Option<u64>,
    default_limit: Option<usize>,
    max_limit: Option<usize>,
    diversify_after_merge: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LlmProvider, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    #[test]
    fn defaults_validate() {
        let _guard = env_lock().lock().unwrap();
        let config = AppConfig::load(LoadOptions::default()).unwrap();
        assert_eq!(config.llm.provider, LlmProvider::Ollama);
        assert_eq!(config.fusion.default_limit, 10);
        assert!(config.fusion.diversify_after_merge);
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn precedence_defaults_file_env_overrides() {
        let _guard = env_lock().lock().unwrap();

        env::set_var("REKO_LLM_MODEL", "qwen2.5");

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reko.toml");
        fs::write(
            &path,
            r#"
[llm]
model = "llama3.2"
timeout_secs = 30

[fusion]
strategy_timeout_ms = 750

[logging]
level = "warn"
"#,
        )
        .unwrap();

        let config = AppConfig::load(LoadOptions {
            config_path: Some(path),
            overrides: ConfigOverrides {
                log_level: Some("debug".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .unwrap();

        clear_vars(&["REKO_LLM_MODEL"]);

        // env beats file, override beats file.
        assert_eq!(config.llm.model, "qwen2.5");
        assert_eq!(config.llm.timeout_secs, 30);
        assert_eq!(config.fusion.strategy_timeout_ms, 750);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let _guard = env_lock().lock().unwrap();
        let result = AppConfig::load(LoadOptions {
            config_path: Some("definitely-missing-reko.toml".into()),
            require_file: true,
            ..LoadOptions::default()
        });
        assert!(matches!(result, Err(ConfigError::MissingConfigFile(_))));
    }

    #[test]
    fn openai_provider_requires_api_key() {
        let _guard = env_lock().lock().unwrap();

        env::set_var("REKO_LLM_PROVIDER", "openai");
        let result = AppConfig::load(LoadOptions::default());
        clear_vars(&["REKO_LLM_PROVIDER"]);

        assert!(matches!(
            result,
            Err(ConfigError::Validation(ref message)) if message.contains("llm.api_key")
        ));
    }

    #[test]
    fn api_key_env_var_is_picked_up_and_redacted() {
        let _guard = env_lock().lock().unwrap();

        env::set_var("REKO_LLM_PROVIDER", "anthropic");
        env::set_var("REKO_LLM_API_KEY", "sk-secret-value");
        let config = AppConfig::load(LoadOptions::default()).unwrap();
        clear_vars(&["REKO_LLM_PROVIDER", "REKO_LLM_API_KEY"]);

        assert_eq!(config.llm.api_key.as_ref().unwrap().expose_secret(), "sk-secret-value");
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret-value"));
    }

    #[test]
    fn invalid_fusion_limits_fail_validation() {
        let _guard = env_lock().lock().unwrap();

        env::set_var("REKO_FUSION_DEFAULT_LIMIT", "0");
        let result = AppConfig::load(LoadOptions::default());
        clear_vars(&["REKO_FUSION_DEFAULT_LIMIT"]);

        assert!(matches!(
            result,
            Err(ConfigError::Validation(ref message)) if message.contains("fusion.default_limit")
        ));
    }

    #[test]
    fn invalid_env_number_is_reported_with_key() {
        let _guard = env_lock().lock().unwrap();

        env::set_var("REKO_FUSION_STRATEGY_TIMEOUT_MS", "soon");
        let result = AppConfig::load(LoadOptions::default());
        clear_vars(&["REKO_FUSION_STRATEGY_TIMEOUT_MS"]);

        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnvOverride { ref key, .. })
                if key == "REKO_FUSION_STRATEGY_TIMEOUT_MS"
        ));
    }
}
