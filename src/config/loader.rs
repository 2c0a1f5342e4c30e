//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `VIVA_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `VIVA_SESSION__FOCUS_VIOLATION_LIMIT=5`
/// - `VIVA_SYNTHESIS__API_KEY=sk-or-...`
/// - `VIVA_DATABASE__PATH=/data/viva.db`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("session.focus_violation_limit", 3)?
        .set_default("session.clock_tick_ms", 1000)?
        .set_default("attention.max_eye_level_difference", 10.0)?
        .set_default("attention.max_nose_offset", 20.0)?
        .set_default("attention.frame_interval_ms", 100)?
        .set_default("attention.min_confidence", 0.5)?
        .set_default("attention.max_consecutive_frame_errors", 30)?
        .set_default("synthesis.url", "https://openrouter.ai/api/v1")?
        .set_default("synthesis.model", "google/gemma-3n-e2b-it:free")?
        .set_default("synthesis.timeout_secs", 60)?
        .set_default("synthesis.max_retries", 0)?
        .set_default("database.path", "data/viva.db")?
        .set_default("database.max_connections", 5)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix("VIVA")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.session.focus_violation_limit == 0 {
        return Err(ConfigError::ValidationError(
            "Focus violation limit cannot be 0".to_string(),
        ));
    }

    if config.session.clock_tick_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Clock tick cannot be 0".to_string(),
        ));
    }

    if config.attention.frame_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Frame interval cannot be 0".to_string(),
        ));
    }

    if config.attention.max_eye_level_difference <= 0.0 || config.attention.max_nose_offset <= 0.0
    {
        return Err(ConfigError::ValidationError(
            "Attention thresholds must be positive".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&config.attention.min_confidence) {
        return Err(ConfigError::ValidationError(
            "Minimum confidence must be within [0, 1]".to_string(),
        ));
    }

    if config.attention.max_consecutive_frame_errors == 0 {
        return Err(ConfigError::ValidationError(
            "Max consecutive frame errors cannot be 0".to_string(),
        ));
    }

    if config.synthesis.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Synthesis URL cannot be empty".to_string(),
        ));
    }

    if config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Focus Violation Limit: {}", config.session.focus_violation_limit);
    tracing::info!("Clock Tick: {}ms", config.session.clock_tick_ms);
    tracing::info!("Frame Interval: {}ms", config.attention.frame_interval_ms);
    tracing::info!(
        "Attention Thresholds: eye={} nose={}",
        config.attention.max_eye_level_difference,
        config.attention.max_nose_offset
    );
    tracing::info!("Assistant: {}", config.voice.assistant_name);
    tracing::info!(
        "Voice Model: {}/{}",
        config.voice.model_provider,
        config.voice.model
    );
    tracing::info!("Spoken End Request: {}", config.voice.end_on_spoken_request);
    tracing::info!("Synthesis URL: {}", config.synthesis.url);
    tracing::info!("Synthesis Model: {}", config.synthesis.model);
    tracing::info!("Synthesis API Key: {}", config.synthesis.masked_api_key());
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_focus_limit() {
        let mut config = AppConfig::default();
        config.session.focus_violation_limit = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_frame_interval() {
        let mut config = AppConfig::default();
        config.attention.frame_interval_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_negative_threshold() {
        let mut config = AppConfig::default();
        config.attention.max_nose_offset = -1.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_db_path() {
        let mut config = AppConfig::default();
        config.database.path = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[session]
focus_violation_limit = 5

[voice]
assistant_name = "Panel Bot"
end_phrases = ["stop here"]

[synthesis]
model = "openai/gpt-4o-mini"
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.session.focus_violation_limit, 5);
        assert_eq!(config.session.clock_tick_ms, 1000);
        assert_eq!(config.voice.assistant_name, "Panel Bot");
        assert_eq!(config.voice.end_phrases, vec!["stop here".to_string()]);
        assert_eq!(config.synthesis.model, "openai/gpt-4o-mini");
        assert_eq!(config.attention.max_nose_offset, 20.0);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[attention]\nframe_interval_ms = 0").unwrap();
        assert!(matches!(
            load_config_from_path(Some(file.path())),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
