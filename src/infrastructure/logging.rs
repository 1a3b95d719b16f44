use std::io;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    pub format: LogFormat,
    pub include_file_location: bool,
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: LogFormat::Compact,
            include_file_location: false,
            filter: None,
        }
    }
}

impl LoggingConfig {
    /// 调试模式：输出 debug 级别并附带源码位置
    pub fn debug() -> Self {
        Self {
            level: Level::DEBUG,
            format: LogFormat::Pretty,
            include_file_location: true,
            filter: None,
        }
    }
}

/// 日志格式
#[derive(Debug, Clone)]
pub enum LogFormat {
    /// 人类可读的格式
    Pretty,
    /// 紧凑格式
    Compact,
}

/// 设置日志系统
///
/// 日志统一写到 stderr，stdout 只留给报告和提交建议。
/// `RUST_LOG` 存在时优先生效。
pub fn setup_logging(config: LoggingConfig) -> anyhow::Result<()> {
    let env_filter = match &config.filter {
        Some(filter) => EnvFilter::try_new(filter)?,
        None => EnvFilter::try_from_default_env().or_else(|_| {
            EnvFilter::try_new(format!("commit_critic={}", config.level))
        })?,
    };

    let fmt_layer = create_fmt_layer(&config);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

fn create_fmt_layer(
    config: &LoggingConfig,
) -> Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync> {
    let mut layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_level(true);

    if config.include_file_location {
        layer = layer.with_file(true).with_line_number(true);
    }

    match config.format {
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logging_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, Level::WARN);
        assert!(!config.include_file_location);
        assert!(config.filter.is_none());
    }

    #[test]
    fn test_debug_logging_config() {
        let config = LoggingConfig::debug();
        assert_eq!(config.level, Level::DEBUG);
        assert!(config.include_file_location);
    }

    #[test]
    fn test_invalid_filter_is_rejected() {
        let config = LoggingConfig {
            filter: Some("commit_critic=notalevel".to_string()),
            ..LoggingConfig::default()
        };
        assert!(setup_logging(config).is_err());
    }
}
