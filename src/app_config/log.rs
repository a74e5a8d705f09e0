use std::sync::OnceLock;

use tracing::{info, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::app_config::env::{env_is_true, env_or_default};

// 全局变量用于保持日志文件句柄
static INFO_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static ERROR_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

// 日志配置结构体
#[derive(Debug, Clone)]
struct LogConfig {
    app_env: String,
    log_level: String,
    log_dir: String,
    log_rotation: String,
    info_file_name: String,
    error_file_name: String,
    enable_console_logging: bool,
}

impl LogConfig {
    fn from_env() -> Self {
        Self {
            app_env: env_or_default("APP_ENV", "local").to_lowercase(),
            log_level: env_or_default("LOG_LEVEL", "info"),
            log_dir: env_or_default("LOG_DIR", "log_files"),
            log_rotation: env_or_default("LOG_ROTATION", "daily"),
            info_file_name: env_or_default("LOG_INFO_FILE", "info.log"),
            error_file_name: env_or_default("LOG_ERROR_FILE", "error.log"),
            enable_console_logging: env_is_true("ENABLE_CONSOLE_LOGGING", true),
        }
    }
}

// 解析时间轮转策略
fn parse_rotation(s: &str) -> Rotation {
    match s.to_lowercase().as_str() {
        "minutely" | "minute" | "min" => Rotation::MINUTELY,
        "hourly" | "hour" | "hr" => Rotation::HOURLY,
        "daily" | "day" => Rotation::DAILY,
        _ => Rotation::DAILY,
    }
}

/// 所有输出共用的格式层，只有写入目标、颜色和过滤级别不同
fn output_layer<S, W>(writer: W, ansi: bool, filter: &str) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .with_ansi(ansi)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .with_writer(writer)
        .with_filter(EnvFilter::new(filter))
}

// 设置日志
// 控制台日志写到 stderr，stdout 留给回测结果输出
pub fn setup_logging() -> anyhow::Result<()> {
    let config = LogConfig::from_env();

    // 本地环境：仅控制台输出
    if config.app_env == "local" {
        let subscriber =
            Registry::default().with(output_layer(std::io::stderr, true, &config.log_level));
        tracing::subscriber::set_global_default(subscriber)?;

        info!(
            "回测日志已初始化: env={}, level={}",
            config.app_env, config.log_level
        );
        return Ok(());
    }

    // 非本地环境：文件输出（可选控制台）
    std::fs::create_dir_all(&config.log_dir).map_err(|e| {
        anyhow::anyhow!("Failed to create log directory '{}': {}", config.log_dir, e)
    })?;

    let rotation = parse_rotation(&config.log_rotation);
    let info_file =
        RollingFileAppender::new(rotation.clone(), &config.log_dir, &config.info_file_name);
    let error_file = RollingFileAppender::new(rotation, &config.log_dir, &config.error_file_name);

    let (info_writer, info_guard) = tracing_appender::non_blocking(info_file);
    let (error_writer, error_guard) = tracing_appender::non_blocking(error_file);

    // guard 丢弃后后台写线程会退出
    INFO_GUARD
        .set(info_guard)
        .map_err(|_| anyhow::anyhow!("logging already initialised (info writer)"))?;
    ERROR_GUARD
        .set(error_guard)
        .map_err(|_| anyhow::anyhow!("logging already initialised (error writer)"))?;

    let console_layer = config
        .enable_console_logging
        .then(|| output_layer(std::io::stderr, false, &config.log_level));

    let subscriber = Registry::default()
        .with(output_layer(info_writer, false, &config.log_level))
        .with(output_layer(error_writer, false, "error"))
        .with(console_layer);
    tracing::subscriber::set_global_default(subscriber)?;

    info!(
        "回测日志已初始化: env={}, level={}, dir={}, console={}",
        config.app_env, config.log_level, config.log_dir, config.enable_console_logging
    );
    Ok(())
}
