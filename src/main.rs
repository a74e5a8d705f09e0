use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use serde_json::json;
use tracing::{error, info};

use spread_backtest::app_config::log::setup_logging;
use spread_backtest::{compute_spread_backtest, BacktestConfig, BacktestError, BacktestRequest};

/// 价差回测命令行
#[derive(Debug, Parser)]
#[command(name = "spread_backtest", version, about = "Two-leg spread backtest runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 读取 JSON 请求并输出回测结果
    Run {
        /// BacktestRequest JSON 文件
        #[arg(long)]
        request: PathBuf,
        /// 覆盖 DATASET_ROOT
        #[arg(long)]
        dataset_root: Option<PathBuf>,
        /// 进度曲线点数（最多 250）
        #[arg(long)]
        progress_limit: Option<usize>,
        /// 格式化输出
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// 健康检查
    Health,
}

/// 应用初始化
fn app_init() -> Result<()> {
    // 加载环境变量
    dotenv().ok();
    // 设置日志
    setup_logging()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    app_init()?;

    match cli.command {
        Command::Health => {
            println!("{}", json!({ "status": "ok" }));
            Ok(ExitCode::SUCCESS)
        }
        Command::Run {
            request,
            dataset_root,
            progress_limit,
            pretty,
        } => {
            let mut config = BacktestConfig::from_env();
            if let Some(root) = dataset_root {
                config.dataset_root = root;
            }
            if let Some(limit) = progress_limit {
                config = config.with_progress_limit(limit);
            }
            info!("数据集目录: {}", config.dataset_root.display());

            let raw = tokio::fs::read_to_string(&request).await?;
            match run_request(config, &raw).await {
                Ok(result) => {
                    let body = if pretty {
                        serde_json::to_string_pretty(&result)?
                    } else {
                        serde_json::to_string(&result)?
                    };
                    println!("{}", body);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    error!("回测请求失败: {}", e);
                    eprintln!(
                        "{}",
                        json!({ "status": e.status_code(), "detail": e.public_detail() })
                    );
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

/// 计算是阻塞的，放到阻塞线程池执行
async fn run_request(
    config: BacktestConfig,
    raw: &str,
) -> Result<spread_backtest::BacktestResult, BacktestError> {
    let request = BacktestRequest::from_json(raw)?;
    tokio::task::spawn_blocking(move || compute_spread_backtest(&config, &request))
        .await
        .map_err(|e| BacktestError::Internal(e.to_string()))?
}
