//! # Spread Backtest
//!
//! 两条腿价差回测：读取数据集、按时间窗口过滤、计算价差序列及汇总指标

pub mod app_config;
pub mod error;
pub mod time_util;
pub mod trading;

pub use app_config::BacktestConfig;
pub use error::{AppResult, BacktestError};
pub use trading::model::backtest::{BacktestRequest, BacktestResult};
pub use trading::services::spread_backtest_service::compute_spread_backtest;
