//! 配置管理模块

pub mod backtest;
pub mod env;
pub mod log;

pub use backtest::{BacktestConfig, DEFAULT_PROGRESS_LIMIT};
