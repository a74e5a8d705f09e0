pub mod spread_backtest_service;

pub use spread_backtest_service::{compute_spread_backtest, SpreadBacktestService};
