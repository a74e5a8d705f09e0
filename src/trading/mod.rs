pub mod backtest;
pub mod dataset;
pub mod model;
pub mod services;
