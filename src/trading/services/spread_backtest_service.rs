//! 价差回测服务
//!
//! 加载数据集 -> 解析列名 -> 过滤窗口并计算价差 -> 汇总指标 -> 组装结果。
//! 整个流程同步阻塞，调用方若运行在异步运行时上，需要放到阻塞线程中执行。

use std::time::Instant;

use tracing::{error, info};

use crate::app_config::BacktestConfig;
use crate::error::AppResult;
use crate::trading::backtest::result_assembler::assemble_result;
use crate::trading::backtest::spread_engine::{
    build_progress, compute_summary, SpreadEngine, TimeWindow,
};
use crate::trading::dataset::column_resolver::SpreadColumns;
use crate::trading::dataset::loader::DatasetLoader;
use crate::trading::model::backtest::{BacktestRequest, BacktestResult};

pub struct SpreadBacktestService {
    loader: DatasetLoader,
    progress_limit: usize,
}

impl SpreadBacktestService {
    pub fn new(config: &BacktestConfig) -> Self {
        Self {
            loader: DatasetLoader::new(config.dataset_root.clone()),
            progress_limit: config.progress_limit(),
        }
    }

    pub fn run(&self, request: &BacktestRequest) -> AppResult<BacktestResult> {
        let started = Instant::now();
        info!(
            "开始价差回测 id={} dataset={} legs=({}, {} x{}) resolution={} params={}",
            request.id,
            request.dataset_name,
            request.leg_a().symbol,
            request.leg_b().symbol,
            request.leg_b().multiplier,
            request.resolution.as_str(),
            request.parameters.len()
        );

        let result = self.compute(request);
        match &result {
            Ok(res) => info!(
                "价差回测完成 id={} progress={} trades={} pnl={:.4} sharpe={:.4} max_dd={:.4} 耗时={:?}",
                res.id,
                res.progress.len(),
                res.summary.trade_count,
                res.summary.total_pnl,
                res.summary.sharpe,
                res.summary.max_drawdown,
                started.elapsed()
            ),
            Err(e) => error!(
                "价差回测失败 id={} kind={} err={}",
                request.id,
                e.kind(),
                e
            ),
        }
        result
    }

    fn compute(&self, request: &BacktestRequest) -> AppResult<BacktestResult> {
        let table = self.loader.load(&request.dataset_name)?;
        let columns = SpreadColumns::resolve(&table)?;

        let window = TimeWindow::new(request.start_date, request.end_date);
        let points = SpreadEngine::new(request.leg_b().multiplier).derive(&table, &columns, &window)?;

        let spread: Vec<f64> = points.iter().map(|p| p.spread).collect();
        let summary = compute_summary(&spread);
        let progress = build_progress(&points, self.progress_limit);

        Ok(assemble_result(request, summary, progress))
    }
}

/// 执行一次价差回测
pub fn compute_spread_backtest(
    config: &BacktestConfig,
    request: &BacktestRequest,
) -> AppResult<BacktestResult> {
    SpreadBacktestService::new(config).run(request)
}
