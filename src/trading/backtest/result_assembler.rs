use chrono::{DateTime, Utc};

use crate::trading::model::backtest::{
    BacktestRequest, BacktestResult, BacktestStatus, BacktestSummary, ProgressPoint,
};

/// 组装回测结果
/// 计算是同步完成的，开始与完成时间相同，状态固定为 completed
pub fn assemble_result(
    request: &BacktestRequest,
    summary: BacktestSummary,
    progress: Vec<ProgressPoint>,
) -> BacktestResult {
    assemble_result_at(request, summary, progress, Utc::now())
}

pub fn assemble_result_at(
    request: &BacktestRequest,
    summary: BacktestSummary,
    progress: Vec<ProgressPoint>,
    now: DateTime<Utc>,
) -> BacktestResult {
    BacktestResult {
        id: request.id.clone(),
        dataset_name: request.dataset_name.clone(),
        started_at: now,
        completed_at: now,
        status: BacktestStatus::Completed,
        summary,
        progress,
        logs: Vec::new(),
    }
}
