//! 价差计算与汇总指标
//!
//! 指标口径:
//! - 累计盈亏: 价差序列求和
//! - 夏普: 均值 / 总体标准差（除以 n），不年化、不扣无风险利率
//! - 最大回撤: 历史最高点减当前值的最大差
//! - 交易次数: 按每 50 行一笔估算，非真实撮合

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{AppResult, BacktestError};
use crate::trading::dataset::column_resolver::SpreadColumns;
use crate::trading::dataset::table::{Cell, DataTable};
use crate::trading::model::backtest::{BacktestSummary, ProgressPoint, SpreadPoint};

/// 每多少行估算一笔交易
const ROWS_PER_TRADE: usize = 50;

/// 时间窗口，两端闭区间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        *ts >= self.start && *ts <= self.end
    }

    /// 结束早于开始时窗口为空，不报错
    pub fn is_inverted(&self) -> bool {
        self.end < self.start
    }
}

/// 价差引擎: spread = legA - multiplier * legB
///
/// 只使用腿 B 的乘数，腿 A 固定按 1 计算。
/// NOTE: 腿 A 的乘数被忽略是否为有意设计尚未确认，确认前不要改动。
#[derive(Debug, Clone, Copy)]
pub struct SpreadEngine {
    leg_b_multiplier: f64,
}

impl SpreadEngine {
    pub fn new(leg_b_multiplier: f64) -> Self {
        Self { leg_b_multiplier }
    }

    /// 过滤时间窗口并计算价差，每个保留行产出一个点
    pub fn derive(
        &self,
        table: &DataTable,
        columns: &SpreadColumns,
        window: &TimeWindow,
    ) -> AppResult<Vec<SpreadPoint>> {
        if window.is_inverted() {
            warn!(
                "回测窗口结束时间早于开始时间: {} > {}，结果为空",
                window.start, window.end
            );
        }

        let timestamps = ingest_timestamps(table, &columns.timestamp)?;
        let leg_a = require_column(table, &columns.leg_a)?;
        let leg_b = require_column(table, &columns.leg_b)?;

        let mut points = Vec::new();
        for (row, ts) in timestamps.iter().enumerate() {
            if !window.contains(ts) {
                continue;
            }
            let a = leg_value(&leg_a[row], &columns.leg_a, row)?;
            let b = leg_value(&leg_b[row], &columns.leg_b, row)?;
            points.push(SpreadPoint {
                timestamp: *ts,
                spread: a - self.leg_b_multiplier * b,
            });
        }

        debug!(
            "窗口 [{}, {}] 保留 {}/{} 行",
            window.start,
            window.end,
            points.len(),
            table.height()
        );
        Ok(points)
    }
}

/// 读取时间戳列并统一转换为 UTC
pub fn ingest_timestamps(table: &DataTable, column: &str) -> AppResult<Vec<DateTime<Utc>>> {
    let cells = require_column(table, column)?;
    cells
        .iter()
        .enumerate()
        .map(|(row, cell)| {
            cell.as_raw_timestamp()
                .ok_or_else(|| {
                    BacktestError::Validation(format!("missing {} at row {}", column, row))
                })?
                .parse()
        })
        .collect()
}

fn require_column<'a>(table: &'a DataTable, column: &str) -> AppResult<&'a [Cell]> {
    table
        .column(column)
        .ok_or_else(|| BacktestError::Validation(format!("dataset has no column {:?}", column)))
}

fn leg_value(cell: &Cell, column: &str, row: usize) -> AppResult<f64> {
    cell.as_f64().ok_or_else(|| {
        BacktestError::Validation(format!(
            "non-numeric value {:?} in column {} at row {}",
            cell, column, row
        ))
    })
}

/// 计算汇总指标
pub fn compute_summary(spread: &[f64]) -> BacktestSummary {
    BacktestSummary {
        total_pnl: total_pnl(spread),
        sharpe: sharpe_ratio(spread),
        max_drawdown: max_drawdown(spread),
        trade_count: estimate_trade_count(spread.len()),
    }
}

pub fn total_pnl(spread: &[f64]) -> f64 {
    spread.iter().sum()
}

pub fn mean(spread: &[f64]) -> f64 {
    if spread.is_empty() {
        return 0.0;
    }
    total_pnl(spread) / spread.len() as f64
}

/// 总体标准差（除以 n）
pub fn population_std(spread: &[f64]) -> f64 {
    if spread.is_empty() {
        return 0.0;
    }
    let mean = mean(spread);
    let variance = spread.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / spread.len() as f64;
    variance.sqrt()
}

pub fn sharpe_ratio(spread: &[f64]) -> f64 {
    let std = population_std(spread);
    if std == 0.0 {
        return 0.0;
    }
    mean(spread) / std
}

/// 最大回撤 = max(历史最高 - 当前值)，始终 >= 0
pub fn max_drawdown(spread: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_drawdown = 0.0;
    for &value in spread {
        if value > peak {
            peak = value;
        }
        let drawdown = peak - value;
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
        }
    }
    max_drawdown
}

/// 有数据时至少 1 笔
pub fn estimate_trade_count(rows: usize) -> u64 {
    if rows == 0 {
        return 0;
    }
    (rows / ROWS_PER_TRADE).max(1) as u64
}

/// 进度曲线: 保留最近 `limit` 个点，按时间顺序
pub fn build_progress(points: &[SpreadPoint], limit: usize) -> Vec<ProgressPoint> {
    let skip = points.len().saturating_sub(limit);
    points[skip..].iter().map(ProgressPoint::from).collect()
}
