//! 价差回测请求与结果
//!
//! 字段名与对外报文保持一致（camelCase），结果只在单次请求内存在，不做持久化。

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::time_util::deserialize_flexible_datetime;

/// 价差的一条腿
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadLeg {
    /// 标的代码
    pub symbol: String,
    /// 乘数
    pub multiplier: f64,
}

impl SpreadLeg {
    pub fn new(symbol: impl Into<String>, multiplier: f64) -> Self {
        Self {
            symbol: symbol.into(),
            multiplier,
        }
    }
}

/// 回测声明的采样粒度，目前仅作记录，不做重采样
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "1s")]
    OneSecond,
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::OneSecond => "1s",
            Resolution::OneMinute => "1m",
            Resolution::FiveMinutes => "5m",
        }
    }
}

/// 策略参数值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
}

/// 回测请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestRequest {
    pub id: String,
    pub dataset_name: String,
    /// 固定两条腿: (A, B)
    pub legs: (SpreadLeg, SpreadLeg),
    #[serde(deserialize_with = "deserialize_flexible_datetime")]
    pub start_date: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_flexible_datetime")]
    pub end_date: DateTime<Utc>,
    pub resolution: Resolution,
    #[serde(default)]
    pub parameters: HashMap<String, ParamValue>,
}

impl BacktestRequest {
    /// 解析 JSON 请求，结构错误返回 Validation
    pub fn from_json(raw: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn leg_a(&self) -> &SpreadLeg {
        &self.legs.0
    }

    pub fn leg_b(&self) -> &SpreadLeg {
        &self.legs.1
    }
}

/// 价差序列中的一个点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadPoint {
    pub timestamp: DateTime<Utc>,
    pub spread: f64,
}

/// 进度曲线上的点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl From<&SpreadPoint> for ProgressPoint {
    fn from(point: &SpreadPoint) -> Self {
        Self {
            timestamp: point.timestamp,
            value: point.spread,
        }
    }
}

/// 回测汇总指标
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BacktestSummary {
    /// 累计盈亏
    #[serde(rename = "totalPnL")]
    pub total_pnl: f64,
    /// 均值 / 总体标准差，不年化
    pub sharpe: f64,
    /// 最大回撤（绝对值）
    #[serde(rename = "maxDrawdown")]
    pub max_drawdown: f64,
    /// 交易次数估算
    #[serde(rename = "tradeCount")]
    pub trade_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BacktestStatus {
    Queued,
    Running,
    Failed,
    Completed,
}

/// 回测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub id: String,
    pub dataset_name: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub status: BacktestStatus,
    pub summary: BacktestSummary,
    pub progress: Vec<ProgressPoint>,
    #[serde(default)]
    pub logs: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BacktestError;

    const REQUEST: &str = r#"{
        "id": "bt-1",
        "datasetName": "ym_es.csv",
        "legs": [{"symbol": "YM", "multiplier": 1.0}, {"symbol": "ES", "multiplier": 2.5}],
        "startDate": "2024-01-01T00:00:00Z",
        "endDate": "2024-01-31T23:59:59",
        "resolution": "1m",
        "parameters": {"window": 20, "threshold": 1.5, "mode": "mean_revert"}
    }"#;

    #[test]
    fn test_request_from_json() {
        let request = BacktestRequest::from_json(REQUEST).unwrap();
        assert_eq!(request.dataset_name, "ym_es.csv");
        assert_eq!(request.leg_b().multiplier, 2.5);
        assert_eq!(request.resolution, Resolution::OneMinute);
        assert_eq!(request.parameters["window"], ParamValue::Int(20));
        assert_eq!(request.parameters["threshold"], ParamValue::Float(1.5));
        assert_eq!(
            request.parameters["mode"],
            ParamValue::Text("mean_revert".to_string())
        );
        assert_eq!(request.end_date.to_rfc3339(), "2024-01-31T23:59:59+00:00");
    }

    #[test]
    fn test_request_requires_two_legs() {
        let raw = REQUEST.replace(
            r#"[{"symbol": "YM", "multiplier": 1.0}, {"symbol": "ES", "multiplier": 2.5}]"#,
            r#"[{"symbol": "YM", "multiplier": 1.0}]"#,
        );
        let err = BacktestRequest::from_json(&raw).unwrap_err();
        assert!(matches!(err, BacktestError::Validation(_)));
    }

    #[test]
    fn test_request_rejects_unknown_resolution() {
        let raw = REQUEST.replace(r#""1m""#, r#""15m""#);
        assert!(BacktestRequest::from_json(&raw).is_err());
    }

    #[test]
    fn test_summary_wire_names() {
        let summary = BacktestSummary {
            total_pnl: 1.0,
            sharpe: 0.5,
            max_drawdown: 0.25,
            trade_count: 2,
        };
        let value = serde_json::to_value(summary).unwrap();
        assert_eq!(value["totalPnL"], 1.0);
        assert_eq!(value["maxDrawdown"], 0.25);
        assert_eq!(value["tradeCount"], 2);
        assert_eq!(
            serde_json::to_value(BacktestStatus::Completed).unwrap(),
            "completed"
        );
    }
}
