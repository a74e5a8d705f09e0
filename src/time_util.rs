use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::{AppResult, BacktestError};

/// 数据集中时间戳的原始表示
///
/// 在读取数据集时统一转换为 `DateTime<Utc>`，后续流程只处理转换后的值。
#[derive(Debug, Clone, PartialEq)]
pub enum RawTimestamp {
    /// parquet 原生时间类型
    Native(DateTime<Utc>),
    /// 数值型 epoch 秒（可带小数）
    EpochSeconds(f64),
    /// ISO-8601 字符串
    Iso(String),
}

impl RawTimestamp {
    pub fn parse(&self) -> AppResult<DateTime<Utc>> {
        match self {
            RawTimestamp::Native(dt) => Ok(*dt),
            RawTimestamp::EpochSeconds(secs) => parse_epoch_seconds(*secs),
            RawTimestamp::Iso(s) => parse_iso8601(s),
        }
    }
}

/// epoch 秒转 UTC 时间
pub fn parse_epoch_seconds(secs: f64) -> AppResult<DateTime<Utc>> {
    if !secs.is_finite() {
        return Err(BacktestError::Validation(format!(
            "invalid epoch timestamp: {}",
            secs
        )));
    }
    let whole = secs.floor();
    let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);
    match Utc.timestamp_opt(whole as i64, nanos) {
        LocalResult::Single(dt) => Ok(dt),
        _ => Err(BacktestError::Validation(format!(
            "epoch timestamp out of range: {}",
            secs
        ))),
    }
}

/// epoch 微秒转 UTC 时间
pub fn from_epoch_micros(micros: i64) -> AppResult<DateTime<Utc>> {
    Utc.timestamp_micros(micros).single().ok_or_else(|| {
        BacktestError::Validation(format!("timestamp out of range: {}us", micros))
    })
}

/// 解析 ISO-8601 字符串
/// 支持: "2024-01-01T12:00:00Z"、"2024-01-01 12:00:00+08:00"、
/// "2024-01-01T12:00:00.123"、"2024-01-01"。不带时区的按 UTC 处理
pub fn parse_iso8601(value: &str) -> AppResult<DateTime<Utc>> {
    let s = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }

    Err(BacktestError::Validation(format!(
        "invalid ISO-8601 timestamp: {:?}",
        value
    )))
}

/// serde 反序列化：接受带或不带时区的 ISO-8601 字符串
pub fn deserialize_flexible_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_iso8601(&raw).map_err(serde::de::Error::custom)
}
