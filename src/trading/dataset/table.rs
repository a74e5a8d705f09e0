use chrono::{DateTime, Utc};

use crate::error::{AppResult, BacktestError};
use crate::time_util::RawTimestamp;

/// 表格中的单元格
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Number(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Cell {
    /// csv 字段推断：空串为 Null，能解析为数字的为 Number，其余为 Text
    pub fn infer(field: &str) -> Self {
        let field = field.trim();
        if field.is_empty() {
            return Cell::Null;
        }
        match field.parse::<f64>() {
            Ok(v) => Cell::Number(v),
            Err(_) => Cell::Text(field.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// 时间戳列的原始表示
    pub fn as_raw_timestamp(&self) -> Option<RawTimestamp> {
        match self {
            Cell::Timestamp(dt) => Some(RawTimestamp::Native(*dt)),
            Cell::Number(v) => Some(RawTimestamp::EpochSeconds(*v)),
            Cell::Text(s) => Some(RawTimestamp::Iso(s.clone())),
            Cell::Null => None,
        }
    }
}

/// 内存列式表，加载后只读
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    columns: Vec<String>,
    data: Vec<Vec<Cell>>,
    height: usize,
}

impl DataTable {
    pub fn new(columns: Vec<String>, data: Vec<Vec<Cell>>) -> AppResult<Self> {
        if columns.len() != data.len() {
            return Err(BacktestError::Internal(format!(
                "table has {} column names but {} columns",
                columns.len(),
                data.len()
            )));
        }
        let height = data.first().map(Vec::len).unwrap_or(0);
        if let Some((idx, _)) = data.iter().enumerate().find(|(_, c)| c.len() != height) {
            return Err(BacktestError::Validation(format!(
                "column {} has {} rows, expected {}",
                columns[idx],
                data[idx].len(),
                height
            )));
        }
        Ok(Self {
            columns,
            data,
            height,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// 第 `index` 列的列名
    pub fn column_name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    /// 按列名取列，重名时取第一个
    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|idx| self.data[idx].as_slice())
    }
}
