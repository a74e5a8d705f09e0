//! 数据集加载
//!
//! 数据集名是相对于配置根目录的文件名，按扩展名选择解析方式：
//! - `.csv`: 逗号分隔文本，首行为列名
//! - `.parquet` / `.pq`: parquet 列式文件
//!
//! 每次调用都重新读取文件，不做缓存。

use std::fs::File;
use std::path::{Component, Path, PathBuf};

use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, TimeUnit};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::{debug, info};

use crate::error::{AppResult, BacktestError};
use crate::time_util::from_epoch_micros;
use crate::trading::dataset::table::{Cell, DataTable};

/// 支持的数据集格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Parquet,
}

impl DatasetFormat {
    /// 按扩展名识别（区分大小写）
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => Some(DatasetFormat::Csv),
            Some("parquet") | Some("pq") => Some(DatasetFormat::Parquet),
            _ => None,
        }
    }
}

/// 数据集加载器
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    root: PathBuf,
}

impl DatasetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 数据集名只能指向根目录下的文件
    pub fn resolve_path(&self, dataset_name: &str) -> AppResult<PathBuf> {
        let relative = Path::new(dataset_name);
        let confined = !dataset_name.trim().is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !confined {
            return Err(BacktestError::Validation(format!(
                "dataset name must be a relative path inside the dataset root: {:?}",
                dataset_name
            )));
        }
        Ok(self.root.join(relative))
    }

    pub fn load(&self, dataset_name: &str) -> AppResult<DataTable> {
        let path = self.resolve_path(dataset_name)?;
        if !path.is_file() {
            return Err(BacktestError::NotFound {
                name: dataset_name.to_string(),
                root: self.root.display().to_string(),
            });
        }

        let format = DatasetFormat::from_path(&path)
            .ok_or_else(|| BacktestError::UnsupportedFormat(dataset_name.to_string()))?;

        let table = match format {
            DatasetFormat::Csv => read_csv(&path)?,
            DatasetFormat::Parquet => read_parquet(&path)?,
        };
        info!(
            "加载数据集 {} ({:?}): {} 行, 列 {:?}",
            dataset_name,
            format,
            table.height(),
            table.columns()
        );
        Ok(table)
    }
}

pub fn read_csv(path: &Path) -> AppResult<DataTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let columns: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    let mut data: Vec<Vec<Cell>> = vec![Vec::new(); columns.len()];

    for record in reader.records() {
        let record = record?;
        for (idx, field) in record.iter().enumerate() {
            data[idx].push(Cell::infer(field));
        }
    }

    DataTable::new(columns, data)
}

pub fn read_parquet(path: &Path) -> AppResult<DataTable> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let columns: Vec<String> = schema.fields().iter().map(|f| f.name().to_string()).collect();
    let mut data: Vec<Vec<Cell>> = vec![Vec::new(); columns.len()];

    let reader = builder.build()?;
    for batch in reader {
        let batch = batch?;
        for (idx, array) in batch.columns().iter().enumerate() {
            append_cells(&mut data[idx], array, &columns[idx])?;
        }
    }

    DataTable::new(columns, data)
}

/// 把一个 arrow 列追加为单元格
/// 时间类型统一换算成 UTC 微秒，数值类型统一为 f64，其余按文本处理
fn append_cells(out: &mut Vec<Cell>, array: &ArrayRef, column: &str) -> AppResult<()> {
    match array.data_type() {
        DataType::Timestamp(_, tz) => {
            let micros = cast(array, &DataType::Timestamp(TimeUnit::Microsecond, tz.clone()))?;
            append_micros(out, &cast(&micros, &DataType::Int64)?, column)
        }
        DataType::Date32 | DataType::Date64 => {
            let micros = cast(array, &DataType::Timestamp(TimeUnit::Microsecond, None))?;
            append_micros(out, &cast(&micros, &DataType::Int64)?, column)
        }
        DataType::Null => {
            out.extend(std::iter::repeat(Cell::Null).take(array.len()));
            Ok(())
        }
        dt if dt.is_numeric() => {
            let values = cast(array, &DataType::Float64)?;
            let values = values
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| downcast_error(column, "Float64"))?;
            for i in 0..values.len() {
                if values.is_null(i) {
                    out.push(Cell::Null);
                } else {
                    out.push(Cell::Number(values.value(i)));
                }
            }
            Ok(())
        }
        other => {
            let values = match cast(array, &DataType::Utf8) {
                Ok(values) => values,
                Err(e) => {
                    // 用不到的复杂类型列不影响计算
                    debug!("列 {} 类型 {:?} 无法转为文本: {}", column, other, e);
                    out.extend(std::iter::repeat(Cell::Null).take(array.len()));
                    return Ok(());
                }
            };
            let values = values
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| downcast_error(column, "Utf8"))?;
            for i in 0..values.len() {
                if values.is_null(i) {
                    out.push(Cell::Null);
                } else {
                    out.push(Cell::Text(values.value(i).to_string()));
                }
            }
            Ok(())
        }
    }
}

fn append_micros(out: &mut Vec<Cell>, array: &ArrayRef, column: &str) -> AppResult<()> {
    let values = array
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| downcast_error(column, "Int64"))?;
    for i in 0..values.len() {
        if values.is_null(i) {
            out.push(Cell::Null);
        } else {
            out.push(Cell::Timestamp(from_epoch_micros(values.value(i))?));
        }
    }
    Ok(())
}

fn downcast_error(column: &str, expected: &str) -> BacktestError {
    BacktestError::Internal(format!("column {} is not {}", column, expected))
}
