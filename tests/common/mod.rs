#![allow(dead_code)]

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::PathBuf;

use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use uuid::Uuid;

use spread_backtest::time_util::parse_iso8601;
use spread_backtest::trading::model::backtest::{BacktestRequest, Resolution, SpreadLeg};
use spread_backtest::BacktestConfig;

/// 测试用临时数据集目录，离开作用域时删除
pub struct TempDataDir {
    pub root: PathBuf,
}

impl TempDataDir {
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!("spread_backtest_{}", Uuid::new_v4()));
        fs::create_dir_all(&root).expect("create temp dataset root");
        Self { root }
    }

    pub fn config(&self) -> BacktestConfig {
        BacktestConfig::new(self.root.clone())
    }

    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create dataset parent");
        }
        fs::write(&path, content).expect("write dataset");
        path
    }

    pub fn write_parquet(&self, name: &str, batch: &RecordBatch) -> PathBuf {
        let path = self.root.join(name);
        let file = File::create(&path).expect("create parquet");
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).expect("parquet writer");
        writer.write(batch).expect("write batch");
        writer.close().expect("close parquet");
        path
    }
}

impl Drop for TempDataDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

pub fn request(dataset: &str, start: &str, end: &str, leg_b_multiplier: f64) -> BacktestRequest {
    BacktestRequest {
        id: "bt-test".to_string(),
        dataset_name: dataset.to_string(),
        legs: (
            SpreadLeg::new("YM", 1.0),
            SpreadLeg::new("ES", leg_b_multiplier),
        ),
        start_date: parse_iso8601(start).expect("start date"),
        end_date: parse_iso8601(end).expect("end date"),
        resolution: Resolution::OneMinute,
        parameters: HashMap::new(),
    }
}

/// 三行参考数据: 价差 [50, 52, 49]
pub const REFERENCE_CSV: &str = "timestamp,YM,ES
2024-01-02T09:30:00,100,50
2024-01-02T09:31:00,102,50
2024-01-02T09:32:00,99,50
";
