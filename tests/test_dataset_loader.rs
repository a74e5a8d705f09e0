mod common;

use std::sync::Arc;

use anyhow::Result;
use arrow::array::{Date32Array, Float32Array, StringArray, TimestampMillisecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{TimeZone, Utc};

use common::{TempDataDir, REFERENCE_CSV};
use spread_backtest::trading::dataset::{Cell, ColumnResolver, DatasetLoader, SpreadColumns};
use spread_backtest::BacktestError;

#[test]
fn test_load_csv_table() -> Result<()> {
    let dir = TempDataDir::new();
    dir.write_file("ym_es.csv", REFERENCE_CSV);

    let table = DatasetLoader::new(&dir.root).load("ym_es.csv")?;
    assert_eq!(table.columns(), ["timestamp", "YM", "ES"]);
    assert_eq!(table.height(), 3);
    assert_eq!(
        table.column("timestamp").unwrap()[0],
        Cell::Text("2024-01-02T09:30:00".to_string())
    );
    assert_eq!(table.column("YM").unwrap()[1], Cell::Number(102.0));
    Ok(())
}

#[test]
fn test_load_csv_in_subdirectory() -> Result<()> {
    let dir = TempDataDir::new();
    dir.write_file("futures/2024/ym_es.csv", REFERENCE_CSV);

    let table = DatasetLoader::new(&dir.root).load("futures/2024/ym_es.csv")?;
    assert_eq!(table.height(), 3);
    Ok(())
}

#[test]
fn test_csv_empty_cells_are_null() -> Result<()> {
    let dir = TempDataDir::new();
    dir.write_file("gaps.csv", "timestamp,YM,ES\n2024-01-02T09:30:00,,50\n");

    let table = DatasetLoader::new(&dir.root).load("gaps.csv")?;
    assert_eq!(table.column("YM").unwrap()[0], Cell::Null);
    Ok(())
}

#[test]
fn test_ragged_csv_is_validation_error() {
    let dir = TempDataDir::new();
    dir.write_file("ragged.csv", "timestamp,YM,ES\n2024-01-02T09:30:00,1,2,3\n");

    let err = DatasetLoader::new(&dir.root).load("ragged.csv").unwrap_err();
    assert!(matches!(err, BacktestError::Validation(_)));
}

#[test]
fn test_load_parquet_column_kinds() -> Result<()> {
    let dir = TempDataDir::new();
    let ts = Utc.with_ymd_and_hms(2024, 6, 3, 8, 0, 0).unwrap();

    let schema = Arc::new(Schema::new(vec![
        Field::new(
            "timestamp",
            DataType::Timestamp(TimeUnit::Millisecond, None),
            false,
        ),
        Field::new("price_a", DataType::Float32, true),
        Field::new("price_b", DataType::Float32, true),
        Field::new("session", DataType::Utf8, true),
        Field::new("trade_date", DataType::Date32, true),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(TimestampMillisecondArray::from(vec![ts.timestamp_millis()])),
            Arc::new(Float32Array::from(vec![Some(1.5)])),
            Arc::new(Float32Array::from(vec![None::<f32>])),
            Arc::new(StringArray::from(vec!["RTH"])),
            Arc::new(Date32Array::from(vec![19877])),
        ],
    )?;
    dir.write_parquet("kinds.pq", &batch);

    let table = DatasetLoader::new(&dir.root).load("kinds.pq")?;
    assert_eq!(table.height(), 1);
    assert_eq!(table.column("timestamp").unwrap()[0], Cell::Timestamp(ts));
    assert_eq!(table.column("price_a").unwrap()[0], Cell::Number(1.5));
    assert_eq!(table.column("price_b").unwrap()[0], Cell::Null);
    assert_eq!(table.column("session").unwrap()[0], Cell::Text("RTH".into()));
    assert_eq!(
        table.column("trade_date").unwrap()[0],
        Cell::Timestamp(Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap())
    );

    let columns = SpreadColumns::resolve(&table)?;
    assert_eq!(columns.leg_a, "price_a");
    assert_eq!(columns.leg_b, "price_b");
    Ok(())
}

#[test]
fn test_missing_and_unsupported() {
    let dir = TempDataDir::new();
    dir.write_file("prices.txt", REFERENCE_CSV);
    std::fs::create_dir_all(dir.root.join("folder.csv")).unwrap();
    let loader = DatasetLoader::new(&dir.root);

    let err = loader.load("absent.csv").unwrap_err();
    assert!(matches!(err, BacktestError::NotFound { .. }));
    assert!(err.to_string().contains("absent.csv"));

    // 不存在的文件优先报 NotFound
    assert!(matches!(
        loader.load("absent.txt").unwrap_err(),
        BacktestError::NotFound { .. }
    ));
    assert!(matches!(
        loader.load("folder.csv").unwrap_err(),
        BacktestError::NotFound { .. }
    ));
    assert!(matches!(
        loader.load("prices.txt").unwrap_err(),
        BacktestError::UnsupportedFormat(_)
    ));
}

#[test]
fn test_alias_resolution_ignores_declared_symbols() -> Result<()> {
    let dir = TempDataDir::new();
    dir.write_file("pair.csv", "timestamp,es,Ym\n2024-01-02T09:30:00,1,2\n");

    let table = DatasetLoader::new(&dir.root).load("pair.csv")?;
    assert_eq!(ColumnResolver::leg_a().resolve(&table)?, "Ym");
    assert_eq!(ColumnResolver::leg_b().resolve(&table)?, "es");
    Ok(())
}
