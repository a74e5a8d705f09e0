use thiserror::Error;

/// 回测计算错误
///
/// 所有错误都在计算过程中同步抛出，由调用方（传输层）转换为对外状态码，
/// 计算本身不做重试，也不返回部分结果。
#[derive(Error, Debug)]
pub enum BacktestError {
    /// 数据集文件不存在
    #[error("Dataset {name} not found in {root}")]
    NotFound { name: String, root: String },

    /// 文件扩展名既不是 csv 也不是 parquet
    #[error("Unsupported file type for {0}")]
    UnsupportedFormat(String),

    /// 必需的列无法确定
    #[error("Unable to determine column for {0}")]
    ColumnResolution(String),

    /// 时间戳格式错误、腿数值非数字、请求结构错误等
    #[error("Validation error: {0}")]
    Validation(String),

    /// 未知错误
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = std::result::Result<T, BacktestError>;

impl BacktestError {
    /// 传输层使用的状态码映射
    pub fn status_code(&self) -> u16 {
        match self {
            BacktestError::NotFound { .. } => 404,
            BacktestError::UnsupportedFormat(_)
            | BacktestError::ColumnResolution(_)
            | BacktestError::Validation(_) => 400,
            BacktestError::Internal(_) => 500,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BacktestError::NotFound { .. } => "not_found",
            BacktestError::UnsupportedFormat(_) => "unsupported_format",
            BacktestError::ColumnResolution(_) => "column_resolution",
            BacktestError::Validation(_) => "validation",
            BacktestError::Internal(_) => "internal",
        }
    }

    /// 对外展示的错误信息，内部错误不暴露细节
    pub fn public_detail(&self) -> String {
        match self {
            BacktestError::Internal(_) => "Unexpected error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for BacktestError {
    fn from(e: std::io::Error) -> Self {
        BacktestError::Internal(e.to_string())
    }
}

/// csv 内容格式错误属于输入问题，底层 IO 错误属于内部错误
impl From<csv::Error> for BacktestError {
    fn from(e: csv::Error) -> Self {
        if e.is_io_error() {
            BacktestError::Internal(e.to_string())
        } else {
            BacktestError::Validation(format!("malformed csv: {}", e))
        }
    }
}

impl From<parquet::errors::ParquetError> for BacktestError {
    fn from(e: parquet::errors::ParquetError) -> Self {
        BacktestError::Validation(format!("malformed parquet: {}", e))
    }
}

impl From<arrow::error::ArrowError> for BacktestError {
    fn from(e: arrow::error::ArrowError) -> Self {
        BacktestError::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for BacktestError {
    fn from(e: serde_json::Error) -> Self {
        BacktestError::Validation(format!("invalid request payload: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        let not_found = BacktestError::NotFound {
            name: "a.csv".to_string(),
            root: "data".to_string(),
        };
        assert_eq!(not_found.status_code(), 404);
        assert_eq!(BacktestError::UnsupportedFormat("a.txt".into()).status_code(), 400);
        assert_eq!(BacktestError::ColumnResolution("leg A".into()).status_code(), 400);
        assert_eq!(BacktestError::Validation("bad".into()).status_code(), 400);
        assert_eq!(BacktestError::Internal("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = BacktestError::Internal("disk on fire".into());
        assert_eq!(err.public_detail(), "Unexpected error");

        let err = BacktestError::UnsupportedFormat("prices.txt".into());
        assert_eq!(err.public_detail(), "Unsupported file type for prices.txt");
    }
}
