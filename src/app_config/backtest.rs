use std::path::PathBuf;

use crate::app_config::env::{env_or_default, env_usize};

/// 进度曲线默认保留的点数
pub const DEFAULT_PROGRESS_LIMIT: usize = 250;

/// 回测计算配置
///
/// 数据集根目录显式传入加载器，不使用模块级全局状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacktestConfig {
    /// 数据集根目录
    pub dataset_root: PathBuf,
    /// 进度曲线最多保留的点数，不超过 DEFAULT_PROGRESS_LIMIT
    progress_limit: usize,
}

impl BacktestConfig {
    pub fn new(dataset_root: impl Into<PathBuf>) -> Self {
        Self {
            dataset_root: dataset_root.into(),
            progress_limit: DEFAULT_PROGRESS_LIMIT,
        }
    }

    /// 从环境变量读取: DATASET_ROOT、PROGRESS_LIMIT
    pub fn from_env() -> Self {
        let dataset_root = env_or_default("DATASET_ROOT", "data");
        // 只能调小，不能超过 250
        let progress_limit =
            env_usize("PROGRESS_LIMIT", DEFAULT_PROGRESS_LIMIT).min(DEFAULT_PROGRESS_LIMIT);
        Self {
            dataset_root: PathBuf::from(dataset_root),
            progress_limit,
        }
    }

    /// 超过默认上限时按上限处理
    pub fn with_progress_limit(mut self, limit: usize) -> Self {
        self.progress_limit = limit.min(DEFAULT_PROGRESS_LIMIT);
        self
    }

    pub fn progress_limit(&self) -> usize {
        self.progress_limit
    }
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self::new("data")
    }
}
