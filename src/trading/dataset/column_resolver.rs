//! 列名解析
//!
//! 数据集列名不统一（大小写、命名习惯都可能不同），按规则链依次尝试：
//! 先匹配已知别名（不区分大小写），最后回退到按位置取列。

use std::collections::HashMap;

use tracing::debug;

use crate::error::{AppResult, BacktestError};
use crate::trading::dataset::table::DataTable;

/// 时间戳列名，按字面匹配
pub const TIMESTAMP_COLUMN: &str = "timestamp";

pub const LEG_A_ALIASES: [&str; 3] = ["ym", "lega", "leg_a"];
pub const LEG_B_ALIASES: [&str; 3] = ["es", "legb", "leg_b"];

/// 小写列名 -> 实际列名，重名时后出现的覆盖先出现的
pub fn lowercase_lookup(table: &DataTable) -> HashMap<String, String> {
    table
        .columns()
        .iter()
        .map(|c| (c.to_lowercase(), c.clone()))
        .collect()
}

/// 列解析规则
pub trait ColumnRule: Send + Sync {
    fn resolve(&self, table: &DataTable, lookup: &HashMap<String, String>) -> Option<String>;

    fn describe(&self) -> String;
}

/// 按优先级匹配别名
#[derive(Debug, Clone)]
pub struct AliasRule {
    aliases: Vec<String>,
}

impl AliasRule {
    pub fn new<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            aliases: aliases
                .into_iter()
                .map(|a| a.as_ref().to_lowercase())
                .collect(),
        }
    }
}

impl ColumnRule for AliasRule {
    fn resolve(&self, _table: &DataTable, lookup: &HashMap<String, String>) -> Option<String> {
        self.aliases.iter().find_map(|alias| lookup.get(alias).cloned())
    }

    fn describe(&self) -> String {
        format!("aliases {:?}", self.aliases)
    }
}

/// 按位置取列（从 0 开始）
#[derive(Debug, Clone, Copy)]
pub struct PositionalRule {
    index: usize,
}

impl PositionalRule {
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

impl ColumnRule for PositionalRule {
    fn resolve(&self, table: &DataTable, _lookup: &HashMap<String, String>) -> Option<String> {
        table.column_name(self.index).map(str::to_string)
    }

    fn describe(&self) -> String {
        format!("column #{}", self.index + 1)
    }
}

/// 规则链，返回第一个命中的列
pub struct ColumnResolver {
    role: String,
    rules: Vec<Box<dyn ColumnRule>>,
}

impl ColumnResolver {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            rules: Vec::new(),
        }
    }

    pub fn rule(mut self, rule: impl ColumnRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// 腿 A: ym / lega / leg_a，回退第 2 列
    pub fn leg_a() -> Self {
        Self::new("leg A")
            .rule(AliasRule::new(LEG_A_ALIASES))
            .rule(PositionalRule::new(1))
    }

    /// 腿 B: es / legb / leg_b，回退第 3 列
    pub fn leg_b() -> Self {
        Self::new("leg B")
            .rule(AliasRule::new(LEG_B_ALIASES))
            .rule(PositionalRule::new(2))
    }

    pub fn resolve(&self, table: &DataTable) -> AppResult<String> {
        let lookup = lowercase_lookup(table);
        for rule in &self.rules {
            if let Some(column) = rule.resolve(table, &lookup) {
                debug!("{} 列解析为 {:?} (规则: {})", self.role, column, rule.describe());
                return Ok(column);
            }
        }
        let tried: Vec<String> = self.rules.iter().map(|r| r.describe()).collect();
        Err(BacktestError::ColumnResolution(format!(
            "{} (tried {})",
            self.role,
            tried.join(", ")
        )))
    }
}

/// 一次回测用到的三列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadColumns {
    pub timestamp: String,
    pub leg_a: String,
    pub leg_b: String,
}

impl SpreadColumns {
    pub fn resolve(table: &DataTable) -> AppResult<Self> {
        Ok(Self {
            timestamp: TIMESTAMP_COLUMN.to_string(),
            leg_a: ColumnResolver::leg_a().resolve(table)?,
            leg_b: ColumnResolver::leg_b().resolve(table)?,
        })
    }
}
