//! 数据集：加载、列式表与列名解析

pub mod column_resolver;
pub mod loader;
pub mod table;

pub use column_resolver::{ColumnResolver, SpreadColumns};
pub use loader::{DatasetFormat, DatasetLoader};
pub use table::{Cell, DataTable};
