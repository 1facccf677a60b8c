//! # 解析器模块
//!
//! 读取结果文件（按键取对象）以及 CSV 统计量列表。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: results, search, limits, statistics

pub mod limits;
pub mod results;
pub mod search;
pub mod statistics;

pub use limits::load_limit_results;
pub use results::ResultsFile;
pub use search::load_search_results;
pub use statistics::read_statistics_column;
