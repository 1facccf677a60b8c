//! # 数据模型模块
//!
//! 定义直方图、曲线以及搜索阶段与限设定阶段的结果数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `plot/` 和 `commands/` 使用
//! - 子模块: histogram, graph, statistics, search, limits

pub mod graph;
pub mod histogram;
pub mod limits;
pub mod search;
pub mod statistics;

pub use graph::Graph;
pub use histogram::Hist1D;
pub use limits::{LimitResults, SignalCurve};
pub use search::{ObservedStat, RemainderPValues, SearchResults};
