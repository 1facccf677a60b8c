//! # 绘图模块
//!
//! 基于 plotters 的出版风格图表：坐标轴、画框、图例与标签，
//! 以及搜索阶段、限设定阶段、通用直方图和叠加图的各类图表。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: axis, frame, decor, painter, palette, search, limits, histograms, overlays

pub mod axis;
pub mod decor;
pub mod frame;
pub mod histograms;
pub mod limits;
pub mod overlays;
pub mod painter;
pub mod palette;
pub mod search;

pub use painter::{Figure, LabelType, OutputFormat, Painter};
pub use palette::Palette;
