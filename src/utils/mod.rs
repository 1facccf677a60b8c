//! # 工具函数模块
//!
//! 终端输出样式、进度条，以及 ROOT 风格文字标记的转换。
//!
//! ## 依赖关系
//! - 被 `commands/` 与 `plot/` 使用
//! - 子模块: output, progress, latex

pub mod latex;
pub mod output;
pub mod progress;
