//! # stats 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/stats.rs`

use super::style::StyleArgs;

use clap::Args;
use std::path::PathBuf;

/// stats 子命令参数
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// CSV file with one statistic per row
    pub input: PathBuf,

    /// Column holding the statistic
    #[arg(short, long)]
    pub column: String,

    /// Output file stem
    #[arg(short, long, default_value = "plots/statistics")]
    pub output: PathBuf,

    /// Axis title (default: the column name)
    #[arg(long)]
    pub x_title: Option<String>,

    /// Logarithmic entries axis
    #[arg(long, default_value_t = false)]
    pub log_y: bool,

    #[command(flatten)]
    pub style: StyleArgs,
}
