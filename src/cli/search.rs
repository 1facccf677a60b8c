//! # search 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/search.rs`

use super::parse_range;
use super::style::StyleArgs;

use clap::Args;
use std::path::PathBuf;

/// search 子命令参数
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Input: results file or directory containing results files
    pub input: PathBuf,

    /// Output folder (batch mode: one sub-folder per results file)
    #[arg(short, long, default_value = "plots")]
    pub output: PathBuf,

    /// Mass range of the data/fit figure (e.g., "1.1-8")
    #[arg(long, value_parser = parse_range)]
    pub x_range: Option<(f64, f64)>,

    /// Use a linear mass axis on the data/fit figure
    #[arg(long, default_value_t = false)]
    pub linear_x: bool,

    /// Draw the excluded window and report remainder p-values when the fit excluded one
    #[arg(long, default_value_t = false)]
    pub permit_window: bool,

    /// Extra line written under the legend (repeatable)
    #[arg(long = "legend-line")]
    pub legend_lines: Vec<String>,

    /// Also plot the relative difference and the significance of the difference
    #[arg(long, default_value_t = false)]
    pub extra_plots: bool,

    /// Write the statistics summary to a CSV file
    #[arg(long)]
    pub summary_csv: Option<PathBuf>,

    // ─────────────────────────────────────────────────────────────
    // 批量处理参数
    // ─────────────────────────────────────────────────────────────
    /// Glob pattern for results files (batch mode)
    #[arg(long, default_value = "*.json")]
    pub pattern: String,

    /// Number of parallel jobs (0 = auto, batch mode only)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Recurse into subdirectories (batch mode)
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    #[command(flatten)]
    pub style: StyleArgs,
}
