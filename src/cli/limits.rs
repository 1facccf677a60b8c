//! # limits 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/limits.rs`

use super::parse_range;
use super::style::StyleArgs;

use clap::Args;
use std::path::PathBuf;

/// limits 子命令参数
#[derive(Args, Debug)]
pub struct LimitsArgs {
    /// Input: limit results file or directory containing them
    pub input: PathBuf,

    /// Output folder
    #[arg(short, long, default_value = "plots")]
    pub output: PathBuf,

    /// Name of the figure file (without extension)
    #[arg(long, default_value = "limitSettingPlot")]
    pub name: String,

    /// Mass axis title (ROOT text markup allowed)
    #[arg(long, default_value = "m_{Z'} [GeV]")]
    pub x_title: String,

    /// Cross-section axis title (ROOT text markup allowed)
    #[arg(long, default_value = "#sigma #times #it{A} #times BR [pb]")]
    pub y_title: String,

    /// Mass axis range (default: first to last observed point)
    #[arg(long, value_parser = parse_range)]
    pub x_range: Option<(f64, f64)>,

    /// Cross-section axis range (default: min/100 to max*1000 of the observed limit)
    #[arg(long, value_parser = parse_range)]
    pub y_range: Option<(f64, f64)>,

    /// Legend entry for the existing-limit arrow
    #[arg(long, default_value = "Existing limit")]
    pub existing_limit_label: String,

    /// Write the mass limits to a CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Glob pattern for results files (batch mode)
    #[arg(long, default_value = "*.json")]
    pub pattern: String,

    /// Number of parallel jobs (0 = auto, batch mode only)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    #[command(flatten)]
    pub style: StyleArgs,
}
