//! # graphs 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/graphs.rs`

use super::parse_range;
use super::style::StyleArgs;

use clap::Args;
use std::path::PathBuf;

/// graphs 子命令参数
#[derive(Args, Debug)]
pub struct GraphsArgs {
    /// Results files (JSON), one or more
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Graph keys read from every file (comma separated)
    #[arg(long, value_delimiter = ',', default_value = "observed")]
    pub keys: Vec<String>,

    /// Legend entries, one per graph (default: file stem, plus the key when several keys are read)
    #[arg(long, value_delimiter = ',')]
    pub legends: Vec<String>,

    /// Output file stem
    #[arg(short, long, default_value = "plots/severalObservedLimits")]
    pub output: PathBuf,

    /// Mass axis title (ROOT text markup allowed)
    #[arg(long, default_value = "m_{Z'} [GeV]")]
    pub x_title: String,

    /// Cross-section axis title (ROOT text markup allowed)
    #[arg(long, default_value = "#sigma #times #it{A} #times BR [pb]")]
    pub y_title: String,

    /// Mass axis range (default: first to last point over all graphs)
    #[arg(long, value_parser = parse_range)]
    pub x_range: Option<(f64, f64)>,

    /// Cross-section axis range (default: min/100 to max*100 over all graphs)
    #[arg(long, value_parser = parse_range)]
    pub y_range: Option<(f64, f64)>,

    /// Logarithmic mass axis
    #[arg(long, default_value_t = false)]
    pub log_x: bool,

    /// Linear cross-section axis
    #[arg(long, default_value_t = false)]
    pub linear_y: bool,

    /// Pair neighbouring graphs: shared colour, second one dashed
    #[arg(long, default_value_t = false)]
    pub pair_lines: bool,

    /// Dashed horizontal line at this value (repeatable)
    #[arg(long = "hline")]
    pub horizontal_lines: Vec<f64>,

    /// Extra text line above the legend entries (repeatable)
    #[arg(long = "legend-line")]
    pub legend_lines: Vec<String>,

    #[command(flatten)]
    pub style: StyleArgs,
}
