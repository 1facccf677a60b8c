//! # compare 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/compare.rs`

use super::parse_range;
use super::style::StyleArgs;

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 比较图的形式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum CompareMode {
    /// 数据与预测叠加，每个预测一栏数据/预测比值
    #[default]
    Ratio,
    /// 各预测以折线叠加
    Overlay,
    /// 各预测逐个堆叠
    Stack,
}

/// compare 子命令参数
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Results file (JSON)
    pub input: PathBuf,

    /// Figure type
    #[arg(long, value_enum, default_value_t = CompareMode::Ratio)]
    pub mode: CompareMode,

    /// Key of the data histogram
    #[arg(long, default_value = "basicData")]
    pub data: String,

    /// Leave the data out (overlay and stack modes)
    #[arg(long, default_value_t = false)]
    pub no_data: bool,

    /// Legend entry for the data
    #[arg(long, default_value = "Data")]
    pub data_legend: String,

    /// Keys of the prediction histograms (comma separated)
    #[arg(long, value_delimiter = ',', required = true)]
    pub predictions: Vec<String>,

    /// Legend entries for the predictions (comma separated, default: the keys)
    #[arg(long, value_delimiter = ',')]
    pub legends: Vec<String>,

    /// Output file stem (default: plots/dataWithPredictions, plots/overlaidHistograms
    /// or plots/stackedHistograms by mode)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Mass axis title
    #[arg(long, default_value = "m_{jj} [TeV]")]
    pub x_title: String,

    /// Data axis title
    #[arg(long, default_value = "Events")]
    pub y_title: String,

    /// Ratio axis title
    #[arg(long, default_value = "Data/Pred.")]
    pub ratio_title: String,

    /// Mass range (ratio mode: only narrows the filled range of the data)
    #[arg(long, value_parser = parse_range)]
    pub x_range: Option<(f64, f64)>,

    /// Event axis range (overlay and stack modes)
    #[arg(long, value_parser = parse_range)]
    pub y_range: Option<(f64, f64)>,

    /// Add a data/stack ratio pad (stack mode)
    #[arg(long, default_value_t = false)]
    pub ratio: bool,

    /// Extra text lines below the luminosity (overlay and stack modes, repeatable)
    #[arg(long = "extra-line")]
    pub extra_lines: Vec<String>,

    /// Logarithmic mass axis
    #[arg(long, default_value_t = false)]
    pub log_x: bool,

    /// Linear event axis
    #[arg(long, default_value_t = false)]
    pub linear_y: bool,

    #[command(flatten)]
    pub style: StyleArgs,
}
