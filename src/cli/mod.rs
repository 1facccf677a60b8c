//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `search`: 搜索阶段结果的全部图表与统计量表格
//! - `limits`: 限设定图与交点表格
//! - `compare`: 数据与若干预测（比值栏、叠加或堆叠）
//! - `graphs`: 多个结果文件中的曲线叠加（如不同模型的观测限）
//! - `stats`: CSV 中一列统计量的分布
//! - `zvalue`: p 值换算为显著性
//! - `keys`: 列出结果文件中的对象
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: style, search, limits, compare, graphs, stats, zvalue

pub mod compare;
pub mod graphs;
pub mod limits;
pub mod search;
pub mod stats;
pub mod style;
pub mod zvalue;

use clap::{Args, Parser, Subcommand};
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

/// resplot - 共振态搜索结果作图工具
#[derive(Parser)]
#[command(name = "resplot")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Publication-style plots for resonance search and limit-setting results", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Plot search-phase results: data vs fit, test statistics, tomography
    Search(search::SearchArgs),

    /// Plot limit-setting results and report signal mass limits
    Limits(limits::LimitsArgs),

    /// Compare data with several predictions: ratio pads, overlay or stack
    Compare(compare::CompareArgs),

    /// Overlay graphs (e.g. observed limits) from several results files
    Graphs(graphs::GraphsArgs),

    /// Histogram a column of statistics from a CSV file
    Stats(stats::StatsArgs),

    /// Convert p-values to significances
    Zvalue(zvalue::ZvalueArgs),

    /// List the objects stored in a results file
    Keys(KeysArgs),
}

/// keys 子命令参数
#[derive(Args, Debug)]
pub struct KeysArgs {
    /// Results file (JSON)
    pub input: PathBuf,
}

fn range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let number = r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?";
        Regex::new(&format!(r"^\s*({n})\s*(?:-|:|,)\s*({n})\s*$", n = number)).expect("static regex")
    })
}

/// 解析 "low-high"（也接受 `:` 或 `,` 分隔）
pub fn parse_range(input: &str) -> Result<(f64, f64), String> {
    let caps = range_regex()
        .captures(input)
        .ok_or_else(|| format!("Invalid range '{}'. Use e.g. '1100-8000' or '1e-3:0.5'", input))?;
    let low: f64 = caps[1].parse().map_err(|_| format!("Invalid lower bound in '{}'", input))?;
    let high: f64 = caps[2].parse().map_err(|_| format!("Invalid upper bound in '{}'", input))?;
    if high <= low {
        return Err(format!("Invalid range '{}': upper bound must exceed lower bound", input));
    }
    Ok((low, high))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("1100-8000").unwrap(), (1100.0, 8000.0));
        assert_eq!(parse_range(" 1.1 : 8 ").unwrap(), (1.1, 8.0));
        assert_eq!(parse_range("1e-3,0.5").unwrap(), (1e-3, 0.5));
        assert_eq!(parse_range("-2--1").unwrap(), (-2.0, -1.0));
        assert!(parse_range("8000-1100").is_err());
        assert!(parse_range("abc").is_err());
        assert!(parse_range("1-2-3").is_err());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["resplot", "zvalue", "0.05", "0.001"]).unwrap();
        assert!(matches!(cli.command, Commands::Zvalue(_)));
        let cli = Cli::try_parse_from(["resplot", "search", "results.json", "--x-range", "1.1-8"]).unwrap();
        match cli.command {
            Commands::Search(args) => assert_eq!(args.x_range, Some((1.1, 8.0))),
            _ => panic!("expected search"),
        }
        let cli = Cli::try_parse_from(["resplot", "graphs", "a.json", "b.json", "--pair-lines", "--hline", "0.1"]).unwrap();
        match cli.command {
            Commands::Graphs(args) => {
                assert_eq!(args.inputs.len(), 2);
                assert_eq!(args.keys, vec!["observed".to_string()]);
                assert!(args.pair_lines);
                assert_eq!(args.horizontal_lines, vec![0.1]);
            }
            _ => panic!("expected graphs"),
        }
        assert!(Cli::try_parse_from(["resplot", "graphs"]).is_err());
        let cli = Cli::try_parse_from(["resplot", "compare", "r.json", "--predictions", "a", "--mode", "stack"]).unwrap();
        assert!(matches!(cli.command, Commands::Compare(args) if args.mode == compare::CompareMode::Stack));
    }
}
