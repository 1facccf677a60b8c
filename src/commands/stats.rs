//! # stats 子命令实现
//!
//! 读取 CSV 中一列统计量，按 `Hist1D::from_statistics` 分箱后作图，
//! 并标注均值与 RMS。
//!
//! ## 依赖关系
//! - 使用 `cli/stats.rs` 定义的 StatsArgs
//! - 使用 `parsers/statistics.rs`, `models/statistics.rs`, `plot/histograms.rs`

use crate::cli::stats::StatsArgs;
use crate::error::Result;
use crate::models::statistics::{mean, rms};
use crate::models::Hist1D;
use crate::parsers::read_statistics_column;
use crate::plot::histograms::BasicHistogram;
use crate::utils::{output, progress};

/// 图上的均值与 RMS 标注
fn annotations(values: &[f64]) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(m) = mean(values) {
        lines.push(format!("Mean = {:.4}", m));
    }
    if let Some(r) = rms(values) {
        lines.push(format!("RMS = {:.4}", r));
    }
    lines.push(format!("Entries = {}", values.len()));
    lines
}

/// 执行 stats 命令
pub fn execute(args: StatsArgs) -> Result<()> {
    output::print_header("Statistics Distribution");
    let painter = args.style.painter()?;

    let spinner = progress::create_spinner("Reading statistics...");
    let read = read_statistics_column(&args.input, &args.column);
    spinner.finish_and_clear();
    let values = read?;

    let hist = Hist1D::from_statistics(args.column.as_str(), &values)?;
    output::print_value("Entries", values.len());
    output::print_value("Bins", hist.nbins());

    let name = args
        .output
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("statistics")
        .to_string();
    let figure = BasicHistogram {
        x_title: args.x_title.clone().unwrap_or_else(|| args.column.clone()),
        log_y: args.log_y,
        fill: painter.palette.statistical_test_fill,
        annotations: annotations(&values),
        ..BasicHistogram::new(name, &hist)
    };
    for line in &figure.annotations {
        output::print_info(line);
    }

    for path in painter.render(&figure, &args.output)? {
        output::print_written(&figure.name, &path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotations() {
        let lines = annotations(&[1.0, 2.0, 3.0]);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Mean = 2.0000");
        assert!(lines[1].starts_with("RMS = "));
        assert_eq!(lines[2], "Entries = 3");
    }
}
