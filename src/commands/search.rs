//! # search 子命令实现
//!
//! 读取搜索阶段结果文件，输出 figure1、三种统计量的赝实验分布、
//! BumpHunter 层析图，并打印统计量、p 值及其误差。
//!
//! ## 功能
//! - 支持单文件和批量目录处理（每个文件一个输出子目录）
//! - 并行渲染（rayon）
//! - 可选 CSV 汇总
//!
//! ## 依赖关系
//! - 使用 `cli/search.rs` 定义的 SearchArgs
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `parsers/search.rs`, `plot/search.rs`

use crate::batch::{collect_into, BatchRunner, FileCollector, ProcessResult};
use crate::cli::search::SearchArgs;
use crate::error::{ResplotError, Result};
use crate::models::statistics::z_value;
use crate::models::SearchResults;
use crate::parsers::load_search_results;
use crate::plot::search::{DataFitSignificance, PseudoExperiments, SignificanceAlone, Statistic, Tomography};
use crate::plot::{Figure, Painter};
use crate::utils::{output, progress};

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tabled::{Table, Tabled};

/// 出图选项（命令行参数中与单个文件无关的部分）
#[derive(Debug, Clone)]
pub struct SearchPlotOptions {
    pub x_range: Option<(f64, f64)>,
    pub log_x: bool,
    pub legend_lines: Vec<String>,
    pub extra_plots: bool,
}

impl SearchPlotOptions {
    fn from_args(args: &SearchArgs) -> Self {
        SearchPlotOptions {
            x_range: args.x_range,
            log_x: !args.linear_x,
            legend_lines: args.legend_lines.clone(),
            extra_plots: args.extra_plots,
        }
    }
}

/// 每个结果文件一行的汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSummary {
    pub source: String,
    pub log_likelihood: f64,
    pub log_likelihood_pvalue: f64,
    pub log_likelihood_pvalue_error: f64,
    pub chi2: f64,
    pub chi2_pvalue: f64,
    pub chi2_pvalue_error: f64,
    pub bump_hunter: f64,
    pub bump_hunter_pvalue: f64,
    pub bump_hunter_pvalue_error: f64,
    pub bump_low_edge: f64,
    pub bump_high_edge: f64,
    pub ndf: f64,
    pub remainder_bump_hunter_pvalue: Option<f64>,
    pub remainder_log_likelihood_pvalue: Option<f64>,
    pub remainder_chi2: Option<f64>,
    pub remainder_chi2_pvalue: Option<f64>,
}

impl SearchSummary {
    pub fn from_results(results: &SearchResults) -> Self {
        let errors = results.pvalue_errors();
        let remainder = results.remainder;
        let remainder_chi2 = remainder.map(|_| results.remainder_chi2().0);
        SearchSummary {
            source: results.source.clone(),
            log_likelihood: results.log_likelihood.value,
            log_likelihood_pvalue: results.log_likelihood.pvalue,
            log_likelihood_pvalue_error: errors.log_likelihood,
            chi2: results.chi2.value,
            chi2_pvalue: results.chi2.pvalue,
            chi2_pvalue_error: errors.chi2,
            bump_hunter: results.bump_hunter.value,
            bump_hunter_pvalue: results.bump_hunter.pvalue,
            bump_hunter_pvalue_error: errors.bump_hunter,
            bump_low_edge: results.bump_low_edge,
            bump_high_edge: results.bump_high_edge,
            ndf: results.ndf,
            remainder_bump_hunter_pvalue: remainder.map(|r| r.bump_hunter),
            remainder_log_likelihood_pvalue: remainder.map(|r| r.log_likelihood),
            remainder_chi2,
            remainder_chi2_pvalue: remainder.and_then(|r| r.chi2),
        }
    }
}

/// 统计量表格行
#[derive(Debug, Clone, Tabled)]
struct StatRow {
    #[tabled(rename = "Statistic")]
    statistic: String,
    #[tabled(rename = "Observed")]
    observed: String,
    #[tabled(rename = "p-value")]
    pvalue: String,
    #[tabled(rename = "Z (σ)")]
    significance: String,
}

fn format_z(p: f64) -> String {
    match z_value(p, true) {
        Ok(z) if z.is_finite() => format!("{:.2}", z),
        Ok(z) => z.to_string(),
        Err(_) => "-".to_string(),
    }
}

fn stat_rows(summary: &SearchSummary) -> Vec<StatRow> {
    let mut rows: Vec<StatRow> = [
        (Statistic::LogLikelihood, summary.log_likelihood, summary.log_likelihood_pvalue, summary.log_likelihood_pvalue_error),
        (Statistic::Chi2, summary.chi2, summary.chi2_pvalue, summary.chi2_pvalue_error),
        (Statistic::BumpHunter, summary.bump_hunter, summary.bump_hunter_pvalue, summary.bump_hunter_pvalue_error),
    ]
    .into_iter()
    .map(|(stat, value, p, dp)| StatRow {
        statistic: stat.to_string(),
        observed: format!("{:.4}", value),
        pvalue: format!("{:.4} ± {:.4}", p, dp),
        significance: format_z(p),
    })
    .collect();

    let remainder = [
        ("BumpHunter (remainder)", None, summary.remainder_bump_hunter_pvalue),
        ("logL (remainder)", None, summary.remainder_log_likelihood_pvalue),
        ("chi2 (remainder)", summary.remainder_chi2, summary.remainder_chi2_pvalue),
    ];
    for (name, value, p) in remainder {
        if let Some(p) = p {
            rows.push(StatRow {
                statistic: name.to_string(),
                observed: value.map_or_else(|| "-".to_string(), |v| format!("{:.4}", v)),
                pvalue: format!("{:.4}", p),
                significance: format_z(p),
            });
        }
    }
    rows
}

/// 执行 search 命令
pub fn execute(args: SearchArgs) -> Result<()> {
    output::print_header("Search Phase Plots");
    let painter = args.style.painter()?;
    let options = SearchPlotOptions::from_args(&args);

    if args.input.is_file() {
        execute_single_file(&args, &options, &painter)
    } else if args.input.is_dir() {
        execute_batch(&args, &options, &painter)
    } else {
        Err(ResplotError::FileNotFound {
            path: args.input.display().to_string(),
        })
    }
}

fn execute_single_file(args: &SearchArgs, options: &SearchPlotOptions, painter: &Painter) -> Result<()> {
    output::print_info(&format!("Single file mode: '{}'", args.input.display()));

    let spinner = progress::create_spinner("Reading results file...");
    let loaded = load_search_results(&args.input, args.permit_window);
    spinner.finish_and_clear();
    let results = loaded?;

    if results.exclude_window && !args.permit_window {
        output::print_warning("Fit excluded a window; pass --permit-window to draw it and report remainder p-values");
    }

    let written = render_search_figures(&results, options, painter, &args.output)?;
    for path in &written {
        let figure = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        output::print_written(figure, path);
    }
    output::print_done(&format!("{} files in '{}'", written.len(), args.output.display()));

    let summary = SearchSummary::from_results(&results);
    print_summary(&summary);

    if let Some(csv_path) = &args.summary_csv {
        write_summary_csv(std::slice::from_ref(&summary), csv_path)?;
        output::print_success(&format!("Summary saved to '{}'", csv_path.display()));
    }
    Ok(())
}

fn execute_batch(args: &SearchArgs, options: &SearchPlotOptions, painter: &Painter) -> Result<()> {
    output::print_info(&format!("Batch mode: directory '{}'", args.input.display()));

    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect();
    if files.is_empty() {
        return Err(ResplotError::NoFilesFound {
            pattern: args.pattern.clone(),
        });
    }
    output::print_info(&format!("Found {} results files", files.len()));

    let summaries = Mutex::new(Vec::with_capacity(files.len()));
    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!("Rendering with {} worker threads", runner.jobs()));
    let result = runner.run(files, |file| {
        let folder = args.output.join(file_stem(file));
        let outcome = load_search_results(file, args.permit_window).and_then(|results| {
            let written = render_search_figures(&results, options, painter, &folder)?;
            Ok((SearchSummary::from_results(&results), written.len()))
        });
        match outcome {
            Ok((summary, count)) => collect_into(
                &summaries,
                file,
                summary,
                format!("{}: {} figures -> {}", file.display(), count, folder.display()),
            ),
            // 目录中混有其他类型的结果文件
            Err(ResplotError::MissingKey { key, .. }) => {
                ProcessResult::Skipped(format!("{}: no '{}'", file.display(), key))
            }
            Err(e) => ProcessResult::Failed(file.display().to_string(), e.to_string()),
        }
    })?;
    result.report();

    let mut summaries = summaries
        .into_inner()
        .map_err(|_| ResplotError::Other("summary collection was poisoned".to_string()))?;
    summaries.sort_by(|a, b| a.source.cmp(&b.source));
    for summary in &summaries {
        print_summary(summary);
    }

    if let Some(csv_path) = &args.summary_csv {
        write_summary_csv(&summaries, csv_path)?;
        output::print_success(&format!("Summary saved to '{}'", csv_path.display()));
    }
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("results")
        .to_string()
}

/// 输出一个结果文件的全部图表，返回写出的文件
pub fn render_search_figures(
    results: &SearchResults,
    options: &SearchPlotOptions,
    painter: &Painter,
    folder: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let mut figure1 = DataFitSignificance::from_results(results);
    figure1.x_range = options.x_range;
    figure1.log_x = options.log_x;
    figure1.extra_legend_lines = options.legend_lines.clone();
    if painter.draw_user_text {
        figure1.pvalue = Some(results.bump_hunter.pvalue);
    }
    written.extend(render(painter, &figure1, folder)?);

    for statistic in Statistic::ALL {
        let figure = PseudoExperiments::from_results(results, statistic);
        written.extend(render(painter, &figure, folder)?);
    }

    let tomography = &results.bump_hunter_tomography;
    if tomography.x().iter().zip(tomography.y()).any(|(x, y)| *x > 0.0 && *y > 0.0) {
        written.extend(render(painter, &Tomography { graph: tomography }, folder)?);
    }

    if options.extra_plots {
        let extras = [
            ("relativeDiffPlot", &results.relative_difference, "(D - B) / B"),
            ("sigOfDiffPlot", &results.significance_of_difference, "Significance"),
        ];
        for (name, hist, y_title) in extras {
            let figure = SignificanceAlone {
                name: name.to_string(),
                significance: hist,
                x_title: "m_{jj} [TeV]".to_string(),
                y_title: y_title.to_string(),
                log_x: options.log_x,
                x_range: options.x_range,
            };
            written.extend(render(painter, &figure, folder)?);
        }
    }
    Ok(written)
}

fn render<F: Figure>(painter: &Painter, figure: &F, folder: &Path) -> Result<Vec<PathBuf>> {
    painter.render(figure, &folder.join(figure.name()))
}

fn print_summary(summary: &SearchSummary) {
    output::print_header(&format!("Statistics: {}", summary.source));
    output::print_value(
        "BumpHunter interval",
        format!("{} - {}", summary.bump_low_edge, summary.bump_high_edge),
    );
    output::print_value("NDF", summary.ndf);
    println!();
    println!("{}", Table::new(stat_rows(summary)));
}

fn write_summary_csv(summaries: &[SearchSummary], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ResplotError::FileWriteError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }
    let mut wtr = csv::Writer::from_path(path)?;
    for summary in summaries {
        wtr.serialize(summary)?;
    }
    wtr.flush().map_err(|e| ResplotError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::search::tests::sample_results;
    use crate::models::RemainderPValues;

    #[test]
    fn test_summary_without_window() {
        let results = sample_results(false);
        let summary = SearchSummary::from_results(&results);
        assert_eq!(summary.chi2, 32.0);
        assert_eq!(summary.bump_hunter_pvalue, 0.6);
        assert!(summary.remainder_chi2.is_none());
        assert_eq!(stat_rows(&summary).len(), 3);
    }

    #[test]
    fn test_summary_with_remainder() {
        let mut results = sample_results(true);
        results.remainder = Some(RemainderPValues {
            bump_hunter: 0.2,
            log_likelihood: 0.3,
            chi2: Some(1.0),
        });
        let summary = SearchSummary::from_results(&results);
        assert_eq!(summary.remainder_bump_hunter_pvalue, Some(0.2));
        assert_eq!(summary.remainder_chi2_pvalue, Some(1.0));
        assert!(summary.remainder_chi2.unwrap().abs() < 1e-12);

        let rows = stat_rows(&summary);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[3].statistic, "BumpHunter (remainder)");
        assert_eq!(rows[3].observed, "-");
        assert_eq!(rows[5].pvalue, "1.0000");
        assert_eq!(rows[5].observed, "0.0000");
    }

    #[test]
    fn test_format_z() {
        assert_eq!(format_z(0.00135), "3.00");
        assert_eq!(format_z(1.5), "-");
    }

    #[test]
    fn test_summary_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("summary.csv");
        let summary = SearchSummary::from_results(&sample_results(false));
        write_summary_csv(&[summary.clone(), summary], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("source,log_likelihood,"));
        assert!(lines[1].starts_with("sample.json,12.0,0.5,"));
        // 无剩余谱时末尾四列为空
        assert!(lines[1].ends_with(",,,,"));
    }

    #[test]
    fn test_render_search_figures_writes_every_plot() {
        let results = sample_results(false);
        let options = SearchPlotOptions {
            x_range: None,
            log_x: true,
            legend_lines: vec!["|y*| < 0.6".to_string()],
            extra_plots: true,
        };
        let painter = crate::plot::painter::tests::svg_painter();
        let dir = tempfile::tempdir().unwrap();

        let written = render_search_figures(&results, &options, &painter, dir.path()).unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "figure1.svg",
                "logLStatPlot.svg",
                "chi2StatPlot.svg",
                "bumpHunterStatPlot.svg",
                "bumpHunterTomographyPlot.svg",
                "relativeDiffPlot.svg",
                "sigOfDiffPlot.svg",
            ]
        );
        assert!(written.iter().all(|p| p.is_file()));
    }
}
