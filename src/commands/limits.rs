//! # limits 子命令实现
//!
//! 绘制限设定图，并给出每条信号曲线与观测限、期望限的交点质量。
//!
//! ## 功能
//! - 单文件或目录批量处理
//! - 交点表格输出，可选写入 CSV
//!
//! ## 依赖关系
//! - 使用 `cli/limits.rs` 定义的 LimitsArgs
//! - 使用 `parsers/limits.rs`, `plot/limits.rs`
//! - 使用 `batch/` 模块进行批量处理

use crate::batch::{collect_into, BatchRunner, FileCollector, ProcessResult};
use crate::cli::limits::LimitsArgs;
use crate::error::{ResplotError, Result};
use crate::models::LimitResults;
use crate::parsers::load_limit_results;
use crate::plot::limits::LimitPlot;
use crate::plot::Painter;
use crate::utils::{output, progress};

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tabled::{Table, Tabled};

/// 交点表格行
#[derive(Debug, Clone, Tabled)]
struct CrossingRow {
    #[tabled(rename = "Signal")]
    signal: String,
    #[tabled(rename = "Observed limit [mass]")]
    observed: String,
    #[tabled(rename = "Expected limit [mass]")]
    expected: String,
}

/// CSV 记录：每个交点一行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossingRecord {
    pub source: String,
    pub signal: String,
    /// "observed" 或 "expected"
    pub kind: &'static str,
    pub mass: f64,
}

fn join_masses(masses: &[f64]) -> String {
    if masses.is_empty() {
        return "none".to_string();
    }
    masses
        .iter()
        .map(|m| format!("{:.1}", m))
        .collect::<Vec<_>>()
        .join(", ")
}

fn crossing_records(limits: &LimitResults) -> Vec<CrossingRecord> {
    let mut records = Vec::new();
    for crossing in limits.crossings() {
        let kinds = [("observed", &crossing.observed), ("expected", &crossing.expected)];
        for (kind, masses) in kinds {
            records.extend(masses.iter().map(|&mass| CrossingRecord {
                source: limits.source.clone(),
                signal: crossing.signal.clone(),
                kind,
                mass,
            }));
        }
    }
    records
}

/// 执行 limits 命令
pub fn execute(args: LimitsArgs) -> Result<()> {
    output::print_header("Limit Setting Plot");
    let painter = args.style.painter()?;

    if args.input.is_file() {
        execute_single_file(&args, &painter)
    } else if args.input.is_dir() {
        execute_batch(&args, &painter)
    } else {
        Err(ResplotError::FileNotFound {
            path: args.input.display().to_string(),
        })
    }
}

fn execute_single_file(args: &LimitsArgs, painter: &Painter) -> Result<()> {
    output::print_info(&format!("Single file mode: '{}'", args.input.display()));

    let spinner = progress::create_spinner("Reading limit results...");
    let loaded = load_limit_results(&args.input);
    spinner.finish_and_clear();
    let limits = loaded?;

    for path in render_limit_plot(&limits, args, painter, &args.output)? {
        output::print_written(&args.name, &path);
    }
    print_crossings(&limits);

    if let Some(csv_path) = &args.csv {
        write_crossings_csv(&crossing_records(&limits), csv_path)?;
        output::print_success(&format!("Crossings saved to '{}'", csv_path.display()));
    }
    Ok(())
}

fn execute_batch(args: &LimitsArgs, painter: &Painter) -> Result<()> {
    output::print_info(&format!("Batch mode: directory '{}'", args.input.display()));

    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)?
        .collect();
    if files.is_empty() {
        return Err(ResplotError::NoFilesFound {
            pattern: args.pattern.clone(),
        });
    }
    output::print_info(&format!("Found {} results files", files.len()));

    let loaded = Mutex::new(Vec::with_capacity(files.len()));
    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!("Rendering with {} worker threads", runner.jobs()));
    let result = runner.run(files, |file| {
        let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or("limits");
        let folder = args.output.join(stem);
        let outcome = load_limit_results(file).and_then(|limits| {
            render_limit_plot(&limits, args, painter, &folder)?;
            Ok(limits)
        });
        match outcome {
            Ok(limits) => collect_into(
                &loaded,
                file,
                limits,
                format!("{} -> {}", file.display(), folder.display()),
            ),
            Err(ResplotError::MissingKey { key, .. }) => {
                ProcessResult::Skipped(format!("{}: no '{}'", file.display(), key))
            }
            Err(e) => ProcessResult::Failed(file.display().to_string(), e.to_string()),
        }
    })?;
    result.report();

    let mut all = loaded
        .into_inner()
        .map_err(|_| ResplotError::Other("limit collection was poisoned".to_string()))?;
    all.sort_by(|a, b| a.source.cmp(&b.source));
    for limits in &all {
        print_crossings(limits);
    }

    if let Some(csv_path) = &args.csv {
        let records: Vec<CrossingRecord> = all.iter().flat_map(crossing_records).collect();
        write_crossings_csv(&records, csv_path)?;
        output::print_success(&format!("Crossings saved to '{}'", csv_path.display()));
    }
    Ok(())
}

fn render_limit_plot(
    limits: &LimitResults,
    args: &LimitsArgs,
    painter: &Painter,
    folder: &Path,
) -> Result<Vec<PathBuf>> {
    let plot = LimitPlot {
        name: args.name.clone(),
        x_title: args.x_title.clone(),
        y_title: args.y_title.clone(),
        x_range: args.x_range,
        y_range: args.y_range,
        existing_limit_label: args.existing_limit_label.clone(),
        ..LimitPlot::new(limits)
    };
    painter.render(&plot, &folder.join(&args.name))
}

fn print_crossings(limits: &LimitResults) {
    output::print_header(&format!("Mass limits: {}", limits.source));
    let rows: Vec<CrossingRow> = limits
        .crossings()
        .into_iter()
        .map(|c| CrossingRow {
            signal: c.signal,
            observed: join_masses(&c.observed),
            expected: join_masses(&c.expected),
        })
        .collect();
    if rows.is_empty() {
        output::print_skip("No signal curves in results file");
        return;
    }
    println!("{}", Table::new(rows));
}

fn write_crossings_csv(records: &[CrossingRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ResplotError::FileWriteError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }
    let mut wtr = csv::Writer::from_path(path)?;
    for record in records {
        wtr.serialize(record)?;
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
    use crate::models::limits::tests::sample_limits;

    #[test]
    fn test_crossing_records() {
        let records = crossing_records(&sample_limits());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, "observed");
        assert_eq!(records[1].kind, "expected");
        assert!((records[0].mass - 2333.333).abs() < 1.0);
        assert!(records.iter().all(|r| r.source == "limits.json" && r.signal == "Z'"));
    }

    #[test]
    fn test_join_masses() {
        assert_eq!(join_masses(&[]), "none");
        assert_eq!(join_masses(&[2333.33, 2666.67]), "2333.3, 2666.7");
    }

    #[test]
    fn test_crossings_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crossings.csv");
        write_crossings_csv(&crossing_records(&sample_limits()), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "source,signal,kind,mass");
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("limits.json,Z',expected,"));
    }
}
