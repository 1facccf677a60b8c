//! # graphs 子命令实现
//!
//! 从若干结果文件中读取同名曲线（缺省为观测限）画在一张图上，
//! 用于比较不同信号模型或不同选择条件的结果。
//!
//! ## 依赖关系
//! - 使用 `cli/graphs.rs` 定义的 GraphsArgs
//! - 使用 `parsers/results.rs`, `plot/overlays.rs`

use crate::cli::graphs::GraphsArgs;
use crate::error::{ResplotError, Result};
use crate::models::Graph;
use crate::parsers::ResultsFile;
use crate::plot::overlays::{LabelledGraph, OverlaidGraphs};
use crate::utils::{output, progress};

use std::path::{Path, PathBuf};

/// 读取每个文件中的每个键；顺序为文件优先
fn load_graphs(inputs: &[PathBuf], keys: &[String]) -> Result<Vec<(String, Graph)>> {
    let mut graphs = Vec::with_capacity(inputs.len() * keys.len());
    for input in inputs {
        let file = ResultsFile::open(input)?;
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("results")
            .to_string();
        for key in keys {
            let label = if keys.len() == 1 {
                stem.clone()
            } else {
                format!("{}: {}", stem, key)
            };
            graphs.push((label, file.get_graph(key)?));
        }
    }
    Ok(graphs)
}

/// 给出图例时数目必须与曲线数一致
fn graph_legends(defaults: Vec<String>, legends: &[String]) -> Result<Vec<String>> {
    if legends.is_empty() {
        return Ok(defaults);
    }
    if legends.len() != defaults.len() {
        return Err(ResplotError::InvalidArgument(format!(
            "{} legend entries given for {} graphs",
            legends.len(),
            defaults.len()
        )));
    }
    Ok(legends.to_vec())
}

/// 执行 graphs 命令
pub fn execute(args: GraphsArgs) -> Result<()> {
    output::print_header("Overlaid Graphs");
    if let Some(missing) = args.inputs.iter().find(|p| !p.is_file()) {
        return Err(ResplotError::FileNotFound {
            path: missing.display().to_string(),
        });
    }
    let painter = args.style.painter()?;

    let spinner = progress::create_spinner("Reading graphs...");
    let loaded = load_graphs(&args.inputs, &args.keys);
    spinner.finish_and_clear();
    let (labels, graphs): (Vec<String>, Vec<Graph>) = loaded?.into_iter().unzip();
    let legends = graph_legends(labels, &args.legends)?;
    output::print_info(&format!(
        "Overlaying {} graph(s) from {} file(s)",
        graphs.len(),
        args.inputs.len()
    ));

    let name = figure_name(&args.output);
    let figure = OverlaidGraphs {
        name: name.clone(),
        x_title: args.x_title.clone(),
        y_title: args.y_title.clone(),
        x_range: args.x_range,
        y_range: args.y_range,
        log_x: args.log_x,
        log_y: !args.linear_y,
        pair_lines: args.pair_lines,
        horizontal_lines: args.horizontal_lines.clone(),
        extra_legend_lines: args.legend_lines.clone(),
        ..OverlaidGraphs::new(
            graphs
                .iter()
                .zip(legends)
                .map(|(graph, legend)| LabelledGraph { graph, legend })
                .collect(),
        )
    };

    for path in painter.render(&figure, &args.output)? {
        output::print_written(&name, &path);
    }
    Ok(())
}

fn figure_name(stem: &Path) -> String {
    stem.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("severalObservedLimits")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn write_limits(dir: &Path, name: &str, scale: f64) -> PathBuf {
        let path = dir.join(name);
        let content = format!(
            r#"{{
                "observed": {{"x": [1000, 2000, 3000], "y": [{}, {}, {}]}},
                "expected": {{"x": [1000, 2000, 3000], "y": [1.0, 0.1, 0.02]}}
            }}"#,
            scale,
            scale / 10.0,
            scale / 50.0
        );
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_labels_from_stems_and_keys() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_limits(dir.path(), "zprime.json", 1.0);
        let b = write_limits(dir.path(), "excited.json", 2.0);

        let single = load_graphs(&[a.clone(), b.clone()], &["observed".to_string()]).unwrap();
        let labels: Vec<&str> = single.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["zprime", "excited"]);
        assert_eq!(single[1].1.y()[0], 2.0);

        let keys = vec!["observed".to_string(), "expected".to_string()];
        let paired = load_graphs(&[a], &keys).unwrap();
        assert_eq!(paired[0].0, "zprime: observed");
        assert_eq!(paired[1].0, "zprime: expected");

        assert!(matches!(
            load_graphs(&[b], &["median".to_string()]),
            Err(ResplotError::MissingKey { .. })
        ));
    }

    #[test]
    fn test_graph_legends_count() {
        let defaults = vec!["a".to_string(), "b".to_string()];
        assert_eq!(graph_legends(defaults.clone(), &[]).unwrap(), defaults);
        assert!(graph_legends(defaults, &["only one".to_string()]).is_err());
    }

    #[test]
    fn test_execute_writes_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_limits(dir.path(), "zprime.json", 1.0);
        let b = write_limits(dir.path(), "excited.json", 2.0);
        let stem = dir.path().join("overlay");
        let argv = [
            "resplot".to_string(),
            "graphs".to_string(),
            a.to_string_lossy().into_owned(),
            b.to_string_lossy().into_owned(),
            "--keys".to_string(),
            "observed,expected".to_string(),
            "--pair-lines".to_string(),
            "--format".to_string(),
            "svg".to_string(),
            "-o".to_string(),
            stem.to_string_lossy().into_owned(),
        ];
        let args = match Cli::try_parse_from(argv).unwrap().command {
            Commands::Graphs(args) => args,
            _ => panic!("expected graphs"),
        };
        execute(args).unwrap();
        assert!(dir.path().join("overlay.svg").is_file());
    }
}
