//! # compare 子命令实现
//!
//! 从结果文件中取出数据直方图与若干预测直方图，按 `--mode` 绘制：
//! 数据与预测加比值栏、预测折线叠加，或预测堆叠。
//!
//! ## 依赖关系
//! - 使用 `cli/compare.rs` 定义的 CompareArgs
//! - 使用 `parsers/results.rs`, `plot/histograms.rs`, `plot/overlays.rs`

use crate::cli::compare::{CompareArgs, CompareMode};
use crate::error::{ResplotError, Result};
use crate::models::Hist1D;
use crate::parsers::ResultsFile;
use crate::plot::histograms::{DataWithPredictions, Prediction};
use crate::plot::overlays::{OverlaidHistograms, StackedHistograms};
use crate::utils::output;

use std::path::{Path, PathBuf};

/// 预测的图例：缺省使用键名，给出时数目必须一致
fn prediction_legends(keys: &[String], legends: &[String]) -> Result<Vec<String>> {
    if legends.is_empty() {
        return Ok(keys.to_vec());
    }
    if legends.len() != keys.len() {
        return Err(ResplotError::InvalidArgument(format!(
            "{} legend entries given for {} predictions",
            legends.len(),
            keys.len()
        )));
    }
    Ok(legends.to_vec())
}

fn default_output(mode: CompareMode) -> PathBuf {
    let stem = match mode {
        CompareMode::Ratio => "dataWithPredictions",
        CompareMode::Overlay => "overlaidHistograms",
        CompareMode::Stack => "stackedHistograms",
    };
    Path::new("plots").join(stem)
}

fn figure_name(stem: &Path) -> String {
    stem.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("comparison")
        .to_string()
}

/// 执行 compare 命令
pub fn execute(args: CompareArgs) -> Result<()> {
    output::print_header(match args.mode {
        CompareMode::Ratio => "Data With Predictions",
        CompareMode::Overlay => "Overlaid Histograms",
        CompareMode::Stack => "Stacked Histograms",
    });
    if !args.input.is_file() {
        return Err(ResplotError::FileNotFound {
            path: args.input.display().to_string(),
        });
    }
    if args.no_data && args.mode == CompareMode::Ratio {
        return Err(ResplotError::InvalidArgument(
            "ratio mode needs the data histogram; drop --no-data or pick another --mode".to_string(),
        ));
    }
    let painter = args.style.painter()?;
    let legends = prediction_legends(&args.predictions, &args.legends)?;

    let file = ResultsFile::open(&args.input)?;
    let data = if args.no_data {
        None
    } else {
        Some(file.get_hist(&args.data)?)
    };
    let predictions: Vec<Hist1D> = args
        .predictions
        .iter()
        .map(|key| file.get_hist(key))
        .collect::<Result<_>>()?;
    output::print_info(&format!(
        "Comparing {} prediction(s){}",
        predictions.len(),
        data.as_ref().map_or(String::new(), |_| format!(" with '{}'", args.data))
    ));

    let stem = args.output.clone().unwrap_or_else(|| default_output(args.mode));
    let name = figure_name(&stem);
    let entries: Vec<Prediction> = predictions
        .iter()
        .zip(legends)
        .map(|(hist, legend)| Prediction { hist, legend })
        .collect();

    let written = match args.mode {
        CompareMode::Ratio => {
            let data = data.as_ref().ok_or_else(|| ResplotError::MissingKey {
                key: args.data.clone(),
                path: args.input.display().to_string(),
            })?;
            let figure = DataWithPredictions {
                name: name.clone(),
                x_title: args.x_title.clone(),
                data_y_title: args.y_title.clone(),
                ratio_y_title: args.ratio_title.clone(),
                x_range: args.x_range,
                log_x: args.log_x,
                log_y: !args.linear_y,
                ..DataWithPredictions::new(data, entries)
            };
            painter.render(&figure, &stem)?
        }
        CompareMode::Overlay => {
            let figure = OverlaidHistograms {
                name: name.clone(),
                data_legend: args.data_legend.clone(),
                x_title: args.x_title.clone(),
                y_title: args.y_title.clone(),
                x_range: args.x_range,
                y_range: args.y_range,
                log_x: args.log_x,
                log_y: !args.linear_y,
                extra_lines: args.extra_lines.clone(),
                ..OverlaidHistograms::new(entries, data.as_ref())
            };
            painter.render(&figure, &stem)?
        }
        CompareMode::Stack => {
            let figure = StackedHistograms {
                name: name.clone(),
                data_legend: args.data_legend.clone(),
                x_title: args.x_title.clone(),
                y_title: args.y_title.clone(),
                ratio_y_title: args.ratio_title.clone(),
                ratio: args.ratio,
                x_range: args.x_range,
                y_range: args.y_range,
                log_x: args.log_x,
                log_y: !args.linear_y,
                extra_lines: args.extra_lines.clone(),
                ..StackedHistograms::new(entries, data.as_ref())
            };
            painter.render(&figure, &stem)?
        }
    };

    for path in written {
        output::print_written(&name, &path);
    }
    Ok(())
}
