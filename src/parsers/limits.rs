//! # 限设定结果加载器
//!
//! ## 依赖关系
//! - 被 `commands/limits.rs` 使用
//! - 使用 `parsers/results.rs`, `models/limits.rs`

use crate::error::{ResplotError, Result};
use crate::models::{LimitResults, SignalCurve};
use crate::parsers::results::ResultsFile;

use std::path::Path;

/// 读取限设定结果文件
pub fn load_limit_results(path: &Path) -> Result<LimitResults> {
    let file = ResultsFile::open(path)?;
    limit_results_from(&file)
}

/// 从已读取的结果文件构造限设定结果
///
/// `signals` 列出信号曲线的键；`signalLegends` 缺省时图例即为键名。
pub fn limit_results_from(file: &ResultsFile) -> Result<LimitResults> {
    let signal_keys = if file.contains("signals") {
        file.get_labels("signals")?
    } else {
        Vec::new()
    };
    let legends = if file.contains("signalLegends") {
        let legends = file.get_labels("signalLegends")?;
        if legends.len() != signal_keys.len() {
            return Err(ResplotError::MalformedObject {
                kind: "list of strings".to_string(),
                name: "signalLegends".to_string(),
                reason: format!(
                    "{} legends for {} signals",
                    legends.len(),
                    signal_keys.len()
                ),
            });
        }
        legends
    } else {
        signal_keys.clone()
    };

    let signals = signal_keys
        .iter()
        .zip(legends)
        .map(|(key, legend)| {
            Ok(SignalCurve {
                legend,
                graph: file.get_graph(key)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let existing_limit = if file.contains("existingLimit") {
        Some(file.get_scalar("existingLimit")?)
    } else {
        None
    };

    Ok(LimitResults {
        source: file.path().to_string(),
        observed: file.get_graph("observed")?,
        expected_1sigma: file.get_graph("expected1sigma")?,
        expected_2sigma: file.get_graph("expected2sigma")?,
        signals,
        existing_limit,
    })
}
