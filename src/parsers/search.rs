//! # 搜索阶段结果加载器
//!
//! 从结果文件读取搜索阶段的全部对象，构造 `SearchResults`。
//!
//! ## 键与数组含义
//! ```text
//! FitRange                            [low, high]
//! logLOfFitToData / chi2OfFitToData    [stat, pvalue]
//! bumpHunterStatOfFitToData           [stat, pvalue]
//! bumpHunterPLowHigh                  [stat, low edge, high edge]
//! NDF                                 [ndf]
//! excludeWindowNums                   [flag, low edge, high edge]
//! BHLogLAndChi2OfRemainderAfterWindow [BH pvalue, logL pvalue, ...]
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/search.rs` 使用
//! - 使用 `parsers/results.rs`, `models/search.rs`

use crate::error::Result;
use crate::models::{ObservedStat, RemainderPValues, SearchResults};
use crate::parsers::results::ResultsFile;

use std::path::Path;

/// 读取搜索阶段结果文件
///
/// 只有文件标记了排除窗口且 `permit_window` 为真时才读取剩余谱 p 值，
/// 并重新计算剩余谱 χ² 的 p 值。
pub fn load_search_results(path: &Path, permit_window: bool) -> Result<SearchResults> {
    let file = ResultsFile::open(path)?;
    search_results_from(&file, permit_window)
}

/// 从已读取的结果文件构造搜索结果
pub fn search_results_from(file: &ResultsFile, permit_window: bool) -> Result<SearchResults> {
    let fit_range = file.get_vector_min_len("FitRange", 2)?;
    let bump_hunter_of_fit = file.get_vector_min_len("bumpHunterStatOfFitToData", 2)?;
    let log_l_of_fit = file.get_vector_min_len("logLOfFitToData", 2)?;
    let chi2_of_fit = file.get_vector_min_len("chi2OfFitToData", 2)?;
    let bump_low_high = file.get_vector_min_len("bumpHunterPLowHigh", 3)?;
    let window = file.get_vector_min_len("excludeWindowNums", 3)?;

    let mut results = SearchResults {
        source: file.path().to_string(),
        data: file.get_hist("basicData")?,
        background: file.get_hist("basicBkgFrom4ParamFit")?,
        residual: file.get_hist("residualHist")?,
        relative_difference: file.get_hist("relativeDiffHist")?,
        significance_of_difference: file.get_hist("sigOfDiffHist")?,
        log_likelihood_pseudo: file.get_hist("logLikelihoodStatHistNullCase")?,
        chi2_pseudo: file.get_hist("chi2StatHistNullCase")?,
        bump_hunter_pseudo: file.get_hist("bumpHunterStatHistNullCase")?,
        bump_hunter_tomography: file.get_graph("bumpHunterTomographyFromPseudoexperiments")?,
        fit_low: fit_range[0],
        fit_high: fit_range[1],
        log_likelihood: ObservedStat {
            value: log_l_of_fit[0],
            pvalue: log_l_of_fit[1],
        },
        chi2: ObservedStat {
            value: chi2_of_fit[0],
            pvalue: chi2_of_fit[1],
        },
        bump_hunter: ObservedStat {
            value: bump_low_high[0],
            pvalue: bump_hunter_of_fit[1],
        },
        bump_low_edge: bump_low_high[1],
        bump_high_edge: bump_low_high[2],
        ndf: file.get_scalar("NDF")?,
        exclude_window: (window[0] + 0.5).floor() as i64 != 0,
        window_low_edge: window[1],
        window_high_edge: window[2],
        remainder: None,
    };

    if results.exclude_window && permit_window {
        let remainder = file.get_vector_min_len("BHLogLAndChi2OfRemainderAfterWindow", 2)?;
        let (_, chi2_pvalue) = results.remainder_chi2();
        results.remainder = Some(RemainderPValues {
            bump_hunter: remainder[0],
            log_likelihood: remainder[1],
            chi2: chi2_pvalue,
        });
    }

    Ok(results)
}
