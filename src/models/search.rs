//! # 搜索阶段结果数据模型
//!
//! 保存搜索阶段结果文件中的直方图、赝实验统计分布、观测统计量与 p 值，
//! 以及 BumpHunter 区间和排除窗口边界。
//!
//! ## 依赖关系
//! - 被 `parsers/search.rs` 构造
//! - 被 `commands/search.rs` 使用
//! - 使用 `models/histogram.rs`, `models/graph.rs`, `models/statistics.rs`

use crate::models::statistics::{pvalue_uncertainty, tail_fraction};
use crate::models::{Graph, Hist1D};

use serde::Serialize;

/// 某一检验统计量的观测值与 p 值
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObservedStat {
    /// 数据的统计量
    pub value: f64,
    /// p 值
    pub pvalue: f64,
}

/// 三种检验统计量的 p 值误差
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PValueErrors {
    pub bump_hunter: f64,
    pub chi2: f64,
    pub log_likelihood: f64,
}

/// 排除窗口之外剩余谱的 p 值
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RemainderPValues {
    pub bump_hunter: f64,
    pub log_likelihood: f64,
    pub chi2: Option<f64>,
}

/// 搜索阶段结果
#[derive(Debug, Clone)]
pub struct SearchResults {
    /// 结果文件名（用于报告）
    pub source: String,

    // 谱与拟合
    pub data: Hist1D,
    pub background: Hist1D,
    pub residual: Hist1D,
    pub relative_difference: Hist1D,
    pub significance_of_difference: Hist1D,

    // 零假设下赝实验的统计量分布
    pub log_likelihood_pseudo: Hist1D,
    pub chi2_pseudo: Hist1D,
    pub bump_hunter_pseudo: Hist1D,
    pub bump_hunter_tomography: Graph,

    /// 拟合范围
    pub fit_low: f64,
    pub fit_high: f64,

    // 观测统计量
    pub log_likelihood: ObservedStat,
    pub chi2: ObservedStat,
    pub bump_hunter: ObservedStat,

    /// BumpHunter 最显著区间
    pub bump_low_edge: f64,
    pub bump_high_edge: f64,

    /// 拟合自由度
    pub ndf: f64,

    /// 是否排除了一个窗口
    pub exclude_window: bool,
    pub window_low_edge: f64,
    pub window_high_edge: f64,

    /// 剩余谱 p 值（仅当排除窗口且允许窗口时）
    pub remainder: Option<RemainderPValues>,
}

impl SearchResults {
    /// 排除窗口是否参与绘图与报告
    pub fn window_active(&self) -> bool {
        self.exclude_window && self.remainder.is_some()
    }

    /// 三种统计量 p 值的计数统计误差
    pub fn pvalue_errors(&self) -> PValueErrors {
        PValueErrors {
            bump_hunter: pvalue_uncertainty(
                &self.bump_hunter_pseudo,
                self.bump_hunter.value,
                self.bump_hunter.pvalue,
            ),
            chi2: pvalue_uncertainty(&self.chi2_pseudo, self.chi2.value, self.chi2.pvalue),
            log_likelihood: pvalue_uncertainty(
                &self.log_likelihood_pseudo,
                self.log_likelihood.value,
                self.log_likelihood.pvalue,
            ),
        }
    }

    /// 排除窗口后剩余谱的 χ² 及其 p 值
    ///
    /// χ² 只累加背景非空范围内、窗口之外、数据非零的分箱，
    /// 每箱贡献 `((d − b)/sqrt(b + δb²))²`；p 值为赝实验 χ² 分布的右尾比例。
    pub fn remainder_chi2(&self) -> (f64, Option<f64>) {
        let bkg = &self.background;
        let n = bkg.nbins();

        let mut first_bin = 0;
        for bin in 1..=n + 1 {
            first_bin = bin;
            if bkg.bin_content(bin) > 0.0 {
                break;
            }
        }
        let mut last_bin = 0;
        for bin in (1..=n + 1).rev() {
            last_bin = bin;
            if bkg.bin_content(bin) > 0.0 {
                break;
            }
        }

        let mut first_window_bin = 0;
        let mut last_window_bin = 0;
        if self.exclude_window {
            for bin in 1..=n + 1 {
                if (bkg.bin_low_edge(bin) - self.window_low_edge).abs() < 0.1 {
                    first_window_bin = bin;
                }
                if (bkg.bin_up_edge(bin) - self.window_high_edge).abs() < 0.1 {
                    last_window_bin = bin;
                }
            }
        }

        let mut chi2 = 0.0;
        for bin in first_bin..=last_bin {
            if self.exclude_window && bin >= first_window_bin && bin <= last_window_bin {
                continue;
            }
            let d = self.data.bin_content(bin);
            if d == 0.0 {
                continue;
            }
            let b = bkg.bin_content(bin);
            let delta_b = bkg.bin_error(bin);
            let term = (d - b) / (b + delta_b * delta_b).sqrt();
            chi2 += term * term;
        }

        (chi2, tail_fraction(&self.chi2_pseudo, chi2))
    }
}
