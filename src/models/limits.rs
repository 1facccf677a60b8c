//! # 限设定结果数据模型
//!
//! 观测上限、期望上限（带 ±1σ/±2σ 误差）与若干理论信号截面曲线。
//!
//! ## 依赖关系
//! - 被 `parsers/limits.rs` 构造
//! - 被 `commands/limits.rs`, `plot/limits.rs` 使用
//! - 使用 `models/graph.rs`

use crate::models::Graph;

use serde::Serialize;

/// 一条理论信号曲线
#[derive(Debug, Clone)]
pub struct SignalCurve {
    /// 图例文字
    pub legend: String,
    pub graph: Graph,
}

/// 限设定结果
#[derive(Debug, Clone)]
pub struct LimitResults {
    pub source: String,
    pub observed: Graph,
    /// 期望中位数与 ±1σ 带
    pub expected_1sigma: Graph,
    /// 期望中位数与 ±2σ 带
    pub expected_2sigma: Graph,
    pub signals: Vec<SignalCurve>,
    /// 先前已排除的质量上限
    pub existing_limit: Option<f64>,
}

/// 某一信号的观测/期望排除质量
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalCrossings {
    pub signal: String,
    pub observed: Vec<f64>,
    pub expected: Vec<f64>,
}

impl LimitResults {
    /// 各信号曲线与观测限、期望限的交点
    ///
    /// 两条曲线都按 ln y 插值。
    pub fn crossings(&self) -> Vec<SignalCrossings> {
        self.signals
            .iter()
            .map(|signal| SignalCrossings {
                signal: signal.legend.clone(),
                observed: Graph::intersections(&signal.graph, &self.observed, true, true),
                expected: Graph::intersections(&signal.graph, &self.expected_1sigma, true, true),
            })
            .collect()
    }
}
