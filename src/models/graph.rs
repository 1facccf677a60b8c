//! # 曲线（图）数据模型
//!
//! 对应一组按 x 排序的点，可选非对称 y 误差（用于期望限的 ±1σ/±2σ 带）。
//!
//! ## 功能
//! - 线性插值/外推求值
//! - 对数插值求值（ln y 对 x 线性）
//! - 两条曲线的交点搜索（二分法）
//!
//! ## 依赖关系
//! - 被 `parsers/results.rs` 构造
//! - 被 `models/limits.rs`, `plot/limits.rs` 使用

use crate::error::{ResplotError, Result};

/// 交点二分搜索的收敛宽度
pub const INTERSECTION_TOLERANCE: f64 = 0.001;

/// 二分搜索的最大迭代次数
const MAX_BISECTIONS: usize = 200;

/// 曲线
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    /// 名称
    pub name: String,
    /// 点的 x 坐标（升序）
    x: Vec<f64>,
    /// 点的 y 坐标
    y: Vec<f64>,
    /// y 下误差
    ey_low: Option<Vec<f64>>,
    /// y 上误差
    ey_high: Option<Vec<f64>>,
}

impl Graph {
    /// 由点集创建曲线（按 x 排序）
    pub fn new(name: impl Into<String>, x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        Graph::with_errors(name, x, y, None, None)
    }

    /// 由点集与非对称 y 误差创建曲线
    pub fn with_errors(
        name: impl Into<String>,
        x: Vec<f64>,
        y: Vec<f64>,
        ey_low: Option<Vec<f64>>,
        ey_high: Option<Vec<f64>>,
    ) -> Result<Self> {
        let name = name.into();
        if x.len() != y.len() {
            return Err(malformed(
                &name,
                format!("{} x values but {} y values", x.len(), y.len()),
            ));
        }
        if x.is_empty() {
            return Err(malformed(&name, "graph has no points".to_string()));
        }
        for (label, errs) in [("ey_low", &ey_low), ("ey_high", &ey_high)] {
            if let Some(e) = errs {
                if e.len() != x.len() {
                    return Err(malformed(
                        &name,
                        format!("{} points but {} {} values", x.len(), e.len(), label),
                    ));
                }
            }
        }

        let mut order: Vec<usize> = (0..x.len()).collect();
        order.sort_by(|&a, &b| x[a].total_cmp(&x[b]));
        let pick = |v: &[f64]| order.iter().map(|&i| v[i]).collect::<Vec<_>>();

        Ok(Graph {
            x: pick(x.as_slice()),
            y: pick(y.as_slice()),
            ey_low: ey_low.as_deref().map(pick),
            ey_high: ey_high.as_deref().map(pick),
            name,
        })
    }

    /// 点数
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// 是否带 y 误差
    pub fn has_errors(&self) -> bool {
        self.ey_low.is_some() || self.ey_high.is_some()
    }

    /// 第 i 点的误差带下沿
    pub fn band_low(&self, i: usize) -> f64 {
        self.y[i] - self.ey_low.as_ref().map_or(0.0, |e| e[i])
    }

    /// 第 i 点的误差带上沿
    pub fn band_high(&self, i: usize) -> f64 {
        self.y[i] + self.ey_high.as_ref().map_or(0.0, |e| e[i])
    }

    /// x 范围（首末点）
    pub fn x_range(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    /// 最小 y（含误差带下沿）
    pub fn min_y(&self) -> f64 {
        (0..self.len())
            .map(|i| self.band_low(i))
            .fold(f64::INFINITY, f64::min)
    }

    /// 最大 y（含误差带上沿）
    pub fn max_y(&self) -> f64 {
        (0..self.len())
            .map(|i| self.band_high(i))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// 线性插值求值
    ///
    /// 超出范围时用两端最近的两点线性外推；只有一个点时返回该点 y。
    pub fn eval(&self, x: f64) -> f64 {
        let n = self.len();
        if n == 1 {
            return self.y[0];
        }
        // 所在区间左端点下标，截断到 [0, n-2] 实现两端外推
        let upper = self.x.partition_point(|&xi| xi <= x);
        let low = upper.saturating_sub(1).min(n - 2);
        let (x1, x2) = (self.x[low], self.x[low + 1]);
        let (y1, y2) = (self.y[low], self.y[low + 1]);
        if x2 == x1 {
            return y1;
        }
        y1 + (x - x1) * (y2 - y1) / (x2 - x1)
    }

    /// 对数插值求值：在包含 x 的区间内 ln y 随 x 线性变化
    ///
    /// 多个区间包含 x 时取最后一个；x 不在曲线范围内，
    /// 或所在区间有非正端点时返回 None。
    pub fn eval_log(&self, x: f64) -> Option<f64> {
        let mut result = None;
        for i in 0..self.len().saturating_sub(1) {
            let (x1, x2) = (self.x[i], self.x[i + 1]);
            if x1 > x || x2 < x || x2 == x1 {
                continue;
            }
            if self.y[i] <= 0.0 || self.y[i + 1] <= 0.0 {
                result = None;
                continue;
            }
            let (ly1, ly2) = (self.y[i].ln(), self.y[i + 1].ln());
            let slope = (ly2 - ly1) / (x2 - x1);
            result = Some((ly1 + slope * (x - x1)).exp());
        }
        result
    }

    fn value_at(&self, x: f64, log: bool) -> f64 {
        if log {
            self.eval_log(x).unwrap_or(f64::NAN)
        } else {
            self.eval(x)
        }
    }

    /// 求两条曲线的交点
    ///
    /// 在 `first` 的每个相邻点区间内检查两曲线的高低关系是否翻转，
    /// 若翻转则二分搜索至区间宽度不超过 [`INTERSECTION_TOLERANCE`]。
    /// `log_first`/`log_second` 控制各自是否按对数插值。
    pub fn intersections(first: &Graph, second: &Graph, log_first: bool, log_second: bool) -> Vec<f64> {
        let mut crossings = Vec::new();
        let (second_lo, second_hi) = second.x_range();

        for point in 0..first.len().saturating_sub(1) {
            let mut x1 = first.x[point];
            let mut x2 = first.x[point + 1];

            if first.eval(x1) <= 0.0 || second.eval(x1) <= 0.0 || second_lo > x1 || second_hi < x2 {
                continue;
            }

            let first_y1 = first.y[point];
            let first_y2 = first.y[point + 1];
            let second_y1 = second.value_at(x1, log_second);
            let second_y2 = second.value_at(x2, log_second);

            let higher_at_left = first_y1 > second_y1;
            let higher_at_right = first_y2 > second_y2;
            if higher_at_left == higher_at_right {
                continue;
            }

            let mut x_test = 0.5 * (x1 + x2);
            let mut iterations = 0;
            while (x1 - x2).abs() > INTERSECTION_TOLERANCE && iterations < MAX_BISECTIONS {
                let f1 = first.value_at(x1, log_first);
                let f2 = first.value_at(x2, log_first);
                let f_test = first.value_at(x_test, log_first);
                let s1 = second.value_at(x1, log_second);
                let s2 = second.value_at(x2, log_second);
                let s_test = second.value_at(x_test, log_second);

                if f1 >= s1 && f2 <= s2 {
                    if f_test > s_test {
                        x1 = x_test;
                    } else {
                        x2 = x_test;
                    }
                } else if f1 <= s1 && f2 >= s2 {
                    if f_test > s_test {
                        x2 = x_test;
                    } else {
                        x1 = x_test;
                    }
                }
                x_test = 0.5 * (x1 + x2);
                iterations += 1;
            }

            // 插值无定义时区间不会收缩
            if (x1 - x2).abs() <= INTERSECTION_TOLERANCE {
                crossings.push(x_test);
            }
        }

        crossings
    }
}

fn malformed(name: &str, reason: String) -> ResplotError {
    ResplotError::MalformedObject {
        kind: "graph".to_string(),
        name: name.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_sorted_on_construction() {
        let g = Graph::with_errors(
            "g",
            vec![3.0, 1.0, 2.0],
            vec![30.0, 10.0, 20.0],
            Some(vec![3.0, 1.0, 2.0]),
            None,
        )
        .unwrap();
        assert_eq!(g.x(), &[1.0, 2.0, 3.0]);
        assert_eq!(g.y(), &[10.0, 20.0, 30.0]);
        assert!((g.band_low(0) - 9.0).abs() < 1e-12);
        assert!((g.band_high(0) - 10.0).abs() < 1e-12);
        assert!((g.min_y() - 9.0).abs() < 1e-12);
        assert!((g.max_y() - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_eval_linear_and_extrapolation() {
        let g = Graph::new("g", vec![0.0, 1.0, 2.0], vec![0.0, 2.0, 6.0]).unwrap();
        assert!((g.eval(0.5) - 1.0).abs() < 1e-12);
        assert!((g.eval(1.5) - 4.0).abs() < 1e-12);
        assert!((g.eval(2.0) - 6.0).abs() < 1e-12);
        assert!((g.eval(-1.0) + 2.0).abs() < 1e-12);
        assert!((g.eval(3.0) - 10.0).abs() < 1e-12);

        let single = Graph::new("one", vec![1.0], vec![5.0]).unwrap();
        assert_eq!(single.eval(42.0), 5.0);
    }

    #[test]
    fn test_eval_log() {
        let g = Graph::new("g", vec![1.0, 2.0], vec![1.0, 100.0]).unwrap();
        let mid = g.eval_log(1.5).unwrap();
        assert!((mid - 10.0).abs() < 1e-9);
        assert!(g.eval_log(0.5).is_none());
        assert!(g.eval_log(2.5).is_none());
    }

    #[test]
    fn test_intersection_linear() {
        // y = x 与 y = 4 - x 交于 x = 2
        let rising = Graph::new("rising", vec![0.5, 1.0, 3.0, 3.5], vec![0.5, 1.0, 3.0, 3.5]).unwrap();
        let falling = Graph::new("falling", vec![0.0, 4.0], vec![4.0, 0.1]).unwrap();
        let crossings = Graph::intersections(&rising, &falling, false, false);
        assert_eq!(crossings.len(), 1);
        // falling 的斜率为 -0.975
        let expected = 4.0 / 1.975;
        assert!((crossings[0] - expected).abs() < 2.0 * INTERSECTION_TOLERANCE);
    }

    #[test]
    fn test_intersection_log_interpolated() {
        // 理论截面按指数下降，观测限为常数 1
        let theory = Graph::new("theory", vec![1.0, 2.0, 3.0], vec![100.0, 10.0, 0.1]).unwrap();
        let observed = Graph::new("observed", vec![0.5, 3.5], vec![1.0, 1.0]).unwrap();
        let crossings = Graph::intersections(&theory, &observed, true, false);
        assert_eq!(crossings.len(), 1);
        // 区间 [2, 3] 内 ln y 从 ln10 线性降到 ln0.1，过 0 在 x = 2.5
        assert!((crossings[0] - 2.5).abs() < 2.0 * INTERSECTION_TOLERANCE);
    }

    #[test]
    fn test_no_intersection_outside_coverage() {
        let theory = Graph::new("theory", vec![1.0, 2.0, 3.0], vec![100.0, 10.0, 0.1]).unwrap();
        // observed 不覆盖 [2, 3]
        let observed = Graph::new("observed", vec![0.5, 2.5], vec![1.0, 1.0]).unwrap();
        assert!(Graph::intersections(&theory, &observed, true, false).is_empty());
    }

    #[test]
    fn test_log_interpolation_through_zero() {
        // 信号截面在最后一点降到 0
        let theory = Graph::new("theory", vec![1.0, 2.0, 3.0], vec![100.0, 1.5, 0.0]).unwrap();
        let observed = Graph::new("observed", vec![1.0, 2.0, 3.0], vec![1.0, 1.0, 1.0]).unwrap();

        assert!(theory.eval_log(1.5).is_some());
        assert!(theory.eval_log(2.5).is_none());
        assert!(theory.eval_log(3.0).is_none());
        assert!(Graph::intersections(&theory, &observed, true, true).is_empty());
        assert!(Graph::intersections(&theory, &observed, true, false).is_empty());
    }

    #[test]
    fn test_malformed_graphs() {
        assert!(Graph::new("bad", vec![1.0, 2.0], vec![1.0]).is_err());
        assert!(Graph::new("empty", vec![], vec![]).is_err());
        assert!(Graph::with_errors("bad", vec![1.0], vec![1.0], Some(vec![]), None).is_err());
    }
}
