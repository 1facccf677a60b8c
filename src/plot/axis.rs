//! # 坐标轴工具
//!
//! 图表在变换后的线性坐标中绘制：对数轴的坐标为 `log10(v)`。
//! 对数 x 轴的刻度与标签不交给 plotters，而是按数量级手动放置。
//!
//! ## 功能
//! - `AxisScale`：数据值与绘图坐标互转
//! - 数量级取整
//! - 对数轴标签挑选（每个数量级内的 k·10^m）
//! - 对数轴细刻度（TeV/GeV 两种单位）
//! - 用户坐标到 NDC 的换算
//!
//! ## 依赖关系
//! - 被 `plot/` 下各图表使用
//! - 使用 `utils/latex.rs` 生成 10 的幂标签

use crate::error::{ResplotError, Result};
use crate::utils::latex::to_display_text;

use std::ops::Range;

/// 单个坐标轴的范围与刻度类型
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisScale {
    pub min: f64,
    pub max: f64,
    pub log: bool,
}

impl AxisScale {
    pub fn new(min: f64, max: f64, log: bool) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || max <= min {
            return Err(ResplotError::InvalidRange(format!(
                "axis range [{}, {}] is empty",
                min, max
            )));
        }
        if log && min <= 0.0 {
            return Err(ResplotError::InvalidRange(format!(
                "logarithmic axis needs a positive minimum, got {}",
                min
            )));
        }
        Ok(AxisScale { min, max, log })
    }

    pub fn linear(min: f64, max: f64) -> Result<Self> {
        AxisScale::new(min, max, false)
    }

    pub fn logarithmic(min: f64, max: f64) -> Result<Self> {
        AxisScale::new(min, max, true)
    }

    /// 数据值 → 绘图坐标（对数轴上非正值压到下限）
    pub fn to_coord(&self, v: f64) -> f64 {
        if self.log {
            if v > 0.0 {
                v.log10()
            } else {
                self.min.log10()
            }
        } else {
            v
        }
    }

    /// 绘图坐标范围，用于 `build_cartesian_2d`
    pub fn coord_range(&self) -> Range<f64> {
        self.to_coord(self.min)..self.to_coord(self.max)
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

// ─────────────────────────────────────────────────────────────
// 数量级
// ─────────────────────────────────────────────────────────────

/// `floor(log10|v|)`，0 的数量级记为 0
pub fn magnitude(v: f64) -> i32 {
    if v == 0.0 {
        return 0;
    }
    v.abs().log10().floor() as i32
}

/// 在最高位上向上取整：1100 → 2000
pub fn round_up_order_of_magnitude(v: f64) -> f64 {
    let scale = 10f64.powi(magnitude(v));
    (v / scale).ceil() * scale
}

/// 在最高位上向下取整：1900 → 1000
pub fn round_down_order_of_magnitude(v: f64) -> f64 {
    let scale = 10f64.powi(magnitude(v));
    (v / scale).floor() * scale
}

// ─────────────────────────────────────────────────────────────
// 对数轴标签与刻度
// ─────────────────────────────────────────────────────────────

/// 挑选对数轴上要标注的数值
///
/// 候选值为 `[x1, x2]` 内（两端按最高位取整）的 `k·10^m`，按数量级分组。
/// `suppress_first_order` 时最低数量级只保留第一个。数量超过 `n_labels` 时
/// 逐轮比较相邻两组：左组更长则去掉左组最大值，否则去掉右组最大值；
/// 只剩一组时去掉该组最大值。
pub fn log_axis_labels(x1: f64, x2: f64, n_labels: usize, suppress_first_order: bool) -> Vec<f64> {
    if x1 <= 0.0 || x2 <= x1 {
        return Vec::new();
    }
    let first_tick = round_up_order_of_magnitude(x1);
    let last_tick = round_down_order_of_magnitude(x2);

    let mut orders: Vec<Vec<f64>> = (magnitude(first_tick)..=magnitude(last_tick))
        .map(|order| {
            (1..10)
                .map(|k| k as f64 * 10f64.powi(order))
                .filter(|v| *v >= first_tick && *v <= last_tick)
                .collect()
        })
        .collect();

    if suppress_first_order {
        if let Some(lowest) = orders.first_mut() {
            lowest.truncate(1);
        }
    }

    let count = |orders: &[Vec<f64>]| orders.iter().map(Vec::len).sum::<usize>();
    while count(&orders) > n_labels {
        if orders.len() == 1 {
            orders[0].pop();
            continue;
        }
        for order in 0..orders.len() - 1 {
            if orders[order].len() > orders[order + 1].len() {
                orders[order].pop();
            } else {
                orders[order + 1].pop();
            }
        }
    }

    orders.into_iter().flatten().collect()
}

/// 对数轴上的一个刻度
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisTick {
    pub value: f64,
    /// 整 TeV 处为长刻度
    pub major: bool,
}

/// 对数 x 轴的细刻度
///
/// 只在 `10 <= x2/x1 <= 100` 时给出（`override_range` 可强制给出）。
/// `x2 <= 1000` 视为 TeV 单位：每 0.1 TeV 一个刻度，整 TeV 为长刻度；
/// 否则为 GeV：从 `floor(x1)` 起每 100 GeV 一个刻度，1000 的整数倍为长刻度。
pub fn log_axis_ticks(x1: f64, x2: f64, override_range: bool) -> Vec<AxisTick> {
    if x1 <= 0.0 || x2 <= x1 {
        return Vec::new();
    }
    let ratio = x2 / x1;
    if (ratio > 100.0 || ratio < 10.0) && !override_range {
        return Vec::new();
    }

    if x2 <= 1000.0 {
        let start = (x1 * 10.0).ceil() as i64;
        let stop = (x2 * 10.0).floor() as i64;
        (start..=stop)
            .map(|k| AxisTick {
                value: k as f64 / 10.0,
                major: k % 10 == 0,
            })
            .filter(|t| t.value >= x1 && t.value <= x2)
            .collect()
    } else {
        let start = x1.floor() as i64;
        let stop = x2.ceil() as i64;
        (start..stop)
            .step_by(100)
            .map(|i| AxisTick {
                value: i as f64,
                major: i % 1000 == 0,
            })
            .filter(|t| t.value >= x1 && t.value <= x2)
            .collect()
    }
}

/// 用户坐标 → 画布 NDC 横坐标
///
/// 轴占据 `[left_margin, 1 - right_margin]`，对数轴按 ln 比例。
pub fn x_user_to_ndc(val: f64, min: f64, max: f64, log: bool, left_margin: f64, right_margin: f64) -> f64 {
    let fraction = if log {
        (val.ln() - min.ln()) / (max.ln() - min.ln())
    } else {
        (val - min) / (max - min)
    };
    left_margin + fraction * (1.0 - left_margin - right_margin)
}

// ─────────────────────────────────────────────────────────────
// 标签文字
// ─────────────────────────────────────────────────────────────

/// 轴标签数值：整数不带小数点，其余去掉多余的零
pub fn format_axis_value(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 * v.abs().max(1.0) {
        return format!("{}", v.round() as i64);
    }
    let s = format!("{:.6}", v);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// 10 的幂标签：1, 10, 10², 10⁻³ …
pub fn power_of_ten_label(exponent: i32) -> String {
    match exponent {
        0 => "1".to_string(),
        1 => "10".to_string(),
        k => to_display_text(&format!("10^{{{}}}", k)),
    }
}

/// 对数轴坐标（log10 值）的标签：只在整数处给出
pub fn log_coord_label(coord: f64) -> String {
    let rounded = coord.round();
    if (coord - rounded).abs() < 1e-6 {
        power_of_ten_label(rounded as i32)
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_scale_log() {
        let axis = AxisScale::logarithmic(1.0, 1000.0).unwrap();
        let range = axis.coord_range();
        assert!(range.start.abs() < 1e-12);
        assert!((range.end - 3.0).abs() < 1e-12);
        assert!((axis.to_coord(100.0) - 2.0).abs() < 1e-12);
        assert!(axis.contains(1000.0) && !axis.contains(1000.1));
        // 非正值压到下限
        assert_eq!(axis.to_coord(-5.0), 0.0);
    }

    #[test]
    fn test_axis_scale_rejects_bad_ranges() {
        assert!(AxisScale::linear(1.0, 1.0).is_err());
        assert!(AxisScale::logarithmic(0.0, 10.0).is_err());
        assert!(AxisScale::linear(f64::NAN, 1.0).is_err());
        assert!(AxisScale::linear(-1.0, 1.0).is_ok());
    }

    #[test]
    fn test_magnitude_rounding() {
        assert_eq!(magnitude(0.0), 0);
        assert_eq!(magnitude(1100.0), 3);
        assert_eq!(magnitude(0.05), -2);
        assert_eq!(magnitude(-250.0), 2);
        assert_eq!(round_up_order_of_magnitude(1100.0), 2000.0);
        assert_eq!(round_down_order_of_magnitude(1900.0), 1000.0);
        assert_eq!(round_up_order_of_magnitude(3000.0), 3000.0);
    }

    #[test]
    fn test_labels_single_order() {
        let labels = log_axis_labels(1100.0, 8000.0, 7, false);
        assert_eq!(labels, vec![2000.0, 3000.0, 4000.0, 5000.0, 6000.0, 7000.0, 8000.0]);

        // 只有一个数量级时从顶端去掉
        let labels = log_axis_labels(1100.0, 8000.0, 5, false);
        assert_eq!(labels, vec![2000.0, 3000.0, 4000.0, 5000.0, 6000.0]);
    }

    #[test]
    fn test_labels_two_orders_thinned() {
        let labels = log_axis_labels(200.0, 9000.0, 7, false);
        assert_eq!(labels, vec![200.0, 300.0, 400.0, 500.0, 1000.0, 2000.0, 3000.0]);
    }

    #[test]
    fn test_labels_suppress_first_order() {
        let labels = log_axis_labels(200.0, 9000.0, 7, true);
        assert_eq!(
            labels,
            vec![200.0, 1000.0, 2000.0, 3000.0, 4000.0, 5000.0, 6000.0]
        );
    }

    #[test]
    fn test_labels_tev_and_degenerate() {
        let labels = log_axis_labels(1.1, 8.0, 7, false);
        assert_eq!(labels, vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert!(log_axis_labels(0.0, 8.0, 7, false).is_empty());
        assert!(log_axis_labels(8.0, 2.0, 7, false).is_empty());
    }

    #[test]
    fn test_ticks_range_condition() {
        // 比值小于 10
        assert!(log_axis_ticks(1.1, 8.0, false).is_empty());
        assert!(!log_axis_ticks(1.1, 8.0, true).is_empty());
        // 比值大于 100
        assert!(log_axis_ticks(10.0, 5000.0, false).is_empty());
    }

    #[test]
    fn test_ticks_tev() {
        let ticks = log_axis_ticks(0.5, 8.0, false);
        assert_eq!(ticks.len(), 76);
        assert!((ticks[0].value - 0.5).abs() < 1e-12);
        let majors: Vec<f64> = ticks.iter().filter(|t| t.major).map(|t| t.value).collect();
        assert_eq!(majors, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_ticks_gev() {
        let ticks = log_axis_ticks(1000.0, 20000.0, false);
        assert_eq!(ticks.len(), 190);
        assert_eq!(ticks.iter().filter(|t| t.major).count(), 19);
        assert_eq!(ticks.last().map(|t| t.value), Some(19900.0));
    }

    #[test]
    fn test_x_user_to_ndc() {
        let ndc = x_user_to_ndc(5.0, 0.0, 10.0, false, 0.1, 0.1);
        assert!((ndc - 0.5).abs() < 1e-12);
        let ndc = x_user_to_ndc(100.0, 10.0, 1000.0, true, 0.15, 0.05);
        assert!((ndc - 0.55).abs() < 1e-12);
    }

    #[test]
    fn test_label_text() {
        assert_eq!(format_axis_value(2000.0), "2000");
        assert_eq!(format_axis_value(3.0 * 0.1), "0.3");
        assert_eq!(format_axis_value(-1.5), "-1.5");
        assert_eq!(power_of_ten_label(0), "1");
        assert_eq!(power_of_ten_label(3), "10³");
        assert_eq!(power_of_ten_label(-2), "10⁻²");
        assert_eq!(log_coord_label(2.0), "10²");
        assert_eq!(log_coord_label(2.5), "");
    }
}
