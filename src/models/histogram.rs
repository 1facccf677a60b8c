//! # 一维直方图数据模型
//!
//! 采用 ROOT 风格的分箱编号：0 为下溢箱，`1..=n` 为常规箱，`n+1` 为上溢箱。
//! 绘图代码与 p 值计算都依赖这种编号方式，因此内部存储长度为 `n+2`。
//!
//! ## 功能
//! - 分箱查询（内容、误差、边界、中心）
//! - 积分、极值、定位分箱
//! - 比值直方图、统计量直方图
//! - 由非空分箱推断坐标轴范围
//!
//! ## 依赖关系
//! - 被 `parsers/results.rs` 构造
//! - 被 `models/search.rs`, `plot/` 使用

use crate::error::{ResplotError, Result};

/// 一维直方图
#[derive(Debug, Clone, PartialEq)]
pub struct Hist1D {
    /// 名称
    pub name: String,
    /// 分箱边界（长度 n+1，严格递增）
    edges: Vec<f64>,
    /// 分箱内容（长度 n+2，含下溢/上溢）
    contents: Vec<f64>,
    /// 分箱误差（长度 n+2）
    errors: Vec<f64>,
}

impl Hist1D {
    /// 由分箱边界创建空直方图
    pub fn new(name: impl Into<String>, edges: Vec<f64>) -> Result<Self> {
        let name = name.into();
        validate_edges(&name, &edges)?;
        let len = edges.len() + 1;
        Ok(Hist1D {
            name,
            edges,
            contents: vec![0.0; len],
            errors: vec![0.0; len],
        })
    }

    /// 等宽分箱的空直方图
    pub fn uniform(name: impl Into<String>, nbins: usize, low: f64, high: f64) -> Result<Self> {
        let name = name.into();
        if nbins == 0 || high <= low || !low.is_finite() || !high.is_finite() {
            return Err(ResplotError::MalformedObject {
                kind: "histogram".to_string(),
                name,
                reason: format!("cannot build {} bins on [{}, {}]", nbins, low, high),
            });
        }
        let width = (high - low) / nbins as f64;
        let edges = (0..=nbins).map(|i| low + i as f64 * width).collect();
        Hist1D::new(name, edges)
    }

    /// 由常规分箱内容与误差创建直方图
    ///
    /// `errors` 缺省时取 `sqrt(|content|)`。
    pub fn from_parts(
        name: impl Into<String>,
        edges: Vec<f64>,
        contents: &[f64],
        errors: Option<&[f64]>,
        underflow: f64,
        overflow: f64,
    ) -> Result<Self> {
        let mut hist = Hist1D::new(name, edges)?;
        let n = hist.nbins();

        if contents.len() != n {
            return Err(ResplotError::MalformedObject {
                kind: "histogram".to_string(),
                name: hist.name,
                reason: format!("{} bin edges but {} contents", n + 1, contents.len()),
            });
        }
        if let Some(errs) = errors {
            if errs.len() != n {
                return Err(ResplotError::MalformedObject {
                    kind: "histogram".to_string(),
                    name: hist.name,
                    reason: format!("{} contents but {} errors", n, errs.len()),
                });
            }
        }

        for (i, &c) in contents.iter().enumerate() {
            hist.contents[i + 1] = c;
            hist.errors[i + 1] = match errors {
                Some(errs) => errs[i],
                None => c.abs().sqrt(),
            };
        }
        hist.contents[0] = underflow;
        hist.errors[0] = underflow.abs().sqrt();
        hist.contents[n + 1] = overflow;
        hist.errors[n + 1] = overflow.abs().sqrt();

        Ok(hist)
    }

    /// 由一组统计量生成直方图
    ///
    /// 分箱数为条目数的十分之一（至少 1），范围向两侧各扩展 5%。
    pub fn from_statistics(name: impl Into<String>, values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(ResplotError::Statistics(
                "cannot histogram an empty list of statistics".to_string(),
            ));
        }
        let nbins = (values.len() / 10).max(1);

        let max_val = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min_val = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mut axis_range = max_val - min_val;
        if axis_range <= 0.0 {
            axis_range = if max_val == 0.0 { 1.0 } else { max_val.abs() };
        }

        let mut hist = Hist1D::uniform(
            name,
            nbins,
            min_val - 0.05 * axis_range,
            max_val + 0.05 * axis_range,
        )?;
        for &v in values {
            hist.fill(v);
        }
        Ok(hist)
    }

    /// 常规分箱数
    pub fn nbins(&self) -> usize {
        self.edges.len() - 1
    }

    /// 坐标轴下限
    pub fn x_min(&self) -> f64 {
        self.edges[0]
    }

    /// 坐标轴上限
    pub fn x_max(&self) -> f64 {
        self.edges[self.nbins()]
    }

    /// 分箱内容（越界返回 0）
    pub fn bin_content(&self, bin: usize) -> f64 {
        self.contents.get(bin).copied().unwrap_or(0.0)
    }

    /// 分箱误差（越界返回 0）
    pub fn bin_error(&self, bin: usize) -> f64 {
        self.errors.get(bin).copied().unwrap_or(0.0)
    }

    pub fn set_bin_content(&mut self, bin: usize, value: f64) {
        if let Some(c) = self.contents.get_mut(bin) {
            *c = value;
        }
    }

    pub fn set_bin_error(&mut self, bin: usize, value: f64) {
        if let Some(e) = self.errors.get_mut(bin) {
            *e = value;
        }
    }

    /// 分箱下边界
    ///
    /// 下溢箱向左外推一个首箱宽度，上溢箱返回坐标轴上限。
    pub fn bin_low_edge(&self, bin: usize) -> f64 {
        let n = self.nbins();
        match bin {
            0 => self.edges[0] - (self.edges[1] - self.edges[0]),
            b if b <= n + 1 => self.edges[(b - 1).min(n)],
            _ => self.edges[n],
        }
    }

    /// 分箱宽度（下溢/上溢箱取相邻常规箱宽度）
    pub fn bin_width(&self, bin: usize) -> f64 {
        let n = self.nbins();
        let b = bin.clamp(1, n);
        self.edges[b] - self.edges[b - 1]
    }

    /// 分箱中心
    pub fn bin_center(&self, bin: usize) -> f64 {
        self.bin_low_edge(bin) + 0.5 * self.bin_width(bin)
    }

    /// 分箱上边界
    pub fn bin_up_edge(&self, bin: usize) -> f64 {
        self.bin_low_edge(bin) + self.bin_width(bin)
    }

    /// 定位 x 所在分箱
    pub fn find_bin(&self, x: f64) -> usize {
        let n = self.nbins();
        if x.is_nan() || x < self.edges[0] {
            return 0;
        }
        if x >= self.edges[n] {
            return n + 1;
        }
        // partition_point 返回第一个大于 x 的边界位置
        self.edges.partition_point(|&e| e <= x)
    }

    /// 常规分箱积分
    pub fn integral(&self) -> f64 {
        self.integral_range(1, self.nbins())
    }

    /// 闭区间 `[first, last]` 的分箱积分，范围截断到 `0..=n+1`
    pub fn integral_range(&self, first: usize, last: usize) -> f64 {
        let last = last.min(self.nbins() + 1);
        if first > last {
            return 0.0;
        }
        self.contents[first..=last].iter().sum()
    }

    /// 内容最大的常规分箱（取第一个）
    pub fn maximum_bin(&self) -> usize {
        let mut best = 1;
        for bin in 1..=self.nbins() {
            if self.contents[bin] > self.contents[best] {
                best = bin;
            }
        }
        best
    }

    /// 常规分箱最大内容
    pub fn maximum(&self) -> f64 {
        self.contents[self.maximum_bin()]
    }

    /// 常规分箱最小内容
    pub fn minimum(&self) -> f64 {
        self.regular_contents()
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min)
    }

    /// 常规分箱内容切片
    pub fn regular_contents(&self) -> &[f64] {
        &self.contents[1..=self.nbins()]
    }

    /// 清空内容与误差，保留分箱
    pub fn reset(&mut self) {
        self.contents.iter_mut().for_each(|c| *c = 0.0);
        self.errors.iter_mut().for_each(|e| *e = 0.0);
    }

    /// 逐箱相加（误差平方和开方）
    pub fn add(&mut self, other: &Hist1D) -> Result<()> {
        if other.nbins() != self.nbins() {
            return Err(ResplotError::MalformedObject {
                kind: "histogram".to_string(),
                name: other.name.clone(),
                reason: format!(
                    "cannot add {} bins to '{}' with {} bins",
                    other.nbins(),
                    self.name,
                    self.nbins()
                ),
            });
        }
        for bin in 0..self.contents.len() {
            self.contents[bin] += other.contents[bin];
            self.errors[bin] = self.errors[bin].hypot(other.errors[bin]);
        }
        Ok(())
    }

    /// 单位权重填充
    pub fn fill(&mut self, x: f64) {
        let bin = self.find_bin(x);
        self.contents[bin] += 1.0;
        self.errors[bin] = (self.errors[bin] * self.errors[bin] + 1.0).sqrt();
    }

    /// 非空分箱的首末编号，两侧各带一个空箱（若存在）
    ///
    /// 全部为空时返回 `(1, n)`。
    pub fn filled_bin_range(&self) -> (usize, usize) {
        let n = self.nbins();
        let mut first = 0;
        while self.bin_content(first + 1) == 0.0 && first < n {
            first += 1;
        }
        let mut last = n + 1;
        while last > 0 && self.bin_content(last - 1) == 0.0 {
            last -= 1;
        }
        if first > last {
            return (1, n);
        }
        (first, last)
    }

    /// 非空分箱覆盖的 x 范围（首箱下边界，末箱上边界）
    pub fn filled_x_range(&self) -> (f64, f64) {
        let (first, last) = self.filled_bin_range();
        (self.bin_low_edge(first), self.bin_low_edge(last + 1))
    }

    /// 非空分箱范围内的 y 范围
    ///
    /// 返回 (最小内容减误差, 最小非零内容减误差, 最大内容加误差)，
    /// 可用 `x_low`/`x_high` 进一步限制分箱。
    pub fn y_range(&self, x_low: Option<f64>, x_high: Option<f64>) -> (f64, f64, f64) {
        let mut low = 1e10;
        let mut low_nonzero = 1e10;
        let mut high = -1e10;

        let (first, last) = self.filled_bin_range();
        for bin in first..last {
            if let Some(xl) = x_low {
                if xl > self.bin_low_edge(bin + 1) {
                    continue;
                }
            }
            if let Some(xh) = x_high {
                if xh < self.bin_low_edge(bin) {
                    continue;
                }
            }
            let c = self.bin_content(bin);
            let e = self.bin_error(bin);
            if c < low {
                low = c - e;
            }
            if c < low_nonzero && c > 0.0 {
                low_nonzero = c - e;
            }
            if c > high {
                high = c + e;
            }
        }
        (low, low_nonzero, high)
    }

    /// 同分箱的空直方图
    pub fn empty_clone(&self, name: impl Into<String>) -> Self {
        let mut h = self.clone();
        h.name = name.into();
        h.reset();
        h
    }

    /// 比值直方图：分子除以各分母之和
    ///
    /// 误差只取分子误差除以分母；分母为零的分箱内容与误差都置零。
    pub fn create_ratio(numerator: &Hist1D, denominators: &[&Hist1D]) -> Result<Hist1D> {
        let mut ratio = numerator.empty_clone(format!("{}_ratioplot", numerator.name));
        let mut total = numerator.empty_clone(format!("{}_stackForDenominator", numerator.name));
        for denom in denominators {
            total.add(denom)?;
        }

        for bin in 0..ratio.contents.len() {
            let den = total.bin_content(bin);
            if den != 0.0 {
                ratio.set_bin_content(bin, numerator.bin_content(bin) / den);
                ratio.set_bin_error(bin, numerator.bin_error(bin) / den);
            }
        }
        Ok(ratio)
    }
}

fn validate_edges(name: &str, edges: &[f64]) -> Result<()> {
    if edges.len() < 2 {
        return Err(ResplotError::MalformedObject {
            kind: "histogram".to_string(),
            name: name.to_string(),
            reason: "at least two bin edges are required".to_string(),
        });
    }
    if edges.windows(2).any(|w| !(w[1] > w[0])) {
        return Err(ResplotError::MalformedObject {
            kind: "histogram".to_string(),
            name: name.to_string(),
            reason: "bin edges must be strictly increasing".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Hist1D {
        Hist1D::from_parts(
            "sample",
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
            &[0.0, 4.0, 9.0, 1.0, 0.0],
            None,
            2.0,
            3.0,
        )
        .unwrap()
    }

    #[test]
    fn test_bin_layout() {
        let h = sample();
        assert_eq!(h.nbins(), 5);
        assert_eq!(h.bin_content(0), 2.0);
        assert_eq!(h.bin_content(6), 3.0);
        assert_eq!(h.bin_content(7), 0.0);
        assert!((h.bin_error(3) - 3.0).abs() < 1e-12);
        assert!((h.bin_low_edge(0) + 1.0).abs() < 1e-12);
        assert!((h.bin_low_edge(1) - 0.0).abs() < 1e-12);
        assert!((h.bin_low_edge(6) - 5.0).abs() < 1e-12);
        assert!((h.bin_center(2) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_set_bin() {
        let mut h = sample();
        h.set_bin_content(5, 20.0);
        h.set_bin_error(5, 0.5);
        assert_eq!(h.bin_content(5), 20.0);
        assert_eq!(h.bin_error(5), 0.5);
        assert_eq!(h.maximum_bin(), 5);
        // 越界写入被忽略
        h.set_bin_content(99, 1.0);
        assert_eq!(h.bin_content(99), 0.0);
    }

    #[test]
    fn test_find_bin() {
        let h = sample();
        assert_eq!(h.find_bin(-0.5), 0);
        assert_eq!(h.find_bin(0.0), 1);
        assert_eq!(h.find_bin(0.99), 1);
        assert_eq!(h.find_bin(1.0), 2);
        assert_eq!(h.find_bin(4.999), 5);
        assert_eq!(h.find_bin(5.0), 6);
    }

    #[test]
    fn test_integrals() {
        let h = sample();
        assert!((h.integral() - 14.0).abs() < 1e-12);
        assert!((h.integral_range(3, 5) - 10.0).abs() < 1e-12);
        // 上限截断到上溢箱
        assert!((h.integral_range(5, 100) - 3.0).abs() < 1e-12);
        assert_eq!(h.integral_range(4, 2), 0.0);
    }

    #[test]
    fn test_extrema() {
        let h = sample();
        assert_eq!(h.maximum_bin(), 3);
        assert_eq!(h.maximum(), 9.0);
        assert_eq!(h.minimum(), 0.0);
    }

    #[test]
    fn test_filled_range() {
        let h = sample();
        // 两侧各保留一个空箱
        assert_eq!(h.filled_bin_range(), (1, 5));
        let (lo, hi) = h.filled_x_range();
        assert!((lo - 0.0).abs() < 1e-12);
        assert!((hi - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_filled_range_empty() {
        let h = Hist1D::uniform("empty", 4, 0.0, 4.0).unwrap();
        assert_eq!(h.filled_bin_range(), (1, 4));
    }

    #[test]
    fn test_y_range() {
        let h = sample();
        let (low, low_nonzero, high) = h.y_range(None, None);
        // 循环覆盖分箱 1..=4（不含末箱）
        assert!((low - 0.0).abs() < 1e-12);
        assert!((low_nonzero - 0.0).abs() < 1e-12);
        assert!((high - 12.0).abs() < 1e-12);

        let (_, low_nonzero, high) = h.y_range(Some(1.5), Some(2.5));
        assert!((low_nonzero - 2.0).abs() < 1e-12);
        assert!((high - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_create_ratio() {
        let num = sample();
        let den_a = Hist1D::from_parts(
            "a",
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
            &[1.0, 1.0, 2.0, 0.0, 0.0],
            None,
            0.0,
            0.0,
        )
        .unwrap();
        let den_b = Hist1D::from_parts(
            "b",
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
            &[1.0, 1.0, 1.0, 0.0, 0.0],
            None,
            0.0,
            0.0,
        )
        .unwrap();

        let ratio = Hist1D::create_ratio(&num, &[&den_a, &den_b]).unwrap();
        assert_eq!(ratio.name, "sample_ratioplot");
        assert!((ratio.bin_content(2) - 2.0).abs() < 1e-12);
        assert!((ratio.bin_error(2) - 1.0).abs() < 1e-12);
        assert!((ratio.bin_content(3) - 3.0).abs() < 1e-12);
        assert_eq!(ratio.bin_content(4), 0.0);
        assert_eq!(ratio.bin_error(4), 0.0);
        assert_eq!(ratio.bin_content(0), 0.0);
    }

    #[test]
    fn test_ratio_rejects_mismatched_bins() {
        let num = sample();
        let other = Hist1D::uniform("other", 3, 0.0, 3.0).unwrap();
        assert!(Hist1D::create_ratio(&num, &[&other]).is_err());
    }

    #[test]
    fn test_from_statistics() {
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let h = Hist1D::from_statistics("stat", &values).unwrap();
        assert_eq!(h.nbins(), 10);
        assert!((h.x_min() + 4.95).abs() < 1e-9);
        assert!((h.x_max() - 103.95).abs() < 1e-9);
        assert!((h.integral() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_statistics_constant_values() {
        let h = Hist1D::from_statistics("flat", &[2.0, 2.0, 2.0]).unwrap();
        assert_eq!(h.nbins(), 1);
        assert!((h.integral() - 3.0).abs() < 1e-12);
        assert!(Hist1D::from_statistics("none", &[]).is_err());
    }

    #[test]
    fn test_malformed_histograms() {
        assert!(Hist1D::new("bad", vec![1.0]).is_err());
        assert!(Hist1D::new("bad", vec![0.0, 2.0, 1.0]).is_err());
        assert!(Hist1D::from_parts("bad", vec![0.0, 1.0], &[1.0, 2.0], None, 0.0, 0.0).is_err());
    }
}
