//! # 统计量工具
//!
//! p 值与显著性换算、p 值统计误差、统计量列表的均值与 RMS。
//!
//! ## 依赖关系
//! - 被 `models/search.rs`, `commands/` 使用
//! - 使用 `models/histogram.rs`
//! - 使用 `statrs` 计算高斯分位数

use crate::error::{ResplotError, Result};
use crate::models::Hist1D;

use statrs::distribution::{ContinuousCDF, Normal};

/// 将 p 值换算为高斯显著性（单位：标准差）
///
/// 超出（`excess = true`）取右尾 `Φ⁻¹(1 − p)`，亏损取 `Φ⁻¹(p)`。
pub fn z_value(p: f64, excess: bool) -> Result<f64> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ResplotError::Statistics(format!(
            "p-value {} is outside [0, 1]",
            p
        )));
    }
    let normal = Normal::new(0.0, 1.0).map_err(|e| ResplotError::Statistics(e.to_string()))?;
    Ok(if excess {
        normal.inverse_cdf(1.0 - p)
    } else {
        normal.inverse_cdf(p)
    })
}

/// 由赝实验分布的计数统计估计 p 值误差
///
/// 观测值所在分箱及其右侧的计数为 nRight，其余为 nLeft，
/// `δp = p·sqrt(1/nRight + 1/nLeft)`；任一为零时误差为 0。
pub fn pvalue_uncertainty(pseudo: &Hist1D, observed: f64, pvalue: f64) -> f64 {
    let n_right = pseudo.integral_range(pseudo.find_bin(observed), pseudo.nbins());
    let n_left = pseudo.integral() - n_right;
    if n_right > 0.0 && n_left > 0.0 {
        pvalue * (1.0 / n_right + 1.0 / n_left).sqrt()
    } else {
        0.0
    }
}

/// 观测统计量在赝实验分布中的右尾比例
pub fn tail_fraction(pseudo: &Hist1D, observed: f64) -> Option<f64> {
    let total = pseudo.integral();
    if total <= 0.0 {
        return None;
    }
    let n_right = pseudo.integral_range(pseudo.find_bin(observed), pseudo.nbins());
    Some(n_right / total)
}

/// 算术平均
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// 总体标准差（除以 N）
pub fn rms(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((sum_sq / values.len() as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_z_value_excess_and_deficit() {
        let z = z_value(0.0013498980316301, true).unwrap();
        assert!((z - 3.0).abs() < 1e-6);
        let z = z_value(0.5, true).unwrap();
        assert!(z.abs() < 1e-9);
        let z = z_value(0.158655253931457, false).unwrap();
        assert!((z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_z_value_rejects_invalid_p() {
        assert!(z_value(-0.1, true).is_err());
        assert!(z_value(1.5, false).is_err());
    }

    #[test]
    fn test_pvalue_uncertainty() {
        // 10 个分箱各 10 个赝实验，观测值落在第 9 箱
        let edges: Vec<f64> = (0..=10).map(|i| i as f64).collect();
        let hist = Hist1D::from_parts("pseudo", edges, &[10.0; 10], None, 0.0, 0.0).unwrap();
        let p = 0.2;
        let err = pvalue_uncertainty(&hist, 8.5, p);
        let expected = p * (1.0 / 20.0 + 1.0 / 80.0_f64).sqrt();
        assert!((err - expected).abs() < 1e-12);
        assert!((tail_fraction(&hist, 8.5).unwrap() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_pvalue_uncertainty_at_edge() {
        let edges: Vec<f64> = (0..=4).map(|i| i as f64).collect();
        let hist = Hist1D::from_parts("pseudo", edges, &[5.0; 4], None, 0.0, 0.0).unwrap();
        // 观测值低于所有赝实验：nLeft = 0
        assert_eq!(pvalue_uncertainty(&hist, -1.0, 1.0), 0.0);
        // 观测值超出上限：nRight = 0
        assert_eq!(pvalue_uncertainty(&hist, 10.0, 0.0), 0.0);
    }

    #[test]
    fn test_mean_and_rms() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&values).unwrap() - 5.0).abs() < 1e-12);
        assert!((rms(&values).unwrap() - 2.0).abs() < 1e-12);
        assert!(rms(&[]).is_none());
    }
}
