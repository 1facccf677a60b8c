//! # 配色方案
//!
//! 每种配色给出统计检验图、层析图、限设定误差带、信号曲线等用到的颜色，
//! 以及多条曲线叠加时的颜色序列。
//!
//! ## 依赖关系
//! - 被 `plot/painter.rs` 持有
//! - 使用 `plotters` 的 `RGBColor`

use crate::error::{ResplotError, Result};

use plotters::style::RGBColor;

/// 可选配色名称
pub const PALETTE_NAMES: [&str; 4] = ["Tropical", "Classic", "Teal", "Grayscale"];

/// 配色方案
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub name: String,
    /// 赝实验分布填充色
    pub statistical_test_fill: RGBColor,
    /// 观测值箭头
    pub statistical_test_arrow: RGBColor,
    /// 层析图点
    pub tomography: RGBColor,
    /// 期望限 ±1σ 带
    pub one_sigma_band: RGBColor,
    /// 期望限 ±2σ 带
    pub two_sigma_band: RGBColor,
    /// 背景拟合曲线
    pub fit_line: RGBColor,
    /// 显著性直方图填充
    pub significance_fill: RGBColor,
    /// 信号曲线（按顺序使用）
    pub signal_lines: Vec<RGBColor>,
    /// 多条预测曲线的颜色序列
    pub short_good_colours: Vec<RGBColor>,
    pub default_good_colours: Vec<RGBColor>,
    pub medium_good_colours: Vec<RGBColor>,
    pub long_good_colours: Vec<RGBColor>,
}

/// BumpHunter 区间竖线
pub const BUMP_INTERVAL_COLOUR: RGBColor = RGBColor(0, 0, 255);
/// 排除窗口竖线
pub const EXCLUDED_WINDOW_COLOUR: RGBColor = RGBColor(0, 153, 102);
/// 已有限的箭头
pub const EXISTING_LIMIT_COLOUR: RGBColor = RGBColor(255, 0, 0);

impl Default for Palette {
    fn default() -> Self {
        Palette::tropical()
    }
}

impl Palette {
    /// 按名称选择配色（不区分大小写）
    pub fn by_name(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "tropical" => Ok(Palette::tropical()),
            "classic" => Ok(Palette::classic()),
            "teal" => Ok(Palette::teal()),
            "grayscale" | "greyscale" | "gray" | "grey" => Ok(Palette::grayscale()),
            _ => Err(ResplotError::InvalidArgument(format!(
                "unknown colour palette '{}', expected one of: {}",
                name,
                PALETTE_NAMES.join(", ")
            ))),
        }
    }

    /// 按曲线数量选择颜色序列
    pub fn good_colours(&self, ncolours: usize) -> &[RGBColor] {
        if ncolours < 4 {
            &self.short_good_colours
        } else if ncolours < 6 {
            &self.default_good_colours
        } else if ncolours < 13 {
            &self.medium_good_colours
        } else {
            &self.long_good_colours
        }
    }

    /// 第 i 条信号曲线的颜色（循环使用）
    pub fn signal_line(&self, i: usize) -> RGBColor {
        self.signal_lines[i % self.signal_lines.len()]
    }

    fn tropical() -> Self {
        let short = vec![
            RGBColor(0, 145, 145),
            RGBColor(236, 94, 54),
            RGBColor(245, 180, 30),
        ];
        let mut default = short.clone();
        default.extend([RGBColor(126, 182, 66), RGBColor(99, 54, 128)]);
        Palette {
            name: "Tropical".to_string(),
            statistical_test_fill: RGBColor(245, 180, 30),
            statistical_test_arrow: RGBColor(0, 118, 118),
            tomography: RGBColor(236, 94, 54),
            one_sigma_band: RGBColor(126, 182, 66),
            two_sigma_band: RGBColor(250, 215, 90),
            fit_line: RGBColor(220, 30, 30),
            significance_fill: RGBColor(236, 94, 54),
            signal_lines: vec![
                RGBColor(0, 118, 118),
                RGBColor(236, 94, 54),
                RGBColor(99, 54, 128),
                RGBColor(48, 100, 190),
            ],
            short_good_colours: short,
            default_good_colours: default,
            medium_good_colours: root_medium_colours(),
            long_good_colours: root_long_colours(),
        }
    }

    fn classic() -> Self {
        Palette {
            name: "Classic".to_string(),
            statistical_test_fill: RGBColor(255, 255, 0),
            statistical_test_arrow: RGBColor(0, 0, 255),
            tomography: RGBColor(255, 0, 0),
            one_sigma_band: RGBColor(0, 255, 0),
            two_sigma_band: RGBColor(255, 255, 0),
            fit_line: RGBColor(255, 0, 0),
            significance_fill: RGBColor(255, 0, 0),
            signal_lines: vec![
                RGBColor(0, 0, 255),
                RGBColor(255, 0, 0),
                RGBColor(0, 153, 0),
                RGBColor(255, 0, 255),
            ],
            short_good_colours: vec![RGBColor(255, 0, 0), RGBColor(0, 0, 255), RGBColor(0, 153, 0)],
            default_good_colours: vec![
                RGBColor(255, 0, 0),
                RGBColor(0, 0, 255),
                RGBColor(0, 153, 0),
                RGBColor(255, 0, 255),
                RGBColor(255, 153, 0),
            ],
            medium_good_colours: root_medium_colours(),
            long_good_colours: root_long_colours(),
        }
    }

    fn teal() -> Self {
        Palette {
            name: "Teal".to_string(),
            statistical_test_fill: RGBColor(153, 214, 214),
            statistical_test_arrow: RGBColor(0, 77, 77),
            tomography: RGBColor(0, 102, 102),
            one_sigma_band: RGBColor(77, 178, 178),
            two_sigma_band: RGBColor(178, 230, 230),
            fit_line: RGBColor(204, 51, 0),
            significance_fill: RGBColor(0, 128, 128),
            signal_lines: vec![
                RGBColor(204, 51, 0),
                RGBColor(0, 77, 77),
                RGBColor(102, 102, 204),
            ],
            short_good_colours: vec![RGBColor(0, 77, 77), RGBColor(0, 153, 153), RGBColor(204, 51, 0)],
            default_good_colours: vec![
                RGBColor(0, 51, 51),
                RGBColor(0, 102, 102),
                RGBColor(0, 153, 153),
                RGBColor(204, 51, 0),
                RGBColor(255, 153, 51),
            ],
            medium_good_colours: root_medium_colours(),
            long_good_colours: root_long_colours(),
        }
    }

    fn grayscale() -> Self {
        let greys = |levels: &[u8]| levels.iter().map(|&l| RGBColor(l, l, l)).collect::<Vec<_>>();
        Palette {
            name: "Grayscale".to_string(),
            statistical_test_fill: RGBColor(200, 200, 200),
            statistical_test_arrow: RGBColor(0, 0, 0),
            tomography: RGBColor(60, 60, 60),
            one_sigma_band: RGBColor(150, 150, 150),
            two_sigma_band: RGBColor(210, 210, 210),
            fit_line: RGBColor(90, 90, 90),
            significance_fill: RGBColor(120, 120, 120),
            signal_lines: greys(&[0, 80, 140]),
            short_good_colours: greys(&[0, 90, 160]),
            default_good_colours: greys(&[0, 50, 100, 150, 200]),
            medium_good_colours: greys(&[0, 20, 40, 60, 80, 100, 120, 140, 160, 180, 200, 220]),
            long_good_colours: (0..23u8).map(|i| RGBColor(i * 10, i * 10, i * 10)).collect(),
        }
    }
}

/// 12 色序列：青 → 蓝 → 品红 → 红 → 橙 → 黄
fn root_medium_colours() -> Vec<RGBColor> {
    vec![
        RGBColor(0, 51, 51),
        RGBColor(0, 153, 153),
        RGBColor(0, 255, 255),
        RGBColor(0, 0, 255),
        RGBColor(0, 0, 153),
        RGBColor(153, 0, 153),
        RGBColor(255, 0, 255),
        RGBColor(255, 0, 0),
        RGBColor(153, 0, 0),
        RGBColor(255, 102, 0),
        RGBColor(255, 204, 0),
        RGBColor(255, 255, 0),
    ]
}

/// 23 色序列，与 12 色序列同一色带但更细
fn root_long_colours() -> Vec<RGBColor> {
    vec![
        RGBColor(0, 51, 51),
        RGBColor(0, 102, 102),
        RGBColor(0, 153, 153),
        RGBColor(0, 204, 204),
        RGBColor(0, 255, 255),
        RGBColor(0, 0, 255),
        RGBColor(0, 0, 204),
        RGBColor(0, 0, 153),
        RGBColor(0, 0, 102),
        RGBColor(0, 0, 51),
        RGBColor(51, 0, 51),
        RGBColor(102, 0, 102),
        RGBColor(153, 0, 153),
        RGBColor(204, 0, 204),
        RGBColor(255, 0, 255),
        RGBColor(255, 0, 0),
        RGBColor(204, 0, 0),
        RGBColor(153, 0, 0),
        RGBColor(255, 51, 0),
        RGBColor(255, 102, 0),
        RGBColor(255, 153, 0),
        RGBColor(255, 204, 0),
        RGBColor(255, 255, 0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_by_name() {
        assert_eq!(Palette::by_name("tropical").unwrap().name, "Tropical");
        assert_eq!(Palette::by_name("CLASSIC").unwrap().name, "Classic");
        assert_eq!(Palette::by_name("grey").unwrap().name, "Grayscale");
        assert!(Palette::by_name("neon").is_err());
        assert_eq!(Palette::default().name, "Tropical");
    }

    #[test]
    fn test_good_colour_lists() {
        for name in PALETTE_NAMES {
            let palette = Palette::by_name(name).unwrap();
            assert_eq!(palette.good_colours(3).len(), 3);
            assert_eq!(palette.good_colours(5).len(), 5);
            assert_eq!(palette.good_colours(12).len(), 12);
            assert_eq!(palette.good_colours(20).len(), 23);
        }
    }

    #[test]
    fn test_signal_colours_cycle() {
        let palette = Palette::by_name("Teal").unwrap();
        assert_eq!(palette.signal_line(0), palette.signal_line(3));
    }
}
