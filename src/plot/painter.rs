//! # 绘图样式状态与图表输出
//!
//! `Painter` 持有所有图表共享的样式：亮度、质心能量、实验标签、配色、
//! 画布尺寸与输出格式。每个图表实现 `Figure`，由 `Painter::render`
//! 按配置的格式逐一输出。
//!
//! ## 依赖关系
//! - 被 `commands/` 创建并传给各图表
//! - 使用 `plot/palette.rs`
//! - 使用 `plotters` 的 BitMap/SVG 后端

use crate::error::{ResplotError, Result};
use crate::plot::palette::Palette;

use clap::ValueEnum;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────
// 输出格式与标签类型
// ─────────────────────────────────────────────────────────────

/// 图片输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// PNG 位图
    Png,
    /// SVG 矢量图
    Svg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// 实验标签类型（编号 0..=6）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelType {
    Public,
    Preliminary,
    Internal,
    SimulationPreliminary,
    SimulationInternal,
    Simulation,
    WorkInProgress,
}

impl LabelType {
    pub fn from_index(index: u8) -> Result<Self> {
        Ok(match index {
            0 => LabelType::Public,
            1 => LabelType::Preliminary,
            2 => LabelType::Internal,
            3 => LabelType::SimulationPreliminary,
            4 => LabelType::SimulationInternal,
            5 => LabelType::Simulation,
            6 => LabelType::WorkInProgress,
            _ => {
                return Err(ResplotError::InvalidArgument(format!(
                    "label type must be 0-6, got {}",
                    index
                )))
            }
        })
    }

    /// 实验名之后的文字
    pub fn text(&self) -> &'static str {
        match self {
            LabelType::Public => "",
            LabelType::Preliminary => "Preliminary",
            LabelType::Internal => "Internal",
            LabelType::SimulationPreliminary => "Simulation Preliminary",
            LabelType::SimulationInternal => "Simulation Internal",
            LabelType::Simulation => "Simulation",
            LabelType::WorkInProgress => "Work in Progress",
        }
    }
}

// ─────────────────────────────────────────────────────────────
// Figure trait
// ─────────────────────────────────────────────────────────────

/// 可输出的图表
pub trait Figure {
    /// 用于错误信息
    fn name(&self) -> &str;

    /// 画布尺寸缩放
    fn canvas_scale(&self) -> (f64, f64) {
        (1.0, 1.0)
    }

    /// 忽略 `rectangular`，始终用方形画布
    fn square(&self) -> bool {
        false
    }

    /// 在整张画布上绘制
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, painter: &Painter) -> Result<()>
    where
        DB::ErrorType: 'static;
}

// ─────────────────────────────────────────────────────────────
// Painter
// ─────────────────────────────────────────────────────────────

/// 共享绘图样式
#[derive(Debug, Clone)]
pub struct Painter {
    /// 积分亮度 (pb⁻¹)
    pub luminosity_pb: f64,
    /// 质心能量 (TeV)
    pub cme_tev: f64,
    /// fb⁻¹ 数值保留的小数位数
    pub lumi_decimals: usize,
    /// 亮度以 pb⁻¹ 显示
    pub lumi_in_pb: bool,
    pub formats: Vec<OutputFormat>,
    /// 800×600，否则 600×600
    pub rectangular: bool,
    pub experiment_label: bool,
    pub experiment: String,
    pub label_type: LabelType,
    pub palette: Palette,
    /// 是否写出 p 值、拟合范围等附加文字
    pub draw_user_text: bool,
    /// 分析选择条件说明
    pub cut_string: Option<String>,
}

impl Default for Painter {
    fn default() -> Self {
        Painter {
            luminosity_pb: 139000.0,
            cme_tev: 13.0,
            lumi_decimals: 0,
            lumi_in_pb: false,
            formats: vec![OutputFormat::Png],
            rectangular: false,
            experiment_label: true,
            experiment: "ATLAS".to_string(),
            label_type: LabelType::Internal,
            palette: Palette::default(),
            draw_user_text: false,
            cut_string: None,
        }
    }
}

impl Painter {
    /// 以 fb⁻¹ 为单位的亮度，按 `lumi_decimals` 取整
    pub fn lumi_in_fb(&self) -> f64 {
        let factor = 10f64.powi(self.lumi_decimals as i32);
        (self.luminosity_pb / 1000.0 * factor).round() / factor
    }

    /// 亮度文字（ROOT 标记）
    pub fn lumi_text(&self) -> String {
        if self.lumi_in_pb {
            format!("{} pb^{{-1}}", (self.lumi_in_fb() * 1000.0) as i64)
        } else {
            format!("{:.*} fb^{{-1}}", self.lumi_decimals, self.lumi_in_fb())
        }
    }

    pub fn cme_text(&self) -> String {
        format!("#sqrt{{s}}={} TeV", self.cme_tev)
    }

    /// `√s=13 TeV, 139 fb⁻¹`
    pub fn cme_and_lumi_text(&self) -> String {
        format!("{}, {}", self.cme_text(), self.lumi_text())
    }

    /// 实验标签的（粗体部分，普通部分）；关闭时为 None
    pub fn experiment_label_parts(&self) -> Option<(String, String)> {
        if !self.experiment_label {
            return None;
        }
        Some((self.experiment.clone(), self.label_type.text().to_string()))
    }

    /// 画布像素尺寸
    pub fn canvas_size(&self, scale: (f64, f64), square: bool) -> (u32, u32) {
        let base = if self.rectangular && !square { (800.0, 600.0) } else { (600.0, 600.0) };
        ((base.0 * scale.0) as u32, (base.1 * scale.1) as u32)
    }

    /// 按所有配置的格式输出图表，返回写出的文件
    pub fn render<F: Figure>(&self, figure: &F, stem: &Path) -> Result<Vec<PathBuf>> {
        if let Some(parent) = stem.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| ResplotError::FileWriteError {
                    path: parent.display().to_string(),
                    source: e,
                })?;
            }
        }

        let size = self.canvas_size(figure.canvas_scale(), figure.square());
        let mut written = Vec::with_capacity(self.formats.len());
        for format in &self.formats {
            let path = output_path(stem, *format);
            match format {
                OutputFormat::Png => {
                    let root = BitMapBackend::new(&path, size).into_drawing_area();
                    figure.draw(&root, self)?;
                    root.present()
                        .map_err(|e| ResplotError::render(figure.name(), e))?;
                }
                OutputFormat::Svg => {
                    let root = SVGBackend::new(&path, size).into_drawing_area();
                    figure.draw(&root, self)?;
                    root.present()
                        .map_err(|e| ResplotError::render(figure.name(), e))?;
                }
            }
            written.push(path);
        }
        Ok(written)
    }
}

/// `<stem>.<ext>`，不替换 stem 中已有的点
pub fn output_path(stem: &Path, format: OutputFormat) -> PathBuf {
    let mut name = stem.as_os_str().to_owned();
    name.push(".");
    name.push(format.extension());
    PathBuf::from(name)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 只写 SVG 的画笔，附加文字全开
    pub(crate) fn svg_painter() -> Painter {
        Painter {
            formats: vec![OutputFormat::Svg],
            draw_user_text: true,
            cut_string: Some("|y*| < 0.6".to_string()),
            ..Painter::default()
        }
    }

    /// 渲染到临时目录并检查写出的 SVG
    pub(crate) fn assert_renders<F: Figure>(figure: &F) {
        let dir = tempfile::tempdir().unwrap();
        let written = svg_painter().render(figure, &dir.path().join(figure.name())).unwrap();
        assert_eq!(written.len(), 1);
        let content = fs::read_to_string(&written[0]).unwrap();
        assert!(content.starts_with("<svg"), "{} is not an SVG document", written[0].display());
        assert!(content.len() > 1000);
    }

    #[test]
    fn test_default_style() {
        let painter = Painter::default();
        assert_eq!(painter.lumi_in_fb(), 139.0);
        assert_eq!(painter.lumi_text(), "139 fb^{-1}");
        assert_eq!(painter.cme_and_lumi_text(), "#sqrt{s}=13 TeV, 139 fb^{-1}");
        assert_eq!(
            painter.experiment_label_parts(),
            Some(("ATLAS".to_string(), "Internal".to_string()))
        );
        assert_eq!(painter.canvas_size((1.0, 1.0), false), (600, 600));
    }

    #[test]
    fn test_lumi_formatting() {
        let mut painter = Painter {
            luminosity_pb: 36100.0,
            lumi_decimals: 1,
            ..Painter::default()
        };
        assert_eq!(painter.lumi_text(), "36.1 fb^{-1}");
        painter.lumi_in_pb = true;
        assert_eq!(painter.lumi_text(), "36100 pb^{-1}");
    }

    #[test]
    fn test_label_types() {
        assert_eq!(LabelType::from_index(0).unwrap().text(), "");
        assert_eq!(LabelType::from_index(6).unwrap().text(), "Work in Progress");
        assert!(LabelType::from_index(7).is_err());

        let painter = Painter {
            experiment_label: false,
            ..Painter::default()
        };
        assert!(painter.experiment_label_parts().is_none());
    }

    #[test]
    fn test_canvas_and_output_paths() {
        let painter = Painter {
            rectangular: true,
            ..Painter::default()
        };
        assert_eq!(painter.canvas_size((1.0, 1.5), false), (800, 900));
        assert_eq!(painter.canvas_size((1.0, 1.0), true), (600, 600));
        assert_eq!(
            output_path(Path::new("out/limits_1.5"), OutputFormat::Svg),
            PathBuf::from("out/limits_1.5.svg")
        );
    }
}
