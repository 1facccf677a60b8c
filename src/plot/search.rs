//! # 搜索阶段图表
//!
//! ## 功能
//! - `DataFitSignificance`：上半为数据与背景拟合，下半为显著性（figure1）
//! - `PseudoExperiments`：赝实验统计量分布与观测值箭头
//! - `Tomography`：BumpHunter 层析图
//! - `SignificanceAlone`：单独的显著性直方图
//!
//! ## 依赖关系
//! - 被 `commands/search.rs` 使用
//! - 使用 `plot/frame.rs`, `plot/decor.rs`
//! - 使用 `models/search.rs`

use crate::error::{ResplotError, Result};
use crate::models::{Graph, Hist1D, SearchResults};
use crate::plot::axis::AxisScale;
use crate::plot::decor::{Canvas, Legend, LegendMarker};
use crate::plot::frame::{visible_bins, Frame, Margins};
use crate::plot::painter::{Figure, Painter};
use crate::plot::palette::{BUMP_INTERVAL_COLOUR, EXCLUDED_WINDOW_COLOUR};

use plotters::coord::Shift;
use plotters::prelude::*;

/// 上下两栏的分界（上栏占画布高度的比例）
const UPPER_PAD: f64 = 0.73;

/// 拟合范围的单位：上限不超过 1000 视为 TeV
fn range_unit(high: f64) -> &'static str {
    if high <= 1000.0 {
        "TeV"
    } else {
        "GeV"
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// ─────────────────────────────────────────────────────────────
// 数据、拟合与显著性
// ─────────────────────────────────────────────────────────────

/// 数据与背景拟合（上栏）及显著性（下栏）
pub struct DataFitSignificance<'r> {
    pub name: String,
    pub data: &'r Hist1D,
    pub fit: &'r Hist1D,
    pub significance: &'r Hist1D,
    pub x_title: String,
    pub data_y_title: String,
    pub significance_y_title: String,
    pub fit_range: (f64, f64),
    /// 用户给定的 x 范围，缺省取数据非空范围
    pub x_range: Option<(f64, f64)>,
    pub log_x: bool,
    pub bump: Option<(f64, f64)>,
    pub window: Option<(f64, f64)>,
    pub extra_legend_lines: Vec<String>,
    /// 在附加文字中写出的 p 值
    pub pvalue: Option<f64>,
}

impl<'r> DataFitSignificance<'r> {
    pub fn from_results(results: &'r SearchResults) -> Self {
        DataFitSignificance {
            name: "figure1".to_string(),
            data: &results.data,
            fit: &results.background,
            significance: &results.residual,
            x_title: "m_{jj} [TeV]".to_string(),
            data_y_title: "Events".to_string(),
            significance_y_title: "Significance".to_string(),
            fit_range: (results.fit_low, results.fit_high),
            x_range: None,
            log_x: true,
            bump: Some((results.bump_low_edge, results.bump_high_edge)),
            window: results
                .window_active()
                .then_some((results.window_low_edge, results.window_high_edge)),
            extra_legend_lines: Vec::new(),
            pvalue: None,
        }
    }

    /// 显著性栏的固定 y 范围
    fn significance_range(&self, first: usize, last: usize) -> f64 {
        let max = (first..=last)
            .map(|i| self.significance.bin_content(i))
            .fold(f64::NEG_INFINITY, f64::max);
        if max.abs() < 1.5 {
            1.7
        } else {
            3.7
        }
    }

    /// 区间边界处的数据高度：下边界取边界所在箱，上边界取前一箱
    fn edge_heights(&self, low: f64, high: f64) -> (f64, f64) {
        let low_bin = self.data.find_bin(low);
        let high_bin = self.data.find_bin(high).saturating_sub(1);
        (self.data.bin_content(low_bin), self.data.bin_content(high_bin))
    }

    fn user_text(&self, painter: &Painter) -> String {
        let cut = painter.cut_string.clone().unwrap_or_default();
        let (lo, hi) = self.fit_range;
        let range = format!("Fit Range: {} - {} {}", lo, hi, range_unit(hi));
        match self.pvalue {
            Some(p) => format!(
                "#splitline{{#it{{p}}-value = {}}}{{#splitline{{{}}}{{{}}}}}",
                round2(p),
                range,
                cut
            ),
            None => format!("#splitline{{{}}}{{{}}}", range, cut),
        }
    }
}

impl Figure for DataFitSignificance<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, painter: &Painter) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let canvas = Canvas::new(root, self.name());
        root.fill(&WHITE).map_err(|e| canvas.fail(e))?;
        let (_, height) = canvas.size();
        let (upper, lower) = root.split_vertically((height * UPPER_PAD) as i32);
        let upper = Canvas::new(&upper, self.name());
        let lower = Canvas::new(&lower, self.name());
        let lower_pad = 1.0 - UPPER_PAD;

        let (first, last) = visible_bins(self.data, self.x_range);
        let (x_low, x_high) = (self.data.bin_low_edge(first), self.data.bin_up_edge(last));
        let x_axis = AxisScale::new(x_low, x_high, self.log_x && x_low > 0.0)?;

        // 上栏：数据与拟合
        let (low, _, high) = self.data.y_range(Some(x_low), Some(x_high));
        let y1 = (low / 5.0).max(0.3);
        let y2 = (high * 5.0).max(y1 * 10.0);
        let mut top = Frame::new(x_axis, AxisScale::logarithmic(y1, y2)?)
            .titles(&self.x_title, &self.data_y_title)
            .margins(Margins {
                top: 0.05 / UPPER_PAD,
                bottom: 0.0,
                ..Margins::default()
            })
            .text_sizes(0.04 / UPPER_PAD, 0.045 / UPPER_PAD)
            .hide_x_labels()
            .build(&upper)?;
        top.hist_outline(self.fit, first, last, painter.palette.fit_line.stroke_width(2))?;
        top.hist_points(self.data, first, last, &BLACK)?;

        // 下栏：显著性
        let range = self.significance_range(first, last);
        let mut bottom = Frame::new(x_axis, AxisScale::linear(-range, range)?)
            .titles(&self.x_title, &self.significance_y_title)
            .margins(Margins {
                top: 0.0,
                bottom: 0.35,
                ..Margins::default()
            })
            .text_sizes(0.04 / lower_pad, 0.045 / lower_pad)
            .y_labels(5)
            .build(&lower)?;
        bottom.hist_filled(
            self.significance,
            first,
            last,
            painter.palette.significance_fill.filled(),
            Some(BLACK.stroke_width(1)),
        )?;

        // 区间竖线
        let data_min = self.data.minimum();
        let (sig_min, sig_max) = (self.significance.minimum(), self.significance.maximum());
        let edges = [
            (self.bump, BUMP_INTERVAL_COLOUR, false),
            (self.window, EXCLUDED_WINDOW_COLOUR, true),
        ];
        for (interval, colour, dashed) in edges {
            let Some((lo, hi)) = interval else { continue };
            let (h_low, h_high) = self.edge_heights(lo, hi);
            let style = colour.stroke_width(2);
            top.vline(lo, data_min, h_low, style, dashed)?;
            top.vline(hi, data_min, h_high, style, dashed)?;
            bottom.vline(lo, sig_min, sig_max, style, dashed)?;
            bottom.vline(hi, sig_min, sig_max, style, dashed)?;
        }

        // 标签与图例（整张画布的 NDC）
        let left = 0.48;
        let row = 0.04;
        let mut legend = if self.log_x && self.bump.is_none() {
            canvas.experiment_label(painter, 0.2, 0.35, 0.05, false)?;
            canvas.cme_and_lumi(painter, 0.51, 0.90, 0.04)?;
            Legend::new(left, 0.78, 0.9, 0.87)
        } else {
            canvas.experiment_label(painter, 0.45, 0.87, 0.05, true)?;
            canvas.cme_and_lumi(painter, 0.41, 0.82, 0.04)?;
            let rows = 2 + usize::from(self.window.is_some()) + usize::from(self.bump.is_some());
            Legend::new(left, 0.80 - row * rows as f64, 0.9, 0.80)
        };

        for (i, line) in self.extra_legend_lines.iter().enumerate() {
            canvas.text(line, left + 0.01, legend.y1 - row * (i as f64 + 1.0), 0.04)?;
        }

        legend.add(LegendMarker::Point(BLACK), "Data");
        legend.add(
            LegendMarker::Line {
                colour: painter.palette.fit_line,
                width: 2,
                dashed: false,
            },
            "Background fit",
        );
        if self.bump.is_some() {
            legend.add(
                LegendMarker::Line {
                    colour: BUMP_INTERVAL_COLOUR,
                    width: 2,
                    dashed: false,
                },
                "BumpHunter interval",
            );
        }
        if self.window.is_some() {
            legend.add(
                LegendMarker::Line {
                    colour: EXCLUDED_WINDOW_COLOUR,
                    width: 2,
                    dashed: true,
                },
                "Excluded window",
            );
        }
        legend.draw(&canvas)?;

        if painter.draw_user_text {
            let text = self.user_text(painter);
            let below_legend = legend.y1 - 0.06 - self.extra_legend_lines.len() as f64 * 0.05;
            match (self.pvalue.is_some(), self.bump.is_some()) {
                (false, _) => canvas.text(&text, 0.5, below_legend, 0.033)?,
                (true, true) => canvas.text(&text, 0.21, 0.42, 0.04)?,
                (true, false) => canvas.text(&text, 0.56, 0.7, 0.04)?,
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
// 赝实验分布
// ─────────────────────────────────────────────────────────────

/// 搜索阶段的三种检验统计量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    LogLikelihood,
    Chi2,
    BumpHunter,
}

impl Statistic {
    pub const ALL: [Statistic; 3] = [Statistic::LogLikelihood, Statistic::Chi2, Statistic::BumpHunter];

    /// 输出文件名
    pub fn output_name(&self) -> &'static str {
        match self {
            Statistic::LogLikelihood => "logLStatPlot",
            Statistic::Chi2 => "chi2StatPlot",
            Statistic::BumpHunter => "bumpHunterStatPlot",
        }
    }

    pub fn axis_title(&self) -> &'static str {
        match self {
            Statistic::LogLikelihood => "logL statistic",
            Statistic::Chi2 => "#chi^{2}",
            Statistic::BumpHunter => "BumpHunter",
        }
    }
}

impl std::fmt::Display for Statistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Statistic::LogLikelihood => write!(f, "logL"),
            Statistic::Chi2 => write!(f, "chi2"),
            Statistic::BumpHunter => write!(f, "BumpHunter"),
        }
    }
}

/// 赝实验统计量分布，箭头标出数据中的观测值
pub struct PseudoExperiments<'r> {
    pub statistic: Statistic,
    pub pseudo: &'r Hist1D,
    pub observed: f64,
    pub pvalue: f64,
}

impl<'r> PseudoExperiments<'r> {
    pub fn from_results(results: &'r SearchResults, statistic: Statistic) -> Self {
        let (pseudo, stat) = match statistic {
            Statistic::LogLikelihood => (&results.log_likelihood_pseudo, results.log_likelihood),
            Statistic::Chi2 => (&results.chi2_pseudo, results.chi2),
            Statistic::BumpHunter => (&results.bump_hunter_pseudo, results.bump_hunter),
        };
        PseudoExperiments {
            statistic,
            pseudo,
            observed: stat.value,
            pvalue: stat.pvalue,
        }
    }
}

impl Figure for PseudoExperiments<'_> {
    fn name(&self) -> &str {
        self.statistic.output_name()
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, painter: &Painter) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let canvas = Canvas::new(root, self.name());
        root.fill(&WHITE).map_err(|e| canvas.fail(e))?;

        let n = self.pseudo.nbins();
        let y_high = (self.pseudo.maximum() * 50.0).max(5.0);
        let mut plot = Frame::new(
            AxisScale::linear(self.pseudo.x_min(), self.pseudo.x_max())?,
            AxisScale::logarithmic(0.5, y_high)?,
        )
        .titles(self.statistic.axis_title(), "Pseudo-experiments")
        .build(&canvas)?;

        let fill = painter.palette.statistical_test_fill;
        plot.hist_filled(self.pseudo, 1, n, fill.filled(), Some(BLACK.stroke_width(1)))?;

        let arrow = painter.palette.statistical_test_arrow;
        let from = canvas.to_local(plot.pixel(self.observed, 1.0));
        let to = canvas.to_local(plot.pixel(self.observed, 0.0));
        canvas.arrow(from, to, &arrow, 2)?;

        let mut legend = Legend::new(0.21, 0.68, 0.75, 0.78);
        legend.add(
            LegendMarker::Fill {
                fill,
                border: Some(BLACK),
            },
            "Pseudo-experiments",
        );
        legend.add(
            LegendMarker::Line {
                colour: arrow,
                width: 2,
                dashed: false,
            },
            "Value in Data",
        );
        legend.draw(&canvas)?;

        canvas.experiment_label(painter, 0.21, 0.88, 0.05, false)?;
        canvas.cme_and_lumi(painter, 0.14, 0.82, 0.04)?;

        if painter.draw_user_text {
            canvas.text(&format!("#it{{p}}-value = {}", round2(self.pvalue)), 0.22, 0.62, 0.04)?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
// 层析图
// ─────────────────────────────────────────────────────────────

/// 各质量区间的泊松 p 值（对数-对数）
pub struct Tomography<'r> {
    pub graph: &'r Graph,
}

impl Tomography<'_> {
    /// 正值点的 (x, y) 包络
    fn positive_extent(&self) -> Option<((f64, f64), (f64, f64))> {
        let points: Vec<(f64, f64)> = self
            .graph
            .x()
            .iter()
            .zip(self.graph.y())
            .filter(|(x, y)| **x > 0.0 && **y > 0.0)
            .map(|(x, y)| (*x, *y))
            .collect();
        if points.is_empty() {
            return None;
        }
        let extent = |values: Vec<f64>| {
            (
                values.iter().copied().fold(f64::INFINITY, f64::min),
                values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            )
        };
        Some((
            extent(points.iter().map(|p| p.0).collect()),
            extent(points.iter().map(|p| p.1).collect()),
        ))
    }
}

impl Figure for Tomography<'_> {
    fn name(&self) -> &str {
        "bumpHunterTomographyPlot"
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, painter: &Painter) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let canvas = Canvas::new(root, self.name());
        root.fill(&WHITE).map_err(|e| canvas.fail(e))?;

        let ((x_min, x_max), (y_min, y_max)) = self.positive_extent().ok_or_else(|| {
            ResplotError::InvalidRange(format!("tomography graph '{}' has no positive points", self.graph.name))
        })?;
        let mut plot = Frame::new(
            AxisScale::logarithmic(x_min * 0.9, x_max * 1.1)?,
            AxisScale::logarithmic(y_min / 2.0, y_max * 2.0)?,
        )
        .titles("Dijet Mass [GeV]", "Poisson PVal of Interval")
        .build(&canvas)?;

        let colour = painter.palette.tomography;
        plot.graph_points(self.graph, &colour)?;

        canvas.experiment_label(painter, 0.55, 0.20, 0.05, true)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
// 单独的显著性直方图
// ─────────────────────────────────────────────────────────────

/// 单栏的显著性（或残差）直方图，y 范围随内容
pub struct SignificanceAlone<'r> {
    pub name: String,
    pub significance: &'r Hist1D,
    pub x_title: String,
    pub y_title: String,
    pub log_x: bool,
    pub x_range: Option<(f64, f64)>,
}

/// 自由 y 轴的范围
///
/// 最大值为 20（缺省值）时按 7 处理；含负值时两端各放大 1.2 倍，
/// 否则两端各外扩 0.9 倍跨度。
pub fn free_significance_range(low: f64, high: f64) -> (f64, f64) {
    let high = if high == 20.0 { 7.0 } else { high };
    let (y1, y2) = if low < 0.0 {
        (low * 1.2, high * 1.2)
    } else {
        (low - 0.9 * (high - low), high + 0.9 * (high - low))
    };
    if y2 > y1 {
        (y1, y2)
    } else {
        (y1 - 1.0, y1 + 1.0)
    }
}

impl Figure for SignificanceAlone<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, painter: &Painter) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let canvas = Canvas::new(root, self.name());
        root.fill(&WHITE).map_err(|e| canvas.fail(e))?;

        let (first, last) = visible_bins(self.significance, self.x_range);
        let (x_low, x_high) = (self.significance.bin_low_edge(first), self.significance.bin_up_edge(last));
        let (low, _, high) = self.significance.y_range(Some(x_low), Some(x_high));
        let (y1, y2) = free_significance_range(low, high);

        let mut plot = Frame::new(
            AxisScale::new(x_low, x_high, self.log_x && x_low > 0.0)?,
            AxisScale::linear(y1, y2)?,
        )
        .titles(&self.x_title, &self.y_title)
        .build(&canvas)?;
        plot.hist_filled(
            self.significance,
            first,
            last,
            painter.palette.significance_fill.filled(),
            Some(BLACK.stroke_width(1)),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::search::tests::sample_results;
    use crate::models::RemainderPValues;
    use crate::plot::painter::tests::assert_renders;

    #[test]
    fn test_free_significance_range() {
        let (y1, y2) = free_significance_range(-2.0, 3.0);
        assert!((y1 + 2.4).abs() < 1e-12);
        assert!((y2 - 3.6).abs() < 1e-12);
        let (y1, y2) = free_significance_range(1.0, 2.0);
        assert!((y1 - 0.1).abs() < 1e-12);
        assert!((y2 - 2.9).abs() < 1e-12);
        // 缺省上限 20 视为 7
        let (_, y2) = free_significance_range(-1.0, 20.0);
        assert!((y2 - 8.4).abs() < 1e-12);
        // 平坦内容
        assert_eq!(free_significance_range(0.0, 0.0), (-1.0, 1.0));
    }

    #[test]
    fn test_user_text_variants() {
        let results = sample_results(false);
        let mut figure = DataFitSignificance::from_results(&results);
        figure.fit_range = (1100.0, 8000.0);
        let painter = Painter {
            cut_string: Some("|y*| < 0.6".to_string()),
            ..Painter::default()
        };
        assert_eq!(
            figure.user_text(&painter),
            "#splitline{Fit Range: 1100 - 8000 GeV}{|y*| < 0.6}"
        );
        figure.pvalue = Some(0.1234);
        figure.fit_range = (1.1, 8.0);
        assert_eq!(
            figure.user_text(&painter),
            "#splitline{#it{p}-value = 0.12}{#splitline{Fit Range: 1.1 - 8 TeV}{|y*| < 0.6}}"
        );
    }

    #[test]
    fn test_window_only_when_active() {
        let results = sample_results(false);
        assert!(DataFitSignificance::from_results(&results).window.is_none());
        let mut results = sample_results(true);
        assert!(DataFitSignificance::from_results(&results).window.is_none());
        results.remainder = Some(crate::models::RemainderPValues {
            bump_hunter: 0.5,
            log_likelihood: 0.5,
            chi2: None,
        });
        let figure = DataFitSignificance::from_results(&results);
        assert_eq!(figure.window, Some((results.window_low_edge, results.window_high_edge)));
    }

    #[test]
    fn test_statistic_names() {
        let names: Vec<&str> = Statistic::ALL.iter().map(|s| s.output_name()).collect();
        assert_eq!(names, vec!["logLStatPlot", "chi2StatPlot", "bumpHunterStatPlot"]);
        let results = sample_results(false);
        let figure = PseudoExperiments::from_results(&results, Statistic::Chi2);
        assert_eq!(figure.observed, results.chi2.value);
        assert_eq!(figure.name(), "chi2StatPlot");
    }

    #[test]
    fn test_figure1_renders_with_and_without_window() {
        let results = sample_results(false);
        let mut figure = DataFitSignificance::from_results(&results);
        figure.pvalue = Some(results.bump_hunter.pvalue);
        assert_renders(&figure);

        let mut results = sample_results(true);
        results.remainder = Some(RemainderPValues {
            bump_hunter: 0.5,
            log_likelihood: 0.5,
            chi2: Some(0.5),
        });
        let mut figure = DataFitSignificance::from_results(&results);
        figure.extra_legend_lines = vec!["|y*| < 0.6".to_string()];
        assert!(figure.window.is_some());
        assert_renders(&figure);

        figure.bump = None;
        figure.log_x = false;
        assert_renders(&figure);
    }

    #[test]
    fn test_search_side_figures_render() {
        let results = sample_results(false);
        for statistic in Statistic::ALL {
            assert_renders(&PseudoExperiments::from_results(&results, statistic));
        }
        assert_renders(&Tomography {
            graph: &results.bump_hunter_tomography,
        });
        assert_renders(&SignificanceAlone {
            name: "sigOfDiffPlot".to_string(),
            significance: &results.data,
            x_title: "m_{jj} [TeV]".to_string(),
            y_title: "Significance".to_string(),
            log_x: true,
            x_range: Some((2.0, 9.0)),
        });
    }
}
