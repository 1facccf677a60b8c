//! # 坐标框
//!
//! `Frame` 描述一个坐标框（两轴范围、标题、边距、字号），`build` 之后得到
//! `Plot`，在其中以数据值绘制直方图、数据点、折线、误差带和竖线。
//! 对数 x 轴的标签与细刻度由这里手动放置。
//!
//! ## 依赖关系
//! - 被 `plot/` 下各图表使用
//! - 使用 `plot/axis.rs`, `plot/decor.rs`
//! - 使用 `models/` 的 `Hist1D`, `Graph`

use crate::error::{ResplotError, Result};
use crate::models::{Graph, Hist1D};
use crate::plot::axis::{
    format_axis_value, log_axis_labels, log_axis_ticks, log_coord_label, x_user_to_ndc, AxisScale,
};
use crate::plot::decor::{dash_polyline, Align, Canvas};
use crate::utils::latex::to_display_text;

use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::text_anchor::VPos;

pub type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// 坐标框边距，占所在区域的比例
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Margins {
            left: 0.16,
            right: 0.05,
            top: 0.05,
            bottom: 0.16,
        }
    }
}

/// 坐标框描述
#[derive(Debug, Clone)]
pub struct Frame {
    pub x: AxisScale,
    pub y: AxisScale,
    pub x_title: String,
    pub y_title: String,
    pub margins: Margins,
    /// 刻度标签字号（相对区域高度）
    pub label_size: f64,
    pub title_size: f64,
    pub show_x_labels: bool,
    pub n_x_labels: usize,
    pub n_y_labels: usize,
    /// 对数 x 轴最低数量级只标一个值
    pub suppress_first_order: bool,
}

impl Frame {
    pub fn new(x: AxisScale, y: AxisScale) -> Self {
        Frame {
            x,
            y,
            x_title: String::new(),
            y_title: String::new(),
            margins: Margins::default(),
            label_size: 0.04,
            title_size: 0.045,
            show_x_labels: true,
            n_x_labels: 7,
            n_y_labels: 8,
            suppress_first_order: false,
        }
    }

    pub fn titles(mut self, x: &str, y: &str) -> Self {
        self.x_title = x.to_string();
        self.y_title = y.to_string();
        self
    }

    pub fn margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn text_sizes(mut self, label: f64, title: f64) -> Self {
        self.label_size = label;
        self.title_size = title;
        self
    }

    pub fn hide_x_labels(mut self) -> Self {
        self.show_x_labels = false;
        self
    }

    pub fn y_labels(mut self, n: usize) -> Self {
        self.n_y_labels = n;
        self
    }

    /// 数据值 → 绘图坐标
    pub fn coord(&self, x: f64, y: f64) -> (f64, f64) {
        (self.x.to_coord(x), self.y.to_coord(y))
    }

    /// 压到坐标框内的绘图坐标
    pub fn clamped_coord(&self, x: f64, y: f64) -> (f64, f64) {
        let (cx, cy) = self.coord(x, y);
        let xr = self.x.coord_range();
        let yr = self.y.coord_range();
        (cx.clamp(xr.start, xr.end), cy.clamp(yr.start, yr.end))
    }

    /// x 数据值在所在区域中的 NDC 横坐标
    pub fn x_ndc(&self, v: f64) -> f64 {
        x_user_to_ndc(v, self.x.min, self.x.max, self.x.log, self.margins.left, self.margins.right)
    }

    /// 对数 x 轴上手动放置的标签值；少于两个时交给 plotters
    pub fn manual_x_labels(&self) -> Vec<f64> {
        if !self.x.log || !self.show_x_labels {
            return Vec::new();
        }
        let labels = log_axis_labels(self.x.min, self.x.max, self.n_x_labels, self.suppress_first_order);
        if labels.len() < 2 {
            Vec::new()
        } else {
            labels
        }
    }

    /// 在区域上画出坐标框
    pub fn build<'a, DB: DrawingBackend>(self, canvas: &Canvas<'a, DB>) -> Result<Plot<'a, DB>>
    where
        DB::ErrorType: 'static,
    {
        let (w, h) = canvas.size();
        let m = self.margins;
        let manual = self.manual_x_labels();

        let mut chart = ChartBuilder::on(canvas.area())
            .margin_top((m.top * h) as i32)
            .margin_right((m.right * w) as i32)
            .x_label_area_size((m.bottom * h) as i32)
            .y_label_area_size((m.left * w) as i32)
            .build_cartesian_2d(self.x.coord_range(), self.y.coord_range())
            .map_err(|e| canvas.fail(e))?;

        let show_x = self.show_x_labels && manual.is_empty();
        let x_log = self.x.log;
        let y_log = self.y.log;
        let x_fmt = move |v: &f64| {
            if !show_x {
                String::new()
            } else if x_log {
                log_coord_label(*v)
            } else {
                format_axis_value(*v)
            }
        };
        let y_fmt = move |v: &f64| {
            if y_log {
                log_coord_label(*v)
            } else {
                format_axis_value(*v)
            }
        };

        {
            let mut mesh = chart.configure_mesh();
            mesh.disable_mesh()
                .x_labels(if manual.is_empty() { self.n_x_labels } else { 0 })
                .y_labels(self.n_y_labels)
                .x_label_formatter(&x_fmt)
                .y_label_formatter(&y_fmt)
                .label_style(("sans-serif", canvas.font_px(self.label_size)))
                .axis_desc_style(("sans-serif", canvas.font_px(self.title_size)))
                .y_desc(to_display_text(&self.y_title));
            if show_x {
                mesh.x_desc(to_display_text(&self.x_title));
            }
            mesh.draw().map_err(|e| canvas.fail(e))?;
        }

        // 上、右两边
        let xr = self.x.coord_range();
        let yr = self.y.coord_range();
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(xr.start, yr.end), (xr.end, yr.end), (xr.end, yr.start)],
                BLACK.stroke_width(1),
            )))
            .map_err(|e| canvas.fail(e))?;

        let mut plot = Plot {
            chart,
            frame: self,
            figure: canvas.figure(),
        };
        if !manual.is_empty() {
            plot.log_x_ticks(&manual)?;
            plot.log_x_labels(canvas, &manual)?;
        }
        Ok(plot)
    }
}

/// 要画出的常规分箱
///
/// 给定 x 范围时取两端所在分箱（上限恰在分箱下沿时不含该箱），
/// 否则取非空范围（两侧各带一个空箱）。
pub fn visible_bins(hist: &Hist1D, x_range: Option<(f64, f64)>) -> (usize, usize) {
    let n = hist.nbins();
    let (first, last) = match x_range {
        Some((low, high)) => {
            let first = hist.find_bin(low);
            let mut last = hist.find_bin(high);
            if last > first && last <= n && hist.bin_low_edge(last) == high {
                last -= 1;
            }
            (first, last)
        }
        None => hist.filled_bin_range(),
    };
    let first = first.clamp(1, n);
    (first, last.clamp(first, n))
}

// ─────────────────────────────────────────────────────────────
// Plot
// ─────────────────────────────────────────────────────────────

/// 已画出的坐标框，以数据值绘图
pub struct Plot<'a, DB: DrawingBackend> {
    chart: Chart<'a, DB>,
    frame: Frame,
    figure: &'a str,
}

impl<'a, DB: DrawingBackend> Plot<'a, DB>
where
    DB::ErrorType: 'static,
{
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// 数据值 → 后端绝对像素
    pub fn pixel(&self, x: f64, y: f64) -> (i32, i32) {
        self.chart.backend_coord(&self.frame.clamped_coord(x, y))
    }

    fn log_x_ticks(&mut self, labels: &[f64]) -> Result<()> {
        let yr = self.frame.y.coord_range();
        let span = yr.end - yr.start;
        let mut ticks: Vec<(f64, f64)> = log_axis_ticks(self.frame.x.min, self.frame.x.max, false)
            .into_iter()
            .map(|t| (t.value, if t.major { 0.03 } else { 0.015 }))
            .collect();
        ticks.extend(labels.iter().map(|&v| (v, 0.03)));

        let segments: Vec<Vec<(f64, f64)>> = ticks
            .iter()
            .flat_map(|&(v, length)| {
                let x = self.frame.x.to_coord(v);
                [
                    vec![(x, yr.start), (x, yr.start + length * span)],
                    vec![(x, yr.end), (x, yr.end - length * span)],
                ]
            })
            .collect();
        self.chart
            .draw_series(segments.into_iter().map(|s| PathElement::new(s, BLACK.stroke_width(1))))
            .map_err(|e| ResplotError::render(self.figure, e))?;
        Ok(())
    }

    fn log_x_labels(&self, canvas: &Canvas<'a, DB>, labels: &[f64]) -> Result<()> {
        let gap = (canvas.font_px(self.frame.label_size) * 0.3) as i32;
        for &v in labels {
            let (_, y) = canvas.to_local(self.pixel(v, self.frame.y.min));
            let (x, _) = canvas.to_pixel(self.frame.x_ndc(v), 0.0);
            canvas.text_at_pixel(&format_axis_value(v), (x, y + gap), self.frame.label_size, Align::Centre, VPos::Top)?;
        }
        let title_y = self.frame.margins.bottom * 0.25;
        canvas.text_styled(
            &self.frame.x_title,
            1.0 - self.frame.margins.right,
            title_y,
            self.frame.title_size,
            Align::Right,
            &BLACK,
            false,
        )
    }

    // ── 折线 ──

    /// 数据值折线
    pub fn polyline(&mut self, points: &[(f64, f64)], style: ShapeStyle) -> Result<()> {
        let coords: Vec<(f64, f64)> = points.iter().map(|&(x, y)| self.frame.clamped_coord(x, y)).collect();
        if coords.len() < 2 {
            return Ok(());
        }
        self.chart
            .draw_series(std::iter::once(PathElement::new(coords, style)))
            .map_err(|e| ResplotError::render(self.figure, e))?;
        Ok(())
    }

    /// 数据值虚线；`dash`/`gap` 为坐标框边长的比例
    pub fn dashed(&mut self, points: &[(f64, f64)], style: ShapeStyle, dash: f64, gap: f64) -> Result<()> {
        let coords: Vec<(f64, f64)> = points.iter().map(|&(x, y)| self.frame.clamped_coord(x, y)).collect();
        let xr = self.frame.x.coord_range();
        let yr = self.frame.y.coord_range();
        let pieces = dash_polyline(&coords, (xr.end - xr.start, yr.end - yr.start), dash, gap);
        self.chart
            .draw_series(pieces.into_iter().map(|p| PathElement::new(p, style)))
            .map_err(|e| ResplotError::render(self.figure, e))?;
        Ok(())
    }

    /// 竖线
    pub fn vline(&mut self, x: f64, y0: f64, y1: f64, style: ShapeStyle, dashed: bool) -> Result<()> {
        if dashed {
            self.dashed(&[(x, y0), (x, y1)], style, 0.02, 0.015)
        } else {
            self.polyline(&[(x, y0), (x, y1)], style)
        }
    }

    /// 横贯坐标框的横线
    pub fn hline(&mut self, y: f64, style: ShapeStyle, dashed: bool) -> Result<()> {
        let (x0, x1) = (self.frame.x.min, self.frame.x.max);
        if dashed {
            self.dashed(&[(x0, y), (x1, y)], style, 0.02, 0.015)
        } else {
            self.polyline(&[(x0, y), (x1, y)], style)
        }
    }

    // ── 直方图 ──

    fn step_points(&self, hist: &Hist1D, first: usize, last: usize) -> Vec<(f64, f64)> {
        (first..=last)
            .flat_map(|i| {
                let c = hist.bin_content(i);
                [(hist.bin_low_edge(i), c), (hist.bin_up_edge(i), c)]
            })
            .collect()
    }

    /// 直方图阶梯线
    pub fn hist_outline(&mut self, hist: &Hist1D, first: usize, last: usize, style: ShapeStyle) -> Result<()> {
        let points = self.step_points(hist, first, last);
        self.polyline(&points, style)
    }

    /// 填充直方图，从轴下限（线性轴为 0）填到内容；`line` 为外轮廓
    pub fn hist_filled(
        &mut self,
        hist: &Hist1D,
        first: usize,
        last: usize,
        fill: ShapeStyle,
        line: Option<ShapeStyle>,
    ) -> Result<()> {
        let base = if self.frame.y.log { self.frame.y.min } else { 0.0 };
        let bars: Vec<[(f64, f64); 2]> = (first..=last)
            .filter(|&i| hist.bin_content(i) != 0.0)
            .map(|i| {
                [
                    self.frame.clamped_coord(hist.bin_low_edge(i), base),
                    self.frame.clamped_coord(hist.bin_up_edge(i), hist.bin_content(i)),
                ]
            })
            .collect();
        self.chart
            .draw_series(bars.into_iter().map(|corners| Rectangle::new(corners, fill)))
            .map_err(|e| ResplotError::render(self.figure, e))?;

        if let Some(line) = line {
            let mut points = vec![(hist.bin_low_edge(first), base)];
            points.extend(self.step_points(hist, first, last));
            points.push((hist.bin_up_edge(last), base));
            self.polyline(&points, line)?;
        }
        Ok(())
    }

    /// 数据点：bin 中心处的点与竖直误差棒；对数 y 轴上略去空 bin
    pub fn hist_points(&mut self, hist: &Hist1D, first: usize, last: usize, colour: &RGBColor) -> Result<()> {
        let points: Vec<(f64, f64, f64)> = (first..=last)
            .filter(|&i| !(self.frame.y.log && hist.bin_content(i) <= 0.0))
            .map(|i| (hist.bin_center(i), hist.bin_content(i), hist.bin_error(i)))
            .collect();
        let triples: Vec<(f64, f64, f64, f64)> = points.iter().map(|&(x, y, e)| (x, y, e, e)).collect();
        self.error_points(&triples, colour)
    }

    /// 图中的点，无误差时只画点
    pub fn graph_points(&mut self, graph: &Graph, colour: &RGBColor) -> Result<()> {
        let points: Vec<(f64, f64, f64, f64)> = (0..graph.len())
            .map(|i| {
                let y = graph.y()[i];
                (graph.x()[i], y, y - graph.band_low(i), graph.band_high(i) - y)
            })
            .collect();
        self.error_points(&points, colour)
    }

    /// (x, y, 下误差, 上误差)
    fn error_points(&mut self, points: &[(f64, f64, f64, f64)], colour: &RGBColor) -> Result<()> {
        let frame = &self.frame;
        let bars: Vec<_> = points
            .iter()
            .filter(|&&(_, _, lo, hi)| lo > 0.0 || hi > 0.0)
            .map(|&(x, y, lo, hi)| {
                let (cx, cy) = frame.clamped_coord(x, y);
                let (_, clo) = frame.clamped_coord(x, y - lo);
                let (_, chi) = frame.clamped_coord(x, y + hi);
                ErrorBar::new_vertical(cx, clo, cy, chi, colour.stroke_width(1), 6)
            })
            .collect();
        let dots: Vec<_> = points
            .iter()
            .filter(|&&(x, y, _, _)| frame.x.contains(x) && frame.y.contains(y))
            .map(|&(x, y, _, _)| Circle::new(frame.coord(x, y), 3, colour.filled()))
            .collect();
        self.chart.draw_series(bars).map_err(|e| ResplotError::render(self.figure, e))?;
        self.chart.draw_series(dots).map_err(|e| ResplotError::render(self.figure, e))?;
        Ok(())
    }

    /// 图的误差带：上沿正向、下沿反向围成的多边形
    pub fn graph_band(&mut self, graph: &Graph, colour: &RGBColor) -> Result<()> {
        if graph.len() < 2 || !graph.has_errors() {
            return Ok(());
        }
        let mut outline: Vec<(f64, f64)> = (0..graph.len())
            .map(|i| self.frame.clamped_coord(graph.x()[i], graph.band_high(i)))
            .collect();
        outline.extend(
            (0..graph.len())
                .rev()
                .map(|i| self.frame.clamped_coord(graph.x()[i], graph.band_low(i))),
        );
        self.chart
            .draw_series(std::iter::once(Polygon::new(outline, colour.filled())))
            .map_err(|e| ResplotError::render(self.figure, e))?;
        Ok(())
    }

    /// 图的折线
    pub fn graph_line(&mut self, graph: &Graph, style: ShapeStyle, dashed: Option<(f64, f64)>) -> Result<()> {
        let points: Vec<(f64, f64)> = graph.x().iter().copied().zip(graph.y().iter().copied()).collect();
        match dashed {
            Some((dash, gap)) => self.dashed(&points, style, dash, gap),
            None => self.polyline(&points, style),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::new(
            AxisScale::logarithmic(1100.0, 8000.0).unwrap(),
            AxisScale::logarithmic(0.5, 1e5).unwrap(),
        )
    }

    #[test]
    fn test_clamped_coord_stays_inside() {
        let f = frame();
        let (x, y) = f.clamped_coord(10.0, 1e9);
        assert!((x - 1100f64.log10()).abs() < 1e-12);
        assert!((y - 5.0).abs() < 1e-12);
        let (_, y) = f.clamped_coord(2000.0, 0.0);
        assert!((y - 0.5f64.log10()).abs() < 1e-12);
    }

    #[test]
    fn test_manual_labels_only_for_visible_log_axis() {
        let f = frame();
        assert_eq!(f.manual_x_labels().len(), 7);
        assert!(f.clone().hide_x_labels().manual_x_labels().is_empty());

        let linear = Frame::new(AxisScale::linear(0.0, 10.0).unwrap(), AxisScale::linear(0.0, 1.0).unwrap());
        assert!(linear.manual_x_labels().is_empty());
    }

    #[test]
    fn test_visible_bins() {
        let edges: Vec<f64> = (0..=10).map(|i| i as f64).collect();
        let mut contents = vec![0.0; 10];
        contents[2] = 4.0;
        contents[4] = 1.0;
        let hist = Hist1D::from_parts("h", edges, &contents, None, 0.0, 0.0).unwrap();
        assert_eq!(visible_bins(&hist, None), (2, 6));
        assert_eq!(visible_bins(&hist, Some((2.5, 7.5))), (3, 8));
        assert_eq!(visible_bins(&hist, Some((-5.0, 50.0))), (1, 10));
        assert_eq!(visible_bins(&hist, Some((2.0, 8.0))), (3, 8));
    }

    #[test]
    fn test_x_ndc_uses_margins() {
        let f = Frame::new(AxisScale::linear(0.0, 10.0).unwrap(), AxisScale::linear(0.0, 1.0).unwrap())
            .margins(Margins {
                left: 0.1,
                right: 0.1,
                top: 0.05,
                bottom: 0.1,
            });
        assert!((f.x_ndc(0.0) - 0.1).abs() < 1e-12);
        assert!((f.x_ndc(10.0) - 0.9).abs() < 1e-12);
    }
}
