//! # 画布装饰
//!
//! 以 NDC 坐标（左下角为原点，右上角为 (1, 1)）在画布上放置文字、
//! 实验标签、亮度说明、图例、箭头和阴影框。文字先经过 ROOT 标记转换。
//!
//! ## 依赖关系
//! - 被 `plot/frame.rs` 与各图表使用
//! - 使用 `utils/latex.rs`
//! - 使用 `plotters`

use crate::error::{ResplotError, Result};
use crate::plot::painter::Painter;
use crate::utils::latex::render_lines;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle, TextStyle};
use std::fmt::Debug;

/// 文字水平对齐
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Centre,
    Right,
}

impl Align {
    fn hpos(self) -> HPos {
        match self {
            Align::Left => HPos::Left,
            Align::Centre => HPos::Center,
            Align::Right => HPos::Right,
        }
    }
}

/// 行距（相对字号）
const LINE_SPACING: f64 = 1.25;

// ─────────────────────────────────────────────────────────────
// Canvas
// ─────────────────────────────────────────────────────────────

/// 一块绘图区域及其所属图表名
pub struct Canvas<'a, DB: DrawingBackend> {
    area: &'a DrawingArea<DB, Shift>,
    figure: &'a str,
}

impl<'a, DB: DrawingBackend> Canvas<'a, DB>
where
    DB::ErrorType: 'static,
{
    pub fn new(area: &'a DrawingArea<DB, Shift>, figure: &'a str) -> Self {
        Canvas { area, figure }
    }

    pub fn area(&self) -> &'a DrawingArea<DB, Shift> {
        self.area
    }

    pub fn figure(&self) -> &'a str {
        self.figure
    }

    pub fn fail<E: Debug>(&self, err: E) -> ResplotError {
        ResplotError::render(self.figure, err)
    }

    pub fn size(&self) -> (f64, f64) {
        let (w, h) = self.area.dim_in_pixel();
        (w as f64, h as f64)
    }

    /// NDC → 区域内像素
    pub fn to_pixel(&self, x: f64, y: f64) -> (i32, i32) {
        let (w, h) = self.size();
        ((x * w).round() as i32, ((1.0 - y) * h).round() as i32)
    }

    /// 后端绝对像素 → 区域内像素
    pub fn to_local(&self, absolute: (i32, i32)) -> (i32, i32) {
        let (bx, by) = self.area.get_base_pixel();
        (absolute.0 - bx, absolute.1 - by)
    }

    /// 相对区域高度的字号 → 像素
    pub fn font_px(&self, size: f64) -> f64 {
        (size * self.size().1).max(1.0)
    }

    fn style<'c>(&self, size: f64, bold: bool, colour: &'c RGBColor, align: Align, vpos: VPos) -> TextStyle<'c> {
        let font_style = if bold { FontStyle::Bold } else { FontStyle::Normal };
        TextStyle::from(FontDesc::new(FontFamily::SansSerif, self.font_px(size), font_style))
            .color(colour)
            .pos(Pos::new(align.hpos(), vpos))
    }

    // ── 文字 ──

    /// 黑色文字，左下角对齐 (x, y)
    pub fn text(&self, text: &str, x: f64, y: f64, size: f64) -> Result<()> {
        self.text_styled(text, x, y, size, Align::Left, &BLACK, false)
    }

    /// 文字（可含 `#splitline`），第一行基线位于 y，后续各行依次下移
    #[allow(clippy::too_many_arguments)]
    pub fn text_styled(
        &self,
        text: &str,
        x: f64,
        y: f64,
        size: f64,
        align: Align,
        colour: &RGBColor,
        bold: bool,
    ) -> Result<()> {
        self.lines_at(&render_lines(text), x, y, size, align, colour, bold, VPos::Bottom)
    }

    #[allow(clippy::too_many_arguments)]
    fn lines_at(
        &self,
        lines: &[String],
        x: f64,
        y: f64,
        size: f64,
        align: Align,
        colour: &RGBColor,
        bold: bool,
        vpos: VPos,
    ) -> Result<()> {
        let style = self.style(size, bold, colour, align, vpos);
        let (px, py) = self.to_pixel(x, y);
        let step = (self.font_px(size) * LINE_SPACING).round() as i32;
        for (i, line) in lines.iter().enumerate() {
            self.area
                .draw(&Text::new(line.clone(), (px, py + step * i as i32), style.clone()))
                .map_err(|e| self.fail(e))?;
        }
        Ok(())
    }

    /// 像素位置的单行文字
    pub fn text_at_pixel(&self, text: &str, pos: (i32, i32), size: f64, align: Align, vpos: VPos) -> Result<()> {
        let style = self.style(size, false, &BLACK, align, vpos);
        self.area
            .draw(&Text::new(text.to_string(), pos, style))
            .map_err(|e| self.fail(e))
    }

    // ── 实验标签与亮度 ──

    /// 粗体实验名 + 标签类型；`right_align` 时 x 为右端
    pub fn experiment_label(&self, painter: &Painter, x: f64, y: f64, size: f64, right_align: bool) -> Result<()> {
        let Some((experiment, kind)) = painter.experiment_label_parts() else {
            return Ok(());
        };
        let bold = self.style(size, true, &BLACK, Align::Left, VPos::Bottom);
        let normal = self.style(size, false, &BLACK, Align::Left, VPos::Bottom);
        let kind = if kind.is_empty() { kind } else { format!(" {}", kind) };

        let (bold_w, _) = self
            .area
            .estimate_text_size(&experiment, &bold)
            .map_err(|e| self.fail(e))?;
        let (kind_w, _) = self
            .area
            .estimate_text_size(&kind, &normal)
            .map_err(|e| self.fail(e))?;

        let (mut px, py) = self.to_pixel(x, y);
        if right_align {
            px -= (bold_w + kind_w) as i32;
        }
        self.area
            .draw(&Text::new(experiment, (px, py), bold))
            .map_err(|e| self.fail(e))?;
        if !kind.is_empty() {
            self.area
                .draw(&Text::new(kind, (px + bold_w as i32, py), normal))
                .map_err(|e| self.fail(e))?;
        }
        Ok(())
    }

    /// `√s=13 TeV, 139 fb⁻¹`
    pub fn cme_and_lumi(&self, painter: &Painter, x: f64, y: f64, size: f64) -> Result<()> {
        self.text(&painter.cme_and_lumi_text(), x, y, size)
    }

    /// 两行：质心能量在上，亮度在下
    pub fn cme_and_lumi_vertical(&self, painter: &Painter, x: f64, y: f64, size: f64) -> Result<()> {
        let text = format!("#splitline{{{}}}{{{}}}", painter.cme_text(), painter.lumi_text());
        self.text(&text, x, y, size)
    }

    // ── 图形元素 ──

    /// NDC 矩形
    pub fn ndc_box(&self, x1: f64, y1: f64, x2: f64, y2: f64, style: ShapeStyle) -> Result<()> {
        let a = self.to_pixel(x1, y1);
        let b = self.to_pixel(x2, y2);
        self.area
            .draw(&Rectangle::new([a, b], style))
            .map_err(|e| self.fail(e))
    }

    /// 像素坐标的箭头，箭头尖位于 `to`
    pub fn arrow(&self, from: (i32, i32), to: (i32, i32), colour: &RGBColor, width: u32) -> Result<()> {
        let style = colour.stroke_width(width);
        self.area
            .draw(&PathElement::new(vec![from, to], style))
            .map_err(|e| self.fail(e))?;
        let head = arrow_head(from, to, self.font_px(0.02), self.font_px(0.01));
        self.area
            .draw(&Polygon::new(head, colour.filled()))
            .map_err(|e| self.fail(e))
    }

    /// 像素坐标的虚线
    pub fn dashed_line(&self, from: (i32, i32), to: (i32, i32), style: ShapeStyle, dash: f64, gap: f64) -> Result<()> {
        let points = [(from.0 as f64, from.1 as f64), (to.0 as f64, to.1 as f64)];
        for piece in dash_polyline(&points, (1.0, 1.0), dash, gap) {
            let piece: Vec<(i32, i32)> = piece
                .iter()
                .map(|&(x, y)| (x.round() as i32, y.round() as i32))
                .collect();
            self.area
                .draw(&PathElement::new(piece, style))
                .map_err(|e| self.fail(e))?;
        }
        Ok(())
    }
}

/// 箭头三角形：尖端在 `to`，沿 from→to 方向
fn arrow_head(from: (i32, i32), to: (i32, i32), length: f64, half_width: f64) -> Vec<(i32, i32)> {
    let dx = (to.0 - from.0) as f64;
    let dy = (to.1 - from.1) as f64;
    let norm = (dx * dx + dy * dy).sqrt().max(1.0);
    let (ux, uy) = (dx / norm, dy / norm);
    let base = (to.0 as f64 - ux * length, to.1 as f64 - uy * length);
    let left = (base.0 - uy * half_width, base.1 + ux * half_width);
    let right = (base.0 + uy * half_width, base.1 - ux * half_width);
    [(to.0 as f64, to.1 as f64), left, right]
        .iter()
        .map(|&(x, y)| (x.round() as i32, y.round() as i32))
        .collect()
}

// ─────────────────────────────────────────────────────────────
// 虚线
// ─────────────────────────────────────────────────────────────

/// 把折线切成虚线段
///
/// `scale` 把坐标换算到度量长度的单位（各轴除以该轴的跨度），
/// `dash`/`gap` 以该单位计。返回各段实线的折点。
pub fn dash_polyline(points: &[(f64, f64)], scale: (f64, f64), dash: f64, gap: f64) -> Vec<Vec<(f64, f64)>> {
    let mut pieces = Vec::new();
    if points.len() < 2 || dash <= 0.0 {
        return pieces;
    }
    let period = dash + gap.max(0.0);
    let mut phase = 0.0; // 当前位置在周期内的偏移
    let mut current: Vec<(f64, f64)> = vec![points[0]];

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let length = (((b.0 - a.0) / scale.0).powi(2) + ((b.1 - a.1) / scale.1).powi(2)).sqrt();
        if length == 0.0 {
            continue;
        }
        let at = |t: f64| (a.0 + (b.0 - a.0) * t / length, a.1 + (b.1 - a.1) * t / length);
        let mut t = 0.0;
        while t < length {
            let drawing = phase < dash;
            let boundary = if drawing { dash } else { period };
            let step = (boundary - phase).min(length - t);
            t += step;
            phase += step;
            if drawing {
                current.push(at(t));
            }
            if phase >= boundary - 1e-12 {
                if drawing {
                    if current.len() > 1 {
                        pieces.push(std::mem::take(&mut current));
                    }
                    current.clear();
                } else {
                    phase = 0.0;
                    current = vec![at(t)];
                }
            }
        }
    }
    if current.len() > 1 {
        pieces.push(current);
    }
    pieces
}

// ─────────────────────────────────────────────────────────────
// 图例
// ─────────────────────────────────────────────────────────────

/// 图例条目左侧的标记
#[derive(Debug, Clone, PartialEq)]
pub enum LegendMarker {
    /// 带误差棒的点
    Point(RGBColor),
    Line { colour: RGBColor, width: u32, dashed: bool },
    Fill { fill: RGBColor, border: Option<RGBColor> },
    /// 外框为 2σ 颜色、中间为 1σ 颜色的色块
    Band { outer: RGBColor, inner: RGBColor },
    Arrow(RGBColor),
    /// 仅文字
    Text,
}

/// NDC 方框内等高分行的图例
#[derive(Debug, Clone)]
pub struct Legend {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub text_size: f64,
    entries: Vec<(LegendMarker, String)>,
}

impl Legend {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Legend {
            x1,
            y1,
            x2,
            y2,
            text_size: 0.04,
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, marker: LegendMarker, label: impl Into<String>) {
        self.entries.push((marker, label.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 各行中心的 NDC 纵坐标（自上而下）
    pub fn row_centres(&self) -> Vec<f64> {
        let n = self.len();
        let row = (self.y2 - self.y1) / n.max(1) as f64;
        (0..n).map(|i| self.y2 - row * (i as f64 + 0.5)).collect()
    }

    /// 标记列的 NDC 横向范围
    fn marker_column(&self) -> (f64, f64) {
        let width = ((self.x2 - self.x1) * 0.25).min(0.08);
        (self.x1, self.x1 + width)
    }

    pub fn draw<DB: DrawingBackend>(&self, canvas: &Canvas<'_, DB>) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        if self.is_empty() {
            return Ok(());
        }
        let (mx1, mx2) = self.marker_column();
        let row = (self.y2 - self.y1) / self.entries.len() as f64;
        let half = (row * 0.3).min(self.text_size * 0.4);
        let text_x = mx2 + 0.01;

        for ((marker, label), yc) in self.entries.iter().zip(self.row_centres()) {
            let left = canvas.to_pixel(mx1 + 0.005, yc);
            let right = canvas.to_pixel(mx2 - 0.005, yc);
            let centre = canvas.to_pixel((mx1 + mx2) / 2.0, yc);
            match marker {
                LegendMarker::Point(colour) => {
                    let top = canvas.to_pixel((mx1 + mx2) / 2.0, yc + half);
                    let bottom = canvas.to_pixel((mx1 + mx2) / 2.0, yc - half);
                    canvas
                        .area()
                        .draw(&PathElement::new(vec![top, bottom], colour.stroke_width(1)))
                        .map_err(|e| canvas.fail(e))?;
                    canvas
                        .area()
                        .draw(&Circle::new(centre, 3, colour.filled()))
                        .map_err(|e| canvas.fail(e))?;
                }
                LegendMarker::Line { colour, width, dashed } => {
                    let style = colour.stroke_width(*width);
                    if *dashed {
                        let dash = canvas.font_px(0.012);
                        canvas.dashed_line(left, right, style, dash, dash * 0.7)?;
                    } else {
                        canvas
                            .area()
                            .draw(&PathElement::new(vec![left, right], style))
                            .map_err(|e| canvas.fail(e))?;
                    }
                }
                LegendMarker::Fill { fill, border } => {
                    canvas.ndc_box(mx1 + 0.005, yc - half, mx2 - 0.005, yc + half, fill.filled())?;
                    if let Some(border) = border {
                        canvas.ndc_box(mx1 + 0.005, yc - half, mx2 - 0.005, yc + half, border.stroke_width(1))?;
                    }
                }
                LegendMarker::Band { outer, inner } => {
                    canvas.ndc_box(mx1 + 0.005, yc - half, mx2 - 0.005, yc + half, outer.filled())?;
                    canvas.ndc_box(mx1 + 0.005, yc - half / 2.0, mx2 - 0.005, yc + half / 2.0, inner.filled())?;
                }
                LegendMarker::Arrow(colour) => {
                    let top = canvas.to_pixel((mx1 + mx2) / 2.0, yc + half);
                    let bottom = canvas.to_pixel((mx1 + mx2) / 2.0, yc - half);
                    canvas.arrow(top, bottom, colour, 2)?;
                }
                LegendMarker::Text => {}
            }
            canvas.lines_at(
                &render_lines(label),
                text_x,
                yc,
                self.text_size,
                Align::Left,
                &BLACK,
                false,
                VPos::Center,
            )?;
        }
        Ok(())
    }
}
