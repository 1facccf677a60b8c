//! # 叠加图表
//!
//! 多个直方图或多条曲线画在同一坐标框内的图表。
//!
//! ## 功能
//! - `OverlaidHistograms`：若干直方图以不同颜色的折线叠加，可选数据点
//! - `StackedHistograms`：直方图逐个累加的填充堆叠图，可选数据点与数据/堆叠比值栏
//! - `OverlaidGraphs`：若干曲线（如不同信号模型的观测限）叠加，可成对使用实线/虚线
//! - 坐标范围的自动选择：`pick_nice_x_limits`, `pick_nice_y_limits`, `graph_overlay_ranges`
//!
//! ## 依赖关系
//! - 被 `commands/compare.rs`, `commands/graphs.rs` 使用
//! - 使用 `plot/frame.rs`, `plot/decor.rs`
//! - 使用 `plot/histograms.rs` 的 `Prediction` 与栏高

use crate::error::{ResplotError, Result};
use crate::models::{Graph, Hist1D};
use crate::plot::axis::AxisScale;
use crate::plot::decor::{Canvas, Legend, LegendMarker};
use crate::plot::frame::{visible_bins, Frame, Margins};
use crate::plot::histograms::{pad_heights, Prediction};
use crate::plot::painter::{Figure, Painter};

use plotters::coord::Shift;
use plotters::prelude::*;

/// x 范围：主直方图（通常为数据）的非空范围，否则取各直方图非空范围的并集；
/// 用户给定的范围优先
pub fn pick_nice_x_limits(hists: &[&Hist1D], dominant: Option<&Hist1D>, user: Option<(f64, f64)>) -> (f64, f64) {
    if let Some(range) = user {
        return range;
    }
    if let Some(hist) = dominant {
        return hist.filled_x_range();
    }
    hists
        .iter()
        .map(|h| h.filled_x_range())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
}

/// y 范围
///
/// 线性轴从 0.01 到最大值×1.5；对数轴下限为 max(0.3, 最小值/5)，
/// 上限按最大值的数量级放大（最大值×5×log10(最大值)，至少为最大值×5）。
/// `extra_room` 时上限再乘 3。
pub fn pick_nice_y_limits(low: f64, high: f64, log: bool, extra_room: bool) -> (f64, f64) {
    let (y1, mut y2) = if log {
        let y1 = (low / 5.0).max(0.3);
        let scaled = if high > 0.0 { high * 5.0 * high.log10() } else { high * 5.0 };
        (y1, scaled.max(high * 5.0).max(y1 * 10.0))
    } else {
        let y1 = 0.01;
        (y1, (high * 1.5).max(y1 * 10.0))
    };
    if extra_room {
        y2 *= 3.0;
    }
    (y1, y2)
}

/// 若干直方图在 `[x_low, x_high]` 内的 (最小非零内容, 最大内容)
fn content_extent(hists: &[&Hist1D], x_low: f64, x_high: f64) -> (f64, f64) {
    hists.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), h| {
        let (_, low_nonzero, high) = h.y_range(Some(x_low), Some(x_high));
        (lo.min(low_nonzero), hi.max(high))
    })
}

fn draw_extra_lines<DB: DrawingBackend>(canvas: &Canvas<'_, DB>, lines: &[String]) -> Result<()>
where
    DB::ErrorType: 'static,
{
    for (i, line) in lines.iter().enumerate() {
        canvas.text(line, 0.2, 0.80 - 0.04 * i as f64, 0.035)?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────
// 叠加直方图
// ─────────────────────────────────────────────────────────────

/// 叠加的直方图折线，可选数据点
pub struct OverlaidHistograms<'r> {
    pub name: String,
    pub histograms: Vec<Prediction<'r>>,
    pub data: Option<&'r Hist1D>,
    pub data_legend: String,
    pub x_title: String,
    pub y_title: String,
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
    pub log_x: bool,
    pub log_y: bool,
    /// CME 与亮度下方的附加文字
    pub extra_lines: Vec<String>,
}

impl<'r> OverlaidHistograms<'r> {
    pub fn new(histograms: Vec<Prediction<'r>>, data: Option<&'r Hist1D>) -> Self {
        OverlaidHistograms {
            name: "overlaidHistograms".to_string(),
            histograms,
            data,
            data_legend: "Data".to_string(),
            x_title: "m_{jj} [TeV]".to_string(),
            y_title: "Events".to_string(),
            x_range: None,
            y_range: None,
            log_x: false,
            log_y: true,
            extra_lines: Vec::new(),
        }
    }

    fn hists(&self) -> Vec<&'r Hist1D> {
        self.histograms.iter().map(|p| p.hist).chain(self.data).collect()
    }

    pub fn axis_ranges(&self) -> ((f64, f64), (f64, f64)) {
        let hists = self.hists();
        let (x_low, x_high) = pick_nice_x_limits(&hists, self.data, self.x_range);
        let y = self.y_range.unwrap_or_else(|| {
            let (low, high) = content_extent(&hists, x_low, x_high);
            pick_nice_y_limits(low, high, self.log_y, false)
        });
        ((x_low, x_high), y)
    }
}

impl Figure for OverlaidHistograms<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, painter: &Painter) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        if self.histograms.is_empty() {
            return Err(ResplotError::InvalidArgument(format!(
                "{} needs at least one histogram",
                self.name
            )));
        }
        let canvas = Canvas::new(root, self.name());
        root.fill(&WHITE).map_err(|e| canvas.fail(e))?;

        let ((x_low, x_high), (y1, y2)) = self.axis_ranges();
        let mut plot = Frame::new(
            AxisScale::new(x_low, x_high, self.log_x && x_low > 0.0)?,
            AxisScale::new(y1, y2, self.log_y)?,
        )
        .titles(&self.x_title, &self.y_title)
        .build(&canvas)?;

        let colours = painter.palette.good_colours(self.histograms.len());
        for (i, entry) in self.histograms.iter().enumerate() {
            let (first, last) = visible_bins(entry.hist, Some((x_low, x_high)));
            let colour = colours[i % colours.len()];
            plot.hist_outline(entry.hist, first, last, colour.stroke_width(2))?;
        }
        if let Some(data) = self.data {
            let (first, last) = visible_bins(data, Some((x_low, x_high)));
            plot.hist_points(data, first, last, &BLACK)?;
        }

        let rows = self.histograms.len() + usize::from(self.data.is_some());
        let top = 0.85;
        let mut legend = Legend::new(0.55, top - 0.04 * rows as f64, 0.92, top);
        if self.data.is_some() {
            legend.add(LegendMarker::Point(BLACK), self.data_legend.as_str());
        }
        for (i, entry) in self.histograms.iter().enumerate() {
            legend.add(
                LegendMarker::Line {
                    colour: colours[i % colours.len()],
                    width: 2,
                    dashed: false,
                },
                entry.legend.as_str(),
            );
        }
        legend.draw(&canvas)?;

        canvas.experiment_label(painter, 0.55, 0.88, 0.04, false)?;
        canvas.cme_and_lumi(painter, 0.2, 0.85, 0.035)?;
        draw_extra_lines(&canvas, &self.extra_lines)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
// 堆叠直方图
// ─────────────────────────────────────────────────────────────

/// 填充堆叠图：第一个直方图在最下层
pub struct StackedHistograms<'r> {
    pub name: String,
    pub stack: Vec<Prediction<'r>>,
    pub data: Option<&'r Hist1D>,
    pub data_legend: String,
    pub x_title: String,
    pub y_title: String,
    pub ratio_y_title: String,
    /// 数据/堆叠总和的比值栏（需要数据）
    pub ratio: bool,
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
    pub log_x: bool,
    pub log_y: bool,
    pub extra_lines: Vec<String>,
}

impl<'r> StackedHistograms<'r> {
    pub fn new(stack: Vec<Prediction<'r>>, data: Option<&'r Hist1D>) -> Self {
        StackedHistograms {
            name: "stackedHistograms".to_string(),
            stack,
            data,
            data_legend: "Data".to_string(),
            x_title: "m_{jj} [TeV]".to_string(),
            y_title: "Events".to_string(),
            ratio_y_title: "Data/Pred.".to_string(),
            ratio: false,
            x_range: None,
            y_range: None,
            log_x: false,
            log_y: true,
            extra_lines: Vec::new(),
        }
    }

    /// 逐层累加：第 k 个为前 k+1 个直方图之和
    pub fn cumulative(&self) -> Result<Vec<Hist1D>> {
        let mut layers = Vec::with_capacity(self.stack.len());
        let Some(first) = self.stack.first() else {
            return Ok(layers);
        };
        let mut running = first.hist.empty_clone(format!("{}_stack", self.name));
        for entry in &self.stack {
            running.add(entry.hist)?;
            layers.push(running.clone());
        }
        Ok(layers)
    }

    /// 坐标范围；无数据时由堆叠总和决定（对数轴 0.5 到最大值×5，线性轴 0 到最大值×1.4）
    pub fn axis_ranges(&self, total: &Hist1D) -> ((f64, f64), (f64, f64)) {
        let hists: Vec<&Hist1D> = self.stack.iter().map(|p| p.hist).collect();
        let (x_low, x_high) = pick_nice_x_limits(&hists, self.data, self.x_range);
        let y = self.y_range.unwrap_or_else(|| {
            let mut contents = vec![total];
            contents.extend(self.data);
            let (_, high) = content_extent(&contents, x_low, x_high);
            if self.log_y {
                (0.5, (high * 5.0).max(5.0))
            } else {
                (0.0, if high > 0.0 { high * 1.4 } else { 1.0 })
            }
        });
        ((x_low, x_high), y)
    }
}

impl Figure for StackedHistograms<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, painter: &Painter) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let layers = self.cumulative()?;
        let Some(total) = layers.last() else {
            return Err(ResplotError::InvalidArgument(format!(
                "{} needs at least one histogram to stack",
                self.name
            )));
        };
        let ratio_data = match (self.ratio, self.data) {
            (false, _) => None,
            (true, Some(data)) => Some(data),
            (true, None) => {
                return Err(ResplotError::InvalidArgument(format!(
                    "{}: a ratio pad needs a data histogram",
                    self.name
                )))
            }
        };

        let canvas = Canvas::new(root, self.name());
        root.fill(&WHITE).map_err(|e| canvas.fail(e))?;

        let ((x_low, x_high), (y1, y2)) = self.axis_ranges(total);
        let x_axis = AxisScale::new(x_low, x_high, self.log_x && x_low > 0.0)?;
        let colours = painter.palette.good_colours(self.stack.len());
        let colour = |i: usize| colours[i % colours.len()];

        let heights = pad_heights(1);
        let (_, height) = canvas.size();
        let (upper, lower) = root.split_vertically((height * heights[0]) as i32);
        let main_area = if ratio_data.is_some() { &upper } else { root };
        let main = Canvas::new(main_area, self.name());

        let mut frame = Frame::new(x_axis, AxisScale::new(y1, y2, self.log_y)?).titles(&self.x_title, &self.y_title);
        if ratio_data.is_some() {
            let frac = heights[0];
            frame = frame
                .margins(Margins {
                    top: 0.05 / frac,
                    bottom: 0.0,
                    ..Margins::default()
                })
                .text_sizes(0.035 / frac, 0.04 / frac)
                .hide_x_labels();
        }
        let mut plot = frame.build(&main)?;

        // 从最上层画起，下层覆盖在上层之上
        for (i, layer) in layers.iter().enumerate().rev() {
            let (first, last) = visible_bins(layer, Some((x_low, x_high)));
            plot.hist_filled(layer, first, last, colour(i).filled(), Some(colour(i).stroke_width(2)))?;
        }
        if let Some(data) = self.data {
            let (first, last) = visible_bins(data, Some((x_low, x_high)));
            plot.hist_points(data, first, last, &BLACK)?;
        }

        if let Some(data) = ratio_data {
            let frac = heights[1];
            let pad = Canvas::new(&lower, self.name());
            let denominators: Vec<&Hist1D> = self.stack.iter().map(|p| p.hist).collect();
            let ratio = Hist1D::create_ratio(data, &denominators)?;
            let (first, last) = visible_bins(&ratio, Some((x_low, x_high)));
            let mut plot = Frame::new(x_axis, AxisScale::linear(0.0, 2.0)?)
                .titles(&self.x_title, &self.ratio_y_title)
                .margins(Margins {
                    top: 0.0,
                    bottom: 0.1 / frac,
                    ..Margins::default()
                })
                .text_sizes(0.035 / frac, 0.04 / frac)
                .y_labels(3)
                .build(&pad)?;
            plot.hist_points(&ratio, first, last, &BLACK)?;
            plot.hline(1.0, BLACK.stroke_width(1), true)?;
        }

        // 图例自上而下与堆叠的视觉顺序一致
        let rows = self.stack.len() + usize::from(self.data.is_some());
        let top = if ratio_data.is_some() { 0.95 } else { 0.90 };
        let mut legend = Legend::new(0.5, top - 0.04 * rows as f64, 0.92, top);
        legend.text_size = 0.03;
        if self.data.is_some() {
            legend.add(LegendMarker::Point(BLACK), self.data_legend.as_str());
        }
        for (i, entry) in self.stack.iter().enumerate().rev() {
            legend.add(
                LegendMarker::Fill {
                    fill: colour(i),
                    border: None,
                },
                entry.legend.as_str(),
            );
        }
        legend.draw(&canvas)?;

        canvas.experiment_label(painter, 0.2, 0.9, 0.04, false)?;
        canvas.cme_and_lumi(painter, 0.2, 0.85, 0.035)?;
        draw_extra_lines(&canvas, &self.extra_lines)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
// 叠加曲线
// ─────────────────────────────────────────────────────────────

/// 一条曲线及其图例
pub struct LabelledGraph<'r> {
    pub graph: &'r Graph,
    pub legend: String,
}

/// 曲线叠加范围：x 取全部点的首末，y 在对数轴上取最小值/100 到最大值×100，
/// 线性轴上按符号各放宽 20%
pub fn graph_overlay_ranges(graphs: &[&Graph], log_y: bool) -> Result<((f64, f64), (f64, f64))> {
    let x = graphs
        .iter()
        .map(|g| g.x_range())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (l, h)| (lo.min(l), hi.max(h)));
    let min = graphs.iter().map(|g| g.min_y()).fold(f64::INFINITY, f64::min);
    let max = graphs.iter().map(|g| g.max_y()).fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return Err(ResplotError::InvalidRange("no graphs to overlay".to_string()));
    }

    let y = if log_y {
        if min <= 0.0 {
            return Err(ResplotError::InvalidRange(format!(
                "graphs reach {} on a logarithmic axis",
                min
            )));
        }
        (min / 100.0, max * 100.0)
    } else {
        let low = if min < 0.0 { 1.2 * min } else { 0.8 * min };
        let high = if max < 0.0 { 0.8 * max } else { 1.2 * max };
        if high > low {
            (low, high)
        } else {
            (low - 1.0, low + 1.0)
        }
    };
    Ok((x, y))
}

/// 第 i 条曲线的颜色序号
///
/// 成对时相邻两条共用一个颜色；总数少于 3 时跳过首个颜色。
pub fn graph_colour_index(i: usize, n: usize, pair_lines: bool) -> usize {
    let index = if pair_lines { i / 2 } else { i };
    if n < 3 {
        index + 1
    } else {
        index
    }
}

/// 若干曲线叠加（点与折线）
pub struct OverlaidGraphs<'r> {
    pub name: String,
    pub graphs: Vec<LabelledGraph<'r>>,
    pub x_title: String,
    pub y_title: String,
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
    pub log_x: bool,
    pub log_y: bool,
    /// 相邻两条为一组：同色，奇数序号用虚线
    pub pair_lines: bool,
    /// 虚线横线的 y 值
    pub horizontal_lines: Vec<f64>,
    /// 图例上方的附加文字行
    pub extra_legend_lines: Vec<String>,
}

impl<'r> OverlaidGraphs<'r> {
    pub fn new(graphs: Vec<LabelledGraph<'r>>) -> Self {
        OverlaidGraphs {
            name: "severalObservedLimits".to_string(),
            graphs,
            x_title: "m_{Z'} [GeV]".to_string(),
            y_title: "#sigma #times #it{A} #times BR [pb]".to_string(),
            x_range: None,
            y_range: None,
            log_x: false,
            log_y: true,
            pair_lines: false,
            horizontal_lines: Vec::new(),
            extra_legend_lines: Vec::new(),
        }
    }

    pub fn axis_ranges(&self) -> Result<((f64, f64), (f64, f64))> {
        let graphs: Vec<&Graph> = self.graphs.iter().map(|g| g.graph).collect();
        match (self.x_range, self.y_range) {
            (Some(x), Some(y)) => Ok((x, y)),
            (x, y) => {
                let (auto_x, auto_y) = graph_overlay_ranges(&graphs, self.log_y)?;
                Ok((x.unwrap_or(auto_x), y.unwrap_or(auto_y)))
            }
        }
    }
}

impl Figure for OverlaidGraphs<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, painter: &Painter) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let canvas = Canvas::new(root, self.name());
        root.fill(&WHITE).map_err(|e| canvas.fail(e))?;

        let ((x1, x2), (y1, y2)) = self.axis_ranges()?;
        let mut plot = Frame::new(AxisScale::new(x1, x2, self.log_x)?, AxisScale::new(y1, y2, self.log_y)?)
            .titles(&self.x_title, &self.y_title)
            .build(&canvas)?;

        let n = self.graphs.len();
        let groups = if self.pair_lines { n / 2 + 1 } else { n };
        let colours = painter.palette.good_colours(groups);
        let colour_of = |i: usize| colours[graph_colour_index(i, n, self.pair_lines) % colours.len()];

        for (i, entry) in self.graphs.iter().enumerate() {
            let colour = colour_of(i);
            let dashed = self.pair_lines && i % 2 == 1;
            plot.graph_line(entry.graph, colour.stroke_width(2), dashed.then_some((0.02, 0.012)))?;
            plot.graph_points(entry.graph, &colour)?;
        }
        for &y in &self.horizontal_lines {
            plot.hline(y, BLACK.stroke_width(1), true)?;
        }

        let row = 0.05;
        let top = 0.88 - 0.04;
        let rows = n + self.extra_legend_lines.len();
        let mut legend = Legend::new(0.55, top - row * rows as f64, 0.90, top);
        for line in &self.extra_legend_lines {
            legend.add(LegendMarker::Text, line.as_str());
        }
        for (i, entry) in self.graphs.iter().enumerate() {
            legend.add(
                LegendMarker::Line {
                    colour: colour_of(i),
                    width: 2,
                    dashed: self.pair_lines && i % 2 == 1,
                },
                entry.legend.as_str(),
            );
        }
        legend.draw(&canvas)?;

        canvas.experiment_label(painter, 0.2, 0.85, 0.04, false)?;
        canvas.cme_and_lumi(painter, 0.2, 0.80, 0.035)?;
        if painter.draw_user_text {
            if let Some(cut) = &painter.cut_string {
                canvas.text(cut, 0.2, 0.76, 0.035)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::painter::tests::assert_renders;

    fn hist(name: &str, contents: &[f64]) -> Hist1D {
        let edges: Vec<f64> = (0..=contents.len()).map(|i| 1.0 + i as f64).collect();
        Hist1D::from_parts(name, edges, contents, None, 0.0, 0.0).unwrap()
    }

    fn entries<'r>(hists: &'r [Hist1D]) -> Vec<Prediction<'r>> {
        hists
            .iter()
            .map(|hist| Prediction {
                hist,
                legend: hist.name.clone(),
            })
            .collect()
    }

    #[test]
    fn test_pick_nice_x_limits() {
        let a = hist("a", &[0.0, 5.0, 3.0, 0.0, 0.0, 0.0]);
        let b = hist("b", &[0.0, 0.0, 0.0, 2.0, 4.0, 0.0]);
        let (a_low, _) = a.filled_x_range();
        let (_, b_high) = b.filled_x_range();
        assert_eq!(pick_nice_x_limits(&[&a, &b], None, None), (a_low, b_high));
        assert_eq!(pick_nice_x_limits(&[&a, &b], Some(&b), None), b.filled_x_range());
        assert_eq!(pick_nice_x_limits(&[&a, &b], Some(&b), Some((2.0, 3.0))), (2.0, 3.0));
    }

    #[test]
    fn test_pick_nice_y_limits() {
        assert_eq!(pick_nice_y_limits(2.0, 100.0, false, false), (0.01, 150.0));
        let (y1, y2) = pick_nice_y_limits(10.0, 1000.0, true, false);
        assert!((y1 - 2.0).abs() < 1e-12);
        assert!((y2 - 15000.0).abs() < 1e-9);
        // 下限不低于 0.3
        let (y1, _) = pick_nice_y_limits(0.5, 1000.0, true, false);
        assert_eq!(y1, 0.3);
        // 最大值接近 1 时上限至少为最大值×5
        let (_, y2) = pick_nice_y_limits(0.5, 1.2, true, false);
        assert!(y2 >= 6.0);
        let (_, roomy) = pick_nice_y_limits(10.0, 1000.0, true, true);
        assert!((roomy - 45000.0).abs() < 1e-9);
    }

    #[test]
    fn test_cumulative_stack() {
        let hists = vec![hist("qcd", &[10.0, 20.0, 5.0]), hist("ttbar", &[1.0, 2.0, 3.0])];
        let figure = StackedHistograms::new(entries(&hists), None);
        let layers = figure.cumulative().unwrap();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].bin_content(2), 20.0);
        assert_eq!(layers[1].bin_content(2), 22.0);
        assert_eq!(layers[1].bin_content(3), 8.0);

        let ((_, _), (y1, y2)) = figure.axis_ranges(&layers[1]);
        assert_eq!(y1, 0.5);
        // 最高箱 22 ± sqrt(22)
        assert!((y2 - (22.0 + 22f64.sqrt()) * 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_stack_ratio_needs_data() {
        let hists = vec![hist("qcd", &[10.0, 20.0, 5.0])];
        let mut figure = StackedHistograms::new(entries(&hists), None);
        figure.ratio = true;
        let dir = tempfile::tempdir().unwrap();
        let painter = crate::plot::painter::tests::svg_painter();
        assert!(matches!(
            painter.render(&figure, &dir.path().join("stack")),
            Err(ResplotError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_graph_overlay_ranges() {
        let a = Graph::new("a", vec![1000.0, 2000.0], vec![0.5, 0.05]).unwrap();
        let b = Graph::new("b", vec![1500.0, 3000.0], vec![2.0, 0.1]).unwrap();
        let ((x1, x2), (y1, y2)) = graph_overlay_ranges(&[&a, &b], true).unwrap();
        assert_eq!((x1, x2), (1000.0, 3000.0));
        assert!((y1 - 5e-4).abs() < 1e-12);
        assert!((y2 - 200.0).abs() < 1e-9);

        let ((_, _), (y1, y2)) = graph_overlay_ranges(&[&a, &b], false).unwrap();
        assert!((y1 - 0.04).abs() < 1e-12);
        assert!((y2 - 2.4).abs() < 1e-12);

        let negative = Graph::new("n", vec![1.0, 2.0], vec![-1.0, 1.0]).unwrap();
        assert!(graph_overlay_ranges(&[&negative], true).is_err());
        let ((_, _), (y1, _)) = graph_overlay_ranges(&[&negative], false).unwrap();
        assert!((y1 + 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_graph_colour_index() {
        assert_eq!(graph_colour_index(0, 2, false), 1);
        assert_eq!(graph_colour_index(1, 2, false), 2);
        assert_eq!(graph_colour_index(3, 5, false), 3);
        // 成对：0,1 同色，2,3 同色
        assert_eq!(graph_colour_index(1, 4, true), 0);
        assert_eq!(graph_colour_index(2, 4, true), 1);
        assert_eq!(graph_colour_index(1, 2, true), 1);
    }

    #[test]
    fn test_overlay_figures_render() {
        let hists = vec![
            hist("4-par fit", &[0.0, 50.0, 20.0, 8.0, 0.0]),
            hist("5-par fit", &[0.0, 48.0, 22.0, 7.0, 0.0]),
        ];
        let data = hist("data", &[0.0, 51.0, 19.0, 9.0, 0.0]);

        let mut overlay = OverlaidHistograms::new(entries(&hists), Some(&data));
        overlay.extra_lines = vec!["|y*| < 0.6".to_string()];
        assert_renders(&overlay);
        overlay.data = None;
        overlay.log_y = false;
        assert_renders(&overlay);

        let mut stack = StackedHistograms::new(entries(&hists), Some(&data));
        assert_renders(&stack);
        stack.ratio = true;
        assert_renders(&stack);
        stack.data = None;
        stack.ratio = false;
        stack.log_y = false;
        assert_renders(&stack);

        let a = Graph::new("a", vec![1000.0, 2000.0, 3000.0], vec![0.5, 0.05, 0.01]).unwrap();
        let b = Graph::new("b", vec![1000.0, 2000.0, 3000.0], vec![0.8, 0.08, 0.02]).unwrap();
        let mut graphs = OverlaidGraphs::new(vec![
            LabelledGraph {
                graph: &a,
                legend: "Z' observed".to_string(),
            },
            LabelledGraph {
                graph: &b,
                legend: "Z' expected".to_string(),
            },
        ]);
        graphs.pair_lines = true;
        graphs.horizontal_lines = vec![0.1];
        graphs.extra_legend_lines = vec!["95% CL".to_string()];
        assert_renders(&graphs);
    }
}
