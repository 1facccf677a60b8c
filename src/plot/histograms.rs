//! # 通用直方图图表
//!
//! ## 功能
//! - `BasicHistogram`：单个直方图的填充阶梯图（统计量分布等）
//! - `DataWithPredictions`：数据与若干预测，下方为各自的比值栏
//!
//! ## 依赖关系
//! - 被 `commands/stats.rs`, `commands/compare.rs` 使用
//! - 使用 `plot/frame.rs`, `plot/decor.rs`

use crate::error::{ResplotError, Result};
use crate::models::Hist1D;
use crate::plot::axis::AxisScale;
use crate::plot::decor::{Canvas, Legend, LegendMarker};
use crate::plot::frame::{visible_bins, Frame, Margins};
use crate::plot::painter::{Figure, Painter};

use plotters::coord::Shift;
use plotters::prelude::*;

/// 由内容范围得到 y 轴：对数轴取最小非零值/2 到最大值×100，线性轴到最大值×1.5
fn content_axis(low: f64, low_nonzero: f64, high: f64, log: bool) -> Result<AxisScale> {
    if log {
        let min = if low_nonzero > 0.0 && low_nonzero < high { low_nonzero / 2.0 } else { 0.5 };
        AxisScale::logarithmic(min, (high * 100.0).max(min * 10.0))
    } else {
        let min = low.min(0.0);
        let max = if high > min { high * 1.5 } else { min + 1.0 };
        AxisScale::linear(min, max)
    }
}

// ─────────────────────────────────────────────────────────────
// 单个直方图
// ─────────────────────────────────────────────────────────────

/// 单个直方图，黑色轮廓加填充
pub struct BasicHistogram<'r> {
    pub name: String,
    pub hist: &'r Hist1D,
    pub x_title: String,
    pub y_title: String,
    /// 缺省取非空范围
    pub bins: Option<(usize, usize)>,
    pub log_x: bool,
    pub log_y: bool,
    pub fill: RGBColor,
    /// 右上角的附加文字，每项一行
    pub annotations: Vec<String>,
}

impl<'r> BasicHistogram<'r> {
    pub fn new(name: impl Into<String>, hist: &'r Hist1D) -> Self {
        BasicHistogram {
            name: name.into(),
            hist,
            x_title: String::new(),
            y_title: "Entries".to_string(),
            bins: None,
            log_x: false,
            log_y: false,
            fill: RED,
            annotations: Vec::new(),
        }
    }

    fn bin_range(&self) -> (usize, usize) {
        let n = self.hist.nbins();
        match self.bins {
            Some((first, last)) => {
                let first = first.clamp(1, n);
                (first, last.clamp(first, n))
            }
            None => visible_bins(self.hist, None),
        }
    }
}

impl Figure for BasicHistogram<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, painter: &Painter) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let canvas = Canvas::new(root, self.name());
        root.fill(&WHITE).map_err(|e| canvas.fail(e))?;

        let (first, last) = self.bin_range();
        let (x_low, x_high) = (self.hist.bin_low_edge(first), self.hist.bin_up_edge(last));
        let (low, low_nonzero, high) = self.hist.y_range(Some(x_low), Some(x_high));

        let mut plot = Frame::new(
            AxisScale::new(x_low, x_high, self.log_x && x_low > 0.0)?,
            content_axis(low, low_nonzero, high, self.log_y)?,
        )
        .titles(&self.x_title, &self.y_title)
        .build(&canvas)?;
        plot.hist_filled(self.hist, first, last, self.fill.filled(), Some(BLACK.stroke_width(1)))?;

        for (i, line) in self.annotations.iter().enumerate() {
            canvas.text(line, 0.6, 0.88 - 0.05 * i as f64, 0.035)?;
        }
        canvas.experiment_label(painter, 0.2, 0.88, 0.05, false)?;
        canvas.cme_and_lumi_vertical(painter, 0.2, 0.82, 0.04)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
// 数据、预测与比值
// ─────────────────────────────────────────────────────────────

/// 一条预测及其图例
pub struct Prediction<'r> {
    pub hist: &'r Hist1D,
    pub legend: String,
}

/// 数据与预测（上栏）及每个预测的数据/预测比值（下方各栏）
pub struct DataWithPredictions<'r> {
    pub name: String,
    pub data: &'r Hist1D,
    pub predictions: Vec<Prediction<'r>>,
    pub x_title: String,
    pub data_y_title: String,
    pub ratio_y_title: String,
    /// 只在数据范围之内收窄
    pub x_range: Option<(f64, f64)>,
    pub log_x: bool,
    pub log_y: bool,
    /// 比值栏的中心线
    pub ratio_centre: f64,
}

/// 比值栏的单栏高度（占画布比例）
pub fn ratio_pad_size(n: usize) -> f64 {
    match n {
        1 => 0.2,
        2 => 0.13,
        3 => 0.10,
        _ => 0.4 / n.max(1) as f64,
    }
}

/// 各栏自上而下的高度比例：主栏、中间比值栏、最下栏（含 x 轴标签区）
pub fn pad_heights(n: usize) -> Vec<f64> {
    let pad = ratio_pad_size(n);
    let top_of_ratios = 0.1 + pad * n as f64;
    let mut heights = vec![1.0 - top_of_ratios];
    heights.extend(std::iter::repeat(pad).take(n.saturating_sub(1)));
    heights.push(0.1 + pad);
    heights
}

impl<'r> DataWithPredictions<'r> {
    pub fn new(data: &'r Hist1D, predictions: Vec<Prediction<'r>>) -> Self {
        DataWithPredictions {
            name: "dataWithPredictions".to_string(),
            data,
            predictions,
            x_title: "m_{jj} [TeV]".to_string(),
            data_y_title: "Events".to_string(),
            ratio_y_title: "Data/Pred.".to_string(),
            x_range: None,
            log_x: false,
            log_y: true,
            ratio_centre: 1.0,
        }
    }

    /// 绘图的 x 范围：数据非空范围，用户范围只在其内部收窄
    pub fn plot_x_range(&self) -> (f64, f64) {
        let (mut low, mut high) = self.data.filled_x_range();
        if let Some((user_low, user_high)) = self.x_range {
            if user_low > self.data.x_min() {
                low = user_low;
            }
            if user_high < self.data.x_max() {
                high = user_high;
            }
        }
        (low, high)
    }

    /// 每个预测一个比值直方图
    pub fn ratios(&self) -> Result<Vec<Hist1D>> {
        self.predictions
            .iter()
            .map(|p| Hist1D::create_ratio(self.data, &[p.hist]))
            .collect()
    }
}

impl Figure for DataWithPredictions<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, painter: &Painter) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        if self.predictions.is_empty() {
            return Err(ResplotError::InvalidArgument(format!(
                "{} needs at least one prediction",
                self.name
            )));
        }
        let canvas = Canvas::new(root, self.name());
        root.fill(&WHITE).map_err(|e| canvas.fail(e))?;

        let ratios = self.ratios()?;
        let heights = pad_heights(ratios.len());
        let (_, total) = canvas.size();

        let mut areas = Vec::with_capacity(heights.len());
        let mut rest = root.clone();
        for h in &heights[..heights.len() - 1] {
            let (pad, below) = rest.split_vertically((h * total) as i32);
            areas.push(pad);
            rest = below;
        }
        areas.push(rest);

        let (x_low, x_high) = self.plot_x_range();
        let (first, last) = visible_bins(self.data, Some((x_low, x_high)));
        let x_axis = AxisScale::new(x_low, x_high, self.log_x && x_low > 0.0)?;
        let colours = painter.palette.good_colours(self.predictions.len());

        // 主栏
        let main = Canvas::new(&areas[0], self.name());
        let main_frac = heights[0];
        let (low, low_nonzero, high) = self.data.y_range(Some(x_low), Some(x_high));
        let mut plot = Frame::new(x_axis, content_axis(low, low_nonzero, high, self.log_y)?)
            .titles(&self.x_title, &self.data_y_title)
            .margins(Margins {
                top: 0.05 / main_frac,
                bottom: 0.0,
                ..Margins::default()
            })
            .text_sizes(0.035 / main_frac, 0.04 / main_frac)
            .hide_x_labels()
            .build(&main)?;
        plot.hist_points(self.data, first, last, &BLACK)?;
        for (i, prediction) in self.predictions.iter().enumerate() {
            let colour = colours[i % colours.len()];
            plot.hist_outline(prediction.hist, first, last, colour.stroke_width(2))?;
        }

        // 比值栏
        let n = ratios.len();
        for (i, ratio) in ratios.iter().enumerate() {
            let frac = heights[i + 1];
            let is_last = i + 1 == n;
            let pad = Canvas::new(&areas[i + 1], self.name());
            let mut frame = Frame::new(
                x_axis,
                AxisScale::linear(self.ratio_centre - 1.7, self.ratio_centre + 1.7)?,
            )
            .titles(&self.x_title, &self.ratio_y_title)
            .margins(Margins {
                top: 0.0,
                bottom: if is_last { 0.1 / frac } else { 0.0 },
                ..Margins::default()
            })
            .text_sizes(0.035 / frac, 0.04 / frac)
            .y_labels(3);
            if !is_last {
                frame = frame.hide_x_labels();
            }
            let mut plot = frame.build(&pad)?;
            let colour = colours[i % colours.len()];
            plot.hist_filled(ratio, first, last, colour.filled(), Some(colour.stroke_width(1)))?;
            plot.hline(self.ratio_centre, BLACK.stroke_width(1), true)?;
        }

        // 标签与图例（整张画布）
        let top_of_ratios = 1.0 - heights[0];
        let row = 0.05;
        let rows = (self.predictions.len() + 1) as f64;
        let (left, bottom, top) = if self.log_x {
            canvas.experiment_label(painter, 0.53, 0.88, 0.05, true)?;
            canvas.cme_and_lumi(painter, 0.51, 0.82, 0.04)?;
            let bottom = top_of_ratios + 0.02;
            (0.2, bottom, bottom + row * rows)
        } else {
            canvas.experiment_label(painter, 0.2, 0.4, 0.05, false)?;
            canvas.cme_and_lumi(painter, 0.5, 0.89, 0.04)?;
            (0.5, 0.87 - row * rows, 0.87)
        };
        let mut legend = Legend::new(left, bottom, left + 0.4, top);
        legend.add(LegendMarker::Point(BLACK), "Data");
        for (i, prediction) in self.predictions.iter().enumerate() {
            legend.add(
                LegendMarker::Line {
                    colour: colours[i % colours.len()],
                    width: 2,
                    dashed: false,
                },
                prediction.legend.as_str(),
            );
        }
        legend.draw(&canvas)?;
        Ok(())
    }
}
