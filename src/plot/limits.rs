//! # 限设定图
//!
//! 期望限的 ±2σ/±1σ 带、期望中位数、理论信号曲线与观测限，
//! 可选标出已有排除限的箭头。
//!
//! ## 依赖关系
//! - 被 `commands/limits.rs` 使用
//! - 使用 `plot/frame.rs`, `plot/decor.rs`
//! - 使用 `models/limits.rs`

use crate::error::{ResplotError, Result};
use crate::models::LimitResults;
use crate::plot::axis::AxisScale;
use crate::plot::decor::{Canvas, Legend, LegendMarker};
use crate::plot::frame::Frame;
use crate::plot::painter::{Figure, Painter};
use crate::plot::palette::EXISTING_LIMIT_COLOUR;

use plotters::coord::Shift;
use plotters::prelude::*;

const LINE_WIDTH: u32 = 3;

/// 限设定图
pub struct LimitPlot<'r> {
    pub name: String,
    pub limits: &'r LimitResults,
    pub x_title: String,
    pub y_title: String,
    /// 缺省取观测限的首末点
    pub x_range: Option<(f64, f64)>,
    /// 缺省取观测限最小正值/100 到最大值×1000
    pub y_range: Option<(f64, f64)>,
    pub existing_limit_label: String,
}

impl<'r> LimitPlot<'r> {
    pub fn new(limits: &'r LimitResults) -> Self {
        LimitPlot {
            name: "limitSettingPlot".to_string(),
            limits,
            x_title: "m_{Z'} [GeV]".to_string(),
            y_title: "#sigma #times #it{A} #times BR [pb]".to_string(),
            x_range: None,
            y_range: None,
            existing_limit_label: "Existing limit".to_string(),
        }
    }

    pub fn axis_ranges(&self) -> Result<((f64, f64), (f64, f64))> {
        let observed = &self.limits.observed;
        let x = self.x_range.unwrap_or_else(|| observed.x_range());
        let y = match self.y_range {
            Some(range) => range,
            None => {
                let min = observed
                    .y()
                    .iter()
                    .copied()
                    .filter(|v| *v > 0.0)
                    .fold(f64::INFINITY, f64::min);
                let max = observed.max_y();
                if !min.is_finite() {
                    return Err(ResplotError::InvalidRange(format!(
                        "observed limit '{}' has no positive points",
                        observed.name
                    )));
                }
                (min / 100.0, max * 1000.0)
            }
        };
        Ok((x, y))
    }

    /// 第 i 条信号曲线的虚线样式（划长, 间隔）
    fn signal_dash(i: usize) -> (f64, f64) {
        let dash = 0.03 - 0.006 * (i % 4) as f64;
        (dash, 0.012)
    }
}

impl Figure for LimitPlot<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn square(&self) -> bool {
        true
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, painter: &Painter) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let canvas = Canvas::new(root, self.name());
        root.fill(&WHITE).map_err(|e| canvas.fail(e))?;

        let ((x1, x2), (y1, y2)) = self.axis_ranges()?;
        let mut plot = Frame::new(AxisScale::linear(x1, x2)?, AxisScale::logarithmic(y1, y2)?)
            .titles(&self.x_title, &self.y_title)
            .build(&canvas)?;

        let palette = &painter.palette;
        plot.graph_band(&self.limits.expected_2sigma, &palette.two_sigma_band)?;
        plot.graph_band(&self.limits.expected_1sigma, &palette.one_sigma_band)?;
        plot.graph_line(
            &self.limits.expected_1sigma,
            BLACK.stroke_width(LINE_WIDTH),
            Some((0.006, 0.01)),
        )?;

        for (i, signal) in self.limits.signals.iter().enumerate() {
            plot.graph_line(
                &signal.graph,
                palette.signal_line(i).stroke_width(LINE_WIDTH),
                Some(Self::signal_dash(i)),
            )?;
        }

        plot.graph_line(&self.limits.observed, BLACK.stroke_width(LINE_WIDTH), None)?;
        plot.graph_points(&self.limits.observed, &BLACK)?;

        let mut legend = Legend::new(0.18, 0.18, 0.5, 0.18 + 0.055 * (3 + self.limits.signals.len()) as f64);
        if let Some(limit) = self.limits.existing_limit {
            let from = canvas.to_local(plot.pixel(limit, 0.002));
            let to = canvas.to_local(plot.pixel(limit, 0.0));
            canvas.arrow(from, to, &EXISTING_LIMIT_COLOUR, 2)?;
            legend.add(LegendMarker::Arrow(EXISTING_LIMIT_COLOUR), self.existing_limit_label.as_str());
        }
        for (i, signal) in self.limits.signals.iter().enumerate() {
            legend.add(
                LegendMarker::Line {
                    colour: palette.signal_line(i),
                    width: LINE_WIDTH,
                    dashed: true,
                },
                signal.legend.as_str(),
            );
        }
        legend.add(LegendMarker::Point(BLACK), "Observed 95% CL upper limit");
        legend.add(
            LegendMarker::Line {
                colour: BLACK,
                width: LINE_WIDTH,
                dashed: true,
            },
            "Expected 95% CL upper limit",
        );
        legend.add(
            LegendMarker::Band {
                outer: palette.two_sigma_band,
                inner: palette.one_sigma_band,
            },
            "68% and 95% bands",
        );
        legend.draw(&canvas)?;

        canvas.experiment_label(painter, 0.58, 0.88, 0.05, false)?;
        canvas.cme_and_lumi(painter, 0.5, 0.825, 0.04)?;
        if painter.draw_user_text {
            if let Some(cut) = &painter.cut_string {
                canvas.text(cut, 0.585, 0.775, 0.04)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::limits::tests::sample_limits;
    use crate::plot::painter::tests::assert_renders;

    #[test]
    fn test_automatic_axis_ranges() {
        let limits = sample_limits();
        let plot = LimitPlot::new(&limits);
        let ((x1, x2), (y1, y2)) = plot.axis_ranges().unwrap();
        assert_eq!((x1, x2), (1000.0, 4000.0));
        assert!((y1 - 0.01).abs() < 1e-12);
        assert!((y2 - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_user_ranges_win() {
        let limits = sample_limits();
        let plot = LimitPlot {
            x_range: Some((500.0, 5000.0)),
            y_range: Some((1e-4, 1e3)),
            ..LimitPlot::new(&limits)
        };
        assert_eq!(plot.axis_ranges().unwrap(), ((500.0, 5000.0), (1e-4, 1e3)));
    }

    #[test]
    fn test_non_positive_observed_is_rejected() {
        let mut limits = sample_limits();
        limits.observed = crate::models::Graph::new("observed", vec![1.0, 2.0], vec![0.0, -1.0]).unwrap();
        assert!(LimitPlot::new(&limits).axis_ranges().is_err());
    }

    #[test]
    fn test_signal_dashes_differ() {
        assert_ne!(LimitPlot::signal_dash(0), LimitPlot::signal_dash(1));
        assert_eq!(LimitPlot::signal_dash(0), LimitPlot::signal_dash(4));
    }

    #[test]
    fn test_limit_plot_renders() {
        let mut limits = sample_limits();
        assert!(limits.existing_limit.is_some());
        assert_renders(&LimitPlot::new(&limits));

        limits.existing_limit = None;
        let plot = LimitPlot {
            name: "limits_no_arrow".to_string(),
            y_range: Some((1e-4, 1e3)),
            ..LimitPlot::new(&limits)
        };
        assert_renders(&plot);
    }
}
