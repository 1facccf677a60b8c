//! # 绘图样式参数
//!
//! 所有出图子命令共用的样式选项，通过 `#[command(flatten)]` 嵌入；
//! 常用项可由环境变量给出缺省值。
//!
//! ## 依赖关系
//! - 被 `cli/search.rs`, `cli/limits.rs`, `cli/compare.rs`, `cli/stats.rs` 嵌入
//! - 转换为 `plot/painter.rs` 的 `Painter`

use crate::error::Result;
use crate::plot::{LabelType, OutputFormat, Painter, Palette};

use clap::Args;

/// 绘图样式参数
#[derive(Args, Debug, Clone)]
pub struct StyleArgs {
    /// Integrated luminosity in pb^-1
    #[arg(long, env = "RESPLOT_LUMI", default_value_t = 139000.0)]
    pub lumi: f64,

    /// Centre-of-mass energy in TeV
    #[arg(long, env = "RESPLOT_CME", default_value_t = 13.0)]
    pub cme: f64,

    /// Decimal places of the luminosity in fb^-1
    #[arg(long, default_value_t = 0)]
    pub lumi_decimals: usize,

    /// Print the luminosity in pb^-1 instead of fb^-1
    #[arg(long, default_value_t = false)]
    pub lumi_in_pb: bool,

    /// Output image formats (comma separated)
    #[arg(long = "format", env = "RESPLOT_FORMATS", value_enum, value_delimiter = ',', default_value = "png")]
    pub formats: Vec<OutputFormat>,

    /// Use an 800x600 canvas instead of 600x600
    #[arg(long, default_value_t = false)]
    pub rectangular: bool,

    /// Experiment name in the label
    #[arg(long, default_value = "ATLAS")]
    pub experiment: String,

    /// Label type: 0 public, 1 Preliminary, 2 Internal, 3 Simulation Preliminary,
    /// 4 Simulation Internal, 5 Simulation, 6 Work in Progress
    #[arg(long, env = "RESPLOT_LABEL", default_value_t = 2, value_parser = clap::value_parser!(u8).range(0..=6))]
    pub label_type: u8,

    /// Do not draw the experiment label
    #[arg(long, default_value_t = false)]
    pub no_label: bool,

    /// Colour palette: Tropical, Classic, Teal, Grayscale
    #[arg(long, env = "RESPLOT_PALETTE", default_value = "Tropical")]
    pub palette: String,

    /// Draw fit range, p-values and the cut description on the figures
    #[arg(long, default_value_t = false)]
    pub user_text: bool,

    /// Analysis selection shown with --user-text (ROOT text markup allowed)
    #[arg(long)]
    pub cut: Option<String>,
}

impl StyleArgs {
    /// 构造共享绘图样式
    pub fn painter(&self) -> Result<Painter> {
        Ok(Painter {
            luminosity_pb: self.lumi,
            cme_tev: self.cme,
            lumi_decimals: self.lumi_decimals,
            lumi_in_pb: self.lumi_in_pb,
            formats: self.formats.clone(),
            rectangular: self.rectangular,
            experiment_label: !self.no_label,
            experiment: self.experiment.clone(),
            label_type: LabelType::from_index(self.label_type)?,
            palette: Palette::by_name(&self.palette)?,
            draw_user_text: self.user_text,
            cut_string: self.cut.clone(),
        })
    }
}
