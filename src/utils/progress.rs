//! # 进度条工具
//!
//! 封装 `indicatif`：批量渲染用的进度条与加载结果文件时的 spinner。
//!
//! ## 依赖关系
//! - 被 `commands/` 与 `batch/` 使用
//! - 使用 `indicatif` crate

use indicatif::{ProgressBar, ProgressStyle};

fn style_or_default(template: &str, fallback: ProgressStyle) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or(fallback)
}

/// 批量处理进度条
pub fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        style_or_default(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            ProgressStyle::default_bar(),
        )
        .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}

/// spinner（读取大结果文件等不确定进度的任务）
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        style_or_default("{spinner:.green} {elapsed_precise} {msg}", ProgressStyle::default_spinner())
            .tick_strings(&["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
