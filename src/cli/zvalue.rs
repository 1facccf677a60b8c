//! # zvalue 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/zvalue.rs`

use clap::Args;

/// zvalue 子命令参数
#[derive(Args, Debug)]
pub struct ZvalueArgs {
    /// One or more p-values in [0, 1]
    #[arg(required = true, num_args = 1..)]
    pub pvalues: Vec<f64>,

    /// Treat the p-values as deficits (negative significance)
    #[arg(long, default_value_t = false)]
    pub deficit: bool,
}
