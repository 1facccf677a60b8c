//! # resplot - 共振态搜索结果作图工具
//!
//! 读取搜索阶段与限设定阶段的结果文件，输出出版风格的图表，
//! 并报告检验统计量、p 值及其误差与信号质量限。
//!
//! ## 子命令
//! - `search`  - 数据与拟合、显著性、赝实验分布与层析图
//! - `limits`  - 限设定图与交点质量
//! - `compare` - 数据与多个预测及比值栏
//! - `stats`   - CSV 统计量列的分布
//! - `zvalue`  - p 值换算为显著性
//! - `keys`    - 列出结果文件中的对象
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (结果文件读取)
//!   │     ├── models/    (直方图、曲线与结果模型)
//!   │     ├── plot/      (图表绘制)
//!   │     └── batch/     (目录批量处理)
//!   ├── utils/      (输出、进度条、标签文本)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod models;
mod parsers;
mod plot;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
