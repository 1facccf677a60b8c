//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `models/`, `plot/`, `utils/`
//! - 子模块: search, limits, compare, graphs, stats, zvalue, keys

pub mod compare;
pub mod graphs;
pub mod keys;
pub mod limits;
pub mod search;
pub mod stats;
pub mod zvalue;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Search(args) => search::execute(args),
        Commands::Limits(args) => limits::execute(args),
        Commands::Compare(args) => compare::execute(args),
        Commands::Graphs(args) => graphs::execute(args),
        Commands::Stats(args) => stats::execute(args),
        Commands::Zvalue(args) => zvalue::execute(args),
        Commands::Keys(args) => keys::execute(args),
    }
}
