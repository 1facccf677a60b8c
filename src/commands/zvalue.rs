//! # zvalue 子命令实现
//!
//! 将一组 p 值换算为单侧高斯显著性并以表格输出。

use crate::cli::zvalue::ZvalueArgs;
use crate::error::Result;
use crate::models::statistics::z_value;
use crate::utils::output;

use tabled::{Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct ZRow {
    #[tabled(rename = "p-value")]
    pvalue: String,
    #[tabled(rename = "Z (σ)")]
    significance: String,
}

fn z_rows(pvalues: &[f64], excess: bool) -> Result<Vec<ZRow>> {
    pvalues
        .iter()
        .map(|&p| {
            let z = z_value(p, excess)?;
            Ok(ZRow {
                pvalue: format!("{:e}", p),
                significance: if z.is_finite() { format!("{:.4}", z) } else { z.to_string() },
            })
        })
        .collect()
}

/// 执行 zvalue 命令
pub fn execute(args: ZvalueArgs) -> Result<()> {
    let excess = !args.deficit;
    output::print_header(if excess { "Significance (excess)" } else { "Significance (deficit)" });
    let rows = z_rows(&args.pvalues, excess)?;
    println!("{}", Table::new(rows));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_z_rows() {
        let rows = z_rows(&[0.0013498980316301, 0.0227501319481792], true).unwrap();
        assert_eq!(rows[0].significance, "3.0000");
        assert_eq!(rows[1].significance, "2.0000");

        let rows = z_rows(&[0.0227501319481792], false).unwrap();
        assert_eq!(rows[0].significance, "-2.0000");
    }

    #[test]
    fn test_invalid_pvalue_is_an_error() {
        assert!(z_rows(&[0.5, 2.0], true).is_err());
    }
}
