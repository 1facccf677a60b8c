//! # 统计量列表读取器
//!
//! 从 CSV 文件的某一列读取一组统计量（例如赝实验的检验统计量）。
//!
//! ## 依赖关系
//! - 被 `commands/stats.rs` 使用
//! - 使用 `csv` crate

use crate::error::{ResplotError, Result};

use std::io::Read;
use std::path::Path;

/// 读取 CSV 文件中名为 `column` 的列
///
/// 空单元格跳过；无法解析为数值的单元格报错并给出行号。
pub fn read_statistics_column(path: &Path, column: &str) -> Result<Vec<f64>> {
    if !path.exists() {
        return Err(ResplotError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let reader = csv::Reader::from_path(path)?;
    read_column(reader, column, &path.display().to_string())
}

/// 从任意 CSV 读取器读取一列
pub fn read_column<R: Read>(mut reader: csv::Reader<R>, column: &str, source: &str) -> Result<Vec<f64>> {
    let headers = reader.headers()?.clone();
    let index = headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| ResplotError::MissingKey {
            key: column.to_string(),
            path: source.to_string(),
        })?;

    let mut values = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let cell = record.get(index).unwrap_or("").trim();
        if cell.is_empty() {
            continue;
        }
        let value: f64 = cell.parse().map_err(|_| {
            ResplotError::InvalidArgument(format!(
                "{}: row {} column '{}' is not a number: '{}'",
                source,
                row + 2,
                column,
                cell
            ))
        })?;
        values.push(value);
    }

    if values.is_empty() {
        return Err(ResplotError::Statistics(format!(
            "column '{}' in {} contains no values",
            column, source
        )));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn reader(content: &str) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes())
    }

    #[test]
    fn test_read_column() {
        let values = read_column(reader("id,chi2\n1,3.5\n2,\n3,4.5\n"), "chi2", "mem").unwrap();
        assert_eq!(values, vec![3.5, 4.5]);
    }

    #[test]
    fn test_missing_column() {
        assert!(matches!(
            read_column(reader("id,chi2\n1,3.5\n"), "logL", "mem"),
            Err(ResplotError::MissingKey { .. })
        ));
    }

    #[test]
    fn test_bad_value_reports_row() {
        let err = read_column(reader("chi2\n1.0\nabc\n"), "chi2", "mem").unwrap_err();
        assert!(err.to_string().contains("row 3"));
    }

    #[test]
    fn test_read_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "bh,chi2").unwrap();
        writeln!(tmp, "1.0,2.0").unwrap();
        writeln!(tmp, "3.0,4.0").unwrap();
        tmp.flush().unwrap();
        let values = read_statistics_column(tmp.path(), "bh").unwrap();
        assert_eq!(values, vec![1.0, 3.0]);
    }
}
