//! # keys 子命令实现
//!
//! 列出结果文件中的全部对象及其类型。

use crate::cli::KeysArgs;
use crate::error::Result;
use crate::parsers::ResultsFile;
use crate::utils::output;

use tabled::{Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct KeyRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Kind")]
    kind: String,
}

fn key_rows(file: &ResultsFile) -> Vec<KeyRow> {
    file.keys()
        .map(|key| KeyRow {
            key: key.to_string(),
            kind: file.kind_of(key).unwrap_or("?").to_string(),
        })
        .collect()
}

/// 执行 keys 命令
pub fn execute(args: KeysArgs) -> Result<()> {
    let file = ResultsFile::open(&args.input)?;
    output::print_header(&format!("Objects in {}", file.path()));
    let rows = key_rows(&file);
    output::print_value("Objects", rows.len());
    println!("{}", Table::new(rows));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_rows_are_sorted_with_kinds() {
        let content = r#"{
            "pvalue": 0.3,
            "basicData": {"edges": [1.0, 2.0, 3.0], "contents": [4.0, 5.0]}
        }"#;
        let file = ResultsFile::parse_content(content, "mem.json").unwrap();
        let rows = key_rows(&file);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, "basicData");
        assert_eq!(rows[1].key, "pvalue");
        assert_eq!(rows[0].kind, "histogram");
        assert_eq!(rows[1].kind, "number");
    }
}
