//! # 结果文件读取器
//!
//! 结果文件是一个 JSON 对象，键为对象名，值为直方图、曲线、数值数组、
//! 字符串数组或单个数值。
//!
//! ## 格式说明
//! ```text
//! {
//!   "basicData": {"edges": [..], "contents": [..], "errors": [..], "underflow": 0, "overflow": 0},
//!   "observed":  {"x": [..], "y": [..], "ey_low": [..], "ey_high": [..]},
//!   "FitRange":  [1100.0, 8000.0],
//!   "signals":   ["zprime", "qstar"]
//! }
//! ```
//!
//! ## 依赖关系
//! - 被 `parsers/search.rs`, `parsers/limits.rs`, `commands/compare.rs` 使用
//! - 使用 `models/histogram.rs`, `models/graph.rs`
//! - 使用 `serde_json` 解析

use crate::error::{ResplotError, Result};
use crate::models::{Graph, Hist1D};

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// 直方图的存储形式
#[derive(Debug, Deserialize)]
struct StoredHist {
    edges: Vec<f64>,
    contents: Vec<f64>,
    #[serde(default)]
    errors: Option<Vec<f64>>,
    #[serde(default)]
    underflow: f64,
    #[serde(default)]
    overflow: f64,
    #[serde(default)]
    name: Option<String>,
}

/// 曲线的存储形式
#[derive(Debug, Deserialize)]
struct StoredGraph {
    x: Vec<f64>,
    y: Vec<f64>,
    #[serde(default)]
    ey_low: Option<Vec<f64>>,
    #[serde(default)]
    ey_high: Option<Vec<f64>>,
}

/// 结果文件中的一个对象
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredObject {
    Histogram(StoredHist),
    Graph(StoredGraph),
    Numbers(Vec<f64>),
    Labels(Vec<String>),
    Scalar(f64),
    Unrecognized(serde_json::Value),
}

impl StoredObject {
    fn kind(&self) -> &'static str {
        match self {
            StoredObject::Histogram(_) => "histogram",
            StoredObject::Graph(_) => "graph",
            StoredObject::Numbers(_) => "vector",
            StoredObject::Labels(_) => "list of strings",
            StoredObject::Scalar(_) => "number",
            StoredObject::Unrecognized(_) => "unrecognized object",
        }
    }
}

/// 已读取的结果文件
#[derive(Debug)]
pub struct ResultsFile {
    path: String,
    objects: BTreeMap<String, StoredObject>,
}

impl ResultsFile {
    /// 读取结果文件
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ResplotError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path).map_err(|e| ResplotError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        ResultsFile::parse_content(&content, &path.display().to_string())
    }

    /// 从字符串内容解析，`path` 只用于错误信息
    pub fn parse_content(content: &str, path: &str) -> Result<Self> {
        let objects: BTreeMap<String, StoredObject> =
            serde_json::from_str(content).map_err(|e| ResplotError::ResultsParseError {
                path: path.to_string(),
                source: e,
            })?;
        Ok(ResultsFile {
            path: path.to_string(),
            objects,
        })
    }

    /// 文件路径
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.contains_key(key)
    }

    /// 全部键（按字母顺序）
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(|k| k.as_str())
    }

    /// 键对应对象的类型名
    pub fn kind_of(&self, key: &str) -> Option<&'static str> {
        self.objects.get(key).map(StoredObject::kind)
    }

    fn lookup(&self, key: &str) -> Result<&StoredObject> {
        self.objects.get(key).ok_or_else(|| ResplotError::MissingKey {
            key: key.to_string(),
            path: self.path.clone(),
        })
    }

    fn wrong_kind(&self, key: &str, expected: &str, found: &StoredObject) -> ResplotError {
        ResplotError::WrongObjectKind {
            key: key.to_string(),
            path: self.path.clone(),
            expected: expected.to_string(),
            found: found.kind().to_string(),
        }
    }

    /// 读取直方图
    pub fn get_hist(&self, key: &str) -> Result<Hist1D> {
        match self.lookup(key)? {
            StoredObject::Histogram(h) => Hist1D::from_parts(
                h.name.clone().unwrap_or_else(|| key.to_string()),
                h.edges.clone(),
                &h.contents,
                h.errors.as_deref(),
                h.underflow,
                h.overflow,
            ),
            other => Err(self.wrong_kind(key, "histogram", other)),
        }
    }

    /// 读取曲线
    pub fn get_graph(&self, key: &str) -> Result<Graph> {
        match self.lookup(key)? {
            StoredObject::Graph(g) => match (&g.ey_low, &g.ey_high) {
                (None, None) => Graph::new(key, g.x.clone(), g.y.clone()),
                (low, high) => Graph::with_errors(key, g.x.clone(), g.y.clone(), low.clone(), high.clone()),
            },
            other => Err(self.wrong_kind(key, "graph", other)),
        }
    }

    /// 读取数值数组（单个数值视为长度为 1 的数组）
    pub fn get_vector(&self, key: &str) -> Result<Vec<f64>> {
        match self.lookup(key)? {
            StoredObject::Numbers(v) => Ok(v.clone()),
            StoredObject::Scalar(x) => Ok(vec![*x]),
            other => Err(self.wrong_kind(key, "vector", other)),
        }
    }

    /// 读取数值数组并检查最少长度
    pub fn get_vector_min_len(&self, key: &str, min_len: usize) -> Result<Vec<f64>> {
        let values = self.get_vector(key)?;
        if values.len() < min_len {
            return Err(ResplotError::MalformedObject {
                kind: "vector".to_string(),
                name: key.to_string(),
                reason: format!("expected at least {} values, found {}", min_len, values.len()),
            });
        }
        Ok(values)
    }

    /// 读取单个数值（数组取第一个元素）
    pub fn get_scalar(&self, key: &str) -> Result<f64> {
        Ok(self.get_vector_min_len(key, 1)?[0])
    }

    /// 读取字符串数组
    pub fn get_labels(&self, key: &str) -> Result<Vec<String>> {
        match self.lookup(key)? {
            StoredObject::Labels(v) => Ok(v.clone()),
            // 空数组按数值数组解析
            StoredObject::Numbers(v) if v.is_empty() => Ok(Vec::new()),
            other => Err(self.wrong_kind(key, "list of strings", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "basicData": {"edges": [0, 1, 2, 3], "contents": [4, 9, 16], "overflow": 1},
        "fitted": {"edges": [0, 1, 2, 3], "contents": [4, 9, 16], "errors": [0.5, 0.5, 0.5], "name": "fit"},
        "observed": {"x": [2, 1], "y": [0.2, 0.1], "ey_low": [0.01, 0.02]},
        "FitRange": [1100.0, 8000.0],
        "NDF": 12,
        "signals": ["zprime"],
        "comment": {"author": "someone"}
    }"#;

    fn sample() -> ResultsFile {
        ResultsFile::parse_content(SAMPLE, "sample.json").unwrap()
    }

    #[test]
    fn test_read_histogram() {
        let file = sample();
        let h = file.get_hist("basicData").unwrap();
        assert_eq!(h.name, "basicData");
        assert_eq!(h.nbins(), 3);
        assert_eq!(h.bin_content(2), 9.0);
        assert!((h.bin_error(3) - 4.0).abs() < 1e-12);
        assert_eq!(h.bin_content(4), 1.0);

        let fit = file.get_hist("fitted").unwrap();
        assert_eq!(fit.name, "fit");
        assert_eq!(fit.bin_error(1), 0.5);
    }

    #[test]
    fn test_read_graph_sorted() {
        let g = sample().get_graph("observed").unwrap();
        assert_eq!(g.x(), &[1.0, 2.0]);
        assert!((g.band_low(0) - 0.08).abs() < 1e-12);
    }

    #[test]
    fn test_read_vectors_and_labels() {
        let file = sample();
        assert_eq!(file.get_vector("FitRange").unwrap(), vec![1100.0, 8000.0]);
        assert_eq!(file.get_scalar("NDF").unwrap(), 12.0);
        assert_eq!(file.get_scalar("FitRange").unwrap(), 1100.0);
        assert_eq!(file.get_labels("signals").unwrap(), vec!["zprime".to_string()]);
        assert!(file.get_vector_min_len("FitRange", 3).is_err());
        assert_eq!(file.kind_of("NDF"), Some("number"));
        assert_eq!(file.kind_of("comment"), Some("unrecognized object"));
        assert_eq!(file.kind_of("nope"), None);
    }

    #[test]
    fn test_missing_and_wrong_kind() {
        let file = sample();
        assert!(matches!(
            file.get_hist("nope"),
            Err(ResplotError::MissingKey { .. })
        ));
        assert!(matches!(
            file.get_hist("observed"),
            Err(ResplotError::WrongObjectKind { .. })
        ));
        assert!(matches!(
            file.get_graph("comment"),
            Err(ResplotError::WrongObjectKind { .. })
        ));
        assert!(file.contains("comment"));
    }

    #[test]
    fn test_malformed_histogram_is_rejected() {
        let file = ResultsFile::parse_content(
            r#"{"h": {"edges": [0, 1], "contents": [1, 2]}}"#,
            "bad.json",
        )
        .unwrap();
        assert!(matches!(
            file.get_hist("h"),
            Err(ResplotError::MalformedObject { .. })
        ));
    }

    #[test]
    fn test_open_from_disk() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(SAMPLE.as_bytes()).unwrap();
        let file = ResultsFile::open(tmp.path()).unwrap();
        assert_eq!(file.keys().count(), 7);

        assert!(matches!(
            ResultsFile::open(Path::new("/definitely/not/here.json")),
            Err(ResplotError::FileNotFound { .. })
        ));
        assert!(ResultsFile::parse_content("[1, 2]", "list.json").is_err());
    }
}
