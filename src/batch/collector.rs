//! # 结果文件收集器
//!
//! 根据输入路径和模式收集待处理的结果文件列表。
//!
//! ## 功能
//! - 支持单文件和目录输入
//! - 逗号分隔的多个 glob 模式
//! - 可选递归目录搜索
//!
//! ## 依赖关系
//! - 被 `commands/search.rs`, `commands/limits.rs` 调用
//! - 使用 `walkdir` 遍历目录
//! - 使用 `glob` 匹配文件名

use crate::error::{ResplotError, Result};

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 文件收集器
pub struct FileCollector {
    input: PathBuf,
    patterns: Vec<glob::Pattern>,
    recursive: bool,
}

impl FileCollector {
    /// 缺省收集 `*.json`
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            patterns: vec![glob::Pattern::new("*.json").expect("static pattern")],
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        let patterns = pattern
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|p| {
                glob::Pattern::new(p).map_err(|e| {
                    ResplotError::InvalidArgument(format!("Invalid pattern '{}': {}", p, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        if !patterns.is_empty() {
            self.patterns = patterns;
        }
        Ok(self)
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件（按路径排序）
    pub fn collect(&self) -> Vec<PathBuf> {
        if self.input.is_file() {
            return vec![self.input.clone()];
        }
        if !self.input.is_dir() {
            return vec![];
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|entry| self.matches_patterns(entry.path()))
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();
        files
    }

    fn matches_patterns(&self, path: &Path) -> bool {
        let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.patterns.iter().any(|p| p.matches(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collect_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b_results.json"), "{}").unwrap();
        fs::write(dir.path().join("a_results.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.json"), "{}").unwrap();

        let files = FileCollector::new(dir.path().to_path_buf()).collect();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a_results.json", "b_results.json"]);

        let all = FileCollector::new(dir.path().to_path_buf()).recursive(true).collect();
        assert_eq!(all.len(), 3);

        let txt = FileCollector::new(dir.path().to_path_buf())
            .with_pattern("*.txt, a_*")
            .unwrap()
            .collect();
        assert_eq!(txt.len(), 2);
    }

    #[test]
    fn test_single_file_and_bad_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("limits.dat");
        fs::write(&file, "{}").unwrap();
        assert_eq!(FileCollector::new(file.clone()).collect(), vec![file]);
        assert!(FileCollector::new(dir.path().to_path_buf()).with_pattern("[").is_err());
        assert!(FileCollector::new(dir.path().join("missing")).collect().is_empty());
    }
}
