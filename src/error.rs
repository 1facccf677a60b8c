//! # 统一错误处理模块
//!
//! 定义 resplot 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// resplot 统一错误类型
#[derive(Error, Debug)]
pub enum ResplotError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 结果文件错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse results file: {path}\nReason: {source}")]
    ResultsParseError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Key '{key}' not found in results file: {path}")]
    MissingKey { key: String, path: String },

    #[error("Key '{key}' in {path} holds a {found}, expected a {expected}")]
    WrongObjectKind {
        key: String,
        path: String,
        expected: String,
        found: String,
    },

    #[error("Malformed {kind} '{name}': {reason}")]
    MalformedObject {
        kind: String,
        name: String,
        reason: String,
    },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid range format: {0}")]
    InvalidRange(String),

    // ─────────────────────────────────────────────────────────────
    // 数值与绘图错误
    // ─────────────────────────────────────────────────────────────
    #[error("Statistics error: {0}")]
    Statistics(String),

    #[error("Failed to render {figure}: {reason}")]
    RenderError { figure: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("No matching files found with pattern: {pattern}")]
    NoFilesFound { pattern: String },

    #[error("{0}")]
    Other(String),
}

impl ResplotError {
    /// 将绘图后端错误包装为 RenderError
    pub fn render<E: std::fmt::Debug>(figure: &str, err: E) -> Self {
        ResplotError::RenderError {
            figure: figure.to_string(),
            reason: format!("{:?}", err),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, ResplotError>;
