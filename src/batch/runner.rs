//! # 批量执行器
//!
//! 并行处理一批结果文件，每个文件输出到各自的子目录。
//!
//! ## 功能
//! - 基于 rayon 的并行迭代（线程数缺省为 CPU 核数）
//! - 进度条显示
//! - 错误收集与汇总报告
//!
//! ## 依赖关系
//! - 被 `commands/search.rs`, `commands/limits.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon`, `num_cpus`

use crate::error::{ResplotError, Result};
use crate::utils::{output, progress};

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// 单个文件处理结果
#[derive(Debug, Clone)]
pub enum ProcessResult {
    /// 处理说明（输入 -> 输出目录）
    Success(String),
    /// 跳过原因（如缺少该命令需要的键）
    Skipped(String),
    /// (文件路径, 错误信息)
    Failed(String, String),
}

/// 批量处理结果统计
#[derive(Debug, Default)]
pub struct BatchResult {
    pub success: usize,
    pub skipped: usize,
    pub failed: usize,
    pub processed: Vec<String>,
    pub skips: Vec<String>,
    pub failures: Vec<(String, String)>,
}

/// 每类明细最多打印的条数
const REPORT_LIMIT: usize = 10;

fn print_capped<T>(items: &[T], print: impl Fn(&T)) {
    for item in items.iter().take(REPORT_LIMIT) {
        print(item);
    }
    if items.len() > REPORT_LIMIT {
        output::print_warning(&format!("  ... and {} more", items.len() - REPORT_LIMIT));
    }
}

impl BatchResult {
    pub fn merge(&mut self, result: ProcessResult) {
        match result {
            ProcessResult::Success(message) => {
                self.success += 1;
                self.processed.push(message);
            }
            ProcessResult::Skipped(reason) => {
                self.skipped += 1;
                self.skips.push(reason);
            }
            ProcessResult::Failed(path, err) => {
                self.failed += 1;
                self.failures.push((path, err));
            }
        }
    }

    pub fn total(&self) -> usize {
        self.success + self.skipped + self.failed
    }

    /// 打印汇总，以及处理、跳过、失败明细（各至多 10 条）
    pub fn report(&self) {
        output::print_separator();
        print_capped(&self.processed, |message| output::print_done(message));
        print_capped(&self.skips, |reason| output::print_skip(reason));
        output::print_success(&format!(
            "Batch complete: {} files, {} success, {} skipped, {} failed",
            self.total(),
            self.success,
            self.skipped,
            self.failed
        ));
        if self.failures.is_empty() {
            return;
        }
        output::print_warning("Failed files:");
        print_capped(&self.failures, |(path, err)| {
            output::print_error(&format!("  {}: {}", path, err))
        });
    }
}

/// 把一个文件的结果放进共享集合
///
/// 锁已中毒（其他工作线程 panic）时该文件记为失败。
pub fn collect_into<T>(store: &Mutex<Vec<T>>, file: &Path, item: T, message: String) -> ProcessResult {
    match store.lock() {
        Ok(mut items) => {
            items.push(item);
            ProcessResult::Success(message)
        }
        Err(_) => ProcessResult::Failed(
            file.display().to_string(),
            "result collection was poisoned by a failed worker".to_string(),
        ),
    }
}

/// 批量执行器
pub struct BatchRunner {
    jobs: usize,
}

impl BatchRunner {
    /// `jobs == 0` 时使用全部 CPU 核
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// 并行处理文件列表
    pub fn run<F>(&self, files: Vec<PathBuf>, processor: F) -> Result<BatchResult>
    where
        F: Fn(&PathBuf) -> ProcessResult + Sync + Send,
    {
        let pb = progress::create_progress_bar(files.len() as u64, "Rendering");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| ResplotError::Other(format!("Failed to start worker pool: {}", e)))?;

        let results: Vec<ProcessResult> = pool.install(|| {
            files
                .par_iter()
                .map(|file| {
                    let result = processor(file);
                    pb.inc(1);
                    result
                })
                .collect()
        });
        pb.finish_and_clear();

        let mut batch = BatchResult::default();
        for result in results {
            batch.merge(result);
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runner_collects_every_outcome() {
        let files: Vec<PathBuf> = ["a.json", "b.json", "skip.json", "bad.json"]
            .iter()
            .map(PathBuf::from)
            .collect();
        let runner = BatchRunner::new(2);
        assert_eq!(runner.jobs(), 2);
        let result = runner
            .run(files, |file| {
                let name = file.display().to_string();
                if name.starts_with("bad") {
                    ProcessResult::Failed(name, "broken".to_string())
                } else if name.starts_with("skip") {
                    ProcessResult::Skipped(format!("{}: no 'basicData'", name))
                } else {
                    ProcessResult::Success(format!("{} -> out", name))
                }
            })
            .unwrap();
        assert_eq!((result.success, result.skipped, result.failed), (2, 1, 1));
        assert_eq!(result.total(), 4);
        assert_eq!(result.failures, vec![("bad.json".to_string(), "broken".to_string())]);
        assert_eq!(result.skips, vec!["skip.json: no 'basicData'".to_string()]);
        assert_eq!(
            result.processed,
            vec!["a.json -> out".to_string(), "b.json -> out".to_string()]
        );
    }

    #[test]
    fn test_collect_into_poisoned_store_fails() {
        let store = Mutex::new(Vec::new());
        match collect_into(&store, Path::new("a.json"), 1, "a.json -> out".to_string()) {
            ProcessResult::Success(message) => assert_eq!(message, "a.json -> out"),
            other => panic!("unexpected {:?}", other),
        }

        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.lock().unwrap();
            panic!("worker died");
        }));
        assert!(store.is_poisoned());
        match collect_into(&store, Path::new("b.json"), 2, "b.json -> out".to_string()) {
            ProcessResult::Failed(path, reason) => {
                assert_eq!(path, "b.json");
                assert!(reason.contains("poisoned"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(store.into_inner().unwrap_or_else(|e| e.into_inner()), vec![1]);
    }

    #[test]
    fn test_zero_jobs_uses_all_cores() {
        assert_eq!(BatchRunner::new(0).jobs(), num_cpus::get());
    }
}
