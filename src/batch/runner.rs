//! # 批量执行器
//!
//! 在有界线程池上对批内各结构并行执行同一工作函数，按输入顺序
//! 回收结果。
//!
//! ## 功能
//! - 基于 rayon 的并行迭代，索引式 collect 保证顺序
//! - 进度条显示（可禁用）
//! - 单个单元失败即中止整批，错误携带结构索引
//!
//! ## 依赖关系
//! - 被 `calculator.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::error::Result;
use crate::utils::progress;

use indicatif::ProgressBar;
use rayon::prelude::*;

/// 批量执行器
///
/// 线程池的生命周期限定在单次 `run` 调用内：进入时构建，
/// 返回前（含失败路径）随作用域释放。
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
    /// 是否显示进度条
    show_progress: bool,
}

impl BatchRunner {
    /// 创建新的批量执行器；jobs = 0 时使用全部逻辑核心
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self {
            jobs,
            show_progress: false,
        }
    }

    /// 设置是否显示进度条
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// 并行处理 n_items 个单元，按索引顺序返回结果
    ///
    /// 工作函数对单元索引求值；任何单元报错都会中止整批，返回
    /// 携带该索引的 WorkerFailure，不产生部分结果。
    pub fn run<T, F>(&self, n_items: usize, label: &str, worker: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> Result<T> + Sync + Send,
    {
        let pb = if self.show_progress {
            progress::create_progress_bar(n_items as u64, label)
        } else {
            ProgressBar::hidden()
        };

        // 配置 rayon 线程池
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .unwrap();

        let results: Result<Vec<T>> = pool.install(|| {
            (0..n_items)
                .into_par_iter()
                .map(|index| {
                    let result = worker(index).map_err(|e| e.in_worker(index));
                    pb.inc(1);
                    result
                })
                .collect()
        });

        pb.finish_and_clear();

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AtomrepError;

    #[test]
    fn test_results_preserve_input_order() {
        let runner = BatchRunner::new(4);
        let results = runner
            .run(64, "Doubling", |i| {
                // 打乱完成顺序
                if i % 7 == 0 {
                    std::thread::sleep(std::time::Duration::from_millis(1));
                }
                Ok(i * 2)
            })
            .unwrap();

        assert_eq!(results.len(), 64);
        for (i, value) in results.iter().enumerate() {
            assert_eq!(*value, i * 2);
        }
    }

    #[test]
    fn test_single_worker_matches_many() {
        let worker = |i: usize| Ok(i * i + 1);
        let serial = BatchRunner::new(1).run(32, "Serial", worker).unwrap();
        let parallel = BatchRunner::new(8).run(32, "Parallel", worker).unwrap();
        assert_eq!(serial, parallel);
    }

    #[test]
    fn test_failure_aborts_batch_with_index() {
        let runner = BatchRunner::new(2);
        let result: Result<Vec<usize>> = runner.run(10, "Failing", |i| {
            if i == 7 {
                Err(AtomrepError::InvalidStructure {
                    reason: "broken".to_string(),
                })
            } else {
                Ok(i)
            }
        });

        match result {
            Err(AtomrepError::WorkerFailure { index, .. }) => assert_eq!(index, 7),
            other => panic!("expected WorkerFailure, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_zero_jobs_defaults_to_all_cores() {
        let runner = BatchRunner::new(0);
        let results = runner.run(4, "Default pool", |i| Ok(i)).unwrap();
        assert_eq!(results, vec![0, 1, 2, 3]);
    }
}
