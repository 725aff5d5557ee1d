//! # 统一错误处理模块
//!
//! 定义 atomrep 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// atomrep 统一错误类型
#[derive(Error, Debug)]
pub enum AtomrepError {
    // ─────────────────────────────────────────────────────────────
    // 结构错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid structure: {reason}")]
    InvalidStructure { reason: String },

    // ─────────────────────────────────────────────────────────────
    // 超参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid hyperparameter '{name}': {reason}")]
    InvalidHyperparameter { name: String, reason: String },

    #[error("Unsupported descriptor: {0}")]
    UnsupportedDescriptor(String),

    // ─────────────────────────────────────────────────────────────
    // 特征汇总错误
    // ─────────────────────────────────────────────────────────────
    #[error("Feature width mismatch: collection expects {expected}, got {got}")]
    SizingConflict { expected: usize, got: usize },

    // ─────────────────────────────────────────────────────────────
    // 并行计算错误
    // ─────────────────────────────────────────────────────────────
    #[error("Worker failed on structure {index}: {source}")]
    WorkerFailure {
        index: usize,
        #[source]
        source: Box<AtomrepError>,
    },

    // ─────────────────────────────────────────────────────────────
    // 序列化错误
    // ─────────────────────────────────────────────────────────────
    #[error("Hyperparameter serialization failed: {0}")]
    HypersSerialization(#[from] serde_json::Error),
}

impl AtomrepError {
    /// 将批内单元的错误包装为 WorkerFailure，并记录结构索引
    pub fn in_worker(self, index: usize) -> Self {
        AtomrepError::WorkerFailure {
            index,
            source: Box::new(self),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, AtomrepError>;
