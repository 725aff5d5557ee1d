//! # 工具模块
//!
//! ## 依赖关系
//! - 被 `batch/` 使用
//! - 子模块: progress

pub mod progress;
