//! # 批量处理模块
//!
//! 提供批量尺寸预扫描与保序并行执行能力。
//!
//! ## 功能
//! - Coulomb 矩阵填充尺寸的批量预扫描
//! - 有界线程池上的保序并行执行
//! - 进度反馈；失败即中止整批
//!
//! ## 依赖关系
//! - 被 `calculator.rs` 和 `descriptors/` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod runner;
pub mod sizing;

pub use runner::BatchRunner;
