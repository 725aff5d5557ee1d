//! # 数据模型模块
//!
//! 定义统一的原子结构数据模型。
//!
//! ## 依赖关系
//! - 被 `neighbours/`、`descriptors/` 和 `calculator.rs` 使用
//! - 子模块: structure

pub mod structure;

pub use structure::{Lattice, Structure};
