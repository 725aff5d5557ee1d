//! # 特征汇总模块
//!
//! 将各结构的描述符输出聚合为单一特征集合。
//!
//! ## 依赖关系
//! - 被 `calculator.rs` 和 `descriptors/` 使用
//! - 子模块: collection

pub mod collection;

pub use collection::{FeatureBlock, FeatureCollection};
