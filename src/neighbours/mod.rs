//! # 邻居列表模块
//!
//! 在截断半径内枚举每个中心原子的邻居，统一处理周期与非周期结构。
//!
//! ## 依赖关系
//! - 被 `descriptors/` 和 `calculator.rs` 使用
//! - 使用 `models/structure.rs`

pub mod list;

pub use list::{Neighbour, NeighbourList};
