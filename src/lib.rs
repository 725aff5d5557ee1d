//! # atomrep - 原子结构表示计算库
//!
//! 为机器学习模型计算原子结构的定长数值描述符（表示）：
//! Sorted Coulomb 矩阵与 SOAP 径向谱/功率谱。
//!
//! ## 流水线
//! 结构 → 邻居列表×N →（按需）批量尺寸预扫描 → 超参数冻结 →
//! 描述符计算×N（并行）→ 特征汇总 → 特征集合
//!
//! ## 依赖关系
//! ```text
//! lib.rs
//!   ├── calculator.rs  (transform 编排)
//!   ├── descriptors/   (描述符调度与数值核心)
//!   ├── neighbours/    (截断内邻居枚举，含周期镜像)
//!   ├── batch/         (尺寸预扫描、保序并行执行)
//!   ├── features/      (特征集合聚合)
//!   ├── models/        (结构与晶格数据模型)
//!   ├── utils/         (进度条工具)
//!   └── error.rs       (错误处理)
//! ```
//!
//! ## 使用示例
//! ```
//! use atomrep::{Calculator, Structure};
//! use serde_json::json;
//!
//! let structures = vec![
//!     Structure::new(vec![[0.0, 0.0, 0.0], [0.96, 0.0, 0.0]], vec![8, 1]).unwrap(),
//! ];
//! let calculator = Calculator::from_options("soap", &json!({
//!     "interaction_cutoff": 3.0,
//!     "cutoff_smooth_width": 0.5,
//!     "max_radial": 2,
//!     "max_angular": 1,
//!     "n_species": 2,
//! })).unwrap().with_jobs(2);
//!
//! let features = calculator.transform(&structures).unwrap();
//! assert_eq!(features.n_rows(), 2);
//! ```

pub mod batch;
pub mod calculator;
pub mod descriptors;
pub mod error;
pub mod features;
pub mod models;
pub mod neighbours;
pub mod utils;

pub use calculator::Calculator;
pub use descriptors::{CoulombHypers, Descriptor, SoapHypers, SoapType, SortingAlgorithm};
pub use error::{AtomrepError, Result};
pub use features::{FeatureBlock, FeatureCollection};
pub use models::{Lattice, Structure};
pub use neighbours::{Neighbour, NeighbourList};
