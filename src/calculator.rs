//! # 表示计算流水线
//!
//! 把各组件串成一次 `transform` 调用：
//! 结构 → 邻居列表×N →（按需）批量尺寸预扫描 → 超参数冻结 →
//! 描述符计算×N（并行）→ 特征汇总 → 返回特征集合。
//!
//! 输出是全量式的：任何结构失败整批失败，不返回部分结果，
//! 因为下游 ML 消费方假定每个输入结构恰有对应的行。
//!
//! ## 依赖关系
//! - 使用 `neighbours/` 构建邻居列表
//! - 使用 `descriptors/` 计算描述符
//! - 使用 `batch/` 进行保序并行执行
//! - 使用 `features/` 聚合输出

use crate::batch::BatchRunner;
use crate::descriptors::Descriptor;
use crate::error::Result;
use crate::features::FeatureCollection;
use crate::models::Structure;
use crate::neighbours::NeighbourList;

use serde_json::Value;

/// 表示计算器
///
/// 持有描述符配置与执行选项。`transform` 期间超参数不再变化：
/// 并行单元只看到冻结快照。
pub struct Calculator {
    descriptor: Descriptor,
    jobs: usize,
    show_progress: bool,
}

impl Calculator {
    /// 用已构造的描述符创建计算器，默认单线程、无进度条
    pub fn new(descriptor: Descriptor) -> Self {
        Calculator {
            descriptor,
            jobs: 1,
            show_progress: false,
        }
    }

    /// 按名称与 JSON 选项创建计算器
    pub fn from_options(name: &str, options: &Value) -> Result<Self> {
        Ok(Calculator::new(Descriptor::from_options(name, options)?))
    }

    /// 设置并行作业数；0 表示使用全部逻辑核心
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// 设置是否显示进度条
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// 计算整个批量的表示
    ///
    /// 结果按输入顺序排列；与并行度无关。失败时报告出错结构的
    /// 批内索引，且不返回部分结果。
    pub fn transform(&self, structures: &[Structure]) -> Result<FeatureCollection> {
        let cutoff = self.descriptor.cutoff();
        let runner = BatchRunner::new(self.jobs).with_progress(self.show_progress);

        // 邻居列表：对 (结构, 截断) 是纯函数，同一批量内复用
        let lists = runner.run(structures.len(), "Neighbour lists", |i| {
            NeighbourList::build(&structures[i], cutoff)
        })?;

        // 尺寸预扫描 + 超参数冻结，必须先于任何描述符定稿
        let frozen = self.descriptor.freeze(structures, &lists)?;
        let width = frozen.output_width();
        let hypers_json = frozen.canonical_json()?;

        let blocks = runner.run(structures.len(), "Representations", |i| {
            frozen.compute(&structures[i], &lists[i])
        })?;

        // 汇总在编排线程上串行进行，避免对集合的并发修改
        let mut features = FeatureCollection::new(width, hypers_json);
        for block in blocks {
            features.append(block)?;
        }

        Ok(features)
    }
}
