//! # 描述符模块
//!
//! 在固定变体集合 {RadialSpectrum, PowerSpectrum, SortedCoulomb}
//! 上做穷尽匹配调度。构造时按变体校验超参数；transform 前经
//! `freeze` 折入批量派生数据（Coulomb 矩阵尺寸、物种通道映射），
//! 得到并行单元共享的不可变快照。
//!
//! ## 子模块
//! - `hypers`: 各变体的超参数结构体与允许键过滤
//! - `cutoff`: 截断平滑函数
//! - `coulomb`: Sorted Coulomb 矩阵计算
//! - `soap`: SOAP 径向谱 / 功率谱计算
//!
//! ## 依赖关系
//! - 被 `calculator.rs` 使用
//! - 使用 `neighbours/`、`features/`、`models/`

pub mod coulomb;
pub mod cutoff;
pub mod hypers;
pub mod soap;

pub use hypers::{CoulombHypers, GaussianSigmaType, SoapHypers, SoapType, SortingAlgorithm};

use crate::batch::sizing;
use crate::error::{AtomrepError, Result};
use crate::features::FeatureBlock;
use crate::models::Structure;
use crate::neighbours::NeighbourList;

use serde_json::Value;
use soap::SpeciesChannels;

/// 描述符变体
#[derive(Debug, Clone)]
pub enum Descriptor {
    RadialSpectrum(SoapHypers),
    PowerSpectrum(SoapHypers),
    SortedCoulomb(CoulombHypers),
}

impl Descriptor {
    /// 按名称与 JSON 选项构造
    ///
    /// 未实现的名称返回 UnsupportedDescriptor。SOAP 选项中的
    /// `soap_type` 决定最终变体，与名称 "soap" 搭配使用。
    pub fn from_options(name: &str, options: &Value) -> Result<Self> {
        match name {
            "soap" => {
                let hypers = SoapHypers::from_options(options)?;
                Ok(match hypers.soap_type {
                    SoapType::RadialSpectrum => Descriptor::RadialSpectrum(hypers),
                    SoapType::PowerSpectrum => Descriptor::PowerSpectrum(hypers),
                })
            }
            "sortedcoulomb" => Ok(Descriptor::SortedCoulomb(CoulombHypers::from_options(
                options,
            )?)),
            other => Err(AtomrepError::UnsupportedDescriptor(other.to_string())),
        }
    }

    /// 邻居列表构建所需的截断半径
    pub fn cutoff(&self) -> f64 {
        match self {
            Descriptor::RadialSpectrum(h) | Descriptor::PowerSpectrum(h) => h.interaction_cutoff,
            Descriptor::SortedCoulomb(h) => h.cutoff,
        }
    }

    /// 折入批量派生数据，生成冻结快照
    ///
    /// Coulomb 矩阵在此执行批量尺寸预扫描；SOAP 在此确定跨批量
    /// 一致的物种通道映射。快照之后不再变化，正在进行的并行
    /// 计算观察不到任何调用方侧的修改。
    pub fn freeze(
        &self,
        structures: &[Structure],
        lists: &[NeighbourList],
    ) -> Result<FrozenDescriptor> {
        match self {
            Descriptor::RadialSpectrum(h) | Descriptor::PowerSpectrum(h) => {
                let channels = soap::species_channels(structures, h.n_species)?;
                Ok(FrozenDescriptor {
                    descriptor: self.clone(),
                    channels,
                })
            }
            Descriptor::SortedCoulomb(h) => {
                let size = sizing::resolve_size(lists);
                Ok(FrozenDescriptor {
                    descriptor: Descriptor::SortedCoulomb(h.with_size(size)),
                    channels: SpeciesChannels::new(),
                })
            }
        }
    }
}

/// 冻结的描述符快照
///
/// transform 期间传给各并行单元的不可变配置：超参数已定稿，
/// 批量派生数据（矩阵尺寸、物种通道）已折入。
#[derive(Debug, Clone)]
pub struct FrozenDescriptor {
    descriptor: Descriptor,
    channels: SpeciesChannels,
}

impl FrozenDescriptor {
    /// 每个中心的特征宽度，超参数（与批量尺寸）的纯函数
    pub fn output_width(&self) -> usize {
        match &self.descriptor {
            Descriptor::RadialSpectrum(h) | Descriptor::PowerSpectrum(h) => h.n_features(),
            Descriptor::SortedCoulomb(h) => h.n_features(),
        }
    }

    /// 定稿超参数的规范化 JSON 字符串
    pub fn canonical_json(&self) -> Result<String> {
        match &self.descriptor {
            Descriptor::RadialSpectrum(h) | Descriptor::PowerSpectrum(h) => h.canonical_json(),
            Descriptor::SortedCoulomb(h) => h.canonical_json(),
        }
    }

    /// 计算一个结构的描述符块
    ///
    /// 给定相同输入结果确定，不修改邻居列表与超参数。
    pub fn compute(
        &self,
        structure: &Structure,
        neighbourlist: &NeighbourList,
    ) -> Result<FeatureBlock> {
        match &self.descriptor {
            Descriptor::RadialSpectrum(h) | Descriptor::PowerSpectrum(h) => {
                soap::compute(structure, neighbourlist, h, &self.channels)
            }
            Descriptor::SortedCoulomb(h) => coulomb::compute(structure, neighbourlist, h),
        }
    }
}
