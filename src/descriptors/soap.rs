//! # SOAP 描述符（径向谱 / 功率谱）
//!
//! 将中心原子周围的邻居密度按物种通道展开到高斯径向基上。
//! 径向谱直接输出展开系数；功率谱通过球谐加法定理对成对夹角
//! 求 Legendre 多项式，免去显式球谐计算。
//!
//! ## 算法概述
//! - c[a][n] = Σ_{j∈a} g_n(r_j) · f_c(r_j)
//! - p[a][b][n1][n2][l] = Σ_{i∈a, j∈b} g_n1(r_i) g_n2(r_j)
//!     · f_c(r_i) f_c(r_j) · (2l+1)/(4π) · P_l(cos θ_ij)
//!
//! 径向基 g_n 为均匀分布在 (0, cutoff] 上的归一化高斯。
//!
//! ## 依赖关系
//! - 被 `descriptors/mod.rs` 调度
//! - 使用 `descriptors/cutoff.rs` 的余弦开关函数
//! - 使用 `neighbours/list.rs` 的 NeighbourList

use crate::descriptors::cutoff::switching_function_cosine;
use crate::descriptors::hypers::{SoapHypers, SoapType};
use crate::error::{AtomrepError, Result};
use crate::features::FeatureBlock;
use crate::models::Structure;
use crate::neighbours::{Neighbour, NeighbourList};

use std::collections::BTreeMap;
use std::f64::consts::PI;

/// 原子序数到物种通道的映射，按批量内出现的序数升序编号
pub type SpeciesChannels = BTreeMap<i32, usize>;

/// 从整个批量的结构建立物种通道映射
///
/// 不同物种数超过 n_species 时拒绝，否则跨结构的特征列无法对齐。
pub fn species_channels(structures: &[Structure], n_species: usize) -> Result<SpeciesChannels> {
    let mut distinct: Vec<i32> = structures
        .iter()
        .flat_map(|s| s.species.iter().copied())
        .collect();
    distinct.sort_unstable();
    distinct.dedup();

    if distinct.len() > n_species {
        return Err(AtomrepError::InvalidHyperparameter {
            name: "n_species".to_string(),
            reason: format!(
                "batch contains {} distinct species, hyperparameter allows {}",
                distinct.len(),
                n_species
            ),
        });
    }

    Ok(distinct
        .into_iter()
        .enumerate()
        .map(|(channel, z)| (z, channel))
        .collect())
}

/// 计算一个结构的 SOAP 表示，每个中心一行
pub fn compute(
    structure: &Structure,
    neighbourlist: &NeighbourList,
    hypers: &SoapHypers,
    channels: &SpeciesChannels,
) -> Result<FeatureBlock> {
    let width = hypers.n_features();
    let mut rows = Vec::with_capacity(structure.n_atoms());

    for center in 0..structure.n_atoms() {
        let neighbours = neighbourlist.neighbours(center);

        // 零距离邻居会让成对夹角未定义，谱里混入 NaN，与
        // Coulomb 路径一致地拒绝
        if let Some(n) = neighbours.iter().find(|n| n.distance < 1e-12) {
            return Err(AtomrepError::InvalidStructure {
                reason: format!(
                    "coincident atoms around center {} (neighbour {})",
                    center, n.index
                ),
            });
        }

        let row = match hypers.soap_type {
            SoapType::RadialSpectrum => {
                radial_spectrum(structure, neighbours, hypers, channels)?
            }
            SoapType::PowerSpectrum => power_spectrum(structure, neighbours, hypers, channels)?,
        };
        rows.push(row);
    }

    FeatureBlock::from_rows(rows, width)
}

/// 径向谱：展开系数 c[a][n] 按 (通道, 径向) 展平
fn radial_spectrum(
    structure: &Structure,
    neighbours: &[Neighbour],
    hypers: &SoapHypers,
    channels: &SpeciesChannels,
) -> Result<Vec<f64>> {
    let n_max = hypers.max_radial;
    let mut coefficients = vec![0.0; hypers.n_species * n_max];

    for neighbour in neighbours {
        let channel = channel_of(structure, neighbour.index, channels)?;
        let weight = switching_function_cosine(
            neighbour.distance,
            hypers.interaction_cutoff,
            hypers.cutoff_smooth_width,
        );
        for n in 0..n_max {
            coefficients[channel * n_max + n] +=
                radial_basis(neighbour.distance, n, hypers) * weight;
        }
    }

    Ok(coefficients)
}

/// 功率谱：p[a][b][n1][n2][l]，按该顺序展平
fn power_spectrum(
    structure: &Structure,
    neighbours: &[Neighbour],
    hypers: &SoapHypers,
    channels: &SpeciesChannels,
) -> Result<Vec<f64>> {
    let n_max = hypers.max_radial;
    let l_max = hypers.max_angular;
    let n_species = hypers.n_species;
    let width = hypers.n_features();

    // 每个邻居先求物种通道、截断权重与径向基值
    let mut prepared = Vec::with_capacity(neighbours.len());
    for neighbour in neighbours {
        let channel = channel_of(structure, neighbour.index, channels)?;
        let weight = switching_function_cosine(
            neighbour.distance,
            hypers.interaction_cutoff,
            hypers.cutoff_smooth_width,
        );
        let radial: Vec<f64> = (0..n_max)
            .map(|n| radial_basis(neighbour.distance, n, hypers) * weight)
            .collect();
        prepared.push((channel, neighbour, radial));
    }

    let mut spectrum = vec![0.0; width];
    for (channel_i, neighbour_i, radial_i) in &prepared {
        for (channel_j, neighbour_j, radial_j) in &prepared {
            let cos_angle = pair_cosine(neighbour_i, neighbour_j);
            let legendre = legendre_all(l_max, cos_angle);

            for n1 in 0..n_max {
                for n2 in 0..n_max {
                    let radial_product = radial_i[n1] * radial_j[n2];
                    let base = (((channel_i * n_species + channel_j) * n_max + n1) * n_max + n2)
                        * (l_max + 1);
                    for (l, p_l) in legendre.iter().enumerate() {
                        let angular_weight = (2 * l + 1) as f64 / (4.0 * PI);
                        spectrum[base + l] += radial_product * angular_weight * p_l;
                    }
                }
            }
        }
    }

    Ok(spectrum)
}

/// 归一化高斯径向基
///
/// 中心均匀分布在 (0, cutoff]：r_n = (n + 1) · cutoff / max_radial，
/// 宽度取 gaussian_sigma_constant。
fn radial_basis(distance: f64, n: usize, hypers: &SoapHypers) -> f64 {
    let center = (n as f64 + 1.0) * hypers.interaction_cutoff / hypers.max_radial as f64;
    let sigma = hypers.gaussian_sigma_constant;
    let delta = (distance - center) / sigma;
    (-0.5 * delta * delta).exp() / (sigma * (2.0 * PI).sqrt())
}

/// 两个邻居向量夹角的余弦
fn pair_cosine(a: &Neighbour, b: &Neighbour) -> f64 {
    let dot = a.vector[0] * b.vector[0] + a.vector[1] * b.vector[1] + a.vector[2] * b.vector[2];
    let cos_angle = dot / (a.distance * b.distance);
    cos_angle.clamp(-1.0, 1.0)
}

/// Legendre 多项式 P_0..P_l_max 的 Bonnet 递推
fn legendre_all(l_max: usize, x: f64) -> Vec<f64> {
    let mut values = Vec::with_capacity(l_max + 1);
    values.push(1.0);
    if l_max >= 1 {
        values.push(x);
    }
    for l in 2..=l_max {
        let next = (((2 * l - 1) as f64) * x * values[l - 1] - ((l - 1) as f64) * values[l - 2])
            / (l as f64);
        values.push(next);
    }
    values
}

fn channel_of(
    structure: &Structure,
    atom: usize,
    channels: &SpeciesChannels,
) -> Result<usize> {
    let z = structure.species[atom];
    channels
        .get(&z)
        .copied()
        .ok_or_else(|| AtomrepError::InvalidHyperparameter {
            name: "n_species".to_string(),
            reason: format!("species {} missing from frozen channel map", z),
        })
}
