//! # Sorted Coulomb 矩阵描述符
//!
//! 对每个中心原子构造其局部环境（中心 + 截断内邻居）的类库仑
//! 相互作用矩阵，行排序保证置换不变性，零填充到批量统一尺寸后
//! 展平上三角。
//!
//! ## 算法概述
//! 1. 条目 0 为中心原子，其后为邻居
//! 2. 对角元 0.5·Z^2.4，非对角元 Z_i·Z_j / d_ij
//! 3. 涉及中心的元素按 (cutoff, central_decay) 衰减，
//!    邻居间元素按 (interaction_cutoff, interaction_decay) 衰减
//! 4. 中心固定在首位，其余行按排序算法稳定排序
//! 5. 零填充到 size，按行展平上三角（含对角）
//!
//! ## 依赖关系
//! - 被 `descriptors/mod.rs` 调度
//! - 使用 `descriptors/cutoff.rs` 的衰减因子
//! - 使用 `neighbours/list.rs` 的 NeighbourList

use crate::descriptors::cutoff::coulomb_decay;
use crate::descriptors::hypers::{CoulombHypers, SortingAlgorithm};
use crate::error::{AtomrepError, Result};
use crate::features::FeatureBlock;
use crate::models::Structure;
use crate::neighbours::NeighbourList;

/// 对角元指数，出自 Rupp et al. (2011) 的拟合形式
const DIAGONAL_EXPONENT: f64 = 2.4;

/// 计算一个结构的 Sorted Coulomb 矩阵，每个中心一行
pub fn compute(
    structure: &Structure,
    neighbourlist: &NeighbourList,
    hypers: &CoulombHypers,
) -> Result<FeatureBlock> {
    let size = hypers.size;
    let width = hypers.n_features();
    let mut rows = Vec::with_capacity(structure.n_atoms());

    for center in 0..structure.n_atoms() {
        let neighbours = neighbourlist.neighbours(center);
        let n_entries = neighbours.len() + 1;
        if n_entries > size {
            return Err(AtomrepError::InvalidHyperparameter {
                name: "size".to_string(),
                reason: format!(
                    "matrix size {} too small for {} local entries",
                    size, n_entries
                ),
            });
        }

        // 条目 0 为中心；向量与原子序数按条目索引排列
        let mut charges = Vec::with_capacity(n_entries);
        let mut vectors = Vec::with_capacity(n_entries);
        charges.push(structure.species[center] as f64);
        vectors.push([0.0, 0.0, 0.0]);
        for n in neighbours {
            charges.push(structure.species[n.index] as f64);
            vectors.push(n.vector);
        }

        let mut matrix = vec![vec![0.0; n_entries]; n_entries];
        for i in 0..n_entries {
            matrix[i][i] = 0.5 * charges[i].powf(DIAGONAL_EXPONENT);
            for j in (i + 1)..n_entries {
                let dx = vectors[i][0] - vectors[j][0];
                let dy = vectors[i][1] - vectors[j][1];
                let dz = vectors[i][2] - vectors[j][2];
                let distance = (dx * dx + dy * dy + dz * dz).sqrt();
                if distance < 1e-12 {
                    return Err(AtomrepError::InvalidStructure {
                        reason: format!("coincident atoms around center {}", center),
                    });
                }

                let factor = if i == 0 {
                    coulomb_decay(distance, hypers.cutoff, hypers.central_decay)
                } else {
                    coulomb_decay(distance, hypers.interaction_cutoff, hypers.interaction_decay)
                };

                let entry = charges[i] * charges[j] / distance * factor;
                matrix[i][j] = entry;
                matrix[j][i] = entry;
            }
        }

        let order = match hypers.sorting_algorithm {
            SortingAlgorithm::RowNorm => row_norm_order(&matrix),
            SortingAlgorithm::Distance => {
                let mut distances = Vec::with_capacity(n_entries);
                distances.push(0.0);
                distances.extend(neighbours.iter().map(|n| n.distance));
                distance_order(&distances)
            }
        };

        // 排序后的矩阵零填充到 size，展平上三角（含对角）
        let mut row = Vec::with_capacity(width);
        for i in 0..size {
            for j in i..size {
                if i < n_entries && j < n_entries {
                    row.push(matrix[order[i]][order[j]]);
                } else {
                    row.push(0.0);
                }
            }
        }
        rows.push(row);
    }

    FeatureBlock::from_rows(rows, width)
}

/// 行范数排序：中心（条目 0）固定在首位，其余按行范数降序稳定排序
fn row_norm_order(matrix: &[Vec<f64>]) -> Vec<usize> {
    let norms: Vec<f64> = matrix
        .iter()
        .map(|row| row.iter().map(|x| x * x).sum::<f64>())
        .collect();

    let mut order: Vec<usize> = (1..matrix.len()).collect();
    order.sort_by(|&a, &b| norms[b].partial_cmp(&norms[a]).unwrap());

    let mut full = Vec::with_capacity(matrix.len());
    full.push(0);
    full.extend(order);
    full
}

/// 距离排序：中心固定在首位，其余按到中心的距离升序稳定排序
fn distance_order(distances: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (1..distances.len()).collect();
    order.sort_by(|&a, &b| distances[a].partial_cmp(&distances[b]).unwrap());

    let mut full = Vec::with_capacity(distances.len());
    full.push(0);
    full.extend(order);
    full
}
