//! # 邻居列表构建器
//!
//! 给定结构与截断半径，为每个中心原子枚举截断内的全部邻居，
//! 包括周期镜像。对 (结构, 截断) 而言是纯函数，无副作用。
//!
//! ## 算法概述
//! 1. 周期方向按晶格垂直宽度确定镜像平铺范围（与 XRD 限制球的
//!    保守估计同一思路）
//! 2. 遍历平移向量 t = s1·a + s2·b + s3·c
//! 3. 对每对 (中心, 原子+t) 计算距离并按截断过滤
//! 4. 排除 (0,0,0) 镜像下的自身
//!
//! ## 依赖关系
//! - 被 `calculator.rs` 和 `descriptors/` 调用
//! - 使用 `models/structure.rs` 的 Structure, Lattice

use crate::error::{AtomrepError, Result};
use crate::models::Structure;

/// 单个邻居条目
#[derive(Debug, Clone)]
pub struct Neighbour {
    /// 邻居原子在结构内的索引
    pub index: usize,
    /// 从中心指向邻居的相对向量
    pub vector: [f64; 3],
    /// 中心-邻居距离
    pub distance: f64,
    /// 周期镜像标签 (s1, s2, s3)
    pub image: [i32; 3],
}

/// 一个结构在给定截断下的邻居列表
///
/// 不变量：每个条目满足 distance <= cutoff；枚举是穷尽的，
/// 同一 (邻居, 镜像) 不会重复出现。
#[derive(Debug, Clone)]
pub struct NeighbourList {
    /// 构建时使用的截断半径
    pub cutoff: f64,
    /// 按中心原子索引排列的邻居序列
    centers: Vec<Vec<Neighbour>>,
}

impl NeighbourList {
    /// 构建邻居列表
    pub fn build(structure: &Structure, cutoff: f64) -> Result<Self> {
        if !(cutoff > 0.0) {
            return Err(AtomrepError::InvalidHyperparameter {
                name: "cutoff".to_string(),
                reason: format!("must be positive, got {}", cutoff),
            });
        }

        let n_atoms = structure.n_atoms();
        let shifts = image_shifts(structure, cutoff);

        // 镜像平铺范围按单胞几何推导，坐标必须先折回单胞内，
        // 否则胞外位置会丢失截断内的镜像
        let positions = wrapped_positions(structure);

        let mut centers: Vec<Vec<Neighbour>> = vec![Vec::new(); n_atoms];

        for (shift, translation) in &shifts {
            let is_origin_cell = *shift == [0, 0, 0];

            for center in 0..n_atoms {
                let center_pos = positions[center];

                for other in 0..n_atoms {
                    if is_origin_cell && other == center {
                        continue;
                    }

                    let other_pos = positions[other];
                    let vector = [
                        other_pos[0] + translation[0] - center_pos[0],
                        other_pos[1] + translation[1] - center_pos[1],
                        other_pos[2] + translation[2] - center_pos[2],
                    ];
                    let distance =
                        (vector[0] * vector[0] + vector[1] * vector[1] + vector[2] * vector[2])
                            .sqrt();

                    if distance <= cutoff {
                        centers[center].push(Neighbour {
                            index: other,
                            vector,
                            distance,
                            image: *shift,
                        });
                    }
                }
            }
        }

        Ok(NeighbourList { cutoff, centers })
    }

    /// 中心原子数量
    pub fn n_centers(&self) -> usize {
        self.centers.len()
    }

    /// 某个中心的邻居序列
    pub fn neighbours(&self, center: usize) -> &[Neighbour] {
        &self.centers[center]
    }

    /// 按中心迭代
    pub fn iter(&self) -> impl Iterator<Item = &[Neighbour]> {
        self.centers.iter().map(|n| n.as_slice())
    }

    /// 全部中心里最大的邻居数
    pub fn max_neighbours(&self) -> usize {
        self.centers.iter().map(|n| n.len()).max().unwrap_or(0)
    }
}

/// 将原子坐标沿周期方向折回单胞
///
/// 分数坐标按 rem_euclid 归约到 [0, 1)，非周期方向保持原值。
/// 非周期结构原样返回。
fn wrapped_positions(structure: &Structure) -> Vec<[f64; 3]> {
    let lattice = match (&structure.lattice, structure.is_periodic()) {
        (Some(lattice), true) => lattice,
        _ => return structure.positions.clone(),
    };

    structure
        .positions
        .iter()
        .map(|&pos| {
            let mut frac = lattice.to_fractional(pos);
            for axis in 0..3 {
                if structure.pbc[axis] {
                    frac[axis] = frac[axis].rem_euclid(1.0);
                }
            }
            lattice.to_cartesian(frac)
        })
        .collect()
}

/// 枚举需要考虑的周期平移向量
///
/// 返回 (镜像标签, 笛卡尔平移) 列表。非周期结构只有 (0,0,0)。
/// 每个周期方向的平铺数取 ceil(cutoff / 垂直宽度)，保证截断球
/// 完全被镜像覆盖。
fn image_shifts(structure: &Structure, cutoff: f64) -> Vec<([i32; 3], [f64; 3])> {
    let lattice = match (&structure.lattice, structure.is_periodic()) {
        (Some(lattice), true) => lattice,
        _ => return vec![([0, 0, 0], [0.0, 0.0, 0.0])],
    };

    let widths = lattice.perpendicular_widths();
    let mut reach = [0i32; 3];
    for axis in 0..3 {
        if structure.pbc[axis] {
            reach[axis] = (cutoff / widths[axis]).ceil() as i32;
        }
    }

    let m = lattice.matrix;
    let mut shifts = Vec::new();
    for s1 in -reach[0]..=reach[0] {
        for s2 in -reach[1]..=reach[1] {
            for s3 in -reach[2]..=reach[2] {
                let f1 = s1 as f64;
                let f2 = s2 as f64;
                let f3 = s3 as f64;
                let translation = [
                    f1 * m[0][0] + f2 * m[1][0] + f3 * m[2][0],
                    f1 * m[0][1] + f2 * m[1][1] + f3 * m[2][1],
                    f1 * m[0][2] + f2 * m[1][2] + f3 * m[2][2],
                ];
                shifts.push(([s1, s2, s3], translation));
            }
        }
    }

    shifts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Lattice;

    #[test]
    fn test_cutoff_must_be_positive() {
        let structure = Structure::new(vec![[0.0, 0.0, 0.0]], vec![1]).unwrap();
        assert!(NeighbourList::build(&structure, 0.0).is_err());
        assert!(NeighbourList::build(&structure, -1.0).is_err());
    }

    #[test]
    fn test_isolated_pair() {
        let structure =
            Structure::new(vec![[0.0, 0.0, 0.0], [1.5, 0.0, 0.0]], vec![1, 1]).unwrap();
        let nl = NeighbourList::build(&structure, 2.0).unwrap();

        assert_eq!(nl.n_centers(), 2);
        assert_eq!(nl.neighbours(0).len(), 1);
        assert_eq!(nl.neighbours(1).len(), 1);
        assert!((nl.neighbours(0)[0].distance - 1.5).abs() < 1e-12);
        assert_eq!(nl.neighbours(0)[0].index, 1);
        assert_eq!(nl.neighbours(0)[0].image, [0, 0, 0]);
    }

    #[test]
    fn test_pair_outside_cutoff() {
        let structure =
            Structure::new(vec![[0.0, 0.0, 0.0], [3.0, 0.0, 0.0]], vec![1, 1]).unwrap();
        let nl = NeighbourList::build(&structure, 2.0).unwrap();

        assert_eq!(nl.neighbours(0).len(), 0);
        assert_eq!(nl.neighbours(1).len(), 0);
    }

    #[test]
    fn test_all_distances_within_cutoff() {
        let structure = Structure::new(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.2, 0.0],
                [0.0, 1.7, 0.3],
                [2.4, 2.4, 2.4],
            ],
            vec![6, 1, 1, 8],
        )
        .unwrap();
        let cutoff = 2.5;
        let nl = NeighbourList::build(&structure, cutoff).unwrap();

        for neighbours in nl.iter() {
            for n in neighbours {
                assert!(n.distance <= cutoff);
                assert!(n.distance > 0.0);
            }
        }
    }

    #[test]
    fn test_simple_cubic_coordination() {
        // 简单立方晶格，截断略大于晶格常数：6 个最近邻
        let a = 3.0;
        let lattice = Lattice::from_vectors([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]]);
        let structure = Structure::periodic(
            vec![[0.0, 0.0, 0.0]],
            vec![26],
            lattice,
            [true, true, true],
        )
        .unwrap();

        let nl = NeighbourList::build(&structure, a * 1.01).unwrap();
        assert_eq!(nl.neighbours(0).len(), 6);

        for n in nl.neighbours(0) {
            assert!((n.distance - a).abs() < 1e-10);
            assert_eq!(n.index, 0);
            assert_ne!(n.image, [0, 0, 0]);
        }
    }

    #[test]
    fn test_simple_cubic_second_shell() {
        // 截断覆盖第二近邻壳层：6 + 12 = 18 个邻居
        let a = 3.0;
        let lattice = Lattice::from_vectors([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]]);
        let structure = Structure::periodic(
            vec![[0.0, 0.0, 0.0]],
            vec![26],
            lattice,
            [true, true, true],
        )
        .unwrap();

        let nl = NeighbourList::build(&structure, a * std::f64::consts::SQRT_2 * 1.01).unwrap();
        assert_eq!(nl.neighbours(0).len(), 18);
    }

    #[test]
    fn test_no_duplicate_images() {
        let a = 2.0;
        let lattice = Lattice::from_vectors([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]]);
        let structure = Structure::periodic(
            vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]],
            vec![11, 17],
            lattice,
            [true, true, true],
        )
        .unwrap();

        let nl = NeighbourList::build(&structure, 4.0).unwrap();
        for center in 0..nl.n_centers() {
            let mut seen = std::collections::HashSet::new();
            for n in nl.neighbours(center) {
                assert!(seen.insert((n.index, n.image)), "duplicated neighbour entry");
            }
        }
    }

    #[test]
    fn test_out_of_cell_positions_are_wrapped() {
        // 3 Å 立方胞，第二个原子位于胞外 x = 7.5（折回后 1.5）：
        // 截断 2.0 内必须找到折回位置的两个镜像，距离均为 1.5
        let a = 3.0;
        let lattice = Lattice::from_vectors([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]]);
        let structure = Structure::periodic(
            vec![[0.0, 0.0, 0.0], [7.5, 0.0, 0.0]],
            vec![1, 1],
            lattice,
            [true, true, true],
        )
        .unwrap();

        let nl = NeighbourList::build(&structure, 2.0).unwrap();
        assert_eq!(nl.neighbours(0).len(), 2);
        for n in nl.neighbours(0) {
            assert_eq!(n.index, 1);
            assert!((n.distance - 1.5).abs() < 1e-10);
        }
    }

    #[test]
    fn test_wrapped_equivalent_of_in_cell_structure() {
        // 胞外坐标与其折回等价结构给出相同的邻居距离集合
        let a = 3.0;
        let lattice = Lattice::from_vectors([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]]);
        let outside = Structure::periodic(
            vec![[0.0, 0.0, 0.0], [7.5, 0.4, -3.7]],
            vec![1, 8],
            lattice.clone(),
            [true, true, true],
        )
        .unwrap();
        let inside = Structure::periodic(
            vec![[0.0, 0.0, 0.0], [1.5, 0.4, 2.3]],
            vec![1, 8],
            lattice,
            [true, true, true],
        )
        .unwrap();

        let nl_out = NeighbourList::build(&outside, 2.5).unwrap();
        let nl_in = NeighbourList::build(&inside, 2.5).unwrap();

        for center in 0..2 {
            let mut d_out: Vec<f64> = nl_out.neighbours(center).iter().map(|n| n.distance).collect();
            let mut d_in: Vec<f64> = nl_in.neighbours(center).iter().map(|n| n.distance).collect();
            d_out.sort_by(|x, y| x.partial_cmp(y).unwrap());
            d_in.sort_by(|x, y| x.partial_cmp(y).unwrap());

            assert_eq!(d_out.len(), d_in.len());
            for (x, y) in d_out.iter().zip(d_in.iter()) {
                assert!((x - y).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn test_partial_periodicity() {
        // 只沿 z 周期：x/y 方向不产生镜像
        let a = 2.0;
        let lattice = Lattice::from_vectors([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]]);
        let structure = Structure::periodic(
            vec![[0.0, 0.0, 0.0]],
            vec![6],
            lattice,
            [false, false, true],
        )
        .unwrap();

        let nl = NeighbourList::build(&structure, a * 1.01).unwrap();
        assert_eq!(nl.neighbours(0).len(), 2);
        for n in nl.neighbours(0) {
            assert_eq!(n.image[0], 0);
            assert_eq!(n.image[1], 0);
            assert_ne!(n.image[2], 0);
        }
    }
}
