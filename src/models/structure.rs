//! # 原子结构数据模型
//!
//! 定义统一的原子结构表示：笛卡尔坐标、原子序数、可选周期性晶格。
//! 结构一经构造即视为不可变。
//!
//! ## 依赖关系
//! - 被 `neighbours/` 和 `descriptors/` 使用
//! - 无外部模块依赖

use crate::error::{AtomrepError, Result};

use serde::{Deserialize, Serialize};

/// 晶格参数表示
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶格参数 (a, b, c, alpha, beta, gamma) 创建晶格
    /// 角度单位：度
    pub fn from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        let alpha_rad = alpha.to_radians();
        let beta_rad = beta.to_radians();
        let gamma_rad = gamma.to_radians();

        let cos_alpha = alpha_rad.cos();
        let cos_beta = beta_rad.cos();
        let cos_gamma = gamma_rad.cos();
        let sin_gamma = gamma_rad.sin();

        let a_vec = [a, 0.0, 0.0];
        let b_vec = [b * cos_gamma, b * sin_gamma, 0.0];

        let c1 = c * cos_beta;
        let c2 = c * (cos_alpha - cos_beta * cos_gamma) / sin_gamma;
        let c3 = (c * c - c1 * c1 - c2 * c2).sqrt();
        let c_vec = [c1, c2, c3];

        Lattice {
            matrix: [a_vec, b_vec, c_vec],
        }
    }

    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 获取晶格参数 (a, b, c, alpha, beta, gamma)
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let a_vec = self.matrix[0];
        let b_vec = self.matrix[1];
        let c_vec = self.matrix[2];

        let a = norm(&a_vec);
        let b = norm(&b_vec);
        let c = norm(&c_vec);

        let alpha = (dot(&b_vec, &c_vec) / (b * c)).acos().to_degrees();
        let beta = (dot(&a_vec, &c_vec) / (a * c)).acos().to_degrees();
        let gamma = (dot(&a_vec, &b_vec) / (a * b)).acos().to_degrees();

        (a, b, c, alpha, beta, gamma)
    }

    /// 计算晶格体积
    pub fn volume(&self) -> f64 {
        let a = self.matrix[0];
        let b = self.matrix[1];
        let c = self.matrix[2];

        // 行列式计算
        a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }

    /// 笛卡尔坐标转分数坐标
    ///
    /// 行向量约定 cart = frac · M，故 frac_j = cart · (a_k × a_l) / V。
    pub fn to_fractional(&self, cart: [f64; 3]) -> [f64; 3] {
        let volume = self.volume();
        let a = self.matrix[0];
        let b = self.matrix[1];
        let c = self.matrix[2];
        let duals = [cross(&b, &c), cross(&c, &a), cross(&a, &b)];

        [
            dot(&cart, &duals[0]) / volume,
            dot(&cart, &duals[1]) / volume,
            dot(&cart, &duals[2]) / volume,
        ]
    }

    /// 分数坐标转笛卡尔坐标
    pub fn to_cartesian(&self, frac: [f64; 3]) -> [f64; 3] {
        let m = self.matrix;
        [
            frac[0] * m[0][0] + frac[1] * m[1][0] + frac[2] * m[2][0],
            frac[0] * m[0][1] + frac[1] * m[1][1] + frac[2] * m[2][1],
            frac[0] * m[0][2] + frac[1] * m[1][2] + frac[2] * m[2][2],
        ]
    }

    /// 各晶轴方向的垂直宽度
    ///
    /// 第 i 个分量是晶胞沿第 i 个晶格向量方向、垂直于另外两个向量
    /// 所张平面的厚度 V / |a_j × a_k|。邻居搜索用它确定每个方向
    /// 需要平铺的周期镜像数量。
    pub fn perpendicular_widths(&self) -> [f64; 3] {
        let volume = self.volume().abs();
        let a = self.matrix[0];
        let b = self.matrix[1];
        let c = self.matrix[2];

        [
            volume / norm(&cross(&b, &c)),
            volume / norm(&cross(&c, &a)),
            volume / norm(&cross(&a, &b)),
        ]
    }
}

/// 向量叉积
fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// 向量点积
fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// 向量模长
fn norm(a: &[f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

/// 原子结构
///
/// 位置为笛卡尔坐标（Å），物种用原子序数表示。周期性结构带
/// 晶格与周期性标志；非周期方向的标志为 false。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    /// 原子笛卡尔坐标列表
    pub positions: Vec<[f64; 3]>,

    /// 原子序数列表，与 positions 等长
    pub species: Vec<i32>,

    /// 可选晶格
    pub lattice: Option<Lattice>,

    /// 各晶轴方向是否周期
    pub pbc: [bool; 3],
}

impl Structure {
    /// 创建非周期结构（孤立分子/团簇）
    pub fn new(positions: Vec<[f64; 3]>, species: Vec<i32>) -> Result<Self> {
        let structure = Structure {
            positions,
            species,
            lattice: None,
            pbc: [false; 3],
        };
        structure.validate()?;
        Ok(structure)
    }

    /// 创建周期结构
    pub fn periodic(
        positions: Vec<[f64; 3]>,
        species: Vec<i32>,
        lattice: Lattice,
        pbc: [bool; 3],
    ) -> Result<Self> {
        let structure = Structure {
            positions,
            species,
            lattice: Some(lattice),
            pbc,
        };
        structure.validate()?;
        Ok(structure)
    }

    /// 原子数量
    pub fn n_atoms(&self) -> usize {
        self.positions.len()
    }

    /// 是否沿任一方向周期
    pub fn is_periodic(&self) -> bool {
        self.pbc.iter().any(|&flag| flag)
    }

    /// 构造时的合法性检查
    fn validate(&self) -> Result<()> {
        if self.positions.is_empty() {
            return Err(AtomrepError::InvalidStructure {
                reason: "structure has no atoms".to_string(),
            });
        }

        if self.positions.len() != self.species.len() {
            return Err(AtomrepError::InvalidStructure {
                reason: format!(
                    "positions/species length mismatch: {} vs {}",
                    self.positions.len(),
                    self.species.len()
                ),
            });
        }

        for (i, pos) in self.positions.iter().enumerate() {
            if pos.iter().any(|x| !x.is_finite()) {
                return Err(AtomrepError::InvalidStructure {
                    reason: format!("non-finite coordinate on atom {}", i),
                });
            }
        }

        for (i, &z) in self.species.iter().enumerate() {
            if z <= 0 {
                return Err(AtomrepError::InvalidStructure {
                    reason: format!("non-positive atomic number {} on atom {}", z, i),
                });
            }
        }

        if self.is_periodic() {
            let lattice =
                self.lattice
                    .as_ref()
                    .ok_or_else(|| AtomrepError::InvalidStructure {
                        reason: "periodic flags set but no lattice given".to_string(),
                    })?;
            if lattice.volume().abs() < 1e-10 {
                return Err(AtomrepError::InvalidStructure {
                    reason: "lattice is singular (zero volume)".to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_from_parameters_cubic() {
        let lattice = Lattice::from_parameters(5.0, 5.0, 5.0, 90.0, 90.0, 90.0);
        let (a, b, c, alpha, beta, gamma) = lattice.parameters();

        assert!((a - 5.0).abs() < 1e-6);
        assert!((b - 5.0).abs() < 1e-6);
        assert!((c - 5.0).abs() < 1e-6);
        assert!((alpha - 90.0).abs() < 1e-6);
        assert!((beta - 90.0).abs() < 1e-6);
        assert!((gamma - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_lattice_volume_cubic() {
        let lattice = Lattice::from_parameters(5.0, 5.0, 5.0, 90.0, 90.0, 90.0);
        let vol = lattice.volume().abs();

        // 5^3 = 125
        assert!((vol - 125.0).abs() < 1e-6);
    }

    #[test]
    fn test_perpendicular_widths_cubic() {
        let lattice = Lattice::from_vectors([[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]]);
        let widths = lattice.perpendicular_widths();

        for w in widths {
            assert!((w - 4.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_perpendicular_widths_hexagonal() {
        let lattice = Lattice::from_parameters(3.0, 3.0, 5.0, 90.0, 90.0, 120.0);
        let widths = lattice.perpendicular_widths();

        // 斜交晶胞的垂直宽度小于晶格常数
        assert!(widths[0] < 3.0);
        assert!(widths[1] < 3.0);
        assert!((widths[2] - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_fractional_roundtrip_triclinic() {
        let lattice = Lattice::from_parameters(3.0, 4.0, 5.0, 80.0, 95.0, 110.0);
        let cart = [1.3, -0.7, 2.1];
        let frac = lattice.to_fractional(cart);
        let back = lattice.to_cartesian(frac);

        for axis in 0..3 {
            assert!((back[axis] - cart[axis]).abs() < 1e-10);
        }
    }

    #[test]
    fn test_fractional_cubic() {
        let lattice = Lattice::from_vectors([[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]]);
        let frac = lattice.to_fractional([2.0, 6.0, -1.0]);

        assert!((frac[0] - 0.5).abs() < 1e-12);
        assert!((frac[1] - 1.5).abs() < 1e-12);
        assert!((frac[2] - (-0.25)).abs() < 1e-12);
    }

    #[test]
    fn test_structure_valid() {
        let structure =
            Structure::new(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]], vec![1, 8]).unwrap();

        assert_eq!(structure.n_atoms(), 2);
        assert!(!structure.is_periodic());
    }

    #[test]
    fn test_structure_length_mismatch() {
        let result = Structure::new(vec![[0.0, 0.0, 0.0]], vec![1, 8]);
        assert!(result.is_err());
    }

    #[test]
    fn test_structure_empty() {
        let result = Structure::new(vec![], vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn test_structure_non_finite() {
        let result = Structure::new(vec![[f64::NAN, 0.0, 0.0]], vec![1]);
        assert!(result.is_err());
    }

    #[test]
    fn test_structure_periodic_singular_lattice() {
        let lattice = Lattice::from_vectors([[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        let result =
            Structure::periodic(vec![[0.0, 0.0, 0.0]], vec![6], lattice, [true, true, true]);
        assert!(result.is_err());
    }
}
