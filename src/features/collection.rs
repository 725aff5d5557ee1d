//! # 特征集合
//!
//! 按输入顺序聚合各结构的描述符输出。全局特征宽度在构造时固定，
//! append 是唯一的修改操作；宽度不符的 append 被整体拒绝，集合
//! 不发生部分修改。
//!
//! ## 依赖关系
//! - 被 `calculator.rs` 使用
//! - 使用 `error.rs` 的 SizingConflict

use crate::error::{AtomrepError, Result};

/// 单个结构的描述符输出：每个中心原子一行的稠密块
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBlock {
    n_rows: usize,
    width: usize,
    data: Vec<f64>,
}

impl FeatureBlock {
    /// 从行向量列表构造，所有行必须等宽
    pub fn from_rows(rows: Vec<Vec<f64>>, width: usize) -> Result<Self> {
        let mut data = Vec::with_capacity(rows.len() * width);
        let n_rows = rows.len();
        for row in rows {
            if row.len() != width {
                return Err(AtomrepError::SizingConflict {
                    expected: width,
                    got: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(FeatureBlock {
            n_rows,
            width,
            data,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.width..(i + 1) * self.width]
    }
}

/// 全批量的特征集合
///
/// 底层为行优先的稠密存储；同时记录每个结构占据的行数，提供按
/// 结构分块的视图。附带生成它的超参数规范化字符串作为身份标识。
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection {
    width: usize,
    data: Vec<f64>,
    block_rows: Vec<usize>,
    hypers_json: String,
}

impl FeatureCollection {
    /// 以固定全局宽度创建空集合
    pub fn new(width: usize, hypers_json: String) -> Self {
        FeatureCollection {
            width,
            data: Vec::new(),
            block_rows: Vec::new(),
            hypers_json,
        }
    }

    /// 追加一个结构的描述符块
    ///
    /// 宽度不符返回 SizingConflict，且集合保持原状。
    pub fn append(&mut self, block: FeatureBlock) -> Result<()> {
        if block.width != self.width {
            return Err(AtomrepError::SizingConflict {
                expected: self.width,
                got: block.width,
            });
        }
        self.block_rows.push(block.n_rows);
        self.data.extend(block.data);
        Ok(())
    }

    /// 已追加的结构数量
    pub fn n_structures(&self) -> usize {
        self.block_rows.len()
    }

    /// 总行数（全部中心原子数）
    pub fn n_rows(&self) -> usize {
        if self.width == 0 {
            return self.block_rows.iter().sum();
        }
        self.data.len() / self.width
    }

    /// 全局特征宽度
    pub fn width(&self) -> usize {
        self.width
    }

    /// 生成集合的超参数规范化字符串
    pub fn hypers_json(&self) -> &str {
        &self.hypers_json
    }

    /// 单行视图
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.width..(i + 1) * self.width]
    }

    /// 某个结构对应的行块视图
    pub fn structure_rows(&self, structure: usize) -> &[f64] {
        let start: usize = self.block_rows[..structure].iter().sum();
        let rows = self.block_rows[structure];
        &self.data[start * self.width..(start + rows) * self.width]
    }

    /// 稠密矩阵视图（行优先连续存储）
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}
