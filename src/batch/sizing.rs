//! # 批量尺寸预扫描
//!
//! Coulomb 矩阵的特征宽度取决于整个批量的内容：填充尺寸必须
//! 覆盖所有结构、所有中心的局部条目数。预扫描在任何描述符定稿
//! 之前完成，其结果折回超参数快照，因为特征集合的列宽在构造后
//! 不可增长。
//!
//! ## 依赖关系
//! - 被 `descriptors/mod.rs` 的 freeze 调用
//! - 使用 `neighbours/list.rs` 的 NeighbourList

use crate::neighbours::NeighbourList;

/// 解析批量统一的填充尺寸
///
/// 对每个中心取 邻居数 + 1（含中心自身），跨批量取最大值。
/// 全批量无邻居时为 1。
pub fn resolve_size(lists: &[NeighbourList]) -> usize {
    resolve_size_from_counts(
        lists
            .iter()
            .flat_map(|nl| nl.iter().map(|neighbours| neighbours.len())),
    )
}

/// 从邻居计数序列解析尺寸
pub fn resolve_size_from_counts(counts: impl IntoIterator<Item = usize>) -> usize {
    counts
        .into_iter()
        .map(|count| count + 1)
        .max()
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Structure;

    #[test]
    fn test_size_is_max_count_plus_one() {
        // 结构 A 的中心邻居数 [2, 5]，结构 B 是 [0, 3] → size = 6
        let size = resolve_size_from_counts(vec![2, 5, 0, 3]);
        assert_eq!(size, 6);
    }

    #[test]
    fn test_zero_neighbour_batch_yields_one() {
        assert_eq!(resolve_size_from_counts(vec![0, 0, 0]), 1);
        assert_eq!(resolve_size_from_counts(Vec::<usize>::new()), 1);
    }

    #[test]
    fn test_resolve_size_over_lists() {
        // 孤立原子对：每个中心 1 个邻居 → size = 2
        let pair = Structure::new(vec![[0.0; 3], [1.0, 0.0, 0.0]], vec![1, 1]).unwrap();
        let lone = Structure::new(vec![[0.0; 3]], vec![1]).unwrap();
        let lists = vec![
            NeighbourList::build(&pair, 2.0).unwrap(),
            NeighbourList::build(&lone, 2.0).unwrap(),
        ];

        assert_eq!(resolve_size(&lists), 2);
    }
}
