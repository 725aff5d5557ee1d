//! # 截断平滑函数
//!
//! 余弦开关函数及 Coulomb 衰减因子。
//!
//! ## 依赖关系
//! - 被 `descriptors/soap.rs` 和 `descriptors/coulomb.rs` 使用
//! - 无外部模块依赖

use std::f64::consts::PI;

/// 余弦开关函数
///
/// 在 [cutoff - smooth_width, cutoff] 区间内从 1 平滑降到 0：
/// 区间内取 0.5 * (1 + cos(π (r - cutoff + sw) / sw))，
/// 区间前为 1，超过截断为 0。smooth_width = 0 退化为阶跃。
pub fn switching_function_cosine(distance: f64, cutoff: f64, smooth_width: f64) -> f64 {
    if distance > cutoff {
        return 0.0;
    }
    if smooth_width <= 0.0 || distance < cutoff - smooth_width {
        return 1.0;
    }
    0.5 * (1.0 + (PI * (distance - cutoff + smooth_width) / smooth_width).cos())
}

/// Coulomb 相互作用衰减因子
///
/// decay < 0 表示不衰减：截断内为 1，截断外为 0。
/// 否则在 [cutoff - decay, cutoff] 上按余弦开关从满强度降到零。
pub fn coulomb_decay(distance: f64, cutoff: f64, decay: f64) -> f64 {
    if decay < 0.0 {
        if distance > cutoff {
            0.0
        } else {
            1.0
        }
    } else {
        switching_function_cosine(distance, cutoff, decay)
    }
}
