//! # λ 积分
//!
//! 对 ⟨dU/dλ⟩ 做梯形积分，并给出统计误差与积分（离散化）误差。
//!
//! ## 误差估计
//! - 统计误差：√Σ wᵢ² σᵢ²，wᵢ 为梯形权重
//! - 积分误差：|I(h) − I(2h)| / 3，I(2h) 为隔点取样（保留端点）的梯形积分；
//!   少于 3 个点时无法估计，记为 0
//!
//! ## 依赖关系
//! - 被 `hti/post.rs` 使用
//! - 使用 `models/thermo.rs`

use crate::models::{FreeEnergyResult, LambdaPoint};

/// 梯形积分
pub fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| 0.5 * (xs[1] - xs[0]) * (ys[0] + ys[1]))
        .sum()
}

/// 梯形权重
pub fn trapezoid_weights(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    (0..n)
        .map(|i| {
            let left = if i > 0 { x[i] - x[i - 1] } else { 0.0 };
            let right = if i + 1 < n { x[i + 1] - x[i] } else { 0.0 };
            0.5 * (left + right)
        })
        .collect()
}

/// 隔点取样的粗网格下标（总是包含最后一个点）
fn coarse_indices(n: usize) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..n).step_by(2).collect();
    if idx.last() != Some(&(n - 1)) {
        idx.push(n - 1);
    }
    idx
}

/// 对积分点做 λ 积分
pub fn integrate(points: &[LambdaPoint]) -> FreeEnergyResult {
    let x: Vec<f64> = points.iter().map(|p| p.lambda).collect();
    let y: Vec<f64> = points.iter().map(|p| p.mean).collect();

    let value = trapezoid(&x, &y);

    let stat_err = trapezoid_weights(&x)
        .iter()
        .zip(points)
        .map(|(w, p)| (w * p.err).powi(2))
        .sum::<f64>()
        .sqrt();

    let inte_err = if points.len() >= 3 {
        let idx = coarse_indices(points.len());
        let xc: Vec<f64> = idx.iter().map(|&i| x[i]).collect();
        let yc: Vec<f64> = idx.iter().map(|&i| y[i]).collect();
        (value - trapezoid(&xc, &yc)).abs() / 3.0
    } else {
        0.0
    };

    FreeEnergyResult::new(value, stat_err, inte_err)
}
