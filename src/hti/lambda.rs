//! # λ 网格
//!
//! 配置中的 `lambda` 可以混合写单个数值与 `"start:stop:step"` 区间：
//!
//! ```json
//! "lambda": ["0:0.2:0.05", "0.2:1:0.1", 1.0]
//! ```
//!
//! 区间包含终点；展开后排序、去重，首尾必须分别为 0 和 1。
//!
//! ## 依赖关系
//! - 被 `hti/tasks.rs` 使用

use crate::error::{HtiError, Result};

use serde::{Deserialize, Serialize};

/// 判定两个 λ 相同的容差
const LAMBDA_TOL: f64 = 1e-10;

/// 单个区间最多展开的点数
const MAX_RANGE_POINTS: usize = 10_000;

/// `lambda` 数组中的一项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LambdaEntry {
    Value(f64),
    Range(String),
}

impl LambdaEntry {
    fn expand(&self, out: &mut Vec<f64>) -> Result<()> {
        match self {
            LambdaEntry::Value(v) => out.push(*v),
            LambdaEntry::Range(range) => out.extend(parse_range(range)?),
        }
        Ok(())
    }
}

/// 解析 `"start:stop:step"`（包含终点）
pub fn parse_range(range: &str) -> Result<Vec<f64>> {
    let invalid = |reason: &str| {
        HtiError::InvalidConfig(format!("Invalid lambda range '{}': {}", range, reason))
    };

    let parts: Vec<f64> = range
        .split(':')
        .map(|s| s.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| invalid("expected numbers"))?;

    let &[start, stop, step] = parts.as_slice() else {
        return Err(invalid("expected 'start:stop:step'"));
    };
    if step <= 0.0 {
        return Err(invalid("step must be positive"));
    }
    if stop < start {
        return Err(invalid("stop is smaller than start"));
    }

    let span = ((stop - start) / step + LAMBDA_TOL).floor();
    if span > MAX_RANGE_POINTS as f64 {
        return Err(invalid(&format!(
            "more than {} points, use a larger step",
            MAX_RANGE_POINTS
        )));
    }
    let n = span as usize;
    let mut values: Vec<f64> = (0..=n).map(|i| start + i as f64 * step).collect();
    if values.last().map_or(true, |last| (stop - last).abs() > LAMBDA_TOL) {
        values.push(stop);
    }
    Ok(values)
}

/// 展开、排序、去重并校验 λ 网格
pub fn expand_lambdas(entries: &[LambdaEntry]) -> Result<Vec<f64>> {
    let mut values = Vec::new();
    for entry in entries {
        entry.expand(&mut values)?;
    }

    if let Some(bad) = values.iter().find(|v| !(0.0..=1.0 + LAMBDA_TOL).contains(*v)) {
        return Err(HtiError::InvalidConfig(format!(
            "lambda value {} is outside [0, 1]",
            bad
        )));
    }

    values.sort_by(|a, b| a.total_cmp(b));
    values.dedup_by(|a, b| (*a - *b).abs() < LAMBDA_TOL);

    match (values.first(), values.last()) {
        (Some(first), Some(last))
            if values.len() >= 2 && first.abs() < LAMBDA_TOL && (last - 1.0).abs() < LAMBDA_TOL => {}
        _ => {
            return Err(HtiError::InvalidConfig(
                "lambda grid must contain at least 0 and 1".to_string(),
            ))
        }
    }

    Ok(values)
}
