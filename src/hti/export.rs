//! # 积分点导出
//!
//! 把 λ 积分点写成 CSV：`lambda, dhdl, dhdl_err, samples`（每分子 eV）。
//!
//! ## 依赖关系
//! - 被 `commands/compute.rs` 调用
//! - 使用 `csv` 库写入 CSV 文件

use crate::error::{HtiError, Result};
use crate::models::LambdaPoint;

use std::path::Path;

/// 导出积分点为 CSV
pub fn integrand_to_csv(points: &[LambdaPoint], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record(["lambda", "dhdl", "dhdl_err", "samples"])?;

    for p in points {
        wtr.write_record(&[
            format!("{:.6}", p.lambda),
            format!("{:.10e}", p.mean),
            format!("{:.4e}", p.err),
            p.samples.to_string(),
        ])?;
    }

    wtr.flush().map_err(|e| HtiError::write(output_path, e))?;

    Ok(())
}
