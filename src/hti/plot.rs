//! # 积分点作图
//!
//! 使用 `plotters` 画出 ⟨dU/dλ⟩ 随 λ 的变化（带误差棒），
//! 按输出文件扩展名选择 PNG 或 SVG。
//!
//! ## 依赖关系
//! - 被 `commands/compute.rs` 调用
//! - 使用 `models/thermo.rs` 的 LambdaPoint
//! - 使用 `plotters` 渲染图表

use crate::error::{HtiError, Result};
use crate::models::LambdaPoint;

use plotters::prelude::*;
use std::path::Path;

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 700;

/// 生成积分曲线图
pub fn plot_integrand(points: &[LambdaPoint], output_path: &Path, title: &str) -> Result<()> {
    if points.is_empty() {
        return Err(HtiError::PlotError("No lambda points to plot".to_string()));
    }

    let use_svg = output_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);

    if use_svg {
        let root = SVGBackend::new(output_path, (WIDTH, HEIGHT)).into_drawing_area();
        draw_chart(&root, points, title)?;
        root.present()
            .map_err(|e| HtiError::PlotError(format!("{:?}", e)))?;
    } else {
        let root = BitMapBackend::new(output_path, (WIDTH, HEIGHT)).into_drawing_area();
        draw_chart(&root, points, title)?;
        root.present()
            .map_err(|e| HtiError::PlotError(format!("{:?}", e)))?;
    }
    Ok(())
}

/// y 轴范围（含误差棒，上下各留 10%）
fn y_range(points: &[LambdaPoint]) -> (f64, f64) {
    let lo = points
        .iter()
        .map(|p| p.mean - p.err)
        .fold(f64::INFINITY, f64::min);
    let hi = points
        .iter()
        .map(|p| p.mean + p.err)
        .fold(f64::NEG_INFINITY, f64::max);
    let pad = ((hi - lo) * 0.1).max(1e-6);
    (lo - pad, hi + pad)
}

/// 绘制图表的核心逻辑
fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    points: &[LambdaPoint],
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| HtiError::PlotError(format!("{:?}", e)))?;

    let (y_min, y_max) = y_range(points);

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..1.0, y_min..y_max)
        .map_err(|e| HtiError::PlotError(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc("λ")
        .y_desc("⟨dU/dλ⟩ per molecule (eV)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| HtiError::PlotError(format!("{:?}", e)))?;

    let line_color = RGBColor(0, 102, 204);

    chart
        .draw_series(LineSeries::new(
            points.iter().map(|p| (p.lambda, p.mean)),
            line_color.stroke_width(2),
        ))
        .map_err(|e| HtiError::PlotError(format!("{:?}", e)))?;

    chart
        .draw_series(points.iter().map(|p| {
            ErrorBar::new_vertical(
                p.lambda,
                p.mean - p.err,
                p.mean,
                p.mean + p.err,
                line_color.filled(),
                8,
            )
        }))
        .map_err(|e| HtiError::PlotError(format!("{:?}", e)))?;

    chart
        .draw_series(
            points
                .iter()
                .map(|p| Circle::new((p.lambda, p.mean), 4, line_color.filled())),
        )
        .map_err(|e| HtiError::PlotError(format!("{:?}", e)))?;

    Ok(())
}
