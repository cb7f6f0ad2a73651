//! # 块平均统计
//!
//! 对时间序列做块平均，估计均值与统计误差。
//!
//! ## 依赖关系
//! - 被 `hti/post.rs` 使用
//! - 无外部模块依赖

/// 块平均结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockAverage {
    pub mean: f64,
    pub err: f64,
    /// 丢弃平衡段后的样本数
    pub samples: usize,
}

/// 丢弃前 `skip` 个样本后按 `block_size` 分块平均
///
/// 误差为块均值的样本标准差除以 √块数。块数不足 2 时退化为逐样本估计。
/// 丢弃后没有样本则返回 `None`。
pub fn block_average(data: &[f64], skip: usize, block_size: usize) -> Option<BlockAverage> {
    let data = data.get(skip..)?;
    if data.is_empty() {
        return None;
    }
    let mean = data.iter().sum::<f64>() / data.len() as f64;

    let block_size = block_size.max(1);
    let nblocks = data.len() / block_size;
    let block_means: Vec<f64> = if nblocks >= 2 {
        data.chunks_exact(block_size)
            .map(|c| c.iter().sum::<f64>() / block_size as f64)
            .collect()
    } else {
        data.to_vec()
    };

    Some(BlockAverage {
        mean,
        err: std_error(&block_means),
        samples: data.len(),
    })
}

/// 均值的标准误差（样本标准差 / √n）
fn std_error(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    (var / n as f64).sqrt()
}
