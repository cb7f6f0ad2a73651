//! # 热力学积分结果数据模型
//!
//! 存储后处理得到的自由能差、误差、热力学量以及 λ 积分点。
//!
//! ## 依赖关系
//! - 被 `hti/post.rs` 构建
//! - 被 `commands/compute.rs` 使用

use crate::error::{HtiError, Result};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 自由能差及其误差 (eV)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FreeEnergyResult {
    /// 自由能差
    pub delta_e: f64,

    /// [统计误差, 积分误差]
    pub delta_e_err: [f64; 2],
}

impl FreeEnergyResult {
    pub fn new(delta_e: f64, stat_err: f64, inte_err: f64) -> Self {
        FreeEnergyResult {
            delta_e,
            delta_e_err: [stat_err, inte_err],
        }
    }

    pub fn stat_err(&self) -> f64 {
        self.delta_e_err[0]
    }

    pub fn inte_err(&self) -> f64 {
        self.delta_e_err[1]
    }
}

/// 具名标量热力学量（如 `pv`, `pv_err`）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThermoInfo(BTreeMap<String, f64>);

impl ThermoInfo {
    pub fn new() -> Self {
        ThermoInfo::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    /// 取必需的键，缺失时报错
    pub fn require(&self, key: &str) -> Result<f64> {
        self.get(key)
            .ok_or_else(|| HtiError::MissingThermoKey(key.to_string()))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ThermoInfo {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        ThermoInfo(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// 单个 λ 点上的 ⟨dU/dλ⟩
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LambdaPoint {
    pub lambda: f64,

    /// 每分子平均值 (eV)
    pub mean: f64,

    /// 块平均统计误差 (eV)
    pub err: f64,

    /// 参与统计的样本数
    pub samples: usize,
}

/// 一次后处理的完整输出
#[derive(Debug, Clone)]
pub struct TiEstimate {
    pub free_energy: FreeEnergyResult,
    pub thermo_info: ThermoInfo,
    pub integrand: Vec<LambdaPoint>,
}
