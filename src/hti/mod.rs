//! # Hamiltonian 热力学积分模块
//!
//! 生成 λ 任务目录并对完成的任务做后处理。
//!
//! 路径 `U(λ) = (1 − λ)·U_spring + λ·U_model`：λ = 0 为 Einstein 晶体，
//! λ = 1 为目标模型，所有相互作用在同一条 λ 路径上同时切换（模式 `all`）。
//!
//! ## 子模块
//! - `lambda`: λ 网格展开
//! - `tasks`: 任务目录与 LAMMPS 输入生成
//! - `stats`: 块平均
//! - `integrate`: λ 积分与误差
//! - `post`: 任务后处理
//! - `export`: 积分点导出
//! - `plot`: 积分点作图
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/`, `parsers/`, `utils/`

pub mod export;
pub mod integrate;
pub mod lambda;
pub mod plot;
pub mod post;
pub mod stats;
pub mod tasks;

use crate::error::{HtiError, Result};
use crate::models::{JobConfig, ThermoInfo, TiEstimate};

use std::io::Write;
use std::path::Path;

/// 任务目录名前缀
pub const TASK_PREFIX: &str = "task.";

/// 切换模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchMode {
    /// 所有相互作用在一条 λ 路径上同时切换
    All,
}

impl SwitchMode {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "all" => Ok(SwitchMode::All),
            other => Err(HtiError::UnsupportedMode(other.to_string())),
        }
    }
}

/// 任务生成器
pub trait TaskGenerator {
    /// 在 `output_dir` 下生成完整的作业目录
    fn make_tasks(
        &self,
        output_dir: &Path,
        config: &JobConfig,
        reference: &str,
        mode: &str,
    ) -> Result<()>;
}

/// 任务后处理器
pub trait TaskPostProcessor {
    /// 汇总作业目录中的任务；`natoms` 为归一化所用的粒子数（分子数）
    fn post_tasks(&self, job_dir: &Path, config: &JobConfig, natoms: usize)
        -> Result<TiEstimate>;

    /// 输出热力学量
    fn print_thermo_info(&self, info: &ThermoInfo, out: &mut dyn Write) -> Result<()>;
}

/// 基于 LAMMPS 的 HTI 实现
#[derive(Debug, Default, Clone, Copy)]
pub struct HtiEngine;

impl TaskGenerator for HtiEngine {
    fn make_tasks(
        &self,
        output_dir: &Path,
        config: &JobConfig,
        reference: &str,
        mode: &str,
    ) -> Result<()> {
        tasks::make_tasks(output_dir, config, reference, mode).map(|_| ())
    }
}

impl TaskPostProcessor for HtiEngine {
    fn post_tasks(
        &self,
        job_dir: &Path,
        config: &JobConfig,
        natoms: usize,
    ) -> Result<TiEstimate> {
        post::post_tasks(job_dir, config, natoms)
    }

    fn print_thermo_info(&self, info: &ThermoInfo, out: &mut dyn Write) -> Result<()> {
        post::print_thermo_info(info, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_mode_names() {
        assert_eq!(SwitchMode::from_name("all").unwrap(), SwitchMode::All);
        assert!(matches!(
            SwitchMode::from_name("three-step"),
            Err(HtiError::UnsupportedMode(_))
        ));
    }
}
