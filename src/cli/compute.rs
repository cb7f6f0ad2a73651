//! # compute 子命令 CLI 定义
//!
//! 对完成的 HTI 作业计算每分子自由能
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/compute.rs`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 自由能类型
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum EnergyType {
    /// Constant-volume free energy
    #[default]
    Helmholtz,
    /// Constant-pressure free energy (adds pv)
    Gibbs,
}

impl std::fmt::Display for EnergyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnergyType::Helmholtz => write!(f, "helmholtz"),
            EnergyType::Gibbs => write!(f, "gibbs"),
        }
    }
}

/// compute 子命令参数
#[derive(Args, Debug)]
pub struct ComputeArgs {
    /// Folder of the finished job
    #[arg(value_name = "JOB")]
    pub job: PathBuf,

    /// Type of the free energy
    #[arg(short = 't', long = "type", value_enum, default_value_t = EnergyType::Helmholtz)]
    pub energy_type: EnergyType,

    /// Print the integrand at every lambda as a table
    #[arg(long, default_value_t = false)]
    pub detail: bool,

    /// Export the integrand to a CSV file
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Plot the integrand (PNG or SVG by extension)
    #[arg(long, value_name = "FILE")]
    pub plot: Option<PathBuf>,
}
