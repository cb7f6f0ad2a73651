//! # Slurm 脚本生成工具
//!
//! 为每个 λ 任务生成 sbatch 提交脚本。配置来自参数文件中的 `slurm` 段：
//!
//! ```json
//! "slurm": { "partition": "cpu", "ntasks": 16, "modules": ["lammps/2023"] }
//! ```
//!
//! ## 依赖关系
//! - 被 `hti/tasks.rs` 使用
//! - 使用 `serde`

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Slurm 作业配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlurmConfig {
    pub partition: String,
    pub constraint: Option<String>,
    pub nodes: u32,
    pub ntasks: u32,
    pub cpus_per_task: u32,
    pub mem_per_cpu: String,
    pub time_limit: String,
    pub modules: Vec<String>,
    /// 执行命令，在任务目录内运行
    pub command: String,
}

impl Default for SlurmConfig {
    fn default() -> Self {
        SlurmConfig {
            partition: "cpu".to_string(),
            constraint: None,
            nodes: 1,
            ntasks: 1,
            cpus_per_task: 1,
            mem_per_cpu: "2G".to_string(),
            time_limit: "24:00:00".to_string(),
            modules: vec![],
            command: "lmp -i in.lammps".to_string(),
        }
    }
}

/// 生成 sbatch 脚本内容
pub fn generate_sbatch_script(config: &SlurmConfig, job_name: &str, workdir: &Path) -> String {
    let module_loads = config
        .modules
        .iter()
        .map(|m| format!("module load {}", m))
        .collect::<Vec<_>>()
        .join("\n");

    let constraint = config
        .constraint
        .as_ref()
        .map(|c| format!("#SBATCH --constraint \"{}\"\n", c))
        .unwrap_or_default();

    let exec_cmd = if config.ntasks > 1 {
        format!("srun {}", config.command)
    } else {
        config.command.clone()
    };

    format!(
        r#"#!/bin/bash
{}#SBATCH --partition {}
#SBATCH --nodes={}
#SBATCH --mem-per-cpu {}
#SBATCH --time {}
#SBATCH -c {}
#SBATCH -n {}
#SBATCH -J {}
#SBATCH -o %x.out
#SBATCH -e %x.err

set -euo pipefail

module purge 2>&1
{}

cd "{}"
echo "PWD=$(pwd)"
echo "Running: {}"
{} > log.out 2>&1
"#,
        constraint,
        config.partition,
        config.nodes,
        config.mem_per_cpu,
        config.time_limit,
        config.cpus_per_task,
        config.ntasks,
        job_name,
        module_loads,
        workdir.display(),
        exec_cmd,
        exec_cmd,
    )
}
