//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `gen`: 由参数文件生成 HTI 作业目录
//! - `compute`: 对完成的作业计算自由能
//!
//! 不带子命令时解析依然成功（`command` 为 `None`），由 `main.rs` 打印帮助。
//!
//! ## 依赖关系
//! - 被 `main.rs` 与 `commands/` 使用
//! - 子模块: gen, compute

pub mod compute;
pub mod gen;

use clap::{ArgAction, Parser, Subcommand};

/// hti_ice - 以 Einstein 晶体为参考态的 Hamiltonian TI 自由能工具
#[derive(Parser, Debug)]
#[command(name = "hti_ice")]
#[command(version)]
#[command(about = "Compute free energy of ice by Hamiltonian TI", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase diagnostic log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Silence diagnostics and status messages
    #[arg(short, long, global = true, default_value_t = false)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// 可用的子命令
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the job from a parameter file
    Gen(gen::GenArgs),

    /// Compute the free energy of a finished job
    Compute(compute::ComputeArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::compute::EnergyType;
    use std::path::PathBuf;

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["hti_ice"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_gen_defaults() {
        let cli = Cli::try_parse_from(["hti_ice", "gen", "param.json"]).unwrap();
        match cli.command {
            Some(Commands::Gen(args)) => {
                assert_eq!(args.param, PathBuf::from("param.json"));
                assert_eq!(args.output, PathBuf::from("new_job"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_gen_output() {
        let cli = Cli::try_parse_from(["hti_ice", "gen", "p.json", "-o", "job_a"]).unwrap();
        let Some(Commands::Gen(args)) = cli.command else {
            panic!("expected gen");
        };
        assert_eq!(args.output, PathBuf::from("job_a"));
    }

    #[test]
    fn test_compute_defaults() {
        let cli = Cli::try_parse_from(["hti_ice", "compute", "job"]).unwrap();
        let Some(Commands::Compute(args)) = cli.command else {
            panic!("expected compute");
        };
        assert_eq!(args.job, PathBuf::from("job"));
        assert_eq!(args.energy_type, EnergyType::Helmholtz);
        assert!(!args.detail);
        assert!(args.csv.is_none());
        assert!(args.plot.is_none());
    }

    #[test]
    fn test_compute_gibbs_and_verbosity() {
        let cli =
            Cli::try_parse_from(["hti_ice", "-vv", "compute", "job", "-t", "gibbs", "--detail"])
                .unwrap();
        assert_eq!(cli.verbose, 2);
        let Some(Commands::Compute(args)) = cli.command else {
            panic!("expected compute");
        };
        assert_eq!(args.energy_type, EnergyType::Gibbs);
        assert!(args.detail);
    }

    #[test]
    fn test_compute_rejects_unknown_type() {
        assert!(Cli::try_parse_from(["hti_ice", "compute", "job", "-t", "enthalpy"]).is_err());
    }

    #[test]
    fn test_gen_requires_param() {
        assert!(Cli::try_parse_from(["hti_ice", "gen"]).is_err());
    }
}
