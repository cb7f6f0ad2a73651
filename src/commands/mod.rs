//! # 命令执行模块
//!
//! `JobCli` 把子命令翻译为对协作模块的调用并输出结果。协作模块以
//! trait 对象注入，默认装配为 LAMMPS/HTI 引擎、LMP 解析器与 Einstein 模型。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `hti/`, `parsers/`, `einstein/`, `models/`, `utils/`
//! - 子模块: gen, compute

pub mod compute;
pub mod gen;

use crate::cli::Commands;
use crate::einstein::{EinsteinModel, ReferenceModel};
use crate::error::Result;
use crate::hti::{HtiEngine, TaskGenerator, TaskPostProcessor};
use crate::parsers::{ConfigParser, LmpParser};

use std::io::Write;

/// 每个水分子的原子数
pub const ATOMS_PER_MOLECULE: usize = 3;

/// 命令调度器
pub struct JobCli {
    generator: Box<dyn TaskGenerator>,
    post_processor: Box<dyn TaskPostProcessor>,
    parser: Box<dyn ConfigParser>,
    reference: Box<dyn ReferenceModel>,
    atoms_per_molecule: usize,
}

impl JobCli {
    pub fn new(
        generator: Box<dyn TaskGenerator>,
        post_processor: Box<dyn TaskPostProcessor>,
        parser: Box<dyn ConfigParser>,
        reference: Box<dyn ReferenceModel>,
    ) -> Self {
        JobCli {
            generator,
            post_processor,
            parser,
            reference,
            atoms_per_molecule: ATOMS_PER_MOLECULE,
        }
    }

    /// 默认装配
    pub fn standard() -> Self {
        JobCli::new(
            Box::new(HtiEngine),
            Box::new(HtiEngine),
            Box::new(LmpParser),
            Box::new(EinsteinModel),
        )
    }

    /// 覆盖每分子原子数（非三原子分子体系）
    pub fn with_atoms_per_molecule(mut self, atoms_per_molecule: usize) -> Self {
        self.atoms_per_molecule = atoms_per_molecule.max(1);
        self
    }

    pub fn atoms_per_molecule(&self) -> usize {
        self.atoms_per_molecule
    }

    /// 执行命令，结果写入 `out`
    pub fn run(&self, command: Commands, out: &mut dyn Write) -> Result<()> {
        match command {
            Commands::Gen(args) => self.gen(&args.param, &args.output),
            Commands::Compute(args) => {
                let estimate = self.compute(&args.job, args.energy_type, out)?;
                compute::report(&estimate, &args, out)
            }
        }
    }
}

impl Default for JobCli {
    fn default() -> Self {
        JobCli::standard()
    }
}
