//! # hti_ice - 冰的 Hamiltonian 热力学积分自由能工具
//!
//! 以 Einstein 晶体为参考态，沿 λ 路径把弹簧势切换到目标力场，
//! 由热力学积分得到每分子 Helmholtz / Gibbs 自由能。
//!
//! ## 子命令
//! - `gen`     - 由 JSON 参数文件生成 LAMMPS 作业目录
//! - `compute` - 后处理完成的作业并输出自由能
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (JobCli 调度与输出)
//!   │     ├── hti/       (任务生成、后处理、积分)
//!   │     ├── einstein/  (参考态自由能)
//!   │     ├── parsers/   (LAMMPS data 与日志解析)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (输出、日志、进度条、Slurm)
//!   └── error.rs    (错误处理)
//! ```

mod cli;
mod commands;
mod einstein;
mod error;
mod hti;
mod models;
mod parsers;
mod utils;

use clap::{CommandFactory, Parser};
use cli::Cli;
use commands::JobCli;
use std::io::Write;

/// 未给出子命令时的退出码
const EXIT_USAGE: i32 = 2;
/// 执行失败时的退出码
const EXIT_FAILURE: i32 = 1;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();
    utils::logging::setup_logging(cli.verbose, cli.quiet);
    utils::output::set_quiet(cli.quiet);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let code = run(cli, &JobCli::standard(), &mut out);
    if code != 0 {
        std::process::exit(code);
    }
}

/// 执行解析后的命令行，返回进程退出码
fn run(cli: Cli, job_cli: &JobCli, out: &mut dyn Write) -> i32 {
    let Some(command) = cli.command else {
        // 无子命令：打印帮助并以状态 2 退出
        writeln!(out, "{}", Cli::command().render_help()).ok();
        return EXIT_USAGE;
    };

    match job_cli.run(command, out) {
        Ok(()) => 0,
        Err(e) => {
            utils::output::print_error(&format!("{}", e));
            EXIT_FAILURE
        }
    }
}
