//! # gen 子命令 CLI 定义
//!
//! 由 JSON 参数文件生成 HTI 作业目录
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/gen.rs`

use clap::Args;
use std::path::PathBuf;

/// gen 子命令参数
#[derive(Args, Debug)]
pub struct GenArgs {
    /// JSON file of parameters
    #[arg(value_name = "PARAM")]
    pub param: PathBuf,

    /// Output directory of the job
    #[arg(short, long, default_value = "new_job")]
    pub output: PathBuf,
}
