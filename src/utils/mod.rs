//! # 工具函数模块
//!
//! 提供美化输出、诊断日志、进度条、Slurm 脚本生成等工具。
//!
//! ## 依赖关系
//! - 被 `commands/`、`hti/` 与 `main.rs` 使用
//! - 子模块: logging, output, progress, slurm

pub mod logging;
pub mod output;
pub mod progress;
pub mod slurm;
