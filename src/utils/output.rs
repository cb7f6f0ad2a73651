//! # 美化输出工具
//!
//! 提供统一的终端状态输出样式。计算结果本身写入调用方给定的
//! writer，不经过这里。`-q` 时除错误外的状态行与进度条都不显示。
//!
//! ## 依赖关系
//! - 被 `commands/`、`utils/progress.rs` 与 `main.rs` 使用
//! - 使用 `colored` crate

use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};

static QUIET: AtomicBool = AtomicBool::new(false);

/// 设置静默模式
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// 打印成功消息
pub fn print_success(msg: &str) {
    if !is_quiet() {
        eprintln!("{} {}", "[OK]".green().bold(), msg);
    }
}

/// 打印错误消息（静默模式下也输出）
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    if !is_quiet() {
        eprintln!("{} {}", "[*]".blue().bold(), msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_flag_round_trip() {
        set_quiet(true);
        assert!(is_quiet());
        print_info("hidden");
        print_success("hidden");
        set_quiet(false);
        assert!(!is_quiet());
    }
}
