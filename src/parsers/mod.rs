//! # 解析器模块
//!
//! 提供分子构型文件与模拟日志的解析器。
//!
//! ## 依赖关系
//! - 被 `commands/` 与 `hti/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: lmp, thermo_log

pub mod lmp;
pub mod thermo_log;

use crate::error::{HtiError, Result};
use crate::models::SystemData;
use std::fs;
use std::path::Path;

/// 分子构型解析器
pub trait ConfigParser {
    /// 把构型文件的文本行解析为体系数据
    fn to_system_data(&self, lines: &[&str]) -> Result<SystemData>;
}

/// LAMMPS data 文件解析器
#[derive(Debug, Default, Clone, Copy)]
pub struct LmpParser;

impl ConfigParser for LmpParser {
    fn to_system_data(&self, lines: &[&str]) -> Result<SystemData> {
        lmp::parse_lmp_lines(lines, "conf.lmp")
    }
}

/// 读取构型文件并交给解析器
pub fn read_system_data(parser: &dyn ConfigParser, path: &Path) -> Result<SystemData> {
    if !path.exists() {
        return Err(HtiError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path).map_err(|e| HtiError::read(path, e))?;
    let lines: Vec<&str> = content.split('\n').collect();
    parser.to_system_data(&lines)
}
