//! # 分子构型数据模型
//!
//! `ConfigParser` 解析 `conf.lmp` 得到的体系信息。
//!
//! ## 依赖关系
//! - 被 `parsers/lmp.rs` 构建
//! - 被 `commands/compute.rs`, `einstein/` 使用

use serde::{Deserialize, Serialize};

/// LAMMPS `Atoms` 段的 atom style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AtomStyle {
    Atomic,
    Charge,
    Molecular,
    Full,
}

impl AtomStyle {
    /// 原子类型所在的列（0 起）
    pub fn type_column(self) -> usize {
        match self {
            AtomStyle::Atomic | AtomStyle::Charge => 1,
            AtomStyle::Molecular | AtomStyle::Full => 2,
        }
    }

    /// 从 `Atoms # full` 之类的注释识别
    pub fn from_hint(hint: &str) -> Option<Self> {
        match hint.trim().to_lowercase().as_str() {
            "atomic" => Some(AtomStyle::Atomic),
            "charge" => Some(AtomStyle::Charge),
            "molecular" | "bond" | "angle" => Some(AtomStyle::Molecular),
            "full" => Some(AtomStyle::Full),
            _ => None,
        }
    }

    /// 根据列数推断（可带 3 个 image flag）
    pub fn from_column_count(n: usize) -> Option<Self> {
        match n {
            5 | 8 => Some(AtomStyle::Atomic),
            6 | 9 => Some(AtomStyle::Charge),
            7 | 10 => Some(AtomStyle::Full),
            _ => None,
        }
    }
}

impl std::fmt::Display for AtomStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtomStyle::Atomic => write!(f, "atomic"),
            AtomStyle::Charge => write!(f, "charge"),
            AtomStyle::Molecular => write!(f, "molecular"),
            AtomStyle::Full => write!(f, "full"),
        }
    }
}

/// 体系数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemData {
    /// 每种原子类型的原子数，按类型编号排序
    pub atom_numbs: Vec<usize>,

    /// 模拟盒子体积 (Å³)
    pub volume: f64,

    /// 每种类型的质量 (amu)，来自 `Masses` 段
    pub masses: Option<Vec<f64>>,

    /// 检测到的 atom style
    pub atom_style: AtomStyle,
}

impl SystemData {
    /// 总原子数
    pub fn natoms(&self) -> usize {
        self.atom_numbs.iter().sum()
    }

    /// 原子类型数
    pub fn ntypes(&self) -> usize {
        self.atom_numbs.len()
    }
}
