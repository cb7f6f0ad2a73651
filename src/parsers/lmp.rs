//! # LAMMPS data 格式解析器
//!
//! 解析 `conf.lmp`（LAMMPS `read_data` 格式），统计每种原子类型的原子数。
//!
//! ## 格式说明
//! ```text
//! comment line
//!
//! 12 atoms
//! 2 atom types
//! 0.0 4.5 xlo xhi
//! 0.0 7.8 ylo yhi
//! 0.0 7.3 zlo zhi
//! 0.0 0.0 0.0 xy xz yz      # optional
//!
//! Masses
//!
//! 1 15.9994
//! 2 1.008
//!
//! Atoms # atomic
//!
//! 1 1 0.0 0.0 0.0
//! ...
//! ```
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/system.rs`

use crate::error::{HtiError, Result};
use crate::models::{AtomStyle, SystemData};

use regex::Regex;

const FORMAT: &str = "lammps data";

/// 段标题（出现后结束当前段）
const SECTION_KEYWORDS: &[&str] = &[
    "Masses",
    "Atoms",
    "Velocities",
    "Bonds",
    "Angles",
    "Dihedrals",
    "Impropers",
    "Pair Coeffs",
    "PairIJ Coeffs",
    "Bond Coeffs",
    "Angle Coeffs",
    "Dihedral Coeffs",
    "Improper Coeffs",
];

/// 盒子边界
#[derive(Debug, Default)]
struct BoxBounds {
    x: Option<(f64, f64)>,
    y: Option<(f64, f64)>,
    z: Option<(f64, f64)>,
}

impl BoxBounds {
    /// 三斜盒子的体积同样是 lx*ly*lz
    fn volume(&self) -> Option<f64> {
        let (xlo, xhi) = self.x?;
        let (ylo, yhi) = self.y?;
        let (zlo, zhi) = self.z?;
        Some((xhi - xlo) * (yhi - ylo) * (zhi - zlo))
    }
}

/// 从文本行解析 LAMMPS data 文件
pub fn parse_lmp_lines(lines: &[&str], source: &str) -> Result<SystemData> {
    let parse_err = |reason: String| HtiError::ParseError {
        format: FORMAT.to_string(),
        path: source.to_string(),
        reason,
    };

    let count_re = Regex::new(r"^\s*(\d+)\s+(atoms|atom types)\s*$")
        .map_err(|e| parse_err(e.to_string()))?;
    let bound_re = Regex::new(r"^\s*(\S+)\s+(\S+)\s+([xyz])lo\s+[xyz]hi\s*$")
        .map_err(|e| parse_err(e.to_string()))?;

    let mut natoms: Option<usize> = None;
    let mut ntypes: Option<usize> = None;
    let mut bounds = BoxBounds::default();

    // 头部：直到第一个段标题
    let mut idx = 1; // 第一行是注释
    while idx < lines.len() {
        let line = strip_comment(lines[idx]);
        if section_name(lines[idx]).is_some() {
            break;
        }
        if let Some(caps) = count_re.captures(line) {
            let value: usize = caps[1]
                .parse()
                .map_err(|_| parse_err(format!("Invalid count at line {}", idx + 1)))?;
            match &caps[2] {
                "atoms" => natoms = Some(value),
                _ => ntypes = Some(value),
            }
        } else if let Some(caps) = bound_re.captures(line) {
            let lo: f64 = caps[1]
                .parse()
                .map_err(|_| parse_err(format!("Invalid box bound at line {}", idx + 1)))?;
            let hi: f64 = caps[2]
                .parse()
                .map_err(|_| parse_err(format!("Invalid box bound at line {}", idx + 1)))?;
            match &caps[3] {
                "x" => bounds.x = Some((lo, hi)),
                "y" => bounds.y = Some((lo, hi)),
                _ => bounds.z = Some((lo, hi)),
            }
        }
        idx += 1;
    }

    let natoms = natoms.ok_or_else(|| parse_err("Missing 'atoms' count in header".to_string()))?;
    let ntypes =
        ntypes.ok_or_else(|| parse_err("Missing 'atom types' count in header".to_string()))?;
    let volume = bounds
        .volume()
        .ok_or_else(|| parse_err("Missing box bounds in header".to_string()))?;

    let mut masses: Option<Vec<f64>> = None;
    let mut atom_numbs: Option<Vec<usize>> = None;
    let mut atom_style = AtomStyle::Atomic;

    // 各段
    while idx < lines.len() {
        let Some((name, hint)) = section_name(lines[idx]) else {
            idx += 1;
            continue;
        };
        let (body, next) = section_body(lines, idx + 1);
        match name {
            "Masses" => {
                let mut values = vec![0.0; ntypes];
                for (lineno, line) in &body {
                    let parts: Vec<&str> = strip_comment(line).split_whitespace().collect();
                    let t = parse_type(parts.first().copied(), ntypes)
                        .ok_or_else(|| parse_err(format!("Invalid atom type at line {}", lineno + 1)))?;
                    values[t] = parts
                        .get(1)
                        .and_then(|s| s.parse().ok())
                        .ok_or_else(|| parse_err(format!("Invalid mass at line {}", lineno + 1)))?;
                }
                masses = Some(values);
            }
            "Atoms" => {
                let first_cols = body
                    .first()
                    .map(|(_, l)| strip_comment(l).split_whitespace().count())
                    .unwrap_or(0);
                atom_style = hint
                    .and_then(AtomStyle::from_hint)
                    .or_else(|| AtomStyle::from_column_count(first_cols))
                    .ok_or_else(|| {
                        parse_err(format!(
                            "Cannot infer atom style from {} columns",
                            first_cols
                        ))
                    })?;
                let col = atom_style.type_column();

                let mut counts = vec![0usize; ntypes];
                for (lineno, line) in &body {
                    let parts: Vec<&str> = strip_comment(line).split_whitespace().collect();
                    let t = parse_type(parts.get(col).copied(), ntypes)
                        .ok_or_else(|| parse_err(format!("Invalid atom type at line {}", lineno + 1)))?;
                    counts[t] += 1;
                }
                atom_numbs = Some(counts);
            }
            _ => {}
        }
        idx = next;
    }

    let atom_numbs = atom_numbs.ok_or_else(|| parse_err("Missing 'Atoms' section".to_string()))?;
    let counted: usize = atom_numbs.iter().sum();
    if counted != natoms {
        return Err(parse_err(format!(
            "Header declares {} atoms but 'Atoms' section has {}",
            natoms, counted
        )));
    }

    Ok(SystemData {
        atom_numbs,
        volume,
        masses,
        atom_style,
    })
}

/// 去掉行内 `#` 注释
fn strip_comment(line: &str) -> &str {
    line.split('#').next().unwrap_or("").trim()
}

/// 识别段标题，返回 (标题, 注释提示)
fn section_name(line: &str) -> Option<(&'static str, Option<&str>)> {
    let mut split = line.splitn(2, '#');
    let head = split.next()?.trim();
    let hint = split.next().map(str::trim).filter(|h| !h.is_empty());
    SECTION_KEYWORDS
        .iter()
        .find(|k| **k == head)
        .map(|k| (*k, hint))
}

/// 段正文：跳过标题后的空行，直到下一个空行或段标题；同时返回段后的行号
fn section_body<'a>(lines: &[&'a str], start: usize) -> (Vec<(usize, &'a str)>, usize) {
    let mut body = Vec::new();
    let mut idx = start;
    while idx < lines.len() && lines[idx].trim().is_empty() {
        idx += 1;
    }
    while idx < lines.len() {
        let line = lines[idx];
        if line.trim().is_empty() || section_name(line).is_some() {
            break;
        }
        body.push((idx, line));
        idx += 1;
    }
    (body, idx)
}

/// 解析 1 起的类型编号为 0 起的下标
fn parse_type(token: Option<&str>, ntypes: usize) -> Option<usize> {
    let t: usize = token?.parse().ok()?;
    (1..=ntypes).contains(&t).then(|| t - 1)
}
