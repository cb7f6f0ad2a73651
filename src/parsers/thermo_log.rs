//! # LAMMPS 日志 thermo 表解析器
//!
//! 从 `log.lammps` 中提取 `thermo_style` 输出的数据表。
//!
//! ## 格式说明
//! ```text
//! Step KinEng PotEng ... v_dhdl
//!        0   12.3  -456.7 ...  1.23
//!       10   12.1  -456.9 ...  1.19
//! Loop time of 1.23 on 1 procs for 10 steps with 96 atoms
//! ```
//! 同一日志中有多个 `run` 时取最后一个数据块。
//!
//! ## 依赖关系
//! - 被 `hti/post.rs` 使用
//! - 无外部模块依赖

use crate::error::{HtiError, Result};

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const FORMAT: &str = "lammps log";

/// thermo 数据表
#[derive(Debug, Clone, Default)]
pub struct ThermoTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl ThermoTable {
    /// 按列名取出一整列
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|r| r[idx]).collect())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 解析 `log.lammps` 文件
pub fn parse_thermo_log(path: &Path) -> Result<ThermoTable> {
    let file = File::open(path).map_err(|e| HtiError::read(path, e))?;
    let reader = BufReader::new(file);

    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line.map_err(|e| HtiError::read(path, e))?);
    }

    let table = parse_thermo_lines(lines.iter().map(String::as_str));
    if table.columns.is_empty() {
        return Err(HtiError::ParseError {
            format: FORMAT.to_string(),
            path: path.display().to_string(),
            reason: "No thermo header ('Step ...') found".to_string(),
        });
    }
    Ok(table)
}

/// 从文本行解析 thermo 表（取最后一个数据块）
pub fn parse_thermo_lines<'a, I>(lines: I) -> ThermoTable
where
    I: IntoIterator<Item = &'a str>,
{
    let mut last = ThermoTable::default();
    let mut current: Option<ThermoTable> = None;

    for line in lines {
        let trimmed = line.trim();

        if trimmed.starts_with("Step ") || trimmed == "Step" {
            if let Some(done) = current.take() {
                last = done;
            }
            current = Some(ThermoTable {
                columns: trimmed.split_whitespace().map(str::to_string).collect(),
                rows: Vec::new(),
            });
            continue;
        }

        let Some(table) = current.as_mut() else {
            continue;
        };

        let values: Vec<f64> = trimmed
            .split_whitespace()
            .map_while(|s| s.parse().ok())
            .collect();

        if values.len() == table.columns.len() && !values.is_empty() {
            table.rows.push(values);
        } else if !trimmed.starts_with("WARNING") {
            // `Loop time ...` 或其它输出结束数据块
            last = current.take().unwrap_or_default();
        }
    }

    current.unwrap_or(last)
}
