//! # HTI 任务后处理
//!
//! 读取每个任务的 `lambda.out` 与 `log.lammps`，块平均得到 ⟨dU/dλ⟩，
//! 对 λ 积分得到自由能差；λ = 1 的任务给出目标体系的热力学量。
//!
//! ## 依赖关系
//! - 被 `hti/mod.rs` 使用
//! - 使用 `parsers/thermo_log.rs`, `hti/stats.rs`, `hti/integrate.rs`
//! - 使用 `rayon` 并行解析各任务日志

use super::integrate::integrate;
use super::stats::{block_average, BlockAverage};
use super::TASK_PREFIX;
use crate::einstein::ELECTRON_VOLT;
use crate::error::{HtiError, Result};
use crate::models::{JobConfig, LambdaPoint, ThermoInfo, TiEstimate};
use crate::parsers::thermo_log::{parse_thermo_log, ThermoTable};
use crate::utils::progress;

use rayon::prelude::*;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 1 bar·Å³ 对应的能量 (eV)
pub const BAR_A3_TO_EV: f64 = 1e5 * 1e-30 / ELECTRON_VOLT;

/// 日志中的列名
const COL_DHDL: &str = "v_dhdl";
const COL_PE: &str = "PotEng";
const COL_TEMP: &str = "Temp";
const COL_PRESS: &str = "Press";
const COL_VOLUME: &str = "Volume";

/// 后处理所需的配置段
#[derive(Debug, Clone, Deserialize)]
pub struct PostParams {
    /// 丢弃的平衡段样本数
    #[serde(default)]
    pub stat_skip: usize,

    /// 块平均的块大小
    #[serde(default = "default_stat_bsize")]
    pub stat_bsize: usize,
}

fn default_stat_bsize() -> usize {
    100
}

/// 单个任务的解析结果
struct TaskSample {
    dir: PathBuf,
    lambda: f64,
    dhdl: BlockAverage,
    table: ThermoTable,
}

/// 汇总作业目录中的全部任务
pub fn post_tasks(job_dir: &Path, config: &JobConfig, natoms: usize) -> Result<TiEstimate> {
    if !job_dir.is_dir() {
        return Err(HtiError::DirectoryNotFound {
            path: job_dir.display().to_string(),
        });
    }
    if natoms == 0 {
        return Err(HtiError::InvalidArgument(
            "Cannot normalize by zero molecules".to_string(),
        ));
    }
    let params: PostParams = config.section()?;

    let task_dirs = find_task_dirs(job_dir)?;
    info!(ntasks = task_dirs.len(), "post-processing HTI tasks");

    let pb = progress::create_progress_bar(task_dirs.len() as u64, "Reading logs");
    let mut samples = task_dirs
        .par_iter()
        .map(|dir| {
            let sample = read_task(dir, &params);
            pb.inc(1);
            sample
        })
        .collect::<Result<Vec<_>>>()?;
    pb.finish_and_clear();

    samples.sort_by(|a, b| a.lambda.total_cmp(&b.lambda));
    if samples.len() < 2 {
        return Err(HtiError::InsufficientData {
            path: job_dir.display().to_string(),
            reason: format!("need at least 2 lambda tasks, found {}", samples.len()),
        });
    }
    if let (Some(first), Some(last)) = (samples.first(), samples.last()) {
        if first.lambda.abs() > 1e-8 || (last.lambda - 1.0).abs() > 1e-8 {
            warn!(
                first = first.lambda,
                last = last.lambda,
                "lambda tasks do not span [0, 1]"
            );
        }
    }

    let scale = natoms as f64;
    let integrand: Vec<LambdaPoint> = samples
        .iter()
        .map(|s| LambdaPoint {
            lambda: s.lambda,
            mean: s.dhdl.mean / scale,
            err: s.dhdl.err / scale,
            samples: s.dhdl.samples,
        })
        .collect();

    let free_energy = integrate(&integrand);
    debug!(?free_energy, "integrated over lambda");

    let physical = samples
        .last()
        .ok_or_else(|| HtiError::InsufficientData {
            path: job_dir.display().to_string(),
            reason: "no tasks".to_string(),
        })?;
    let thermo_info = thermo_info(physical, &params, natoms)?;

    Ok(TiEstimate {
        free_energy,
        thermo_info,
        integrand,
    })
}

/// 按名称排序的任务目录
fn find_task_dirs(job_dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = job_dir.join(format!("{}*", TASK_PREFIX));
    let pattern_str = pattern.display().to_string();
    let mut dirs: Vec<PathBuf> = glob::glob(&pattern_str)
        .map_err(|e| HtiError::InvalidArgument(format!("Invalid glob pattern: {}", e)))?
        .filter_map(|e| e.ok())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();

    if dirs.is_empty() {
        return Err(HtiError::NoTasksFound {
            pattern: pattern_str,
        });
    }
    Ok(dirs)
}

/// 解析单个任务
fn read_task(dir: &Path, params: &PostParams) -> Result<TaskSample> {
    let lambda_path = dir.join("lambda.out");
    let lambda_text =
        fs::read_to_string(&lambda_path).map_err(|e| HtiError::read(&lambda_path, e))?;
    let lambda: f64 = lambda_text.trim().parse().map_err(|_| HtiError::ParseError {
        format: "lambda".to_string(),
        path: lambda_path.display().to_string(),
        reason: format!("'{}' is not a number", lambda_text.trim()),
    })?;

    let log_path = dir.join("log.lammps");
    let table = parse_thermo_log(&log_path)?;
    if table.is_empty() {
        return Err(HtiError::InsufficientData {
            path: log_path.display().to_string(),
            reason: "thermo table has no rows".to_string(),
        });
    }
    debug!(lambda, rows = table.len(), "parsed task log");
    let dhdl = averaged_column(&table, COL_DHDL, params, &log_path)?;

    Ok(TaskSample {
        dir: dir.to_path_buf(),
        lambda,
        dhdl,
        table,
    })
}

/// 取出一列并做块平均
fn averaged_column(
    table: &ThermoTable,
    name: &str,
    params: &PostParams,
    path: &Path,
) -> Result<BlockAverage> {
    let values = table.column(name).ok_or_else(|| HtiError::ParseError {
        format: "lammps log".to_string(),
        path: path.display().to_string(),
        reason: format!("Missing thermo column '{}'", name),
    })?;
    block_average(&values, params.stat_skip, params.stat_bsize).ok_or_else(|| {
        HtiError::InsufficientData {
            path: path.display().to_string(),
            reason: format!(
                "{} samples of '{}' with stat_skip = {}",
                values.len(),
                name,
                params.stat_skip
            ),
        }
    })
}

/// λ = 1 任务的热力学量（按分子数归一化）
fn thermo_info(sample: &TaskSample, params: &PostParams, natoms: usize) -> Result<ThermoInfo> {
    let path = sample.dir.join("log.lammps");
    let scale = natoms as f64;
    let mut info = ThermoInfo::new();

    let e = averaged_column(&sample.table, COL_PE, params, &path)?;
    info.insert("e", e.mean / scale);
    info.insert("e_err", e.err / scale);

    let t = averaged_column(&sample.table, COL_TEMP, params, &path)?;
    info.insert("t", t.mean);
    info.insert("t_err", t.err);

    let p = averaged_column(&sample.table, COL_PRESS, params, &path)?;
    info.insert("p", p.mean);
    info.insert("p_err", p.err);

    let v = averaged_column(&sample.table, COL_VOLUME, params, &path)?;
    info.insert("v", v.mean / scale);
    info.insert("v_err", v.err / scale);

    // pv 逐帧计算后再平均
    let press = sample.table.column(COL_PRESS).unwrap_or_default();
    let vol = sample.table.column(COL_VOLUME).unwrap_or_default();
    let pv_series: Vec<f64> = press
        .iter()
        .zip(&vol)
        .map(|(p, v)| p * v * BAR_A3_TO_EV / scale)
        .collect();
    let pv = block_average(&pv_series, params.stat_skip, params.stat_bsize).ok_or_else(|| {
        HtiError::InsufficientData {
            path: path.display().to_string(),
            reason: "no samples for pv".to_string(),
        }
    })?;
    info.insert("pv", pv.mean);
    info.insert("pv_err", pv.err);

    Ok(info)
}

/// 输出热力学量
pub fn print_thermo_info(info: &ThermoInfo, out: &mut dyn Write) -> Result<()> {
    const ROWS: &[(&str, &str)] = &[
        ("e", "# E (err)  [eV]:  "),
        ("t", "# T (err)   [K]:  "),
        ("p", "# P (err) [bar]:  "),
        ("v", "# V (err) [A^3]:  "),
        ("pv", "# PV(err)  [eV]:  "),
    ];

    writeln!(out, "# thermodynamics (normalized by nmols)")?;
    for (key, label) in ROWS {
        let Some(value) = info.get(key) else {
            continue;
        };
        let err = info.get(&format!("{}_err", key)).unwrap_or(0.0);
        writeln!(out, "{}{:20.8} {:20.8}", label, value, err)?;
    }
    Ok(())
}
