//! # Einstein 晶体参考态
//!
//! 计算所有原子以同一弹簧常数束缚在格点上的经典 Einstein 晶体的
//! Helmholtz 自由能（每原子，eV），作为热力学积分的起点。
//!
//! ## 公式
//! ```text
//! F / kT = Σ_i 3 ln(Λ_i / σ)
//!        + 3/2 ln(2π s²) + ln(N / V) - 3/2 ln N      (固定质心修正)
//!
//! Λ_i = h / sqrt(2π m_i kT)
//! σ   = sqrt(2π kT / k)
//! s²  = kT Σ m_i² / (k M²)
//! ```
//! 长度统一以 Å 为单位；`copies` 复制后的体系 N 与 V 同比放大。
//!
//! ## 依赖关系
//! - 被 `commands/compute.rs` 使用
//! - 使用 `models/config.rs`, `models/system.rs`

use crate::error::{HtiError, Result};
use crate::models::{JobConfig, SystemData};

use serde::Deserialize;
use std::f64::consts::PI;

/// Boltzmann 常数 (J/K)
pub const BOLTZMANN: f64 = 1.380649e-23;
/// Planck 常数 (J s)
pub const PLANCK: f64 = 6.626_070_15e-34;
/// 原子质量单位 (kg)
pub const AMU: f64 = 1.660_539_066_60e-27;
/// 电子伏特 (J)
pub const ELECTRON_VOLT: f64 = 1.602_176_634e-19;
/// Å² (m²)
const ANGSTROM_SQ: f64 = 1e-20;

/// 参考态自由能模型
pub trait ReferenceModel {
    /// 每原子参考态自由能 (eV)
    fn free_energy(&self, config: &JobConfig, system: &SystemData) -> Result<f64>;
}

/// Einstein 模型需要的配置段
#[derive(Debug, Clone, Deserialize)]
pub struct EinsteinParams {
    /// 温度 (K)
    pub temp: f64,

    /// 弹簧常数 (eV/Å²)
    pub spring_k: f64,

    /// 每种类型的质量 (amu)，缺省时取自 `conf.lmp` 的 Masses 段
    #[serde(default)]
    pub masses: Option<Vec<f64>>,

    #[serde(default = "default_com_correction")]
    pub com_correction: bool,
}

fn default_com_correction() -> bool {
    true
}

/// 经典 Einstein 晶体
#[derive(Debug, Default, Clone, Copy)]
pub struct EinsteinModel;

impl ReferenceModel for EinsteinModel {
    fn free_energy(&self, config: &JobConfig, system: &SystemData) -> Result<f64> {
        let params: EinsteinParams = config.section()?;
        let masses = params
            .masses
            .clone()
            .or_else(|| system.masses.clone())
            .ok_or_else(|| {
                HtiError::InvalidConfig(
                    "Atomic masses are required: set 'masses' or add a Masses section to conf.lmp"
                        .to_string(),
                )
            })?;
        if masses.len() != system.ntypes() {
            return Err(HtiError::InvalidConfig(format!(
                "Got {} masses for {} atom types",
                masses.len(),
                system.ntypes()
            )));
        }
        einstein_free_energy(
            params.temp,
            params.spring_k,
            &masses,
            &system.atom_numbs,
            system.volume,
            config.replication_factor()?,
            params.com_correction,
        )
    }
}

/// 每原子 Einstein 晶体自由能 (eV)
pub fn einstein_free_energy(
    temp: f64,
    spring_k: f64,
    masses: &[f64],
    atom_numbs: &[usize],
    volume: f64,
    replication: u64,
    com_correction: bool,
) -> Result<f64> {
    if temp <= 0.0 || spring_k <= 0.0 {
        return Err(HtiError::InvalidConfig(format!(
            "temp and spring_k must be positive (temp = {}, spring_k = {})",
            temp, spring_k
        )));
    }
    if masses.iter().any(|m| *m <= 0.0) {
        return Err(HtiError::InvalidConfig("masses must be positive".to_string()));
    }

    let rep = replication as f64;
    let kt = BOLTZMANN * temp;
    let k_si = spring_k * ELECTRON_VOLT / ANGSTROM_SQ;
    let sigma_sq = 2.0 * PI * kt / k_si;

    let mut bulk = 0.0;
    let mut natoms = 0.0;
    let mut total_mass = 0.0;
    let mut mass_sq = 0.0;
    for (&m, &n) in masses.iter().zip(atom_numbs) {
        let n = n as f64 * rep;
        let m = m * AMU;
        let lambda_sq = PLANCK * PLANCK / (2.0 * PI * m * kt);
        bulk += n * 1.5 * (lambda_sq / sigma_sq).ln();
        natoms += n;
        total_mass += n * m;
        mass_sq += n * m * m;
    }
    if natoms == 0.0 {
        return Err(HtiError::InvalidConfig("System has no atoms".to_string()));
    }

    let mut total = bulk;
    if com_correction {
        let s_sq = kt * mass_sq / (k_si * total_mass * total_mass) / ANGSTROM_SQ;
        total += 1.5 * (2.0 * PI * s_sq).ln() + (natoms / (volume * rep)).ln() - 1.5 * natoms.ln();
    }

    Ok(kt / ELECTRON_VOLT * total / natoms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AtomStyle;

    fn water_system() -> SystemData {
        SystemData {
            atom_numbs: vec![2, 4],
            volume: 400.0,
            masses: Some(vec![15.9994, 1.00794]),
            atom_style: AtomStyle::Atomic,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * b.abs().max(1e-12)
    }

    #[test]
    fn test_single_oscillator_matches_closed_form() {
        // 3 kT ln(Λ/σ), m = 1 amu, T = 100 K, k = 0.02 eV/Å²
        let f = einstein_free_energy(100.0, 0.02, &[1.0], &[1], 1.0, 1, false).unwrap();
        assert!(close(f, 0.0015321224516292092), "{}", f);
    }

    #[test]
    fn test_water_with_and_without_com_correction() {
        let masses = [15.9994, 1.00794];
        let bare = einstein_free_energy(100.0, 0.02, &masses, &[2, 4], 400.0, 1, false).unwrap();
        let com = einstein_free_energy(100.0, 0.02, &masses, &[2, 4], 400.0, 1, true).unwrap();
        assert!(close(bare, -0.010482027901131244), "{}", bare);
        assert!(close(com, -0.020215782766618832), "{}", com);
    }

    #[test]
    fn test_com_correction_shrinks_with_replication() {
        let masses = [15.9994, 1.00794];
        let bare = einstein_free_energy(100.0, 0.02, &masses, &[2, 4], 400.0, 8, false).unwrap();
        let com = einstein_free_energy(100.0, 0.02, &masses, &[2, 4], 400.0, 8, true).unwrap();
        assert!(close(com, -0.012818699807054948), "{}", com);
        assert!((com - bare).abs() < 0.01);
    }

    #[test]
    fn test_stiffer_spring_raises_free_energy() {
        let soft = einstein_free_energy(100.0, 0.01, &[16.0], &[4], 100.0, 1, true).unwrap();
        let stiff = einstein_free_energy(100.0, 0.1, &[16.0], &[4], 100.0, 1, true).unwrap();
        assert!(stiff > soft);
    }

    #[test]
    fn test_model_uses_masses_from_system() {
        let config: JobConfig =
            serde_json::from_str(r#"{"temp": 100.0, "spring_k": 0.02}"#).unwrap();
        let f = EinsteinModel.free_energy(&config, &water_system()).unwrap();
        assert!(close(f, -0.020215782766618832));
    }

    #[test]
    fn test_model_requires_masses() {
        let config: JobConfig =
            serde_json::from_str(r#"{"temp": 100.0, "spring_k": 0.02}"#).unwrap();
        let mut system = water_system();
        system.masses = None;
        assert!(matches!(
            EinsteinModel.free_energy(&config, &system),
            Err(HtiError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_masses_must_match_types() {
        let config: JobConfig =
            serde_json::from_str(r#"{"temp": 100.0, "spring_k": 0.02, "masses": [16.0]}"#)
                .unwrap();
        assert!(EinsteinModel.free_energy(&config, &water_system()).is_err());
    }

    #[test]
    fn test_non_positive_temperature() {
        assert!(einstein_free_energy(0.0, 0.02, &[1.0], &[1], 1.0, 1, true).is_err());
    }
}
