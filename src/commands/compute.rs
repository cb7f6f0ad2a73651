//! # compute 命令实现
//!
//! 对完成的作业计算每分子自由能：
//! 1. 解析 `conf.lmp` 得到原子数，按 `copies` 放大后换算为分子数
//! 2. 后处理各 λ 任务，输出热力学量
//! 3. 校验参考态并求 Einstein 晶体自由能
//! 4. 组合为 Helmholtz 或 Gibbs 自由能并按固定格式输出
//!
//! 可选地以表格显示积分点、导出 CSV 或作图。
//!
//! ## 依赖关系
//! - 使用 `cli/compute.rs` 定义的参数
//! - 使用 `hti/`, `parsers/`, `einstein/`
//! - 使用 `utils/output.rs`

use super::JobCli;
use crate::cli::compute::{ComputeArgs, EnergyType};
use crate::error::{HtiError, Result};
use crate::hti::{export, plot};
use crate::models::{JobConfig, TiEstimate};
use crate::parsers::read_system_data;
use crate::utils::output;

use std::io::Write;
use std::path::Path;
use tabled::{Table, Tabled};
use tracing::{debug, info};

/// 作业目录中的配置文件
pub const JOB_CONFIG_FILE: &str = "in.json";
/// 作业目录中的构型文件
pub const JOB_CONF_FILE: &str = "conf.lmp";

/// 积分点表格行
#[derive(Debug, Clone, Tabled)]
struct IntegrandRow {
    #[tabled(rename = "λ")]
    lambda: String,
    #[tabled(rename = "⟨dU/dλ⟩ (eV/mol)")]
    mean: String,
    #[tabled(rename = "Error (eV/mol)")]
    err: String,
    #[tabled(rename = "Samples")]
    samples: usize,
}

impl JobCli {
    /// 计算并输出自由能，返回后处理结果供后续导出
    pub fn compute(
        &self,
        job_dir: &Path,
        energy_type: EnergyType,
        out: &mut dyn Write,
    ) -> Result<TiEstimate> {
        if !job_dir.is_dir() {
            return Err(HtiError::DirectoryNotFound {
                path: job_dir.display().to_string(),
            });
        }

        let config = JobConfig::from_file(&job_dir.join(JOB_CONFIG_FILE))?;
        let system = read_system_data(self.parser.as_ref(), &job_dir.join(JOB_CONF_FILE))?;

        let nmols = count_molecules(
            &system.atom_numbs,
            config.replication_factor()?,
            self.atoms_per_molecule,
        )?;
        info!(natoms = system.natoms(), nmols, "counted molecules");

        let estimate = self.post_processor.post_tasks(job_dir, &config, nmols)?;
        self.post_processor
            .print_thermo_info(&estimate.thermo_info, out)?;

        let reference = config.reference()?;
        debug!(%reference, "reference state accepted");

        let e0 = self.reference.free_energy(&config, &system)? * self.atoms_per_molecule as f64;
        writeln!(out, "# free ener of Einstein Mole: {:20.8}", e0)?;

        let de = &estimate.free_energy;
        match energy_type {
            EnergyType::Helmholtz => {
                writeln!(out, "# Helmholtz free ener per mol (stat_err inte_err) [eV]:")?;
                writeln!(out, "{}", format_row(e0 + de.delta_e, de.stat_err(), de.inte_err()))?;
            }
            EnergyType::Gibbs => {
                let pv = estimate.thermo_info.require("pv")?;
                let pv_err = estimate.thermo_info.require("pv_err")?;
                let e1 = e0 + de.delta_e + pv;
                let stat = (de.stat_err().powi(2) + pv_err.powi(2)).sqrt();
                writeln!(out, "# Gibbs free ener per mol (stat_err inte_err) [eV]:")?;
                writeln!(out, "{}", format_row(e1, stat, de.inte_err()))?;
            }
        }

        Ok(estimate)
    }
}

/// 处理 `--detail`、`--csv` 与 `--plot`
pub fn report(estimate: &TiEstimate, args: &ComputeArgs, out: &mut dyn Write) -> Result<()> {
    if args.detail {
        let rows: Vec<IntegrandRow> = estimate
            .integrand
            .iter()
            .map(|p| IntegrandRow {
                lambda: format!("{:.6}", p.lambda),
                mean: format!("{:.8}", p.mean),
                err: format_exp(p.err, 3, 0),
                samples: p.samples,
            })
            .collect();
        writeln!(out, "{}", Table::new(&rows))?;
    }

    if let Some(path) = &args.csv {
        export::integrand_to_csv(&estimate.integrand, path)?;
        output::print_success(&format!("Integrand saved to: {}", path.display()));
    }

    if let Some(path) = &args.plot {
        plot::plot_integrand(&estimate.integrand, path, "Hamiltonian TI integrand")?;
        output::print_success(&format!("Plot saved to: {}", path.display()));
    }

    Ok(())
}

/// 分子数 = 原子总数 × 复制倍数 / 每分子原子数（向下取整）
pub fn count_molecules(
    atom_numbs: &[usize],
    replication: u64,
    atoms_per_molecule: usize,
) -> Result<usize> {
    let overflow = || {
        HtiError::InvalidConfig(format!(
            "{:?} atoms replicated {} times overflow the atom count",
            atom_numbs, replication
        ))
    };
    let natoms = atom_numbs
        .iter()
        .try_fold(0u64, |acc, &n| acc.checked_add(n as u64))
        .and_then(|n| n.checked_mul(replication))
        .ok_or_else(overflow)?;
    usize::try_from(natoms / atoms_per_molecule.max(1) as u64).map_err(|_| overflow())
}

/// 结果行：`%20.12f  %10.3e  %10.3e`
pub fn format_row(value: f64, stat_err: f64, inte_err: f64) -> String {
    format!(
        "{:20.12}  {}  {}",
        value,
        format_exp(stat_err, 3, 10),
        format_exp(inte_err, 3, 10)
    )
}

/// C 风格科学计数法：指数带符号且至少两位（`1.000e-02`），右对齐到 `width`
pub fn format_exp(value: f64, precision: usize, width: usize) -> String {
    let text = if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        let inf = if value > 0.0 { "inf" } else { "-inf" };
        inf.to_string()
    } else {
        let raw = format!("{:.*e}", precision, value);
        match raw.split_once('e') {
            Some((mantissa, exp)) => {
                let (sign, digits) = match exp.strip_prefix('-') {
                    Some(d) => ('-', d),
                    None => ('+', exp),
                };
                format!("{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => raw,
        }
    };
    format!("{:>width$}", text, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests_support::{cli_with, job_dir, Calls, Fixture};
    use crate::models::{FreeEnergyResult, LambdaPoint, ThermoInfo};
    use std::path::PathBuf;

    fn run_compute(
        fixture: Fixture,
        config: &str,
        energy_type: EnergyType,
    ) -> (Result<TiEstimate>, String, Vec<String>) {
        let calls = Calls::default();
        let cli = cli_with(&calls, fixture);
        let dir = job_dir(config);
        let mut out = Vec::new();
        let result = cli.compute(dir.path(), energy_type, &mut out);
        (result, String::from_utf8(out).unwrap(), calls.take())
    }

    #[test]
    fn test_format_exp_matches_c_style() {
        assert_eq!(format_exp(0.01, 3, 10), " 1.000e-02");
        assert_eq!(format_exp(0.0, 3, 10), " 0.000e+00");
        assert_eq!(format_exp(-1.5e-120, 3, 10), "-1.500e-120");
        assert_eq!(format_exp(9.9996e-3, 3, 10), " 1.000e-02");
        assert_eq!(format_exp(12346.0, 3, 10), " 1.235e+04");
        assert_eq!(format_exp(f64::NAN, 3, 10), "       nan");
        assert_eq!(format_exp(f64::INFINITY, 3, 10), "       inf");
    }

    #[test]
    fn test_format_row() {
        assert_eq!(
            format_row(10.5, 0.01, 0.02),
            "     10.500000000000   1.000e-02   2.000e-02"
        );
    }

    #[test]
    fn test_count_molecules() {
        assert_eq!(count_molecules(&[128, 64], 1, 3).unwrap(), 64);
        assert_eq!(count_molecules(&[128, 64], 24, 3).unwrap(), 1536);
        // 不整除时向下取整
        assert_eq!(count_molecules(&[4], 1, 3).unwrap(), 1);
        assert_eq!(count_molecules(&[10], 1, 5).unwrap(), 2);
    }

    #[test]
    fn test_count_molecules_overflow() {
        assert!(matches!(
            count_molecules(&[192], u64::MAX / 2, 3),
            Err(HtiError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_huge_copies_rejected() {
        let (result, _, calls) = run_compute(
            Fixture::default(),
            r#"{"copies": [4294967295, 4294967295, 4294967295]}"#,
            EnergyType::Helmholtz,
        );
        assert!(matches!(result, Err(HtiError::InvalidConfig(_))));
        assert!(!calls.iter().any(|c| c.starts_with("post_tasks")));
    }

    #[test]
    fn test_helmholtz_output() {
        let (result, text, calls) = run_compute(Fixture::default(), "{}", EnergyType::Helmholtz);
        result.unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# thermo");
        assert_eq!(lines[1], "# free ener of Einstein Mole:          10.00000000");
        assert_eq!(lines[2], "# Helmholtz free ener per mol (stat_err inte_err) [eV]:");
        assert_eq!(lines[3].trim_start(), "10.500000000000   1.000e-02   2.000e-02");
        assert_eq!(
            calls,
            vec!["to_system_data", "post_tasks 64", "print_thermo_info", "free_energy"]
        );
    }

    #[test]
    fn test_gibbs_output() {
        let (result, text, _) = run_compute(Fixture::default(), "{}", EnergyType::Gibbs);
        result.unwrap();
        let last = text.lines().last().unwrap();
        assert!(text.contains("# Gibbs free ener per mol (stat_err inte_err) [eV]:"));
        assert_eq!(last.trim_start(), "10.700000000000   3.162e-02   2.000e-02");
    }

    #[test]
    fn test_gibbs_requires_pv() {
        let mut fixture = Fixture::default();
        fixture.estimate.thermo_info = [("pv", 0.2)].into_iter().collect();
        let (result, _, _) = run_compute(fixture.clone(), "{}", EnergyType::Gibbs);
        assert!(matches!(result, Err(HtiError::MissingThermoKey(k)) if k == "pv_err"));

        fixture.estimate.thermo_info = ThermoInfo::new();
        let (result, _, _) = run_compute(fixture, "{}", EnergyType::Helmholtz);
        assert!(result.is_ok());
    }

    #[test]
    fn test_copies_scale_molecule_count() {
        let (result, _, calls) =
            run_compute(Fixture::default(), r#"{"copies": [2, 3, 4]}"#, EnergyType::Helmholtz);
        result.unwrap();
        assert!(calls.contains(&"post_tasks 1536".to_string()));
    }

    #[test]
    fn test_atoms_per_molecule_override() {
        let calls = Calls::default();
        let cli = cli_with(&calls, Fixture::default()).with_atoms_per_molecule(4);
        assert_eq!(cli.atoms_per_molecule(), 4);
        let dir = job_dir("{}");
        cli.compute(dir.path(), EnergyType::Helmholtz, &mut Vec::new())
            .unwrap();
        assert!(calls.take().contains(&"post_tasks 48".to_string()));
    }

    #[test]
    fn test_explicit_einstein_reference() {
        let (result, _, _) =
            run_compute(Fixture::default(), r#"{"reference": "einstein"}"#, EnergyType::Helmholtz);
        assert!(result.is_ok());
    }

    #[test]
    fn test_unsupported_reference() {
        for config in [
            r#"{"reference": "einstein2"}"#,
            r#"{"reference": ""}"#,
            r#"{"reference": null}"#,
        ] {
            let (result, text, calls) =
                run_compute(Fixture::default(), config, EnergyType::Helmholtz);
            let err = result.unwrap_err();
            assert!(matches!(err, HtiError::UnsupportedReference { .. }), "{}", config);
            assert!(err.to_string().contains("hti_ice should be used with reference einstein"));
            // 热力学量已输出，参考态自由能未计算
            assert!(text.starts_with("# thermo"));
            assert!(!calls.contains(&"free_energy".to_string()));
        }
    }

    #[test]
    fn test_missing_job_dir() {
        let calls = Calls::default();
        let cli = cli_with(&calls, Fixture::default());
        let err = cli
            .compute(Path::new("/no/such/job"), EnergyType::Helmholtz, &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, HtiError::DirectoryNotFound { .. }));
        assert!(calls.take().is_empty());
    }

    #[test]
    fn test_report_detail_and_csv() {
        let dir = tempfile::tempdir().unwrap();
        let estimate = TiEstimate {
            free_energy: FreeEnergyResult::new(0.5, 0.01, 0.02),
            thermo_info: ThermoInfo::new(),
            integrand: vec![
                LambdaPoint { lambda: 0.0, mean: -1.25, err: 0.004, samples: 90 },
                LambdaPoint { lambda: 1.0, mean: 2.0, err: 0.006, samples: 90 },
            ],
        };
        let args = ComputeArgs {
            job: PathBuf::from("job"),
            energy_type: EnergyType::Helmholtz,
            detail: true,
            csv: Some(dir.path().join("dhdl.csv")),
            plot: None,
        };
        let mut out = Vec::new();
        report(&estimate, &args, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("-1.25000000"));
        assert!(text.contains("6.000e-03"));
        assert!(dir.path().join("dhdl.csv").exists());
    }
}
