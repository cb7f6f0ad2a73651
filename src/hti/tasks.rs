//! # HTI 任务生成
//!
//! 根据参数文件生成作业目录：
//!
//! ```text
//! <output>/in.json        参数（equi_conf 改写为 conf.lmp）
//! <output>/conf.lmp       平衡构型
//! <output>/task.000000/   每个 λ 一个任务：lambda.out, conf.lmp, in.lammps [, job.sbatch]
//! ```
//!
//! 已存在的输出目录会被重命名为 `<output>.bk000`、`<output>.bk001` …
//!
//! ## 依赖关系
//! - 被 `hti/mod.rs` 使用
//! - 使用 `hti/lambda.rs`, `parsers/lmp.rs`, `utils/slurm.rs`, `utils/progress.rs`

use super::lambda::{expand_lambdas, LambdaEntry};
use super::{SwitchMode, TASK_PREFIX};
use crate::error::{HtiError, Result};
use crate::models::{AtomStyle, JobConfig, Reference};
use crate::parsers::lmp;
use crate::utils::progress;
use crate::utils::slurm::{generate_sbatch_script, SlurmConfig};

use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 任务生成所需的配置段
#[derive(Debug, Clone, Deserialize)]
pub struct HtiParams {
    /// 平衡构型（LAMMPS data）
    pub equi_conf: PathBuf,

    /// 温度 (K)
    pub temp: f64,

    /// 弹簧常数 (eV/Å²)
    pub spring_k: f64,

    pub lambda: Vec<LambdaEntry>,

    pub nsteps: u64,

    /// 时间步长 (ps)
    #[serde(default = "default_timestep")]
    pub timestep: f64,

    #[serde(default = "default_thermo_freq")]
    pub thermo_freq: u64,

    /// 恒温器弛豫时间 (ps)
    #[serde(default = "default_tau_t")]
    pub tau_t: f64,

    /// 目标模型的 pair_style，例如 `"deepmd graph.pb"`
    pub pair_style: String,

    #[serde(default = "default_pair_coeff")]
    pub pair_coeff: String,

    /// 每种类型的质量 (amu)
    #[serde(default)]
    pub masses: Option<Vec<f64>>,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default)]
    pub slurm: Option<SlurmConfig>,
}

fn default_timestep() -> f64 {
    0.0005
}

fn default_thermo_freq() -> u64 {
    10
}

fn default_tau_t() -> f64 {
    0.1
}

fn default_pair_coeff() -> String {
    "* *".to_string()
}

fn default_seed() -> u64 {
    7858
}

impl HtiParams {
    fn validate(&self) -> Result<()> {
        if self.temp <= 0.0 {
            return Err(HtiError::InvalidConfig("temp must be positive".to_string()));
        }
        if self.spring_k <= 0.0 {
            return Err(HtiError::InvalidConfig("spring_k must be positive".to_string()));
        }
        if self.nsteps == 0 || self.thermo_freq == 0 {
            return Err(HtiError::InvalidConfig(
                "nsteps and thermo_freq must be positive".to_string(),
            ));
        }
        if self.pair_style.split_whitespace().next().is_none() {
            return Err(HtiError::InvalidConfig("pair_style is empty".to_string()));
        }
        Ok(())
    }
}

/// 生成作业目录，返回各任务目录
pub fn make_tasks(
    output_dir: &Path,
    config: &JobConfig,
    reference: &str,
    mode: &str,
) -> Result<Vec<PathBuf>> {
    let reference = Reference::from_name(reference)?;
    let mode = SwitchMode::from_name(mode)?;
    let params: HtiParams = config.section()?;
    params.validate()?;
    let lambdas = expand_lambdas(&params.lambda)?;
    info!(%reference, ?mode, ntasks = lambdas.len(), "generating HTI tasks");

    // 平衡构型
    if !params.equi_conf.exists() {
        return Err(HtiError::FileNotFound {
            path: params.equi_conf.display().to_string(),
        });
    }
    let conf_text =
        fs::read_to_string(&params.equi_conf).map_err(|e| HtiError::read(&params.equi_conf, e))?;
    let lines: Vec<&str> = conf_text.split('\n').collect();
    let system = lmp::parse_lmp_lines(&lines, &params.equi_conf.display().to_string())?;

    let masses = params
        .masses
        .clone()
        .or_else(|| system.masses.clone())
        .ok_or_else(|| {
            HtiError::InvalidConfig(
                "Atomic masses are required: set 'masses' or add a Masses section to equi_conf"
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

    create_job_dir(output_dir)?;
    write_file(&output_dir.join("conf.lmp"), &conf_text)?;
    let mut job_config = config.clone();
    job_config.set("equi_conf", Value::String("conf.lmp".to_string()));
    job_config.to_file(&output_dir.join("in.json"))?;

    let copies: Option<Vec<u32>> = config
        .copies
        .as_ref()
        .map(|c| c.iter().map(|n| n.get()).collect());

    let pb = progress::create_progress_bar(lambdas.len() as u64, "Writing tasks");
    let mut task_dirs = Vec::with_capacity(lambdas.len());

    for (idx, &lambda) in lambdas.iter().enumerate() {
        let task_name = format!("{}{:06}", TASK_PREFIX, idx);
        let task_dir = output_dir.join(&task_name);
        fs::create_dir_all(&task_dir).map_err(|e| HtiError::write(&task_dir, e))?;

        write_file(&task_dir.join("lambda.out"), &format!("{}\n", lambda))?;
        write_file(&task_dir.join("conf.lmp"), &conf_text)?;
        write_file(
            &task_dir.join("in.lammps"),
            &lammps_input(&params, lambda, &masses, system.atom_style, copies.as_deref()),
        )?;

        if let Some(slurm) = &params.slurm {
            let abs_dir = task_dir.canonicalize().unwrap_or_else(|_| task_dir.clone());
            let job_name = format!("hti.{}", task_name);
            write_file(
                &task_dir.join("job.sbatch"),
                &generate_sbatch_script(slurm, &job_name, &abs_dir),
            )?;
        }

        debug!(task = %task_name, lambda, "task written");
        task_dirs.push(task_dir);
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(task_dirs)
}

/// 创建作业目录；已存在时先备份
fn create_job_dir(path: &Path) -> Result<()> {
    if path.exists() {
        let backup = (0..1000)
            .map(|i| PathBuf::from(format!("{}.bk{:03}", path.display(), i)))
            .find(|p| !p.exists())
            .ok_or_else(|| {
                HtiError::InvalidArgument(format!(
                    "Too many backups of '{}'",
                    path.display()
                ))
            })?;
        info!(from = %path.display(), to = %backup.display(), "backing up existing job directory");
        fs::rename(path, &backup).map_err(|e| HtiError::write(path, e))?;
    }
    fs::create_dir_all(path).map_err(|e| HtiError::write(path, e))
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| HtiError::write(path, e))
}

/// 生成单个 λ 任务的 LAMMPS 输入
pub fn lammps_input(
    params: &HtiParams,
    lambda: f64,
    masses: &[f64],
    atom_style: AtomStyle,
    copies: Option<&[u32]>,
) -> String {
    let mut pair_tokens = params.pair_style.split_whitespace();
    let sub_style = pair_tokens.next().unwrap_or_default();

    let mut coeff_tokens = params.pair_coeff.split_whitespace();
    let atom_i = coeff_tokens.next().unwrap_or("*");
    let atom_j = coeff_tokens.next().unwrap_or("*");
    let coeff_rest: Vec<&str> = coeff_tokens.collect();
    let pair_coeff = std::iter::once(format!("{} {} {}", atom_i, atom_j, sub_style))
        .chain(coeff_rest.iter().map(|s| s.to_string()))
        .collect::<Vec<_>>()
        .join(" ");

    let mut out = String::new();
    out.push_str(&format!("# Hamiltonian TI task, lambda = {}\n", lambda));
    out.push_str(&format!("variable        NSTEPS          equal {}\n", params.nsteps));
    out.push_str(&format!("variable        THERMO_FREQ     equal {}\n", params.thermo_freq));
    out.push_str(&format!("variable        TEMP            equal {}\n", params.temp));
    out.push_str(&format!("variable        TAU_T           equal {}\n", params.tau_t));
    out.push_str(&format!("variable        LAMBDA          equal {}\n", lambda));
    out.push_str(&format!("variable        K_SPRING        equal {}\n", params.spring_k));
    out.push('\n');
    out.push_str("units           metal\n");
    out.push_str("boundary        p p p\n");
    out.push_str(&format!("atom_style      {}\n", atom_style));
    out.push_str("atom_modify     map yes\n");
    out.push_str("read_data       conf.lmp\n");
    if let Some(c) = copies {
        let dims: Vec<String> = c.iter().map(|n| n.to_string()).collect();
        out.push_str(&format!("replicate       {}\n", dims.join(" ")));
    }
    for (i, m) in masses.iter().enumerate() {
        out.push_str(&format!("mass            {} {}\n", i + 1, m));
    }
    out.push('\n');
    out.push_str(&format!(
        "pair_style      hybrid/scaled v_LAMBDA {}\n",
        params.pair_style.trim()
    ));
    out.push_str(&format!("pair_coeff      {}\n", pair_coeff));
    out.push_str(&format!("compute         e_model all pair {}\n", sub_style));
    out.push_str("compute         disp all displace/atom\n");
    out.push_str("variable        d2 atom c_disp[4]*c_disp[4]\n");
    out.push_str("compute         sum_d2 all reduce sum v_d2\n");
    out.push_str("variable        e_spring equal 0.5*v_K_SPRING*c_sum_d2\n");
    out.push_str("variable        dhdl equal c_e_model-v_e_spring\n");
    // spring/self 不接受 K = 0，λ = 1 时不加弹簧，但仍输出 e_spring
    let k_scaled = (1.0 - lambda) * params.spring_k;
    if k_scaled > 0.0 {
        out.push_str(&format!(
            "fix             l_spring all spring/self {}\n",
            k_scaled
        ));
        out.push_str("fix_modify      l_spring energy yes\n");
    }
    out.push('\n');
    out.push_str(
        "thermo_style    custom step ke pe etotal enthalpy temp press vol c_e_model v_e_spring v_dhdl\n",
    );
    out.push_str("thermo_modify   format float %.10e\n");
    out.push_str("thermo          ${THERMO_FREQ}\n");
    out.push('\n');
    out.push_str(&format!(
        "velocity        all create ${{TEMP}} {} dist gaussian\n",
        params.seed
    ));
    out.push_str("fix             md all nvt temp ${TEMP} ${TEMP} ${TAU_T}\n");
    out.push_str(&format!("timestep        {}\n", params.timestep));
    out.push_str("run             ${NSTEPS}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONF: &str = "water\n\n3 atoms\n2 atom types\n0 5 xlo xhi\n0 5 ylo yhi\n0 5 zlo zhi\n\nAtoms # atomic\n\n1 1 0 0 0\n2 2 0.9 0 0\n3 2 0 0.9 0\n";

    fn config_for(conf: &Path, extra: &str) -> JobConfig {
        let text = format!(
            r#"{{
                "equi_conf": {:?},
                "temp": 100.0,
                "spring_k": 0.02,
                "lambda": ["0:1:0.5"],
                "nsteps": 1000,
                "pair_style": "deepmd graph.pb",
                "masses": [15.9994, 1.008]
                {}
            }}"#,
            conf.display().to_string(),
            extra
        );
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn test_make_tasks_layout() {
        let dir = tempfile::tempdir().unwrap();
        let conf = dir.path().join("ice.lmp");
        fs::write(&conf, CONF).unwrap();
        let out = dir.path().join("job");

        let config = config_for(&conf, r#", "copies": [2, 2, 1], "slurm": {"ntasks": 4}"#);
        let tasks = make_tasks(&out, &config, "einstein", "all").unwrap();

        assert_eq!(tasks.len(), 3);
        assert!(out.join("conf.lmp").exists());
        let saved = JobConfig::from_file(&out.join("in.json")).unwrap();
        assert_eq!(saved.get("equi_conf").and_then(|v| v.as_str()), Some("conf.lmp"));
        assert_eq!(saved.replication_factor().unwrap(), 4);

        let last = out.join("task.000002");
        let lambda = fs::read_to_string(last.join("lambda.out")).unwrap();
        assert_eq!(lambda.trim().parse::<f64>().unwrap(), 1.0);
        assert!(last.join("conf.lmp").exists());
        assert!(last.join("job.sbatch").exists());

        let input = fs::read_to_string(out.join("task.000001").join("in.lammps")).unwrap();
        assert!(input.contains("variable        LAMBDA          equal 0.5\n"));
        assert!(input.contains("atom_style      atomic\n"));
        assert!(input.contains("replicate       2 2 1\n"));
        assert!(input.contains("mass            2 1.008\n"));
        assert!(input.contains("pair_style      hybrid/scaled v_LAMBDA deepmd graph.pb\n"));
        assert!(input.contains("pair_coeff      * * deepmd\n"));
        assert!(input.contains("fix             l_spring all spring/self 0.01\n"));
        assert!(input.contains("v_dhdl"));
    }

    #[test]
    fn test_existing_output_is_backed_up() {
        let dir = tempfile::tempdir().unwrap();
        let conf = dir.path().join("ice.lmp");
        fs::write(&conf, CONF).unwrap();
        let out = dir.path().join("job");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("marker"), "old").unwrap();

        make_tasks(&out, &config_for(&conf, ""), "einstein", "all").unwrap();

        let backup = dir.path().join("job.bk000");
        assert!(backup.join("marker").exists());
        assert!(!out.join("marker").exists());
    }

    #[test]
    fn test_rejects_reference_and_mode() {
        let dir = tempfile::tempdir().unwrap();
        let conf = dir.path().join("ice.lmp");
        fs::write(&conf, CONF).unwrap();
        let out = dir.path().join("job");
        let config = config_for(&conf, "");

        assert!(matches!(
            make_tasks(&out, &config, "ideal", "all"),
            Err(HtiError::UnsupportedReference { .. })
        ));
        assert!(matches!(
            make_tasks(&out, &config, "einstein", "two-step"),
            Err(HtiError::UnsupportedMode(_))
        ));
        assert!(!out.exists());
    }

    #[test]
    fn test_missing_equi_conf() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&dir.path().join("nope.lmp"), "");
        let err = make_tasks(&dir.path().join("job"), &config, "einstein", "all").unwrap_err();
        assert!(matches!(err, HtiError::FileNotFound { .. }));
    }

    #[test]
    fn test_pair_coeff_keeps_extra_arguments() {
        let params: HtiParams = serde_json::from_str(
            r#"{
                "equi_conf": "conf.lmp", "temp": 100, "spring_k": 0.1,
                "lambda": [0, 1], "nsteps": 10,
                "pair_style": "tip4p/cut 1 2 1 1 0.125 8.0",
                "pair_coeff": "1 1 0.0067 3.1668"
            }"#,
        )
        .unwrap();
        let input = lammps_input(&params, 0.0, &[16.0, 1.0], AtomStyle::Full, None);
        assert!(input.contains("pair_coeff      1 1 tip4p/cut 0.0067 3.1668\n"));
        assert!(input.contains("compute         e_model all pair tip4p/cut\n"));
        assert!(input.contains("spring/self 0.1\n"));
        assert!(!input.contains("replicate"));
        assert!(input.contains("atom_style      full\n"));
    }

    #[test]
    fn test_full_model_task_has_no_spring_fix() {
        let params: HtiParams = serde_json::from_str(
            r#"{
                "equi_conf": "conf.lmp", "temp": 100, "spring_k": 0.02,
                "lambda": [0, 1], "nsteps": 10, "pair_style": "deepmd graph.pb"
            }"#,
        )
        .unwrap();
        let input = lammps_input(&params, 1.0, &[16.0, 1.0], AtomStyle::Atomic, None);
        assert!(!input.contains("spring/self"));
        assert!(!input.contains("fix_modify      l_spring"));
        assert!(input.contains("variable        e_spring equal 0.5*v_K_SPRING*c_sum_d2\n"));
        assert!(input.contains("variable        dhdl equal c_e_model-v_e_spring\n"));
        assert!(input.contains("v_dhdl\n"));

        let input = lammps_input(&params, 0.5, &[16.0, 1.0], AtomStyle::Atomic, None);
        assert!(input.contains("fix             l_spring all spring/self 0.01\n"));
        assert!(input.contains("fix_modify      l_spring energy yes\n"));
    }
}
