//! # gen 命令实现
//!
//! 读取参数文件并交给任务生成器建立作业目录。
//!
//! ## 依赖关系
//! - 使用 `cli/gen.rs` 定义的参数
//! - 使用 `hti::TaskGenerator`
//! - 使用 `utils/output.rs`

use super::JobCli;
use crate::error::Result;
use crate::models::{JobConfig, EINSTEIN};
use crate::utils::output;

use std::path::Path;
use tracing::debug;

/// 唯一的切换模式名
const MODE_ALL: &str = "all";

impl JobCli {
    /// 由参数文件生成作业
    pub fn gen(&self, param: &Path, output_dir: &Path) -> Result<()> {
        let config = JobConfig::from_file(param)?;
        debug!(param = %param.display(), equi_conf = ?config.get("equi_conf"), "loaded parameters");

        output::print_info(&format!(
            "Generating job '{}' from '{}'",
            output_dir.display(),
            param.display()
        ));
        self.generator
            .make_tasks(output_dir, &config, EINSTEIN, MODE_ALL)?;
        output::print_success(&format!("Job written to '{}'", output_dir.display()));
        Ok(())
    }
}
