//! # 数据模型模块
//!
//! 定义作业配置、体系数据与自由能结果的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`、`hti/`、`einstein/` 和 `commands/` 使用
//! - 子模块: config, system, thermo

pub mod config;
pub mod system;
pub mod thermo;

pub use config::{JobConfig, Reference, EINSTEIN};
pub use system::{AtomStyle, SystemData};
pub use thermo::{FreeEnergyResult, LambdaPoint, ThermoInfo, TiEstimate};
