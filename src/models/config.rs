//! # 作业配置数据模型
//!
//! `in.json` / 参数文件的强类型表示。CLI 只解释 `reference` 与 `copies`
//! 两个键，其余键原样保存在 `extra` 中，由各协作模块按需解码为自己的配置段。
//!
//! ## 依赖关系
//! - 被 `commands/`、`hti/`、`einstein/` 使用
//! - 使用 `serde`, `serde_json`

use crate::error::{HtiError, Result};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::num::NonZeroU32;
use std::path::Path;

/// 本程序唯一支持的参考态名称
pub const EINSTEIN: &str = "einstein";

/// 参考态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    Einstein,
}

impl Reference {
    /// 按名称解析参考态
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            EINSTEIN => Ok(Reference::Einstein),
            other => Err(HtiError::UnsupportedReference {
                found: format!("{:?}", other),
            }),
        }
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reference::Einstein => write!(f, "{}", EINSTEIN),
        }
    }
}

/// 作业配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobConfig {
    /// 参考态；缺省与 "einstein" 等价，显式 `null` 视为非法值
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub reference: Option<Value>,

    /// 沿三个晶格方向的复制倍数
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copies: Option<Vec<NonZeroU32>>,

    /// 交给协作模块的其余键
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 字段出现即为 `Some`，即使其值为 `null`
fn present_value<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl JobConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HtiError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path).map_err(|e| HtiError::read(path, e))?;
        serde_json::from_str(&content).map_err(|e| HtiError::JsonError {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// 写出 JSON 文件（缩进格式）
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| HtiError::JsonError {
            path: path.display().to_string(),
            source: e,
        })?;
        fs::write(path, content + "\n").map_err(|e| HtiError::write(path, e))
    }

    /// 解析参考态
    pub fn reference(&self) -> Result<Reference> {
        match &self.reference {
            None => Ok(Reference::Einstein),
            Some(Value::String(name)) => Reference::from_name(name),
            Some(other) => Err(HtiError::UnsupportedReference {
                found: other.to_string(),
            }),
        }
    }

    /// 复制倍数之积；无 `copies` 时为 1
    pub fn replication_factor(&self) -> Result<u64> {
        let Some(copies) = &self.copies else {
            return Ok(1);
        };
        copies.iter().try_fold(1u64, |acc, n| {
            acc.checked_mul(u64::from(n.get())).ok_or_else(|| {
                HtiError::InvalidConfig(format!("copies {:?} overflow the atom count", copies))
            })
        })
    }

    /// 将 `extra` 解码为协作模块的配置段
    pub fn section<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.extra.clone()))
            .map_err(|e| HtiError::InvalidConfig(e.to_string()))
    }

    /// 读取 `extra` 中的某个键
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// 设置 `extra` 中的某个键
    pub fn set(&mut self, key: &str, value: Value) {
        self.extra.insert(key.to_string(), value);
    }
}
