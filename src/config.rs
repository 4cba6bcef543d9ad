use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::IngestError;

const APP_DIR: &str = "svend-ingest";
const CONFIG_FILE: &str = "config.json";

/// 运行配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IngestConfig {
    /// 多个工作表并行处理
    pub parallel_sheets: bool,
    /// 每张表最多保留的行级诊断条数（计数不受限制）
    pub max_row_diagnostics: usize,
    /// 额外的供应商方案目录，同 id 覆盖内置方案
    pub profile_dir: Option<PathBuf>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            parallel_sheets: true,
            max_row_diagnostics: 200,
            profile_dir: None,
        }
    }
}

/// `<系统配置目录>/svend-ingest/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// 读取配置
///
/// 显式指定的文件必须存在；未指定时使用默认位置，文件不存在则返回默认配置。
pub fn load_config(path: Option<&Path>) -> Result<IngestConfig, IngestError> {
    let (path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => return Ok(IngestConfig::default()),
        },
    };

    if !path.exists() {
        if explicit {
            return Err(IngestError::Config(format!(
                "配置文件不存在: {}",
                path.display()
            )));
        }
        debug!(path = %path.display(), "使用默认配置");
        return Ok(IngestConfig::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|err| IngestError::Config(format!("配置文件读取失败: {err}")))?;
    let config: IngestConfig = serde_json::from_str(&content)
        .map_err(|err| IngestError::Config(format!("配置文件解析失败: {err}")))?;

    debug!(path = %path.display(), ?config, "配置已加载");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"parallelSheets": false}"#).unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert!(!config.parallel_sheets);
        assert_eq!(config.max_row_diagnostics, 200);
        assert_eq!(config.profile_dir, None);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = load_config(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(error, IngestError::Config(_)));
    }
}
