use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::models::{AppError, ErrorKind};
use crate::vendors::VendorProfile;

fn storage_error(message: String) -> AppError {
    AppError::new(ErrorKind::Config, message)
}

fn profile_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{id}.json"))
}

/// 读取目录下全部 `*.json` 供应商方案（按文件名排序）；目录不存在时返回空列表
pub fn load_profiles(dir: &Path) -> Result<Vec<VendorProfile>, AppError> {
    if !dir.exists() {
        debug!(dir = %dir.display(), "方案目录不存在");
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir)
        .map_err(|err| storage_error(format!("方案目录读取失败: {err}")))?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("json"))
        .collect();
    paths.sort();

    let mut profiles = Vec::with_capacity(paths.len());
    for path in paths {
        let content = fs::read_to_string(&path)
            .map_err(|err| storage_error(format!("方案文件读取失败 {}: {err}", path.display())))?;
        let profile: VendorProfile = serde_json::from_str(&content)
            .map_err(|err| storage_error(format!("方案文件解析失败 {}: {err}", path.display())))?;
        profiles.push(profile);
    }

    Ok(profiles)
}

/// 每个方案写入 `<id>.json`；id 为空或重复时不写任何文件
pub fn save_profiles(dir: &Path, profiles: &[VendorProfile]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for profile in profiles {
        let id = profile.id.trim();
        if id.is_empty() {
            return Err(storage_error(format!("供应商 {} 缺少 id", profile.name)));
        }
        if !seen.insert(id.to_lowercase()) {
            return Err(storage_error(format!("供应商 id '{id}' 重复")));
        }
    }

    fs::create_dir_all(dir).map_err(|err| storage_error(format!("方案目录创建失败: {err}")))?;

    for profile in profiles {
        let content = serde_json::to_string_pretty(profile)
            .map_err(|err| storage_error(format!("方案序列化失败: {err}")))?;
        fs::write(profile_path(dir, profile.id.trim()), content)
            .map_err(|err| storage_error(format!("方案文件写入失败: {err}")))?;
    }

    info!(dir = %dir.display(), count = profiles.len(), "供应商方案已保存");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vendors::VendorRegistry;

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let profiles = VendorRegistry::builtin().profiles().to_vec();

        save_profiles(dir.path(), &profiles).unwrap();
        let loaded = load_profiles(dir.path()).unwrap();

        assert_eq!(loaded.len(), profiles.len());
        let shagang = loaded.iter().find(|p| p.id == "shagang").unwrap();
        assert_eq!(shagang, profiles.iter().find(|p| p.id == "shagang").unwrap());
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let profile = crate::vendors::sanding::profile();
        let mut copy = profile.clone();
        copy.id = "SANDING".to_string();

        let error = save_profiles(dir.path(), &[profile, copy]).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Config);
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_missing_dir_and_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_profiles(&dir.path().join("none")).unwrap().is_empty());

        fs::write(dir.path().join("broken.json"), "{").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let error = load_profiles(dir.path()).unwrap_err();
        assert!(error.message.contains("broken.json"));
    }
}
