pub mod changshi;
pub mod deruisi;
pub mod langdu;
mod profile;
pub mod sanding;
pub mod shagang;
pub mod tebian;
pub mod weiyuan;
pub mod xingcheng;
pub mod zhongchuan;

use tracing::info;

pub use profile::{DockRule, JoinPlan, MonthRule, SheetPlan, SheetSelector, VendorProfile};

use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::parsers::binding::FieldSpec;
use crate::parsers::header::PATH_SEPARATOR;
use crate::storage::profiles::load_profiles;

/// 三行表头中纵向合并的列，例如 "合同号 > 合同号 > 合同号"
pub(crate) fn stacked(label: &str) -> String {
    [label; 3].join(PATH_SEPARATOR)
}

/// 三行表头中 "分组 > 子项 > 重量" 的列
pub(crate) fn weight(group: &str, item: &str) -> String {
    [group, item, "重量"].join(PATH_SEPARATOR)
}

/// 表头文本与字段名相同的一组字段
pub(crate) fn same_fields(names: &[&str]) -> Vec<FieldSpec> {
    names.iter().map(|name| FieldSpec::same(name)).collect()
}

pub(crate) fn names(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|field| field.to_string()).collect()
}

/// 供应商方案注册表
#[derive(Debug, Clone, Default)]
pub struct VendorRegistry {
    profiles: Vec<VendorProfile>,
}

impl VendorRegistry {
    /// 内置的全部供应商
    pub fn builtin() -> Self {
        Self {
            profiles: vec![
                langdu::profile(),
                zhongchuan::profile(),
                changshi::profile(),
                deruisi::profile(),
                sanding::profile(),
                shagang::profile(),
                xingcheng::profile(),
                weiyuan::profile(),
                tebian::profile(),
            ],
        }
    }

    /// 内置方案，再叠加配置目录中的 JSON 方案（同 id 覆盖）
    pub fn load(config: &IngestConfig) -> Result<Self, IngestError> {
        let mut registry = Self::builtin();
        if let Some(dir) = &config.profile_dir {
            let overrides = load_profiles(dir).map_err(|err| IngestError::Config(err.message))?;
            info!(dir = %dir.display(), count = overrides.len(), "加载供应商方案");
            for profile in overrides {
                registry.upsert(profile);
            }
        }
        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Option<&VendorProfile> {
        let id = id.trim().to_lowercase();
        self.profiles.iter().find(|profile| profile.id == id)
    }

    pub fn require(&self, id: &str) -> Result<&VendorProfile, IngestError> {
        self.get(id)
            .ok_or_else(|| IngestError::UnknownVendor(id.to_string()))
    }

    pub fn ids(&self) -> Vec<&str> {
        self.profiles.iter().map(|profile| profile.id.as_str()).collect()
    }

    pub fn profiles(&self) -> &[VendorProfile] {
        &self.profiles
    }

    pub fn upsert(&mut self, mut profile: VendorProfile) {
        profile.id = profile.id.trim().to_lowercase();
        match self.profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }
    }
}
