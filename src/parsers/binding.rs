use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::IngestError;
use crate::models::Column;
use crate::utils::text::normalize_label;

/// 字段与列的匹配方式
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MatchMode {
    /// 完整路径相等
    #[default]
    FullPath,
    /// 完整路径包含期望文本（全角转半角、去空白后比较）
    Contains,
    /// 指定表头行的标题相等
    Level { level: usize },
    /// 第一个 levels[level] 相等的列向右 offset 列，且该列下一级标题为 sub_label
    Offset {
        level: usize,
        offset: usize,
        sub_label: String,
    },
}

/// 逻辑字段声明
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    pub path: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub mode: MatchMode,
}

fn default_required() -> bool {
    true
}

impl FieldSpec {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            required: true,
            mode: MatchMode::FullPath,
        }
    }

    /// 表头文本与字段名相同
    pub fn same(name: &str) -> Self {
        Self::new(name, name)
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }
}

/// 逻辑字段 → 物理列号
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnBinding {
    indices: BTreeMap<String, u32>,
}

impl ColumnBinding {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, u32)>) -> Self {
        Self {
            indices: pairs
                .into_iter()
                .map(|(name, index)| (name.to_string(), index))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.indices.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// 按声明绑定列；任何必需字段无法匹配时，返回全部未匹配的字段名
pub fn bind(sheet: &str, columns: &[Column], schema: &[FieldSpec]) -> Result<ColumnBinding, IngestError> {
    let mut binding = ColumnBinding::default();
    let mut missing = Vec::new();

    for field in schema {
        match locate(columns, field) {
            Some(index) => {
                binding.indices.entry(field.name.clone()).or_insert(index);
            }
            None if field.required => missing.push(field.name.clone()),
            None => debug!(sheet, field = %field.name, "可选列不存在"),
        }
    }

    if !missing.is_empty() {
        warn!(sheet, missing = ?missing, "列绑定失败");
        return Err(IngestError::SchemaMismatch {
            sheet: sheet.to_string(),
            missing,
        });
    }

    Ok(binding)
}

fn locate(columns: &[Column], field: &FieldSpec) -> Option<u32> {
    match &field.mode {
        MatchMode::FullPath => columns
            .iter()
            .find(|column| column.full_path == field.path)
            .map(|column| column.index),
        MatchMode::Contains => {
            let needle = normalize_label(&field.path);
            columns
                .iter()
                .find(|column| {
                    !column.full_path.is_empty() && normalize_label(&column.full_path).contains(&needle)
                })
                .map(|column| column.index)
        }
        MatchMode::Level { level } => columns
            .iter()
            .find(|column| column.levels.get(*level) == Some(&field.path))
            .map(|column| column.index),
        MatchMode::Offset {
            level,
            offset,
            sub_label,
        } => columns.iter().enumerate().find_map(|(position, column)| {
            if column.levels.get(*level) != Some(&field.path) {
                return None;
            }
            let target = columns.get(position + offset)?;
            (target.levels.get(level + 1) == Some(sub_label)).then_some(target.index)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(index: u32, levels: &[&str]) -> Column {
        let levels: Vec<String> = levels.iter().map(|l| l.to_string()).collect();
        let path: Vec<String> = levels.iter().filter(|l| !l.is_empty()).cloned().collect();
        Column {
            index,
            full_path: path.join(" > "),
            path,
            levels,
        }
    }

    #[test]
    fn test_reports_every_missing_field() {
        let columns = vec![column(0, &["合同号"]), column(1, &["重量"])];
        let schema = vec![
            FieldSpec::same("合同号"),
            FieldSpec::same("码头"),
            FieldSpec::same("月份"),
            FieldSpec::same("备注").optional(),
        ];

        match bind("Sheet1", &columns, &schema) {
            Err(IngestError::SchemaMismatch { missing, .. }) => {
                assert_eq!(missing, vec!["码头", "月份"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_optional_fields_are_absent() {
        let columns = vec![column(3, &["合同号"])];
        let schema = vec![FieldSpec::same("合同号"), FieldSpec::same("备注").optional()];
        let binding = bind("Sheet1", &columns, &schema).unwrap();
        assert_eq!(binding.get("合同号"), Some(3));
        assert_eq!(binding.get("备注"), None);
    }

    #[test]
    fn test_duplicate_paths_bind_first_column() {
        let columns = vec![column(0, &["重量"]), column(1, &["重量"])];
        let binding = bind("s", &columns, &[FieldSpec::same("重量")]).unwrap();
        assert_eq!(binding.get("重量"), Some(0));
    }

    #[test]
    fn test_contains_mode_normalizes_width() {
        let columns = vec![column(0, &["单重（吨）"]), column(1, &["合同 编号"])];
        let schema = vec![
            FieldSpec::new("单重", "单重(吨)").with_mode(MatchMode::Contains),
            FieldSpec::same("合同编号").with_mode(MatchMode::Contains),
        ];
        let binding = bind("s", &columns, &schema).unwrap();
        assert_eq!(binding.get("单重"), Some(0));
        assert_eq!(binding.get("合同编号"), Some(1));
    }

    #[test]
    fn test_offset_mode_finds_deficit_column() {
        // 工序名横向合并三列，第三列下一级为"欠量"
        let columns = vec![
            column(0, &["公司别", "", ""]),
            column(1, &["", "炼钢工序", "计划"]),
            column(2, &["", "炼钢工序", "完成"]),
            column(3, &["", "炼钢工序", "欠量"]),
            column(4, &["", "厚板轧制", "计划"]),
            column(5, &["", "厚板轧制", "完成"]),
            column(6, &["", "厚板轧制", "合计"]),
        ];
        let schema = vec![
            FieldSpec::new("公司别", "公司别").with_mode(MatchMode::Level { level: 0 }),
            FieldSpec::new("炼钢欠量", "炼钢工序").with_mode(MatchMode::Offset {
                level: 1,
                offset: 2,
                sub_label: "欠量".to_string(),
            }),
            FieldSpec::new("轧制欠量", "厚板轧制").with_mode(MatchMode::Offset {
                level: 1,
                offset: 2,
                sub_label: "欠量".to_string(),
            }),
        ];

        match bind("生产进程", &columns, &schema) {
            Err(IngestError::SchemaMismatch { missing, .. }) => assert_eq!(missing, vec!["轧制欠量"]),
            other => panic!("unexpected: {other:?}"),
        }

        let binding = bind("生产进程", &columns, &schema[..2]).unwrap();
        assert_eq!(binding.get("公司别"), Some(0));
        assert_eq!(binding.get("炼钢欠量"), Some(3));
    }
}
