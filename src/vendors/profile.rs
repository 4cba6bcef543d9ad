use serde::{Deserialize, Serialize};

use crate::models::{Metric, SheetData, WorkbookModel};
use crate::parsers::binding::FieldSpec;
use crate::parsers::header::HeaderWindow;
use crate::processors::month::{month_from_modes, MonthMode};
use crate::processors::normalizer::NumberPolicy;
use crate::processors::rules::{AttrRule, DerivationRule, RowView};

/// 工作表选择方式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetSelector {
    Name(String),
    /// 第一个名称包含该文本的工作表
    Contains(String),
    Index(usize),
}

impl SheetSelector {
    pub fn find<'a>(&self, workbook: &'a WorkbookModel) -> Option<&'a SheetData> {
        match self {
            SheetSelector::Name(name) => workbook.sheet(name),
            SheetSelector::Contains(part) => workbook.sheets.iter().find(|s| s.name.contains(part.as_str())),
            SheetSelector::Index(index) => workbook.sheet_at(*index),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            SheetSelector::Name(name) => name.clone(),
            SheetSelector::Contains(part) => format!("*{part}*"),
            SheetSelector::Index(index) => format!("第{}个工作表", index + 1),
        }
    }
}

/// 月份来源
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRule {
    pub field: String,
    pub modes: Vec<MonthMode>,
}

impl MonthRule {
    pub fn new(field: &str, modes: Vec<MonthMode>) -> Self {
        Self {
            field: field.to_string(),
            modes,
        }
    }

    pub fn resolve(&self, row: &RowView<'_>) -> Option<u8> {
        month_from_modes(row.value(&self.field), &self.modes)
    }
}

/// 码头来源
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockRule {
    /// 字段为空时使用 fallback；没有 fallback 则跳过该行
    Field {
        name: String,
        #[serde(default)]
        fallback: Option<String>,
    },
    /// 表中没有码头列时的固定值
    Constant(String),
}

impl DockRule {
    pub fn field(name: &str) -> Self {
        DockRule::Field {
            name: name.to_string(),
            fallback: None,
        }
    }

    pub fn field_or(name: &str, fallback: &str) -> Self {
        DockRule::Field {
            name: name.to_string(),
            fallback: Some(fallback.to_string()),
        }
    }

    pub fn resolve(&self, row: &RowView<'_>) -> Option<String> {
        match self {
            DockRule::Field { name, fallback } => {
                let dock = row.text(name);
                if dock.is_empty() {
                    fallback.clone()
                } else {
                    Some(dock)
                }
            }
            DockRule::Constant(value) => Some(value.clone()),
        }
    }
}

/// 关联查找表：按键把另一张表的字段并入主表的行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinPlan {
    pub label: String,
    pub selector: SheetSelector,
    pub header: HeaderWindow,
    pub data_start: u32,
    pub schema: Vec<FieldSpec>,
    /// 查找表中的键字段
    pub key: String,
    /// 主表中的键字段
    pub local_key: String,
}

/// 单个工作表的处理方案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetPlan {
    pub label: String,
    pub selector: SheetSelector,
    /// 找不到工作表时是否记为错误
    #[serde(default)]
    pub required: bool,
    pub header: HeaderWindow,
    /// 第一行数据（0 起始）
    pub data_start: u32,
    pub schema: Vec<FieldSpec>,
    /// 这些字段为空的行直接跳过
    #[serde(default)]
    pub required_values: Vec<String>,
    pub month: MonthRule,
    pub dock: DockRule,
    #[serde(default)]
    pub numbers: NumberPolicy,
    pub metrics: Vec<DerivationRule>,
    #[serde(default)]
    pub attributes: Vec<AttrRule>,
    #[serde(default)]
    pub join: Option<JoinPlan>,
    /// 检查首行数据是否缺少必填值
    #[serde(default)]
    pub probe_first_row: bool,
    /// 无数据时的提示
    #[serde(default)]
    pub no_data_hint: Option<String>,
}

/// 供应商方案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorProfile {
    pub id: String,
    pub name: String,
    pub plans: Vec<SheetPlan>,
}

impl VendorProfile {
    /// 所有工作表声明的指标（去重，保持首次出现的顺序）
    pub fn metrics(&self) -> Vec<Metric> {
        let mut metrics = Vec::new();
        for rule in self.plans.iter().flat_map(|plan| plan.metrics.iter()) {
            if !metrics.contains(&rule.metric) {
                metrics.push(rule.metric);
            }
        }
        metrics
    }
}
