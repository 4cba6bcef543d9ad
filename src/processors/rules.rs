//! 指标与明细属性的派生规则。

use serde::{Deserialize, Serialize};

use super::month::serial_to_date;
use super::normalizer::{normalize_spec, spec_from_parts, split_spec, status_gate, NumberPolicy};
use crate::matchers::{any_matches, Predicate};
use crate::models::{format_number, CellValue, Metric, SheetData};
use crate::parsers::binding::ColumnBinding;
use crate::parsers::extractor::JoinedRow;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// 当前数据行的字段访问
pub struct RowView<'a> {
    pub sheet: &'a SheetData,
    /// 0 起始的绝对行号
    pub row: u32,
    pub binding: &'a ColumnBinding,
    pub joined: Option<&'a JoinedRow>,
}

impl<'a> RowView<'a> {
    /// 先查本表绑定，再查关联表；都没有时为空值
    pub fn value(&self, field: &str) -> &'a CellValue {
        if let Some(col) = self.binding.get(field) {
            return self.sheet.cell(self.row, col);
        }
        self.joined
            .and_then(|joined| joined.get(field))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn text(&self, field: &str) -> String {
        self.value(field).display()
    }

    /// Excel 行号（1 起始）
    pub fn excel_row(&self) -> u32 {
        self.row + 1
    }
}

/// 数值表达式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// 按工作表的数值策略读取字段
    Field(String),
    /// 只做数值转换与取三位小数，不做非负处理
    Raw(String),
    Const(f64),
    Sum(Vec<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    /// 负数归零
    Clamp(Box<Expr>),
    /// 状态字段命中任一谓词时取 then，否则为 0
    Gate {
        status: String,
        any: Vec<Predicate>,
        then: Box<Expr>,
    },
    /// 第一个命中的分支生效
    Switch {
        field: String,
        cases: Vec<Case>,
        #[serde(default = "Expr::zero")]
        otherwise: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub any: Vec<Predicate>,
    pub then: Expr,
}

impl Expr {
    pub fn field(name: &str) -> Self {
        Expr::Field(name.to_string())
    }

    pub fn raw(name: &str) -> Self {
        Expr::Raw(name.to_string())
    }

    pub fn sum(parts: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Sum(parts.into_iter().collect())
    }

    pub fn sub(left: Expr, right: Expr) -> Self {
        Expr::Sub(Box::new(left), Box::new(right))
    }

    pub fn mul(left: Expr, right: Expr) -> Self {
        Expr::Mul(Box::new(left), Box::new(right))
    }

    pub fn clamp(inner: Expr) -> Self {
        Expr::Clamp(Box::new(inner))
    }

    pub fn gate(status: &str, any: Vec<Predicate>, then: Expr) -> Self {
        Expr::Gate {
            status: status.to_string(),
            any,
            then: Box::new(then),
        }
    }

    fn zero() -> Box<Expr> {
        Box::new(Expr::Const(0.0))
    }

    pub fn eval(&self, row: &RowView<'_>, policy: NumberPolicy) -> f64 {
        match self {
            Expr::Field(name) => policy.apply(row.value(name)),
            Expr::Raw(name) => NumberPolicy::default().apply(row.value(name)),
            Expr::Const(value) => *value,
            Expr::Sum(parts) => parts.iter().map(|part| part.eval(row, policy)).sum(),
            Expr::Sub(left, right) => left.eval(row, policy) - right.eval(row, policy),
            Expr::Mul(left, right) => left.eval(row, policy) * right.eval(row, policy),
            Expr::Clamp(inner) => inner.eval(row, policy).max(0.0),
            Expr::Gate { status, any, then } => {
                status_gate(&row.text(status), any, then.eval(row, policy))
            }
            Expr::Switch {
                field,
                cases,
                otherwise,
            } => {
                let value = row.text(field);
                cases
                    .iter()
                    .find(|case| any_matches(&value, &case.any))
                    .map(|case| case.then.eval(row, policy))
                    .unwrap_or_else(|| otherwise.eval(row, policy))
            }
        }
    }
}

/// 指标派生规则
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivationRule {
    pub metric: Metric,
    pub expr: Expr,
}

impl DerivationRule {
    pub fn new(metric: Metric, expr: Expr) -> Self {
        Self { metric, expr }
    }
}

/// 明细属性表达式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrExpr {
    /// 原样文本（去除首尾空白）
    Text(String),
    /// 按数值策略读取后格式化
    Number(String),
    /// 日期显示为 YYYY-MM-DD，大于 12 的数字视为 Excel 序列号
    DateText(String),
    Spec {
        thickness: String,
        width: String,
        length: String,
    },
    NormalizedSpec(String),
    /// 规格描述拆分后的第 part 段（0 起始）
    SpecPart { field: String, part: usize },
    /// 去掉第一处出现的各片段
    Cleaned { field: String, remove: Vec<String> },
    Const(String),
    /// "N月"
    MonthLabel,
    /// Excel 行号
    SourceRow,
}

impl AttrExpr {
    pub fn render(&self, row: &RowView<'_>, month: u8, policy: NumberPolicy) -> String {
        match self {
            AttrExpr::Text(field) => row.text(field),
            AttrExpr::Number(field) => format_number(policy.apply(row.value(field))),
            AttrExpr::DateText(field) => match row.value(field) {
                CellValue::Number(serial) if *serial > 12.0 => serial_to_date(*serial)
                    .map(|date| date.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| format_number(*serial)),
                other => other.display(),
            },
            AttrExpr::Spec {
                thickness,
                width,
                length,
            } => spec_from_parts(row.value(thickness), row.value(width), row.value(length)),
            AttrExpr::NormalizedSpec(field) => normalize_spec(&row.text(field)),
            AttrExpr::SpecPart { field, part } => split_spec(&row.text(field))
                .get(*part)
                .map(|value| format_number(*value))
                .unwrap_or_default(),
            AttrExpr::Cleaned { field, remove } => {
                let mut text = row.text(field);
                for fragment in remove {
                    text = text.replacen(fragment.as_str(), "", 1);
                }
                text.trim().to_string()
            }
            AttrExpr::Const(value) => value.clone(),
            AttrExpr::MonthLabel => format!("{month}月"),
            AttrExpr::SourceRow => row.excel_row().to_string(),
        }
    }
}

/// 明细属性规则
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttrRule {
    pub name: String,
    pub value: AttrExpr,
}

impl AttrRule {
    pub fn new(name: &str, value: AttrExpr) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }

    pub fn text(name: &str, field: &str) -> Self {
        Self::new(name, AttrExpr::Text(field.to_string()))
    }

    pub fn number(name: &str, field: &str) -> Self {
        Self::new(name, AttrExpr::Number(field.to_string()))
    }
}
