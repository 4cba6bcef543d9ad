use serde::{Deserialize, Serialize};

use crate::matchers::{any_matches, Predicate};
use crate::models::{format_number, CellValue};
use crate::utils::text::leading_number;

/// 规格字符串的分隔符
const SPEC_SEPARATORS: [char; 4] = ['*', '×', 'x', 'X'];

/// 数值强制转换：空值或无法解析时为 0
pub fn to_number(value: &CellValue) -> f64 {
    let number = match value {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(0.0)
            }
        }
        CellValue::Empty | CellValue::Date(_) => 0.0,
    };

    if number.is_finite() {
        number
    } else {
        0.0
    }
}

pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// 保留三位小数
pub fn round_money(value: &CellValue) -> f64 {
    round3(to_number(value))
}

/// 保留三位小数，负数归零
pub fn round_money_clamped(value: &CellValue) -> f64 {
    round3(to_number(value).max(0.0))
}

/// 单元格数值的读取策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberPolicy {
    #[serde(default)]
    pub clamp_negative: bool,
}

impl NumberPolicy {
    pub const CLAMPED: NumberPolicy = NumberPolicy {
        clamp_negative: true,
    };

    pub fn apply(&self, value: &CellValue) -> f64 {
        if self.clamp_negative {
            round_money_clamped(value)
        } else {
            round_money(value)
        }
    }
}

/// 状态命中任一谓词时返回数量，否则为 0
pub fn status_gate(status: &str, predicates: &[Predicate], quantity: f64) -> f64 {
    if any_matches(status, predicates) {
        quantity
    } else {
        0.0
    }
}

/// 由厚、宽、长拼出规格描述 "t*w*l"
pub fn spec_from_parts(thickness: &CellValue, width: &CellValue, length: &CellValue) -> String {
    format!(
        "{}*{}*{}",
        thickness.display(),
        width.display(),
        length.display()
    )
}

/// 拆分规格描述为三个数值；无法解析的部分为 0，不是恰好三段时整体为 0
pub fn split_spec(spec: &str) -> [f64; 3] {
    let parts: Vec<&str> = spec.split(&SPEC_SEPARATORS[..]).collect();
    let mut dims = [0.0; 3];
    if parts.len() != 3 {
        return dims;
    }
    for (slot, part) in dims.iter_mut().zip(parts) {
        *slot = leading_number(part.trim()).unwrap_or(0.0);
    }
    dims
}

/// 规范化规格首段的数字（"08.0*1500*6000" → "8*1500*6000"）
pub fn normalize_spec(spec: &str) -> String {
    let mut parts = spec.split('*');
    let first = parts.next().unwrap_or_default();
    let head = match leading_number(first.trim()) {
        Some(number) => format_number(number),
        None => first.to_string(),
    };

    std::iter::once(head)
        .chain(parts.map(str::to_string))
        .collect::<Vec<_>>()
        .join("*")
}
