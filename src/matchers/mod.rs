pub mod helpers;

use serde::{Deserialize, Serialize};

pub use helpers::{any_matches, predicate_matches};

/// 状态文本的匹配条件（大小写不敏感，目标先去除首尾空白）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "match", rename_all = "snake_case")]
pub enum Predicate {
    Equals { value: String },
    Contains { value: String },
    StartsWith { value: String },
    /// 全部子条件同时成立
    All { of: Vec<Predicate> },
}

impl Predicate {
    pub fn equals(value: impl Into<String>) -> Self {
        Predicate::Equals {
            value: value.into(),
        }
    }

    pub fn contains(value: impl Into<String>) -> Self {
        Predicate::Contains {
            value: value.into(),
        }
    }

    pub fn starts_with(value: impl Into<String>) -> Self {
        Predicate::StartsWith {
            value: value.into(),
        }
    }
}
