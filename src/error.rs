use thiserror::Error;

use crate::models::{AppError, ErrorKind};

/// 导入过程中的内部错误
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("无法读取文件: {0}")]
    UnreadableFile(String),

    #[error("工作表 {sheet} 无效，缺少范围定义")]
    MalformedSheet { sheet: String },

    #[error("工作表 {sheet} 找不到列: {}", .missing.join(", "))]
    SchemaMismatch { sheet: String, missing: Vec<String> },

    #[error("工作表 {sheet} 无有效数据处理。可能原因: 1. 数据起始行设置错误 2. 关键字段值为空 3. {hint}")]
    NoDataProcessed { sheet: String, hint: String },

    #[error("第{row}行 {field} 无效: {value}")]
    InvalidRowField {
        row: u32,
        field: String,
        value: String,
    },

    #[error("找不到工作表: {wanted}（现有: {}）", .available.join(", "))]
    MissingSheet {
        wanted: String,
        available: Vec<String>,
    },

    #[error("未知的供应商: {0}")]
    UnknownVendor(String),

    #[error("配置错误: {0}")]
    Config(String),
}

impl IngestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestError::UnreadableFile(_) => ErrorKind::UnreadableFile,
            IngestError::MalformedSheet { .. } => ErrorKind::MalformedSheet,
            IngestError::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
            IngestError::NoDataProcessed { .. } => ErrorKind::NoDataProcessed,
            IngestError::InvalidRowField { .. } => ErrorKind::InvalidRowField,
            IngestError::MissingSheet { .. } => ErrorKind::MissingSheet,
            IngestError::UnknownVendor(_) => ErrorKind::UnknownVendor,
            IngestError::Config(_) => ErrorKind::Config,
        }
    }

    /// 界面返回用的结构化错误
    pub fn to_app_error(&self) -> AppError {
        let mut error = AppError::new(self.kind(), self.to_string());
        match self {
            IngestError::MalformedSheet { sheet } | IngestError::NoDataProcessed { sheet, .. } => {
                error.sheet = Some(sheet.clone());
            }
            IngestError::SchemaMismatch { sheet, missing } => {
                error.sheet = Some(sheet.clone());
                error.missing = missing.clone();
            }
            IngestError::MissingSheet { wanted, .. } => {
                error.missing = vec![wanted.clone()];
            }
            _ => {}
        }
        error
    }
}

impl From<IngestError> for AppError {
    fn from(error: IngestError) -> Self {
        error.to_app_error()
    }
}
