pub mod binding;
mod csv;
mod excel;
pub mod extractor;
pub mod header;

use std::path::Path;

use crate::error::IngestError;
use crate::models::WorkbookModel;

/// 按文件扩展名选择读取方式
///
/// # 参数
/// * `file_name` - 文件名（只用于判断格式和 CSV 表名）
/// * `bytes` - 文件内容
pub fn read_workbook_bytes(file_name: &str, bytes: Vec<u8>) -> Result<WorkbookModel, IngestError> {
    let path = Path::new(file_name);
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => {
            let stem = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("Sheet1");
            csv::parse_csv_bytes(stem, &bytes)
        }
        // 没有扩展名时按 Excel 尝试
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" | "" => excel::parse_excel_bytes(bytes),
        other => Err(IngestError::UnreadableFile(format!(
            "不支持的文件格式: {other}"
        ))),
    }
}
