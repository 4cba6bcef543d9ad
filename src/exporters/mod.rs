pub mod csv;

use crate::models::{AppError, ErrorKind, IngestResult};

/// 按指定格式导出导入结果
///
/// # 参数
/// * `result` - 导入结果
/// * `format` - `json` / `summary-csv` / `details-csv`（不区分大小写）
pub fn export_result(result: &IngestResult, format: &str) -> Result<String, AppError> {
    match format.trim().to_lowercase().as_str() {
        "json" => serde_json::to_string_pretty(result)
            .map_err(|e| AppError::new(ErrorKind::Export, format!("JSON 序列化错误: {}", e))),
        "summary-csv" | "summary" => csv::export_summary_csv(result),
        "details-csv" | "details" => csv::export_details_csv(result),
        other => Err(AppError::new(
            ErrorKind::Export,
            format!("不支持的导出格式: {}", other),
        )),
    }
}
