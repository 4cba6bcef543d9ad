use csv::ReaderBuilder;

use crate::error::IngestError;
use crate::models::{CellValue, SheetData, WorkbookModel};

/// CSV 作为只有一个工作表的工作簿读取，表名取文件名（不含扩展名）
pub fn parse_csv_bytes(sheet_name: &str, bytes: &[u8]) -> Result<WorkbookModel, IngestError> {
    let bytes = bytes.strip_prefix("\u{FEFF}".as_bytes()).unwrap_or(bytes);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| IngestError::UnreadableFile(format!("CSV解析失败: {err}")))?;
        let row: Vec<CellValue> = record
            .iter()
            .map(parse_cell)
            .collect();
        rows.push(row);
    }

    Ok(WorkbookModel::new(vec![SheetData::from_rows(sheet_name, rows)]))
}

/// 数值文本按 Excel 的方式读成数字；带前导零的编号保留为文本
fn parse_cell(cell: &str) -> CellValue {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    let leading_zero = trimmed.len() > 1 && trimmed.starts_with('0') && !trimmed.starts_with("0.");
    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() && !leading_zero => CellValue::Number(number),
        _ => CellValue::Text(cell.to_string()),
    }
}
