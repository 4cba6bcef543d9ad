use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Dimensions, Range, Reader, Sheets};
use chrono::NaiveDate;

use crate::error::IngestError;
use crate::models::{CellRange, CellValue, SheetData, WorkbookModel};

/// 读取 Excel 工作簿（xlsx/xlsm/xls/xlsb/ods）
///
/// 合并单元格信息只有 xlsx 格式提供，其余格式合并列表为空。
pub fn parse_excel_bytes(bytes: Vec<u8>) -> Result<WorkbookModel, IngestError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|err| IngestError::UnreadableFile(format!("Excel文件读取失败: {err}")))?;

    if let Sheets::Xlsx(xlsx) = &mut workbook {
        xlsx.load_merged_regions()
            .map_err(|err| IngestError::UnreadableFile(format!("合并单元格读取失败: {err}")))?;
    }

    let names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());

    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|err| IngestError::UnreadableFile(format!("工作表 {name} 解析失败: {err}")))?;

        let merged = match &mut workbook {
            Sheets::Xlsx(xlsx) => xlsx
                .worksheet_merge_cells(&name)
                .unwrap_or(Ok(Vec::new()))
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        sheets.push(convert_sheet(name, &range, &merged));
    }

    Ok(WorkbookModel::new(sheets))
}

fn convert_sheet(name: String, range: &Range<Data>, merged: &[Dimensions]) -> SheetData {
    let mut sheet = SheetData::new(name);

    if let (Some(start), Some(end)) = (range.start(), range.end()) {
        sheet.range = Some(CellRange::new(start, end));
        for (row_offset, row) in range.rows().enumerate() {
            for (col_offset, cell) in row.iter().enumerate() {
                let value = data_to_cell(cell);
                if value != CellValue::Empty {
                    sheet.set(start.0 + row_offset as u32, start.1 + col_offset as u32, value);
                }
            }
        }
    }

    sheet.merged = merged
        .iter()
        .map(|dims| CellRange::new(dims.start, dims.end))
        .collect();
    sheet
}

fn data_to_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Bool(v) => CellValue::Number(if *v { 1.0 } else { 0.0 }),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => CellValue::Date(datetime.date()),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::Error(_) => CellValue::Empty,
        _ => CellValue::Text(cell.to_string()),
    }
}
