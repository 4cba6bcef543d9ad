use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::IngestError;
use crate::models::{Column, SheetData};

/// 多级表头的路径分隔符
pub const PATH_SEPARATOR: &str = " > ";

/// 表头行窗口（0 起始，连续 depth 行）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderWindow {
    pub first_row: u32,
    pub depth: u32,
}

impl HeaderWindow {
    pub fn single(row: u32) -> Self {
        Self {
            first_row: row,
            depth: 1,
        }
    }

    pub fn rows(first_row: u32, depth: u32) -> Self {
        Self { first_row, depth }
    }

    pub fn last_row(&self) -> u32 {
        self.first_row + self.depth.max(1) - 1
    }

    pub fn contains(&self, row: u32) -> bool {
        row >= self.first_row && row <= self.last_row()
    }
}

/// 解析表头窗口，返回按列顺序排列的列定义
///
/// 起点位于窗口内的合并区域，会把左上角的值复制到窗口内被覆盖的每个单元格。
///
/// # 参数
/// * `sheet` - 工作表
/// * `window` - 表头行窗口
///
/// # 返回
/// 列定义列表；工作表没有范围定义时返回 `MalformedSheet`
pub fn resolve_columns(sheet: &SheetData, window: HeaderWindow) -> Result<Vec<Column>, IngestError> {
    let range = sheet.range.ok_or_else(|| IngestError::MalformedSheet {
        sheet: sheet.name.clone(),
    })?;

    let first_col = range.start_col;
    let width = (range.end_col - range.start_col + 1) as usize;

    let mut labels: Vec<Vec<String>> = (window.first_row..=window.last_row())
        .map(|row| {
            (first_col..=range.end_col)
                .map(|col| sheet.cell(row, col).display())
                .collect()
        })
        .collect();

    for merge in &sheet.merged {
        if !window.contains(merge.start_row) {
            continue;
        }
        let value = sheet.cell(merge.start_row, merge.start_col).display();
        for row in merge.start_row..=merge.end_row.min(window.last_row()) {
            let row_labels = &mut labels[(row - window.first_row) as usize];
            for col in merge.start_col.max(first_col)..=merge.end_col.min(range.end_col) {
                row_labels[(col - first_col) as usize] = value.clone();
            }
        }
    }

    let columns: Vec<Column> = (0..width)
        .map(|offset| {
            let levels: Vec<String> = labels.iter().map(|row| row[offset].clone()).collect();
            let path: Vec<String> = levels.iter().filter(|l| !l.is_empty()).cloned().collect();
            Column {
                index: first_col + offset as u32,
                full_path: path.join(PATH_SEPARATOR),
                path,
                levels,
            }
        })
        .collect();

    debug!(
        sheet = %sheet.name,
        columns = columns.len(),
        merges = sheet.merged.len(),
        "表头解析完成"
    );

    Ok(columns)
}
