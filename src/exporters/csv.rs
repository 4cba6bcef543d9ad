use std::collections::BTreeSet;

use csv::WriterBuilder;

use crate::models::{AppError, ErrorKind, IngestResult, CONTRACT_COUNT_LABEL};

fn csv_error(message: String) -> AppError {
    AppError::new(ErrorKind::Export, message)
}

fn write_rows(rows: impl IntoIterator<Item = Vec<String>>) -> Result<String, AppError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    for row in rows {
        writer
            .write_record(&row)
            .map_err(|e| csv_error(format!("CSV 写入错误: {}", e)))?;
    }

    let data = writer
        .into_inner()
        .map_err(|e| csv_error(format!("CSV 缓冲区获取错误: {}", e)))?;

    let csv_string = String::from_utf8(data).map_err(|e| csv_error(format!("UTF-8 转换错误: {}", e)))?;

    // 加 UTF-8 BOM，Excel 直接打开不乱码
    Ok(format!("\u{FEFF}{}", csv_string))
}

/// 汇总表：每个（月份，码头）一行
pub fn export_summary_csv(result: &IngestResult) -> Result<String, AppError> {
    let mut header = vec!["月份".to_string(), "码头".to_string()];
    header.extend(result.metrics.iter().map(|metric| metric.label().to_string()));
    header.push(CONTRACT_COUNT_LABEL.to_string());

    let rows = result.summary.iter().map(|(month, dock, vector)| {
        let mut row = vec![month.to_string(), dock.to_string()];
        row.extend(result.metrics.iter().map(|metric| vector.get(*metric).to_string()));
        row.push(vector.contract_count.to_string());
        row
    });

    write_rows(std::iter::once(header).chain(rows))
}

/// 明细表：固定列 + 指标 + 全部明细属性（按名称排序）
pub fn export_details_csv(result: &IngestResult) -> Result<String, AppError> {
    let attributes: BTreeSet<&str> = result
        .details
        .iter()
        .flat_map(|record| record.attributes.keys().map(String::as_str))
        .collect();

    let mut header = vec![
        "月份".to_string(),
        "码头".to_string(),
        "来源".to_string(),
        "行号".to_string(),
    ];
    header.extend(result.metrics.iter().map(|metric| metric.label().to_string()));
    header.extend(attributes.iter().map(|name| name.to_string()));

    let rows = result.details.iter().map(|record| {
        let mut row = vec![
            record.month.to_string(),
            record.dock.clone(),
            record.source.clone(),
            record.row.to_string(),
        ];
        row.extend(result.metrics.iter().map(|metric| record.metric(*metric).to_string()));
        row.extend(
            attributes
                .iter()
                .map(|name| record.attributes.get(*name).cloned().unwrap_or_default()),
        );
        row
    });

    write_rows(std::iter::once(header).chain(rows))
}
