//! 按供应商方案处理工作簿：逐表绑定、提取，再汇总为一个结果。

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::models::{
    AppError, Diagnostic, ErrorKind, IngestResult, Severity, SheetData, SheetReport, WorkbookModel,
};
use crate::parsers::binding::bind;
use crate::parsers::extractor::{build_join_table, extract_rows, Extraction, JoinTable};
use crate::parsers::header::resolve_columns;
use crate::summary::aggregate;
use crate::vendors::{JoinPlan, SheetPlan, VendorProfile};

const DEFAULT_NO_DATA_HINT: &str = "日期格式不匹配";

/// 处理单个工作表方案，错误记录在报告里，不向外传播
pub fn run_plan(plan: &SheetPlan, workbook: &WorkbookModel, config: &IngestConfig) -> Extraction {
    let Some(sheet) = plan.selector.find(workbook) else {
        let mut report = SheetReport::new(&plan.label);
        if plan.required {
            let error = IngestError::MissingSheet {
                wanted: plan.selector.describe(),
                available: workbook.sheet_names(),
            };
            warn!(plan = %plan.label, "{error}");
            report.error = Some(error.into());
        } else {
            info!(plan = %plan.label, "工作表不存在，跳过");
            report.diagnostics.push(Diagnostic::info(
                &plan.label,
                format!("未找到工作表 {}，已跳过", plan.selector.describe()),
            ));
        }
        return Extraction {
            records: Vec::new(),
            report,
        };
    };

    match extract_sheet(plan, sheet, workbook, config) {
        Ok(extraction) => extraction,
        Err(error) => {
            warn!(plan = %plan.label, sheet = %sheet.name, "{error}");
            let mut report = SheetReport::new(&plan.label);
            report.sheet_name = Some(sheet.name.clone());
            report.error = Some(error.into());
            Extraction {
                records: Vec::new(),
                report,
            }
        }
    }
}

fn extract_sheet(
    plan: &SheetPlan,
    sheet: &SheetData,
    workbook: &WorkbookModel,
    config: &IngestConfig,
) -> Result<Extraction, IngestError> {
    let columns = resolve_columns(sheet, plan.header)?;
    let binding = bind(&sheet.name, &columns, &plan.schema)?;
    let lookup = plan
        .join
        .as_ref()
        .map(|join| load_join_table(join, workbook))
        .transpose()?;

    let mut extraction = extract_rows(sheet, plan, &binding, lookup.as_ref(), config.max_row_diagnostics);

    if extraction.records.is_empty() {
        let error = IngestError::NoDataProcessed {
            sheet: sheet.name.clone(),
            hint: plan
                .no_data_hint
                .clone()
                .unwrap_or_else(|| DEFAULT_NO_DATA_HINT.to_string()),
        };
        warn!(plan = %plan.label, "{error}");
        extraction.report.error = Some(error.into());
    }

    Ok(extraction)
}

fn load_join_table(join: &JoinPlan, workbook: &WorkbookModel) -> Result<JoinTable, IngestError> {
    let sheet = join
        .selector
        .find(workbook)
        .ok_or_else(|| IngestError::MissingSheet {
            wanted: join.selector.describe(),
            available: workbook.sheet_names(),
        })?;
    let columns = resolve_columns(sheet, join.header)?;
    let binding = bind(&sheet.name, &columns, &join.schema)?;
    build_join_table(sheet, join, &binding)
}

/// 依次处理全部工作表
pub fn ingest_workbook(profile: &VendorProfile, workbook: &WorkbookModel, config: &IngestConfig) -> IngestResult {
    let extractions = profile
        .plans
        .iter()
        .map(|plan| run_plan(plan, workbook, config))
        .collect();
    assemble(profile, extractions)
}

/// 每个工作表在阻塞线程池中并行处理，结果按方案顺序合并
pub async fn ingest_workbook_parallel(
    profile: Arc<VendorProfile>,
    workbook: Arc<WorkbookModel>,
    config: &IngestConfig,
) -> IngestResult {
    let handles: Vec<_> = (0..profile.plans.len())
        .map(|index| {
            let profile = Arc::clone(&profile);
            let workbook = Arc::clone(&workbook);
            let config = config.clone();
            tokio::task::spawn_blocking(move || run_plan(&profile.plans[index], &workbook, &config))
        })
        .collect();

    let mut extractions = Vec::with_capacity(handles.len());
    for (plan, handle) in profile.plans.iter().zip(handles) {
        let extraction = match handle.await {
            Ok(extraction) => extraction,
            Err(err) => {
                warn!(plan = %plan.label, "工作表处理中断: {err}");
                let mut report = SheetReport::new(&plan.label);
                report.error = Some(AppError::new(
                    ErrorKind::MalformedSheet,
                    format!("工作表处理中断: {err}"),
                ));
                Extraction {
                    records: Vec::new(),
                    report,
                }
            }
        };
        extractions.push(extraction);
    }

    assemble(&profile, extractions)
}

/// 合并各表的明细并汇总
///
/// 有任一行被接受即为成功，各表错误降为警告；全部失败时，错误消息列出每张表的原因。
fn assemble(profile: &VendorProfile, extractions: Vec<Extraction>) -> IngestResult {
    let mut records = Vec::new();
    let mut sheets = Vec::with_capacity(extractions.len());
    let mut warnings = Vec::new();
    let mut failures = Vec::new();
    let mut errors: Vec<AppError> = Vec::new();

    for extraction in extractions {
        let report = extraction.report;
        if let Some(error) = &report.error {
            let line = format!("{}: {}", report.label, error.message);
            warnings.push(line.clone());
            failures.push(line);
            errors.push(error.clone());
        }
        if report.invalid_rows > 0 {
            warnings.push(format!(
                "{}: {} 行月份无法识别，已跳过",
                report.label, report.invalid_rows
            ));
        }
        warnings.extend(
            report
                .diagnostics
                .iter()
                .filter(|d| d.severity == Severity::Warning && d.row.is_none())
                .map(|d| format!("{}: {}", report.label, d.message)),
        );
        records.extend(extraction.records);
        sheets.push(report);
    }

    let metrics = profile.metrics();

    if records.is_empty() {
        let reason = if failures.is_empty() {
            "未找到可处理的工作表".to_string()
        } else {
            failures.join("；")
        };
        let mut error = errors
            .first()
            .cloned()
            .unwrap_or_else(|| AppError::new(ErrorKind::NoDataProcessed, reason.clone()));
        error.message = reason.clone();
        error.missing = errors
            .iter()
            .flat_map(|e| e.missing.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if errors.len() > 1 {
            error.sheet = None;
        }

        warn!(vendor = %profile.id, "导入失败: {reason}");
        return IngestResult {
            success: false,
            vendor: profile.id.clone(),
            summary: Default::default(),
            details: Vec::new(),
            metrics,
            sheets,
            warnings,
            message: Some(format!("处理失败: {reason}")),
            error: Some(error),
        };
    }

    let aggregation = aggregate(records, &metrics);
    info!(
        vendor = %profile.id,
        records = aggregation.details.len(),
        months = aggregation.summary.0.len(),
        warnings = warnings.len(),
        "导入完成"
    );

    IngestResult {
        success: true,
        vendor: profile.id.clone(),
        summary: aggregation.summary,
        details: aggregation.details,
        metrics,
        sheets,
        warnings,
        message: None,
        error: None,
    }
}
