use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use super::binding::ColumnBinding;
use crate::error::IngestError;
use crate::models::{CellValue, Diagnostic, FactRecord, Quantity, SheetData, SheetReport};
use crate::processors::rules::RowView;
use crate::vendors::{JoinPlan, SheetPlan};

/// 关联表中的一行（字段名 → 值）
pub type JoinedRow = HashMap<String, CellValue>;

/// 关联查找表，键相同时后出现的行覆盖前面的行
#[derive(Debug, Clone, Default)]
pub struct JoinTable {
    rows: HashMap<String, JoinedRow>,
}

impl JoinTable {
    pub fn get(&self, key: &str) -> Option<&JoinedRow> {
        self.rows.get(key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 从关联表构建查找表
pub fn build_join_table(sheet: &SheetData, plan: &JoinPlan, binding: &ColumnBinding) -> Result<JoinTable, IngestError> {
    let range = sheet.range.ok_or_else(|| IngestError::MalformedSheet {
        sheet: sheet.name.clone(),
    })?;

    let mut table = JoinTable::default();
    for row in plan.data_start..=range.end_row {
        let view = RowView {
            sheet,
            row,
            binding,
            joined: None,
        };
        let key = view.text(&plan.key);
        if key.is_empty() {
            continue;
        }
        let values: JoinedRow = plan
            .schema
            .iter()
            .map(|field| (field.name.clone(), view.value(&field.name).clone()))
            .collect();
        table.rows.insert(key, values);
    }

    debug!(sheet = %sheet.name, keys = table.len(), "关联表构建完成");
    Ok(table)
}

/// 行提取结果
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub records: Vec<FactRecord>,
    pub report: SheetReport,
}

/// 逐行提取数据
///
/// 必填值为空或关联键无匹配的行静默跳过；月份无效的行跳过并记录诊断，不影响其余行。
pub fn extract_rows(
    sheet: &SheetData,
    plan: &SheetPlan,
    binding: &ColumnBinding,
    lookup: Option<&JoinTable>,
    max_row_diagnostics: usize,
) -> Extraction {
    let mut report = SheetReport::new(&plan.label);
    report.sheet_name = Some(sheet.name.clone());
    let mut records = Vec::new();

    let Some(last_row) = sheet.last_row() else {
        return Extraction { records, report };
    };

    if plan.probe_first_row {
        probe_first_row(sheet, plan, binding, &mut report);
    }

    for row in plan.data_start..=last_row {
        report.rows_scanned += 1;

        let joined = match (&plan.join, lookup) {
            (Some(join), Some(table)) => {
                let key = RowView {
                    sheet,
                    row,
                    binding,
                    joined: None,
                }
                .text(&join.local_key);
                match table.get(&key) {
                    Some(found) if !key.is_empty() => Some(found),
                    _ => {
                        report.rows_skipped += 1;
                        continue;
                    }
                }
            }
            _ => None,
        };

        let view = RowView {
            sheet,
            row,
            binding,
            joined,
        };

        if plan
            .required_values
            .iter()
            .any(|field| view.value(field).is_blank())
        {
            report.rows_skipped += 1;
            continue;
        }

        let Some(month) = plan.month.resolve(&view) else {
            let error = IngestError::InvalidRowField {
                row: view.excel_row(),
                field: plan.month.field.clone(),
                value: view.text(&plan.month.field),
            };
            warn!(sheet = %sheet.name, "{error}");
            report.invalid_rows += 1;
            if report.diagnostics.len() < max_row_diagnostics {
                report.diagnostics.push(Diagnostic::warning(
                    &plan.label,
                    Some(view.excel_row()),
                    format!("{error}，无法识别月份"),
                ));
            }
            continue;
        };

        let Some(dock) = plan.dock.resolve(&view) else {
            report.rows_skipped += 1;
            continue;
        };

        let metrics = plan
            .metrics
            .iter()
            .map(|rule| (rule.metric, Quantity::from_f64(rule.expr.eval(&view, plan.numbers))))
            .collect();

        let attributes: BTreeMap<String, String> = plan
            .attributes
            .iter()
            .map(|attr| (attr.name.clone(), attr.value.render(&view, month, plan.numbers)))
            .collect();

        records.push(FactRecord {
            month,
            dock,
            source: plan.label.clone(),
            row: view.excel_row(),
            metrics,
            attributes,
        });
        report.rows_accepted += 1;
    }

    debug!(
        sheet = %sheet.name,
        scanned = report.rows_scanned,
        accepted = report.rows_accepted,
        skipped = report.rows_skipped,
        invalid = report.invalid_rows,
        "数据行提取完成"
    );

    Extraction { records, report }
}

/// 首行数据缺少必填值时，多半是数据起始行设置错误
fn probe_first_row(sheet: &SheetData, plan: &SheetPlan, binding: &ColumnBinding, report: &mut SheetReport) {
    let view = RowView {
        sheet,
        row: plan.data_start,
        binding,
        joined: None,
    };
    let missing: Vec<&str> = plan
        .required_values
        .iter()
        .filter(|field| view.value(field).is_blank())
        .map(String::as_str)
        .collect();

    if !missing.is_empty() {
        let message = format!("首行数据缺失: {}，请确认数据起始行是否正确", missing.join(", "));
        warn!(sheet = %sheet.name, "{message}");
        report
            .diagnostics
            .push(Diagnostic::warning(&plan.label, None, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metric;
    use crate::parsers::binding::FieldSpec;
    use crate::parsers::header::HeaderWindow;
    use crate::processors::month::MonthMode;
    use crate::processors::normalizer::NumberPolicy;
    use crate::processors::rules::{AttrExpr, AttrRule, DerivationRule, Expr};
    use crate::vendors::{DockRule, MonthRule, SheetSelector};

    fn t(value: &str) -> CellValue {
        CellValue::text(value)
    }

    fn n(value: f64) -> CellValue {
        CellValue::Number(value)
    }

    fn plan() -> SheetPlan {
        SheetPlan {
            label: "测试".to_string(),
            selector: SheetSelector::Index(0),
            required: true,
            header: HeaderWindow::single(0),
            data_start: 1,
            schema: vec![FieldSpec::same("月份"), FieldSpec::same("码头"), FieldSpec::same("重量")],
            required_values: vec!["月份".to_string()],
            month: MonthRule::new("月份", vec![MonthMode::Literal, MonthMode::anchored_text()]),
            dock: DockRule::field("码头"),
            numbers: NumberPolicy::CLAMPED,
            metrics: vec![DerivationRule::new(Metric::Shipped, Expr::field("重量"))],
            attributes: vec![AttrRule::new("月份显示", AttrExpr::MonthLabel)],
            join: None,
            probe_first_row: true,
            no_data_hint: None,
        }
    }

    fn sheet() -> SheetData {
        SheetData::from_rows(
            "Sheet1",
            vec![
                vec![t("月份"), t("码头"), t("重量")],
                vec![n(3.0), t("A"), n(10.0)],
                vec![t("13月"), t("A"), n(1.0)],
                vec![CellValue::Empty, t("A"), n(1.0)],
                vec![t("4月"), CellValue::Empty, n(1.0)],
                vec![t("4月"), t(" B "), n(-2.5)],
            ],
        )
    }

    #[test]
    fn test_extract_counts_and_records() {
        let binding = ColumnBinding::from_pairs([("月份", 0), ("码头", 1), ("重量", 2)]);
        let extraction = extract_rows(&sheet(), &plan(), &binding, None, 10);

        assert_eq!(extraction.report.rows_scanned, 5);
        assert_eq!(extraction.report.rows_accepted, 2);
        assert_eq!(extraction.report.invalid_rows, 1);
        assert_eq!(extraction.report.rows_skipped, 2);
        assert_eq!(extraction.report.diagnostics.len(), 1);
        assert_eq!(extraction.report.diagnostics[0].row, Some(3));

        let first = &extraction.records[0];
        assert_eq!((first.month, first.dock.as_str(), first.row), (3, "A", 2));
        assert_eq!(first.metric(Metric::Shipped), Quantity::from_f64(10.0));
        assert_eq!(first.attributes["月份显示"], "3月");

        let second = &extraction.records[1];
        assert_eq!(second.dock, "B");
        assert_eq!(second.metric(Metric::Shipped), Quantity::ZERO);
    }

    #[test]
    fn test_row_diagnostics_are_capped_but_counted() {
        let binding = ColumnBinding::from_pairs([("月份", 0), ("码头", 1), ("重量", 2)]);
        let mut rows = vec![vec![t("月份"), t("码头"), t("重量")]];
        for _ in 0..5 {
            rows.push(vec![t("无效"), t("A"), n(1.0)]);
        }
        let sheet = SheetData::from_rows("Sheet1", rows);
        let extraction = extract_rows(&sheet, &plan(), &binding, None, 2);

        assert_eq!(extraction.report.invalid_rows, 5);
        assert_eq!(extraction.report.diagnostics.len(), 2);
        assert!(extraction.records.is_empty());
    }

    #[test]
    fn test_probe_reports_blank_first_row() {
        let binding = ColumnBinding::from_pairs([("月份", 0), ("码头", 1), ("重量", 2)]);
        let sheet = SheetData::from_rows(
            "Sheet1",
            vec![
                vec![t("月份"), t("码头"), t("重量")],
                vec![CellValue::Empty, CellValue::Empty, CellValue::Empty],
                vec![n(5.0), t("A"), n(1.0)],
            ],
        );
        let extraction = extract_rows(&sheet, &plan(), &binding, None, 10);

        assert_eq!(extraction.records.len(), 1);
        assert!(extraction.report.diagnostics[0].message.contains("首行数据缺失: 月份"));
    }

    #[test]
    fn test_join_lookup_last_row_wins() {
        let lookup_sheet = SheetData::from_rows(
            "执行中",
            vec![
                vec![t("钢厂资源号"), t("订货月")],
                vec![t("R1"), n(2.0)],
                vec![t("R1"), n(6.0)],
                vec![CellValue::Empty, n(7.0)],
            ],
        );
        let join = JoinPlan {
            label: "执行中".to_string(),
            selector: SheetSelector::Name("执行中".to_string()),
            header: HeaderWindow::single(0),
            data_start: 1,
            schema: vec![FieldSpec::same("钢厂资源号"), FieldSpec::same("订货月")],
            key: "钢厂资源号".to_string(),
            local_key: "资源号".to_string(),
        };
        let binding = ColumnBinding::from_pairs([("钢厂资源号", 0), ("订货月", 1)]);
        let table = build_join_table(&lookup_sheet, &join, &binding).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("R1").unwrap()["订货月"], n(6.0));
    }
}
