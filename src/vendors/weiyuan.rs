//! 威远：表头按包含匹配，月份取合同编号第三段的前两位（"25XSH-SJ-2C043" → 2 月）。

use super::{names, DockRule, MonthRule, SheetPlan, SheetSelector, VendorProfile};
use crate::models::Metric;
use crate::parsers::binding::{FieldSpec, MatchMode};
use crate::parsers::header::HeaderWindow;
use crate::processors::month::MonthMode;
use crate::processors::normalizer::NumberPolicy;
use crate::processors::rules::{AttrExpr, AttrRule, DerivationRule, Expr};

const FIELDS: [&str; 12] = [
    "合同编号",
    "已发货量",
    "已炼钢",
    "已轧钢",
    "已船检",
    "已集港",
    "码头",
    "订单钢种",
    "订单厚度",
    "订单宽度",
    "订单长度",
    "单重",
];

pub fn profile() -> VendorProfile {
    VendorProfile {
        id: "weiyuan".to_string(),
        name: "威远".to_string(),
        plans: vec![SheetPlan {
            label: "威远".to_string(),
            selector: SheetSelector::Index(0),
            required: true,
            header: HeaderWindow::single(0),
            data_start: 1,
            schema: FIELDS
                .iter()
                .map(|name| FieldSpec::same(name).with_mode(MatchMode::Contains))
                .collect(),
            required_values: names(&["合同编号"]),
            month: MonthRule::new(
                "合同编号",
                vec![MonthMode::CodeSegment {
                    separator: "-".to_string(),
                    index: 2,
                    take: 2,
                }],
            ),
            dock: DockRule::field_or("码头", "未知码头"),
            numbers: NumberPolicy::default(),
            metrics: vec![
                // 已发运 = 单重 × 已发货量
                DerivationRule::new(
                    Metric::Shipped,
                    Expr::mul(Expr::field("单重"), Expr::field("已发货量")),
                ),
                DerivationRule::new(Metric::Smelted, Expr::field("已炼钢")),
                DerivationRule::new(Metric::Rolled, Expr::field("已轧钢")),
                DerivationRule::new(Metric::Inspected, Expr::field("已船检")),
                DerivationRule::new(Metric::Staged, Expr::field("已集港")),
            ],
            attributes: vec![
                AttrRule::new("月份显示", AttrExpr::MonthLabel),
                AttrRule::text("合同编号", "合同编号"),
                AttrRule::text("订单钢种", "订单钢种"),
                AttrRule::new(
                    "规格描述",
                    AttrExpr::Spec {
                        thickness: "订单厚度".to_string(),
                        width: "订单宽度".to_string(),
                        length: "订单长度".to_string(),
                    },
                ),
            ],
            join: None,
            probe_first_row: false,
            no_data_hint: Some("合同编号格式不匹配".to_string()),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IngestConfig;
    use crate::ingest::ingest_workbook;
    use crate::models::{CellValue, Quantity, SheetData, WorkbookModel};

    fn t(value: &str) -> CellValue {
        CellValue::text(value)
    }

    fn n(value: f64) -> CellValue {
        CellValue::Number(value)
    }

    fn row(contract: &str, dock: CellValue, shipped_count: f64, unit_weight: f64) -> Vec<CellValue> {
        vec![
            t(contract),
            n(shipped_count),
            n(1.0),
            n(2.0),
            n(3.0),
            n(4.0),
            dock,
            t("Q355B"),
            n(8.0),
            n(1500.0),
            t(""),
            n(unit_weight),
        ]
    }

    #[test]
    fn test_contains_headers_and_weighted_shipping() {
        // 表头带单位、全角括号和空格
        let header = vec![
            t("合同编号"),
            t("已发货量（件）"),
            t("已炼钢(吨)"),
            t("已 轧钢"),
            t("已船检"),
            t("已集港"),
            t("码头"),
            t("订单钢种"),
            t("订单厚度"),
            t("订单宽度"),
            t("订单长度"),
            t("单重(吨)"),
        ];
        let sheet = SheetData::from_rows(
            "Sheet1",
            vec![
                header,
                row("25XSH-SJ-2C043", t("上海"), 3.0, 1.25),
                row("25XSH-SJ-2C044", CellValue::Empty, 2.0, 0.5),
                row("25XSH-SJ", t("上海"), 1.0, 1.0),
            ],
        );

        let result = ingest_workbook(&profile(), &WorkbookModel::new(vec![sheet]), &IngestConfig::default());
        assert!(result.success);

        let shanghai = result.summary.get(2, "上海").unwrap();
        assert_eq!(shanghai.get(Metric::Shipped), Quantity::from_f64(3.75));
        assert_eq!(shanghai.get(Metric::Rolled), Quantity::from_f64(2.0));

        let unknown = result.summary.get(2, "未知码头").unwrap();
        assert_eq!(unknown.get(Metric::Shipped), Quantity::from_f64(1.0));

        // 没有第三段，无法取月份
        assert_eq!(result.sheets[0].invalid_rows, 1);
        assert_eq!(result.details[0].attributes["规格描述"], "8*1500*");
    }
}
