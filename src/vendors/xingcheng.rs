//! 兴澄：单行表头，没有码头列，全部归入"全部"。

use super::{names, same_fields, DockRule, MonthRule, SheetPlan, SheetSelector, VendorProfile};
use crate::models::Metric;
use crate::parsers::header::HeaderWindow;
use crate::processors::month::MonthMode;
use crate::processors::normalizer::NumberPolicy;
use crate::processors::rules::{AttrExpr, AttrRule, DerivationRule, Expr};

pub const ALL_DOCKS: &str = "全部";

pub fn profile() -> VendorProfile {
    VendorProfile {
        id: "xingcheng".to_string(),
        name: "兴澄".to_string(),
        plans: vec![SheetPlan {
            label: "兴澄".to_string(),
            selector: SheetSelector::Index(0),
            required: true,
            header: HeaderWindow::single(0),
            data_start: 1,
            schema: same_fields(&[
                "月份",
                "标准",
                "订货厚度",
                "订货宽度",
                "订货长度",
                "炼钢下线量",
                "轧钢下线量",
                "入库量",
                "合同备注",
                "发货重量",
                "书面合同号",
            ]),
            required_values: names(&["月份", "标准", "书面合同号"]),
            month: MonthRule::new("月份", vec![MonthMode::Literal, MonthMode::anchored_text()]),
            dock: DockRule::Constant(ALL_DOCKS.to_string()),
            numbers: NumberPolicy::default(),
            metrics: vec![
                DerivationRule::new(Metric::Smelted, Expr::field("炼钢下线量")),
                DerivationRule::new(Metric::Rolled, Expr::field("轧钢下线量")),
                DerivationRule::new(Metric::Inspected, Expr::field("入库量")),
                DerivationRule::new(Metric::Staged, Expr::field("入库量")),
                DerivationRule::new(Metric::Shipped, Expr::field("发货重量")),
            ],
            attributes: vec![
                AttrRule::new("月份显示", AttrExpr::MonthLabel),
                AttrRule::text("标准", "标准"),
                AttrRule::text("书面合同号", "书面合同号"),
                AttrRule::number("订货厚度", "订货厚度"),
                AttrRule::number("订货宽度", "订货宽度"),
                AttrRule::number("订货长度", "订货长度"),
                AttrRule::new(
                    "合同备注",
                    AttrExpr::Cleaned {
                        field: "合同备注".to_string(),
                        remove: vec!["入库按合约号堆放".to_string(), ",".to_string()],
                    },
                ),
                AttrRule::text("原始月份", "月份"),
            ],
            join: None,
            probe_first_row: true,
            no_data_hint: Some("月份格式不匹配".to_string()),
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

    fn row(month: CellValue, remark: &str, shipped: f64) -> Vec<CellValue> {
        vec![
            month,
            t("GB/T 700"),
            n(10.0),
            n(1500.0),
            n(6000.0),
            n(2.0),
            n(1.5),
            n(1.0),
            t(remark),
            n(shipped),
            t("XC-001"),
        ]
    }

    #[test]
    fn test_constant_dock_and_remark_cleanup() {
        let header = [
            "月份", "标准", "订货厚度", "订货宽度", "订货长度", "炼钢下线量", "轧钢下线量", "入库量", "合同备注",
            "发货重量", "书面合同号",
        ];
        let sheet = SheetData::from_rows(
            "Sheet1",
            vec![
                header.iter().map(|h| t(h)).collect(),
                row(n(6.0), "入库按合约号堆放,急单", 0.5),
                row(t("6月"), "", 0.25),
                row(t("下月"), "", 9.0),
            ],
        );

        let result = ingest_workbook(&profile(), &WorkbookModel::new(vec![sheet]), &IngestConfig::default());
        assert!(result.success);

        let june = result.summary.get(6, ALL_DOCKS).unwrap();
        assert_eq!(june.contract_count, 2);
        assert_eq!(june.get(Metric::Smelted), Quantity::from_f64(4.0));
        assert_eq!(june.get(Metric::Staged), june.get(Metric::Inspected));
        assert_eq!(june.get(Metric::Shipped), Quantity::from_f64(0.75));
        assert_eq!(result.sheets[0].invalid_rows, 1);

        assert_eq!(result.details[0].attributes["合同备注"], "急单");
        assert_eq!(result.details[0].attributes["原始月份"], "6");
        assert_eq!(result.details[1].attributes["原始月份"], "6月");
    }
}
