//! 沙钢：单行表头，合约号中 "K5" 之后一位为月份（A/B/C 表示 10-12 月）。

use super::{names, same_fields, DockRule, MonthRule, SheetPlan, SheetSelector, VendorProfile};
use crate::models::Metric;
use crate::parsers::header::HeaderWindow;
use crate::processors::month::MonthMode;
use crate::processors::normalizer::NumberPolicy;
use crate::processors::rules::{AttrExpr, AttrRule, DerivationRule, Expr};

pub fn profile() -> VendorProfile {
    VendorProfile {
        id: "shagang".to_string(),
        name: "沙钢".to_string(),
        plans: vec![SheetPlan {
            label: "沙钢".to_string(),
            selector: SheetSelector::Index(0),
            required: true,
            header: HeaderWindow::single(0),
            data_start: 1,
            schema: same_fields(&[
                "合同号",
                "合约号",
                "码头",
                "厚度(MM)",
                "最大宽度(MM)",
                "最大长度(MM)",
                "钢级牌号",
                "可编计划量",
                "计划释放量",
                "出厂量",
                "组板欠量",
                "轧机在库量",
                "轧机欠量",
            ]),
            required_values: names(&["合同号", "合约号", "码头"]),
            month: MonthRule::new(
                "合约号",
                vec![MonthMode::CodeMarker {
                    marker: "K5".to_string(),
                    letters: "ABC".to_string(),
                }],
            ),
            dock: DockRule::field("码头"),
            numbers: NumberPolicy::default(),
            metrics: vec![
                DerivationRule::new(Metric::Inspected, Expr::field("可编计划量")),
                DerivationRule::new(Metric::Unstaged, Expr::field("计划释放量")),
                DerivationRule::new(Metric::Shipped, Expr::field("出厂量")),
                DerivationRule::new(Metric::Unsmelted, Expr::field("组板欠量")),
                DerivationRule::new(
                    Metric::Unrolled,
                    Expr::sum([Expr::field("轧机在库量"), Expr::field("轧机欠量")]),
                ),
            ],
            attributes: vec![
                AttrRule::new("月份显示", AttrExpr::MonthLabel),
                AttrRule::text("合同号", "合同号"),
                AttrRule::text("合约号", "合约号"),
                AttrRule::number("厚度", "厚度(MM)"),
                AttrRule::number("最大宽度", "最大宽度(MM)"),
                AttrRule::number("最大长度", "最大长度(MM)"),
                AttrRule::text("钢级牌号", "钢级牌号"),
            ],
            join: None,
            probe_first_row: true,
            no_data_hint: Some("合约号格式不匹配".to_string()),
        }],
    }
}
