//! 中船：第一个工作表，三行合并表头，按签订日期取月份。

use super::{names, stacked, weight, DockRule, MonthRule, SheetPlan, SheetSelector, VendorProfile};
use crate::models::Metric;
use crate::parsers::binding::FieldSpec;
use crate::parsers::header::HeaderWindow;
use crate::processors::month::MonthMode;
use crate::processors::normalizer::NumberPolicy;
use crate::processors::rules::{AttrExpr, AttrRule, DerivationRule, Expr};

pub fn profile() -> VendorProfile {
    VendorProfile {
        id: "zhongchuan".to_string(),
        name: "中船".to_string(),
        plans: vec![SheetPlan {
            label: "中船".to_string(),
            selector: SheetSelector::Index(0),
            required: true,
            header: HeaderWindow::rows(2, 3),
            data_start: 5,
            schema: vec![
                FieldSpec::new("合同号", &stacked("合同号")),
                FieldSpec::new("牌号/材质代码", &stacked("牌号/材质代码")),
                FieldSpec::new("尺寸", &stacked("尺寸")),
                FieldSpec::same("签订日期"),
                FieldSpec::same("码头"),
                FieldSpec::new("未炼钢", &weight("坯料设计", "未计划")),
                FieldSpec::new("已轧制", &weight("轧钢完成", "轧钢完成")),
                FieldSpec::new("成品在库", &weight("成品在库", "成品在库")),
                FieldSpec::new("出库结束", &weight("出库结束", "出库结束")),
                FieldSpec::new("发运", &weight("发运", "发运")),
            ],
            required_values: names(&["码头"]),
            month: MonthRule::new("签订日期", vec![MonthMode::Date, MonthMode::search_text()]),
            dock: DockRule::field("码头"),
            numbers: NumberPolicy::CLAMPED,
            metrics: vec![
                DerivationRule::new(Metric::Unsmelted, Expr::field("未炼钢")),
                DerivationRule::new(Metric::Rolled, Expr::field("已轧制")),
                DerivationRule::new(Metric::InStock, Expr::field("成品在库")),
                DerivationRule::new(Metric::Outbound, Expr::field("出库结束")),
                DerivationRule::new(Metric::Shipped, Expr::field("发运")),
            ],
            attributes: vec![
                AttrRule::text("合同号", "合同号"),
                AttrRule::text("牌号材质代码", "牌号/材质代码"),
                AttrRule::text("尺寸", "尺寸"),
                AttrRule::new("签订日期", AttrExpr::DateText("签订日期".to_string())),
                AttrRule::new("原始行号", AttrExpr::SourceRow),
            ],
            join: None,
            probe_first_row: false,
            no_data_hint: None,
        }],
    }
}
