//! 常石：中船、特变两张表结构相同，结果合并。

use super::{names, stacked, weight, DockRule, MonthRule, SheetPlan, SheetSelector, VendorProfile};
use crate::models::Metric;
use crate::parsers::binding::FieldSpec;
use crate::parsers::header::HeaderWindow;
use crate::processors::month::MonthMode;
use crate::processors::normalizer::NumberPolicy;
use crate::processors::rules::{AttrExpr, AttrRule, DerivationRule, Expr};

pub fn profile() -> VendorProfile {
    VendorProfile {
        id: "changshi".to_string(),
        name: "常石".to_string(),
        plans: vec![plan("中船"), plan("特变")],
    }
}

fn plan(sheet: &str) -> SheetPlan {
    SheetPlan {
        label: sheet.to_string(),
        selector: SheetSelector::Name(sheet.to_string()),
        required: false,
        header: HeaderWindow::rows(2, 3),
        data_start: 5,
        schema: vec![
            FieldSpec::new("合同号", &stacked("合同号")),
            FieldSpec::new("牌号/材质代码", &stacked("牌号/材质代码")),
            FieldSpec::new("尺寸", &stacked("尺寸")),
            FieldSpec::new("签订日期", &stacked("签订日期")),
            FieldSpec::new("码头", &stacked("码头")),
            FieldSpec::new("订单量", &weight("订单量", "订单量")),
            FieldSpec::new("未计划重量", &weight("坯料设计", "未计划")),
            FieldSpec::new("待炼量", &weight("坯料进程", "待炼量")),
            FieldSpec::new("钢坯待出库", &weight("坯料进程", "钢坯待出库")),
            FieldSpec::new("已轧制", &weight("轧钢完成", "轧钢完成")),
            FieldSpec::new("成品在库", &weight("成品在库", "成品在库")),
            FieldSpec::new("出库结束", &weight("出库结束", "出库结束")),
            // 发运量按出库结束计
            FieldSpec::new("发运", &weight("出库结束", "出库结束")),
        ],
        required_values: names(&["码头"]),
        month: MonthRule::new("签订日期", vec![MonthMode::Date, MonthMode::search_text()]),
        dock: DockRule::field("码头"),
        numbers: NumberPolicy::CLAMPED,
        metrics: vec![
            DerivationRule::new(
                Metric::Unsmelted,
                Expr::sum([
                    Expr::field("未计划重量"),
                    Expr::field("待炼量"),
                    Expr::field("钢坯待出库"),
                ]),
            ),
            DerivationRule::new(Metric::Rolled, Expr::field("已轧制")),
            DerivationRule::new(
                Metric::Inspected,
                Expr::sum([Expr::field("成品在库"), Expr::field("出库结束")]),
            ),
            DerivationRule::new(Metric::Staged, Expr::field("出库结束")),
            DerivationRule::new(Metric::Shipped, Expr::field("发运")),
            DerivationRule::new(Metric::OrderQuantity, Expr::field("订单量")),
        ],
        attributes: vec![
            AttrRule::text("合同号", "合同号"),
            AttrRule::text("牌号材质", "牌号/材质代码"),
            AttrRule::text("尺寸", "尺寸"),
            AttrRule::new("数据来源", AttrExpr::Const(sheet.to_string())),
        ],
        join: None,
        probe_first_row: false,
        no_data_hint: None,
    }
}
