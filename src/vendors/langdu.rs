//! 朗度：营口、重钢、敬业三张表，任意出现即处理。

use super::{names, stacked, weight, DockRule, MonthRule, SheetPlan, SheetSelector, VendorProfile};
use crate::matchers::Predicate;
use crate::models::Metric;
use crate::parsers::binding::FieldSpec;
use crate::parsers::header::HeaderWindow;
use crate::processors::month::MonthMode;
use crate::processors::normalizer::NumberPolicy;
use crate::processors::rules::{AttrExpr, AttrRule, DerivationRule, Expr};

pub fn profile() -> VendorProfile {
    VendorProfile {
        id: "langdu".to_string(),
        name: "朗度".to_string(),
        plans: vec![merged_plan("营口"), chonggang_plan(), merged_plan("敬业")],
    }
}

/// 营口、敬业：第 3-5 行合并表头，第 6 行起为数据
fn merged_plan(label: &str) -> SheetPlan {
    SheetPlan {
        label: label.to_string(),
        selector: SheetSelector::Contains(label.to_string()),
        required: false,
        header: HeaderWindow::rows(2, 3),
        data_start: 5,
        schema: vec![
            FieldSpec::new("合同号", &stacked("合同号")),
            FieldSpec::new("牌号/材质代码", &stacked("牌号/材质代码")),
            FieldSpec::new("尺寸", &stacked("尺寸")),
            FieldSpec::new("合同月份", &stacked("合同月份")),
            FieldSpec::new("码头", &stacked("码头")),
            FieldSpec::new("未计划重量", &weight("坯料设计", "未计划")),
            FieldSpec::new("未下炼钢重量", &weight("坯料进程", "未下炼钢")),
            FieldSpec::new("轧钢完成重量", &weight("轧钢完成", "轧钢完成")),
            FieldSpec::new("成品在库重量", &weight("成品在库", "成品在库")),
            FieldSpec::new("出库结束重量", &weight("出库结束", "出库结束")),
            FieldSpec::new("已发运重量", &weight("发运", "发运")),
            FieldSpec::new("订单量", &weight("订单量", "订单量")),
        ],
        required_values: names(&["合同号", "牌号/材质代码", "尺寸", "合同月份", "码头"]),
        month: MonthRule::new("合同月份", vec![MonthMode::Date, MonthMode::anchored_text()]),
        dock: DockRule::field("码头"),
        numbers: NumberPolicy::CLAMPED,
        metrics: vec![
            DerivationRule::new(
                Metric::Unsmelted,
                Expr::sum([Expr::field("未计划重量"), Expr::field("未下炼钢重量")]),
            ),
            DerivationRule::new(Metric::Rolled, Expr::field("轧钢完成重量")),
            DerivationRule::new(
                Metric::Inspected,
                Expr::sum([Expr::field("成品在库重量"), Expr::field("出库结束重量")]),
            ),
            DerivationRule::new(Metric::Staged, Expr::field("出库结束重量")),
            DerivationRule::new(Metric::Shipped, Expr::field("已发运重量")),
            DerivationRule::new(Metric::OrderQuantity, Expr::field("订单量")),
        ],
        attributes: vec![
            AttrRule::text("合同号", "合同号"),
            AttrRule::text("牌号材质代码", "牌号/材质代码"),
            AttrRule::text("尺寸", "尺寸"),
            AttrRule::new("合同月份", AttrExpr::DateText("合同月份".to_string())),
            AttrRule::number("未计划重量", "未计划重量"),
            AttrRule::number("未下炼钢重量", "未下炼钢重量"),
            AttrRule::number("成品在库重量", "成品在库重量"),
        ],
        join: None,
        probe_first_row: false,
        no_data_hint: None,
    }
}

/// 重钢：单行表头，按状态文本判断欠重归属
fn chonggang_plan() -> SheetPlan {
    let pending = vec![Predicate::contains("[材料申请]有欠量")];
    let unrolled = vec![
        Predicate::contains("[材料申请]有欠量"),
        Predicate::contains("炼钢工序配料已满"),
    ];

    SheetPlan {
        label: "重钢".to_string(),
        selector: SheetSelector::Contains("重钢".to_string()),
        required: false,
        header: HeaderWindow::single(0),
        data_start: 1,
        schema: vec![
            FieldSpec::same("合同月份"),
            FieldSpec::same("牌号"),
            FieldSpec::same("订厚(mm)").optional(),
            FieldSpec::same("订宽(mm)").optional(),
            FieldSpec::same("订长(mm)").optional(),
            FieldSpec::same("交货地点"),
            FieldSpec::same("状态"),
            FieldSpec::same("订重(t)"),
            FieldSpec::same("准发欠重"),
            FieldSpec::same("已准发重(t)"),
            FieldSpec::same("已出厂重(t)"),
        ],
        required_values: names(&["合同月份", "牌号", "交货地点"]),
        month: MonthRule::new("合同月份", vec![MonthMode::Date, MonthMode::anchored_text()]),
        dock: DockRule::field("交货地点"),
        numbers: NumberPolicy::CLAMPED,
        metrics: vec![
            DerivationRule::new(
                Metric::Unsmelted,
                Expr::gate("状态", pending, Expr::field("准发欠重")),
            ),
            DerivationRule::new(
                Metric::Unrolled,
                Expr::gate("状态", unrolled.clone(), Expr::field("准发欠重")),
            ),
            DerivationRule::new(
                Metric::Rolled,
                Expr::clamp(Expr::sub(
                    Expr::field("订重(t)"),
                    Expr::gate("状态", unrolled, Expr::field("准发欠重")),
                )),
            ),
            DerivationRule::new(Metric::Inspected, Expr::field("已准发重(t)")),
            DerivationRule::new(Metric::Staged, Expr::field("已准发重(t)")),
            DerivationRule::new(Metric::Shipped, Expr::field("已出厂重(t)")),
            DerivationRule::new(Metric::OrderQuantity, Expr::field("订重(t)")),
        ],
        attributes: vec![
            AttrRule::text("牌号材质代码", "牌号"),
            AttrRule::new(
                "尺寸",
                AttrExpr::Spec {
                    thickness: "订厚(mm)".to_string(),
                    width: "订宽(mm)".to_string(),
                    length: "订长(mm)".to_string(),
                },
            ),
            AttrRule::new("合同月份", AttrExpr::DateText("合同月份".to_string())),
            AttrRule::text("状态", "状态"),
        ],
        join: None,
        probe_first_row: false,
        no_data_hint: None,
    }
}
