//! 特变：一个工作簿三张表，依次为湘钢、涟钢、首钢，列名与口径各不相同。

use super::{names, same_fields, DockRule, MonthRule, SheetPlan, SheetSelector, VendorProfile};
use crate::matchers::Predicate;
use crate::models::Metric;
use crate::parsers::header::HeaderWindow;
use crate::processors::month::MonthMode;
use crate::processors::normalizer::NumberPolicy;
use crate::processors::rules::{AttrExpr, AttrRule, DerivationRule, Expr};

const APPLYING: &str = "41-[材料申请]有欠量";
const HOT_ROLLING: &str = "43-[热轧]有欠量";
const UNKNOWN_DOCK: &str = "未知";

pub fn profile() -> VendorProfile {
    VendorProfile {
        id: "tebian".to_string(),
        name: "特变".to_string(),
        plans: vec![liangang_plan(), xianggang_plan(), shougang_plan()],
    }
}

fn month_rule() -> MonthRule {
    MonthRule::new("月份", vec![MonthMode::Literal, MonthMode::anchored_text()])
}

fn spec(thickness: &str, width: &str, length: &str) -> AttrExpr {
    AttrExpr::Spec {
        thickness: thickness.to_string(),
        width: width.to_string(),
        length: length.to_string(),
    }
}

/// 第二张表：按合同生产状态把订货重量计入各欠量
fn liangang_plan() -> SheetPlan {
    let status = "过滤合同生产状态";
    let order = || Expr::field("过滤订货重量(吨)");
    let uninspected = || {
        Expr::gate(
            status,
            vec![
                Predicate::All {
                    of: vec![Predicate::starts_with("5"), Predicate::contains("[准发]有欠量")],
                },
                Predicate::equals(APPLYING),
                Predicate::equals(HOT_ROLLING),
            ],
            order(),
        )
    };

    SheetPlan {
        label: "涟钢".to_string(),
        selector: SheetSelector::Index(1),
        required: true,
        header: HeaderWindow::single(0),
        data_start: 1,
        schema: same_fields(&[
            "过滤规格描述",
            "过滤订货重量(吨)",
            status,
            "过滤准发净重量",
            "过滤出厂重量（货权转移）",
            "过滤牌号",
            "月份",
            "码头",
        ]),
        required_values: names(&["过滤规格描述", "过滤牌号"]),
        month: month_rule(),
        dock: DockRule::field_or("码头", UNKNOWN_DOCK),
        numbers: NumberPolicy::default(),
        metrics: vec![
            DerivationRule::new(
                Metric::Unsmelted,
                Expr::gate(status, vec![Predicate::equals(APPLYING)], order()),
            ),
            DerivationRule::new(
                Metric::Unrolled,
                Expr::gate(
                    status,
                    vec![Predicate::equals(APPLYING), Predicate::equals(HOT_ROLLING)],
                    order(),
                ),
            ),
            DerivationRule::new(Metric::Uninspected, uninspected()),
            DerivationRule::new(
                Metric::Unstaged,
                Expr::clamp(Expr::sum([
                    Expr::sub(
                        Expr::field("过滤准发净重量"),
                        Expr::field("过滤出厂重量（货权转移）"),
                    ),
                    uninspected(),
                ])),
            ),
            DerivationRule::new(Metric::Shipped, Expr::field("过滤出厂重量（货权转移）")),
            DerivationRule::new(Metric::OrderQuantity, order()),
        ],
        attributes: vec![
            AttrRule::new("规格描述", AttrExpr::NormalizedSpec("过滤规格描述".to_string())),
            AttrRule::text("牌号", "过滤牌号"),
            AttrRule::number("订货重量", "过滤订货重量(吨)"),
        ],
        join: None,
        probe_first_row: false,
        no_data_hint: Some("月份格式不匹配".to_string()),
    }
}

/// 第一张表：各欠量逐级累加在库量
fn xianggang_plan() -> SheetPlan {
    let unsmelted = || Expr::field("原料申请欠量");
    let unrolled = || Expr::sum([unsmelted(), Expr::field("轧钢在库量")]);
    let uninspected = || {
        Expr::sum([
            unrolled(),
            Expr::field("精整在库量"),
            Expr::field("热处理在库量"),
            Expr::field("形合在库量"),
            Expr::field("材合在库量"),
        ])
    };
    let unstaged = Expr::sum([
        uninspected(),
        Expr::field("准发在库量（33）"),
        Expr::field("出厂在库量"),
        Expr::field("出厂未到码头量"),
    ]);

    SheetPlan {
        label: "湘钢".to_string(),
        selector: SheetSelector::Index(0),
        required: true,
        header: HeaderWindow::single(0),
        data_start: 1,
        schema: same_fields(&[
            "标准牌号",
            "厚度",
            "宽度",
            "长度",
            "订货重量",
            "原料申请欠量",
            "炼钢在库量",
            "轧钢在库量",
            "精整在库量",
            "热处理在库量",
            "形合在库量",
            "材合在库量",
            "准发在库量（33）",
            "出厂在库量",
            "出厂未到码头量",
            "总待交重量{订货量-已发货量（出厂码单）}",
            "月份",
            "到站港名称",
        ]),
        required_values: names(&["标准牌号"]),
        month: month_rule(),
        dock: DockRule::field_or("到站港名称", UNKNOWN_DOCK),
        numbers: NumberPolicy::CLAMPED,
        metrics: vec![
            DerivationRule::new(Metric::Unsmelted, unsmelted()),
            DerivationRule::new(Metric::Unrolled, unrolled()),
            DerivationRule::new(Metric::Uninspected, uninspected()),
            DerivationRule::new(Metric::Unstaged, unstaged),
            DerivationRule::new(
                Metric::Unshipped,
                Expr::field("总待交重量{订货量-已发货量（出厂码单）}"),
            ),
            DerivationRule::new(Metric::OrderQuantity, Expr::field("订货重量")),
        ],
        attributes: vec![
            AttrRule::new("规格描述", spec("厚度", "宽度", "长度")),
            AttrRule::text("牌号", "标准牌号"),
            AttrRule::number("订货重量", "订货重量"),
            AttrRule::number("原料申请欠量", "原料申请欠量"),
        ],
        join: None,
        probe_first_row: false,
        no_data_hint: Some("月份格式不匹配".to_string()),
    }
}

/// 第三张表：未船检可能为负，保留原值
fn shougang_plan() -> SheetPlan {
    SheetPlan {
        label: "首钢".to_string(),
        selector: SheetSelector::Index(2),
        required: true,
        header: HeaderWindow::single(0),
        data_start: 1,
        schema: same_fields(&[
            "钢板牌号",
            "订厚(mm)",
            "订宽(mm)",
            "订长(mm)",
            "订货重量",
            "炼钢欠重",
            "轧制欠重",
            "中间库重量",
            "成品重量",
            "准发重量",
            "合同欠重",
            "月份",
            "码头",
        ]),
        required_values: names(&["钢板牌号"]),
        month: month_rule(),
        dock: DockRule::field_or("码头", UNKNOWN_DOCK),
        numbers: NumberPolicy::default(),
        metrics: vec![
            DerivationRule::new(Metric::Unsmelted, Expr::field("炼钢欠重")),
            DerivationRule::new(Metric::Unrolled, Expr::field("轧制欠重")),
            DerivationRule::new(
                Metric::Uninspected,
                Expr::sub(
                    Expr::sum([
                        Expr::field("中间库重量"),
                        Expr::field("轧制欠重"),
                        Expr::field("成品重量"),
                    ]),
                    Expr::field("准发重量"),
                ),
            ),
            DerivationRule::new(Metric::Unstaged, Expr::field("合同欠重")),
            DerivationRule::new(Metric::Unshipped, Expr::field("合同欠重")),
            DerivationRule::new(Metric::OrderQuantity, Expr::field("订货重量")),
        ],
        attributes: vec![
            AttrRule::new("规格描述", spec("订厚(mm)", "订宽(mm)", "订长(mm)")),
            AttrRule::text("牌号", "钢板牌号"),
            AttrRule::number("订货重量", "订货重量"),
        ],
        join: None,
        probe_first_row: false,
        no_data_hint: Some("月份格式不匹配".to_string()),
    }
}
