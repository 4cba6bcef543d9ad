//! 德瑞斯：生产进程表按钢厂资源号关联执行中表，月份、码头、已发货来自执行中表。

use super::{names, same_fields, DockRule, JoinPlan, MonthRule, SheetPlan, SheetSelector, VendorProfile};
use crate::matchers::Predicate;
use crate::models::Metric;
use crate::parsers::binding::{FieldSpec, MatchMode};
use crate::parsers::header::HeaderWindow;
use crate::processors::month::MonthMode;
use crate::processors::normalizer::NumberPolicy;
use crate::processors::rules::{AttrExpr, AttrRule, Case, DerivationRule, Expr};

/// 工序名（第二行）与对应的欠量字段
const DEFICITS: [(&str, &str); 5] = [
    ("炼钢欠量", "炼钢工序"),
    ("轧制欠量", "厚板轧制"),
    ("材合欠量", "材合"),
    ("准发确认欠量", "准发确认"),
    ("出厂完毕欠量", "出厂完毕"),
];

pub fn profile() -> VendorProfile {
    let mut schema: Vec<FieldSpec> = ["公司别", "钢厂资源号", "钢种", "规格"]
        .iter()
        .map(|name| FieldSpec::same(name).with_mode(MatchMode::Level { level: 0 }))
        .collect();
    // 欠量列在工序标题右侧第二列，第三行标题为"欠量"
    schema.extend(DEFICITS.iter().map(|(field, process)| {
        FieldSpec::new(field, process).with_mode(MatchMode::Offset {
            level: 1,
            offset: 2,
            sub_label: "欠量".to_string(),
        })
    }));

    let spec_part = |part: usize| AttrExpr::SpecPart {
        field: "规格".to_string(),
        part,
    };

    VendorProfile {
        id: "deruisi".to_string(),
        name: "德瑞斯".to_string(),
        plans: vec![SheetPlan {
            label: "生产进程".to_string(),
            selector: SheetSelector::Name("生产进程".to_string()),
            required: true,
            header: HeaderWindow::rows(0, 3),
            data_start: 3,
            schema,
            required_values: names(&["钢厂资源号"]),
            month: MonthRule::new(
                "订货月",
                vec![
                    MonthMode::Date,
                    MonthMode::ExcelSerial,
                    MonthMode::Literal,
                    MonthMode::search_text(),
                ],
            ),
            dock: DockRule::field_or("码头", "未知"),
            numbers: NumberPolicy::default(),
            metrics: vec![
                DerivationRule::new(Metric::Unsmelted, Expr::field("炼钢欠量")),
                DerivationRule::new(Metric::Unrolled, Expr::field("轧制欠量")),
                DerivationRule::new(Metric::Uninspected, Expr::field("材合欠量")),
                DerivationRule::new(
                    Metric::Unstaged,
                    Expr::Switch {
                        field: "公司别".to_string(),
                        cases: vec![
                            Case {
                                any: vec![Predicate::contains("宝山"), Predicate::contains("湛江")],
                                then: Expr::field("准发确认欠量"),
                            },
                            Case {
                                any: vec![Predicate::contains("日照")],
                                then: Expr::field("出厂完毕欠量"),
                            },
                        ],
                        otherwise: Box::new(Expr::Const(0.0)),
                    },
                ),
                DerivationRule::new(Metric::Shipped, Expr::field("已发货")),
            ],
            attributes: vec![
                AttrRule::new("月份显示", AttrExpr::MonthLabel),
                AttrRule::text("钢种", "钢种"),
                AttrRule::new("订货厚度", spec_part(0)),
                AttrRule::new("订货宽度", spec_part(1)),
                AttrRule::new("订货长度", spec_part(2)),
                AttrRule::new("订货月份", AttrExpr::DateText("订货月".to_string())),
                AttrRule::new("来源", AttrExpr::Const("生产进程".to_string())),
            ],
            join: Some(JoinPlan {
                label: "执行中".to_string(),
                selector: SheetSelector::Name("执行中".to_string()),
                header: HeaderWindow::single(2),
                data_start: 3,
                schema: same_fields(&["订货月", "码头", "钢厂资源号", "已发货"]),
                key: "钢厂资源号".to_string(),
                local_key: "钢厂资源号".to_string(),
            }),
            probe_first_row: false,
            no_data_hint: Some("关键字段值为空、日期格式不匹配或钢厂资源号匹配失败".to_string()),
        }],
    }
}
