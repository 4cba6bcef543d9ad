//! 三鼎：单行表头，月份编码在合同号第 8-10 位（"030" 表示 3 月）。

use super::{names, DockRule, MonthRule, SheetPlan, SheetSelector, VendorProfile};
use crate::models::Metric;
use crate::parsers::binding::FieldSpec;
use crate::parsers::header::HeaderWindow;
use crate::processors::month::MonthMode;
use crate::processors::normalizer::NumberPolicy;
use crate::processors::rules::{AttrExpr, AttrRule, DerivationRule, Expr};

pub fn profile() -> VendorProfile {
    let dimension = |part: usize| AttrExpr::SpecPart {
        field: "厚宽长".to_string(),
        part,
    };

    VendorProfile {
        id: "sanding".to_string(),
        name: "三鼎".to_string(),
        plans: vec![SheetPlan {
            label: "三鼎".to_string(),
            selector: SheetSelector::Index(0),
            required: true,
            header: HeaderWindow::single(0),
            data_start: 1,
            schema: vec![
                FieldSpec::new("码头", "水运路线"),
                FieldSpec::same("钢种"),
                FieldSpec::same("厚宽长"),
                FieldSpec::new("已炼钢", "炼钢计划"),
                FieldSpec::new("已轧制", "轧钢计划"),
                FieldSpec::new("已船检", "船检"),
                // 集港与发运共用这一列
                FieldSpec::new("已发数量", "集港+发运"),
                FieldSpec::same("合同号"),
            ],
            required_values: names(&["码头", "合同号"]),
            month: MonthRule::new(
                "合同号",
                vec![MonthMode::CodeOffset {
                    start: 7,
                    len: 3,
                    divisor: 10,
                }],
            ),
            dock: DockRule::field("码头"),
            numbers: NumberPolicy::default(),
            metrics: vec![
                DerivationRule::new(Metric::Smelted, Expr::field("已炼钢")),
                DerivationRule::new(Metric::Rolled, Expr::field("已轧制")),
                DerivationRule::new(Metric::Inspected, Expr::field("已船检")),
                DerivationRule::new(Metric::Staged, Expr::field("已发数量")),
                DerivationRule::new(Metric::Shipped, Expr::field("已发数量")),
            ],
            attributes: vec![
                AttrRule::new("月份显示", AttrExpr::MonthLabel),
                AttrRule::text("钢种", "钢种"),
                AttrRule::new("厚度", dimension(0)),
                AttrRule::new("宽度", dimension(1)),
                AttrRule::new("长度", dimension(2)),
                AttrRule::text("合同号", "合同号"),
                AttrRule::text("原始厚宽长", "厚宽长"),
            ],
            join: None,
            probe_first_row: true,
            no_data_hint: Some("合同号格式不匹配".to_string()),
        }],
    }
}
