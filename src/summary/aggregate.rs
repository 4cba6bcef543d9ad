use crate::models::{FactRecord, Metric, MetricVector, Summary};

/// 汇总与明细
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    pub summary: Summary,
    pub details: Vec<FactRecord>,
}

/// 按（月份，码头）累加明细；新键先以 `metrics` 初始化为 0，结果与记录顺序无关
pub fn aggregate(records: Vec<FactRecord>, metrics: &[Metric]) -> Aggregation {
    let mut summary = Summary::new();
    for record in &records {
        let vector = summary
            .0
            .entry(record.month)
            .or_default()
            .entry(record.dock.clone())
            .or_insert_with(|| MetricVector::zeroed(metrics));
        vector.add_record(record);
    }

    Aggregation {
        summary,
        details: records,
    }
}
