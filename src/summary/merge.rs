use tracing::info;

use crate::models::{AppError, ErrorKind, IngestResult, Summary};

/// 合并多个汇总：键取并集，同键逐项相加；输入不被修改
pub fn merge_summaries<'a>(summaries: impl IntoIterator<Item = &'a Summary>) -> Summary {
    let mut merged = Summary::new();
    for summary in summaries {
        merged.absorb(summary);
    }
    merged
}

/// 合并多个供应商/文件的导入结果
///
/// 任一结果成功即视为成功；失败结果的原因记为警告。全部失败时，消息中列出每一个失败原因。
pub fn merge_results(results: Vec<IngestResult>) -> IngestResult {
    let mut vendors: Vec<String> = Vec::new();
    let mut metrics = Vec::new();
    let mut details = Vec::new();
    let mut sheets = Vec::new();
    let mut warnings = Vec::new();
    let mut failures = Vec::new();
    let mut first_error: Option<AppError> = None;

    let summary = merge_summaries(results.iter().filter(|r| r.success).map(|r| &r.summary));

    for result in results {
        if !vendors.contains(&result.vendor) {
            vendors.push(result.vendor.clone());
        }
        for metric in &result.metrics {
            if !metrics.contains(metric) {
                metrics.push(*metric);
            }
        }
        sheets.extend(result.sheets);
        warnings.extend(result.warnings);

        if result.success {
            details.extend(result.details);
        } else {
            let reason = result
                .error
                .as_ref()
                .map(|error| error.message.clone())
                .or(result.message)
                .unwrap_or_else(|| "未知错误".to_string());
            warnings.push(format!("{}: {}", result.vendor, reason));
            failures.push(format!("{}: {}", result.vendor, reason));
            if first_error.is_none() {
                first_error = result.error;
            }
        }
    }

    let success = !details.is_empty();
    info!(
        vendors = vendors.len(),
        details = details.len(),
        failures = failures.len(),
        "导入结果合并完成"
    );

    let (message, error) = if success {
        (None, None)
    } else {
        let reason = if failures.is_empty() {
            "未找到有效数据".to_string()
        } else {
            failures.join("；")
        };
        let mut error = first_error.unwrap_or_else(|| AppError::new(ErrorKind::NoDataProcessed, reason.clone()));
        error.message = reason.clone();
        (Some(format!("处理失败: {reason}")), Some(error))
    };

    IngestResult {
        success,
        vendor: vendors.join("+"),
        summary,
        details,
        metrics,
        sheets,
        warnings,
        message,
        error,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::models::{Metric, MetricVector, Quantity};

    fn vector(pairs: &[(Metric, f64)], contracts: u64) -> MetricVector {
        MetricVector {
            values: pairs
                .iter()
                .map(|(metric, value)| (*metric, Quantity::from_f64(*value)))
                .collect(),
            contract_count: contracts,
        }
    }

    fn summary(entries: &[(u8, &str, MetricVector)]) -> Summary {
        let mut summary = Summary::new();
        for (month, dock, vector) in entries {
            summary.entry(*month, dock).absorb(vector);
        }
        summary
    }

    fn random_summary(rng: &mut StdRng) -> Summary {
        let docks = ["A", "B", "C", "营口"];
        let mut summary = Summary::new();
        for _ in 0..rng.random_range(0..8) {
            let month: u8 = rng.random_range(1..=12);
            let dock = docks[rng.random_range(0..docks.len())];
            let metric = Metric::ALL[rng.random_range(0..Metric::ALL.len())];
            let value = f64::from(rng.random_range(-50_000..50_000i32)) / 1000.0;
            summary
                .entry(month, dock)
                .absorb(&vector(&[(metric, value)], rng.random_range(0..3u64)));
        }
        summary
    }

    #[test]
    fn test_merge_scenario() {
        let left = summary(&[(3, "A", vector(&[(Metric::Shipped, 10.0)], 1))]);
        let right = summary(&[
            (3, "A", vector(&[(Metric::Shipped, 5.0)], 1)),
            (4, "B", vector(&[(Metric::Shipped, 2.0)], 1)),
        ]);

        let merged = merge_summaries([&left, &right]);

        assert_eq!(merged.get(3, "A").unwrap().get(Metric::Shipped), Quantity::from_f64(15.0));
        assert_eq!(merged.get(3, "A").unwrap().contract_count, 2);
        assert_eq!(merged.get(4, "B").unwrap().get(Metric::Shipped), Quantity::from_f64(2.0));
        // 输入保持不变
        assert_eq!(left.get(3, "A").unwrap().get(Metric::Shipped), Quantity::from_f64(10.0));
    }

    #[test]
    fn test_merge_is_commutative_and_associative() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let a = random_summary(&mut rng);
            let b = random_summary(&mut rng);
            let c = random_summary(&mut rng);

            assert_eq!(merge_summaries([&a, &b]), merge_summaries([&b, &a]));

            let left = merge_summaries([&merge_summaries([&a, &b]), &c]);
            let right = merge_summaries([&a, &merge_summaries([&b, &c])]);
            assert_eq!(left, right);
        }
    }

    #[test]
    fn test_merge_results_keeps_successes_and_reports_failures() {
        let ok = IngestResult {
            success: true,
            vendor: "shagang".to_string(),
            summary: summary(&[(5, "A", vector(&[(Metric::Shipped, 1.0)], 1))]),
            details: vec![crate::models::FactRecord {
                month: 5,
                dock: "A".to_string(),
                source: "Sheet1".to_string(),
                row: 2,
                metrics: BTreeMap::from([(Metric::Shipped, Quantity::from_f64(1.0))]),
                attributes: BTreeMap::new(),
            }],
            metrics: vec![Metric::Shipped],
            sheets: Vec::new(),
            warnings: Vec::new(),
            message: None,
            error: None,
        };
        let failed = IngestResult::failure(
            "sanding",
            AppError::new(ErrorKind::SchemaMismatch, "找不到列: 码头"),
        );

        let merged = merge_results(vec![ok, failed.clone()]);
        assert!(merged.success);
        assert_eq!(merged.vendor, "shagang+sanding");
        assert_eq!(merged.details.len(), 1);
        assert!(merged.warnings.iter().any(|w| w.contains("码头")));

        let all_failed = merge_results(vec![failed.clone(), failed]);
        assert!(!all_failed.success);
        assert_eq!(all_failed.error.unwrap().kind, ErrorKind::SchemaMismatch);
        assert!(all_failed.message.unwrap().contains("码头"));
    }
}
