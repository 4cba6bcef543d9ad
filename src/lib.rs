pub mod config;
pub mod error;
pub mod exporters;
pub mod ingest;
pub mod matchers;
pub mod models;
pub mod parsers;
pub mod processors;
pub mod storage;
pub mod summary;
pub mod utils;
pub mod vendors;

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use config::IngestConfig;
use error::IngestError;
use models::{AppError, ErrorKind, IngestResult};
use vendors::VendorRegistry;

pub use ingest::{ingest_workbook, ingest_workbook_parallel};
pub use summary::{merge_results, merge_summaries};

/// 读取文件并按供应商方案导入
///
/// # 参数
/// * `vendor` - 供应商 id（不区分大小写）
/// * `path` - Excel / CSV 文件路径
/// * `config` - 运行配置
///
/// # 返回
/// 导入结果；任何错误都体现在 `success` / `error` 中
pub async fn ingest_file(vendor: &str, path: &Path, config: &IngestConfig) -> IngestResult {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) => {
            let error = IngestError::UnreadableFile(format!("{}: {err}", path.display()));
            warn!(vendor, path = %path.display(), "{error}");
            return IngestResult::failure(vendor, error.into());
        }
    };

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    ingest_bytes(vendor, file_name, bytes, config).await
}

/// 按供应商方案导入内存中的文件内容
///
/// # 参数
/// * `vendor` - 供应商 id
/// * `file_name` - 文件名（用于判断格式）
/// * `bytes` - 文件内容
/// * `config` - 运行配置
pub async fn ingest_bytes(vendor: &str, file_name: &str, bytes: Vec<u8>, config: &IngestConfig) -> IngestResult {
    let registry = match VendorRegistry::load(config) {
        Ok(registry) => registry,
        Err(err) => return IngestResult::failure(vendor, err.into()),
    };
    let profile = match registry.require(vendor) {
        Ok(profile) => profile.clone(),
        Err(err) => {
            warn!(vendor, "{err}");
            return IngestResult::failure(vendor, err.into());
        }
    };

    info!(vendor = %profile.id, file = file_name, size = bytes.len(), "开始导入");

    let name = file_name.to_string();
    let workbook = match tokio::task::spawn_blocking(move || parsers::read_workbook_bytes(&name, bytes)).await {
        Ok(Ok(workbook)) => workbook,
        Ok(Err(err)) => {
            warn!(vendor = %profile.id, "{err}");
            return IngestResult::failure(&profile.id, err.into());
        }
        Err(err) => {
            return IngestResult::failure(
                &profile.id,
                AppError::new(ErrorKind::UnreadableFile, format!("文件解析中断: {err}")),
            );
        }
    };

    if config.parallel_sheets {
        ingest_workbook_parallel(Arc::new(profile), Arc::new(workbook), config).await
    } else {
        ingest_workbook(&profile, &workbook, config)
    }
}

#[cfg(test)]
mod tests {
    use rust_xlsxwriter::Workbook;

    use super::*;
    use crate::models::{Metric, Quantity};

    const SHAGANG_HEADER: [&str; 13] = [
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
    ];

    fn shagang_xlsx(header: &[&str]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, title) in header.iter().enumerate() {
            sheet.write_string(0, col as u16, *title).unwrap();
        }
        for row in 1..=2u32 {
            sheet.write_string(row, 0, format!("HT{row}")).unwrap();
            sheet.write_string(row, 1, "SGK5C0001").unwrap();
            sheet.write_string(row, 2, "张家港").unwrap();
            for col in 3..header.len() {
                sheet.write_number(row, col as u16, 2.5).unwrap();
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[tokio::test]
    async fn test_ingest_xlsx_bytes() {
        let bytes = shagang_xlsx(&SHAGANG_HEADER);
        let result = ingest_bytes("shagang", "沙钢.xlsx", bytes, &IngestConfig::default()).await;

        assert!(result.success, "{:?}", result.message);
        let december = result.summary.get(12, "张家港").unwrap();
        assert_eq!(december.contract_count, 2);
        assert_eq!(december.get(Metric::Shipped), Quantity::from_f64(5.0));
        assert_eq!(december.get(Metric::Unrolled), Quantity::from_f64(10.0));
    }

    #[tokio::test]
    async fn test_missing_dock_column() {
        let header: Vec<&str> = SHAGANG_HEADER.iter().map(|h| if *h == "码头" { "备注" } else { h }).collect();
        let bytes = shagang_xlsx(&header);
        let config = IngestConfig {
            parallel_sheets: false,
            ..IngestConfig::default()
        };
        let result = ingest_bytes("shagang", "沙钢.xlsx", bytes, &config).await;

        assert!(!result.success);
        let error = result.error.unwrap();
        assert_eq!(error.kind, ErrorKind::SchemaMismatch);
        assert_eq!(error.missing, vec!["码头"]);
    }

    #[tokio::test]
    async fn test_unknown_vendor_and_unreadable_file() {
        let result = ingest_bytes("nobody", "a.xlsx", Vec::new(), &IngestConfig::default()).await;
        assert_eq!(result.error.unwrap().kind, ErrorKind::UnknownVendor);

        let result = ingest_file("sanding", Path::new("/nonexistent/三鼎.xlsx"), &IngestConfig::default()).await;
        assert_eq!(result.error.unwrap().kind, ErrorKind::UnreadableFile);
    }

    #[tokio::test]
    async fn test_ingest_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("兴澄.csv");
        std::fs::write(
            &path,
            "月份,标准,订货厚度,订货宽度,订货长度,炼钢下线量,轧钢下线量,入库量,合同备注,发货重量,书面合同号\n\
             7,GB,10,1500,6000,1,2,3,,4,XC1\n",
        )
        .unwrap();

        let result = ingest_file("xingcheng", &path, &IngestConfig::default()).await;
        assert!(result.success, "{:?}", result.message);
        assert_eq!(
            result.summary.get(7, "全部").unwrap().get(Metric::Shipped),
            Quantity::from_f64(4.0)
        );
    }
}
