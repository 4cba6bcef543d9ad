use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use svend_ingest_lib::config::load_config;
use svend_ingest_lib::exporters::export_result;
use svend_ingest_lib::storage::profiles::save_profiles;
use svend_ingest_lib::vendors::VendorRegistry;
use svend_ingest_lib::{ingest_file, merge_results};

#[derive(Debug, Parser)]
#[command(name = "svend-ingest", version, about = "供应商生产/发运表格导入与按月份×码头汇总")]
struct Cli {
    /// 配置文件路径（默认使用系统配置目录）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 导入一个或多个文件，多个文件的结果合并输出
    Ingest {
        #[arg(long)]
        vendor: String,
        /// json | summary-csv | details-csv
        #[arg(long, default_value = "json")]
        format: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// 列出可用的供应商
    Vendors,
    /// 把内置方案写成 JSON，便于修改后放入方案目录
    ExportProfiles { dir: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 日志写 stderr，stdout 只输出结果
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_filter(env_filter))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("配置加载失败")?;

    match cli.command {
        Command::Ingest { vendor, format, files } => {
            let mut results = Vec::with_capacity(files.len());
            for path in &files {
                let result = ingest_file(&vendor, path, &config).await;
                info!(file = %path.display(), success = result.success, "文件处理完成");
                results.push(result);
            }

            let result = merge_results(results);
            println!("{}", export_result(&result, &format)?);
            if !result.success {
                bail!(result.message.unwrap_or_else(|| "处理失败".to_string()));
            }
        }
        Command::Vendors => {
            let registry = VendorRegistry::load(&config)?;
            for profile in registry.profiles() {
                println!("{}\t{}", profile.id, profile.name);
            }
        }
        Command::ExportProfiles { dir } => {
            let registry = VendorRegistry::builtin();
            save_profiles(&dir, registry.profiles())?;
            info!(dir = %dir.display(), count = registry.profiles().len(), "方案已导出");
        }
    }

    Ok(())
}
