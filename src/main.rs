//! 工單齊料模擬命令列

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use kitting::logging;
use kitting_core::{DemandAggregation, SimulationConfig};
use kitting_io::{
    parse_date, CsvErpSource, CsvInventorySource, CsvOrderSource, CsvReportSink, ResultSink,
    TextReportSink,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
enum OutputFormat {
    /// 純文字報表
    Text,
    /// CSV
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "kitting", version, about = "依開工順序模擬工單齊料與缺料")]
struct Cli {
    /// 排程 CSV（order_type, order_number, start_date, plan_qty）
    #[arg(long)]
    orders: PathBuf,

    /// ERP 工單用料 CSV
    #[arg(long)]
    erp: PathBuf,

    /// 庫存 CSV（component, qty）
    #[arg(long)]
    inventory: PathBuf,

    /// JSON 配置檔
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 輸出檔（預設 stdout）
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// 計算當期缺料旗標
    #[arg(long)]
    daily_short: bool,

    /// 區間內同一工單的計劃數量加總
    #[arg(long)]
    summed_range: bool,

    /// 分析區間起日
    #[arg(long, value_parser = cli_date)]
    from: Option<NaiveDate>,

    /// 分析區間迄日
    #[arg(long, value_parser = cli_date)]
    to: Option<NaiveDate>,

    /// 每批查詢數量
    #[arg(long)]
    batch_size: Option<usize>,
}

fn cli_date(value: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(value).ok_or_else(|| format!("無法解析日期: {}", value))
}

impl Cli {
    /// 配置檔為底，命令列參數覆寫
    fn load_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("讀取配置檔失敗: {}", path.display()))?;
                SimulationConfig::from_json_str(&json)
                    .with_context(|| format!("配置檔格式錯誤: {}", path.display()))?
            }
            None => SimulationConfig::new(),
        };

        if self.daily_short {
            config = config.with_daily_short_check(true);
        }
        if self.summed_range {
            config = config.with_demand_aggregation(DemandAggregation::SummedRange);
        }
        if self.from.is_some() || self.to.is_some() {
            // 只給一端時保留配置檔的另一端
            let (start, end) = (config.window_start, config.window_end);
            config = config.with_window(self.from.or(start), self.to.or(end));
        }
        if let Some(size) = self.batch_size {
            config = config.with_lookup_batch_size(size);
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    logging::init();

    let cli = Cli::parse();
    let config = cli.load_config()?;

    let orders = CsvOrderSource::new(&cli.orders);
    let erp = CsvErpSource::open(&cli.erp)
        .with_context(|| format!("讀取 ERP 檔失敗: {}", cli.erp.display()))?;
    let inventory = CsvInventorySource::open(&cli.inventory)
        .with_context(|| format!("讀取庫存檔失敗: {}", cli.inventory.display()))?;

    let run = kitting::run(&orders, &erp, &inventory, &config)?;
    for warning in &run.warnings {
        tracing::warn!("{}: {}", warning.key, warning.message);
    }

    let writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("無法建立輸出檔: {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    let mut sink: Box<dyn ResultSink> = match cli.format {
        OutputFormat::Text => Box::new(TextReportSink::new(writer)),
        OutputFormat::Csv => Box::new(CsvReportSink::new(writer)),
    };
    sink.write(&run.results).context("輸出結果失敗")?;

    tracing::info!(
        "批次 {}：{} 張工單，{} 張可完成全部產量",
        run.run_id,
        run.results.len(),
        run.kitted_count()
    );

    Ok(())
}
