//! 模擬結果輸出

use csv::Writer;
use kitting_core::{SimulationResult, Tier};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::io::Write;

use crate::error::{LookupError, LookupResult};
use crate::lookup::ResultSink;

/// 齊套率百分比（一位小數，去尾零）
fn percent(rate: Decimal) -> Decimal {
    (rate * Decimal::ONE_HUNDRED).round_dp(1).normalize()
}

fn daily_marker(daily_short: Option<bool>) -> &'static str {
    match daily_short {
        Some(true) => "當期缺料",
        Some(false) => "當期齊料",
        None => "",
    }
}

/// 各分級彙總行
pub fn summary_line(results: &[SimulationResult]) -> String {
    let mut counts: BTreeMap<Tier, usize> = BTreeMap::new();
    for result in results {
        *counts.entry(result.tier).or_insert(0) += 1;
    }

    let parts: Vec<String> = Tier::ALL
        .iter()
        .map(|tier| format!("{} {}", tier.label(), counts.get(tier).copied().unwrap_or(0)))
        .collect();

    format!("合計 {} 張：{}", results.len(), parts.join("，"))
}

/// 純文字報表
pub struct TextReportSink<W: Write> {
    writer: W,
}

impl<W: Write> TextReportSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn render(result: &SimulationResult) -> String {
        let mut line = format!(
            "{}\t{}\t齊套率 {}%\t可產 {}/{}",
            result.key,
            result.tier.label(),
            percent(result.completion_rate),
            result.achievable_qty.normalize(),
            result.total_qty.normalize(),
        );

        let marker = daily_marker(result.daily_short);
        if !marker.is_empty() {
            line.push('\t');
            line.push_str(marker);
        }

        if !result.shortages.is_empty() {
            line.push('\t');
            line.push_str(&result.shortage_text());
        }

        line
    }
}

impl<W: Write> ResultSink for TextReportSink<W> {
    fn write(&mut self, results: &[SimulationResult]) -> LookupResult<()> {
        for result in results {
            writeln!(self.writer, "{}", Self::render(result))?;
        }
        writeln!(self.writer, "{}", summary_line(results))?;
        self.writer.flush()?;
        Ok(())
    }
}

/// CSV 報表
pub struct CsvReportSink<W: Write> {
    writer: Writer<W>,
    header_written: bool,
}

impl<W: Write> CsvReportSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Writer::from_writer(writer),
            header_written: false,
        }
    }

    pub fn into_inner(self) -> LookupResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| LookupError::Io(e.to_string()))
    }
}

impl<W: Write> ResultSink for CsvReportSink<W> {
    fn write(&mut self, results: &[SimulationResult]) -> LookupResult<()> {
        if !self.header_written {
            self.writer.write_record([
                "order_type",
                "order_number",
                "start_date",
                "plan_qty",
                "total_qty",
                "tier",
                "completion_rate",
                "achievable_qty",
                "daily_short",
                "shortages",
            ])?;
            self.header_written = true;
        }

        for result in results {
            self.writer.write_record([
                result.key.order_type.clone(),
                result.key.order_number.clone(),
                result
                    .start_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                result
                    .plan_qty
                    .map(|q| q.normalize().to_string())
                    .unwrap_or_default(),
                result.total_qty.normalize().to_string(),
                result.tier.code().to_string(),
                result.completion_rate.round_dp(4).normalize().to_string(),
                result.achievable_qty.normalize().to_string(),
                result.daily_short.map(|s| s.to_string()).unwrap_or_default(),
                result.shortage_text(),
            ])?;
        }

        self.writer.flush()?;
        Ok(())
    }
}
