//! 工單排序

use chrono::NaiveDate;
use kitting_core::{DemandAggregation, OrderKey, OrderRow, SimulationConfig};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 排序後的佇列項
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedOrder {
    /// 工單鍵
    pub key: OrderKey,
    /// 開工日
    pub start_date: NaiveDate,
    /// 原始列號
    pub row_index: usize,
    /// 計劃數量（依彙總方式）
    pub plan_qty: Decimal,
}

/// 工單排序器
pub struct OrderSequencer;

impl OrderSequencer {
    /// 過濾、彙總並排序來源列
    ///
    /// 排序鍵為 `(開工日, 列號)`；同一工單只出現一次，位置取其最早的列。
    pub fn sequence(rows: &[OrderRow], config: &SimulationConfig) -> Vec<QueuedOrder> {
        let mut eligible: Vec<(&OrderRow, NaiveDate, Decimal)> = rows
            .iter()
            .filter_map(|row| match (row.start_date, row.plan_qty) {
                (Some(date), Some(qty)) if row.is_schedulable() => {
                    if config.in_window(date) {
                        Some((row, date, qty))
                    } else {
                        tracing::debug!("略過列 {} ({}): 不在分析區間", row.row_index, row.key);
                        None
                    }
                }
                _ => {
                    tracing::debug!("略過列 {} ({}): 無開工日或計劃數量", row.row_index, row.key);
                    None
                }
            })
            .collect();

        eligible.sort_by(|a, b| (a.1, a.0.row_index).cmp(&(b.1, b.0.row_index)));

        let mut queue: Vec<QueuedOrder> = Vec::new();
        let mut positions: HashMap<&OrderKey, usize> = HashMap::new();

        for (row, date, qty) in eligible {
            match positions.get(&row.key) {
                Some(&pos) => {
                    if config.demand_aggregation == DemandAggregation::SummedRange {
                        queue[pos].plan_qty = queue[pos].plan_qty.saturating_add(qty);
                    }
                }
                None => {
                    positions.insert(&row.key, queue.len());
                    queue.push(QueuedOrder {
                        key: row.key.clone(),
                        start_date: date,
                        row_index: row.row_index,
                        plan_qty: qty,
                    });
                }
            }
        }

        tracing::debug!("來源列 {} 筆，排入佇列 {} 張工單", rows.len(), queue.len());
        queue
    }
}
