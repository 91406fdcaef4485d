//! 完整模擬流程：抽取排程、排序、分批查詢、模擬

use anyhow::{Context, Result};
use kitting_calc::{OrderSequencer, SimulationRun, Simulator};
use kitting_core::{OrderKey, SimulationConfig};
use kitting_io::{fetch_ledger, fetch_snapshot, ErpLookup, InventoryLookup, OrderSource};
use std::collections::BTreeSet;

/// 執行一次齊料模擬
///
/// 任一查詢批次失敗即中止，不產生部分結果。
pub fn run(
    orders: &dyn OrderSource,
    erp: &dyn ErpLookup,
    inventory: &dyn InventoryLookup,
    config: &SimulationConfig,
) -> Result<SimulationRun> {
    config.validate().context("模擬配置無效")?;

    let rows = orders.extract().context("讀取排程失敗")?;
    let queue = OrderSequencer::sequence(&rows, config);
    if queue.is_empty() {
        tracing::warn!("排程 {} 列中沒有可模擬的工單", rows.len());
        return Ok(SimulationRun::empty());
    }

    let keys: BTreeSet<OrderKey> = queue.iter().map(|q| q.key.clone()).collect();
    let snapshot = fetch_snapshot(erp, &keys, config.lookup_batch_size)
        .context("查詢 ERP 工單失敗")?;

    let components = snapshot.component_ids();
    let mut ledger = fetch_ledger(inventory, &components, config.lookup_batch_size)
        .context("查詢庫存失敗")?;

    Ok(Simulator::new(&queue, &snapshot, &mut ledger, config).run())
}
