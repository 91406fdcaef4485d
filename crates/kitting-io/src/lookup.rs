//! 外部協作介面與分批查詢

use kitting_core::{ErpSnapshot, InventoryLedger, OrderKey, OrderRow, SimulationResult};
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};

use crate::error::{LookupError, LookupResult};

/// 排程來源（工單抽取）
pub trait OrderSource {
    /// 抽取全部來源列，列號為原始輸入順序
    fn extract(&self) -> LookupResult<Vec<OrderRow>>;
}

/// ERP 工單查詢
pub trait ErpLookup {
    /// 查詢一批工單；查不到的鍵不出現在結果中，不視為錯誤
    fn fetch(&self, keys: &[OrderKey]) -> LookupResult<ErpSnapshot>;
}

/// 庫存查詢
pub trait InventoryLookup {
    /// 查詢一批物料現有量；查不到的物料不出現在結果中（視為 0）
    fn fetch(&self, components: &[String]) -> LookupResult<HashMap<String, Decimal>>;
}

/// 結果輸出
pub trait ResultSink {
    fn write(&mut self, results: &[SimulationResult]) -> LookupResult<()>;
}

/// 依固定批量分批呼叫，遇到第一個失敗即停止
///
/// 每批只嘗試一次，不重試。
pub fn fetch_in_batches<K, T>(
    ids: &[K],
    batch_size: usize,
    mut fetch: impl FnMut(&[K]) -> LookupResult<T>,
    mut merge: impl FnMut(T),
) -> LookupResult<()> {
    if batch_size == 0 {
        return Err(LookupError::FetchFailed("查詢批量必須大於 0".to_string()));
    }

    for (batch, chunk) in ids.chunks(batch_size).enumerate() {
        tracing::debug!("查詢第 {} 批，共 {} 筆", batch, chunk.len());
        let fetched = fetch(chunk).map_err(|source| LookupError::BatchFailed {
            batch,
            source: Box::new(source),
        })?;
        merge(fetched);
    }

    Ok(())
}

/// 分批查詢 ERP 快照
pub fn fetch_snapshot(
    lookup: &dyn ErpLookup,
    keys: &BTreeSet<OrderKey>,
    batch_size: usize,
) -> LookupResult<ErpSnapshot> {
    let ids: Vec<OrderKey> = keys.iter().cloned().collect();
    let mut snapshot = ErpSnapshot::new();

    fetch_in_batches(&ids, batch_size, |chunk| lookup.fetch(chunk), |part| {
        snapshot.merge(part)
    })?;

    // 只保留本次查詢的工單
    let fetched = snapshot.len();
    snapshot.retain_keys(keys);
    if snapshot.len() < fetched {
        tracing::debug!("丟棄 {} 筆未查詢的 ERP 記錄", fetched - snapshot.len());
    }

    tracing::info!("ERP 查詢 {} 張工單，取得 {} 筆", ids.len(), snapshot.len());
    Ok(snapshot)
}

/// 分批查詢庫存並建立庫存帳
pub fn fetch_ledger(
    lookup: &dyn InventoryLookup,
    components: &BTreeSet<String>,
    batch_size: usize,
) -> LookupResult<InventoryLedger> {
    let components: Vec<String> = components.iter().cloned().collect();
    let mut stock: HashMap<String, Decimal> = HashMap::new();

    fetch_in_batches(&components, batch_size, |chunk| lookup.fetch(chunk), |part| {
        stock.extend(part)
    })?;

    let missing = components.iter().filter(|id| !stock.contains_key(*id)).count();
    if missing > 0 {
        tracing::debug!("{} 個物料查無庫存，以 0 計", missing);
    }

    Ok(stock.into_iter().collect())
}
