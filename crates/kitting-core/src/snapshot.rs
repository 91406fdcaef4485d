//! ERP 工單快照

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::bom::BomLine;
use crate::order::{OrderKey, OrderStatus, WorkOrder};

/// 單張工單的 ERP 記錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErpOrderRecord {
    /// 工單狀態
    pub status: OrderStatus,

    /// 預計產量
    pub total_qty: Decimal,

    /// 用料明細
    pub bom: Vec<BomLine>,
}

impl ErpOrderRecord {
    pub fn new(status: OrderStatus, total_qty: Decimal) -> Self {
        Self {
            status,
            total_qty,
            bom: Vec::new(),
        }
    }

    /// 建構器模式：設置用料明細
    pub fn with_bom(mut self, bom: Vec<BomLine>) -> Self {
        self.bom = bom;
        self
    }

    /// 轉為工單
    pub fn to_work_order(&self, key: OrderKey) -> WorkOrder {
        WorkOrder::new(key, self.status, self.total_qty).with_bom(self.bom.clone())
    }
}

/// ERP 快照（模擬期間唯讀）
///
/// 查不到的工單不在快照內，由模擬器轉為無資料結果。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErpSnapshot {
    records: HashMap<OrderKey, ErpOrderRecord>,
}

impl ErpSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: OrderKey, record: ErpOrderRecord) {
        self.records.insert(key, record);
    }

    pub fn get(&self, key: &OrderKey) -> Option<&ErpOrderRecord> {
        self.records.get(key)
    }

    pub fn contains(&self, key: &OrderKey) -> bool {
        self.records.contains_key(key)
    }

    /// 合併另一批查詢結果
    pub fn merge(&mut self, other: ErpSnapshot) {
        self.records.extend(other.records);
    }

    /// 保留指定工單
    pub fn retain_keys(&mut self, keys: &BTreeSet<OrderKey>) {
        self.records.retain(|key, _| keys.contains(key));
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 快照內所有元件品號（供庫存查詢）
    pub fn component_ids(&self) -> BTreeSet<String> {
        self.records
            .values()
            .flat_map(|record| record.bom.iter().map(|line| line.component_id.clone()))
            .collect()
    }
}

impl FromIterator<(OrderKey, ErpOrderRecord)> for ErpSnapshot {
    fn from_iter<T: IntoIterator<Item = (OrderKey, ErpOrderRecord)>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
