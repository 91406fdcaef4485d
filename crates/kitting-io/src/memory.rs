//! 記憶體內的查詢實作（嵌入與測試用）

use kitting_core::{ErpOrderRecord, ErpSnapshot, OrderKey, OrderRow};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::error::LookupResult;
use crate::lookup::{ErpLookup, InventoryLookup, OrderSource};

/// 記憶體排程來源
#[derive(Debug, Clone, Default)]
pub struct MemoryOrderSource {
    rows: Vec<OrderRow>,
}

impl MemoryOrderSource {
    pub fn new(rows: Vec<OrderRow>) -> Self {
        Self { rows }
    }
}

impl OrderSource for MemoryOrderSource {
    fn extract(&self) -> LookupResult<Vec<OrderRow>> {
        Ok(self.rows.clone())
    }
}

/// 記憶體 ERP
#[derive(Debug, Clone, Default)]
pub struct MemoryErp {
    records: HashMap<OrderKey, ErpOrderRecord>,
}

impl MemoryErp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: OrderKey, record: ErpOrderRecord) {
        self.records.insert(key, record);
    }
}

impl ErpLookup for MemoryErp {
    fn fetch(&self, keys: &[OrderKey]) -> LookupResult<ErpSnapshot> {
        Ok(keys
            .iter()
            .filter_map(|key| {
                self.records
                    .get(key)
                    .map(|record| (key.clone(), record.clone()))
            })
            .collect())
    }
}

/// 記憶體庫存
#[derive(Debug, Clone, Default)]
pub struct MemoryInventory {
    stock: HashMap<String, Decimal>,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, component_id: impl Into<String>, quantity: Decimal) {
        self.stock.insert(component_id.into(), quantity);
    }
}

impl FromIterator<(String, Decimal)> for MemoryInventory {
    fn from_iter<T: IntoIterator<Item = (String, Decimal)>>(iter: T) -> Self {
        Self {
            stock: iter.into_iter().collect(),
        }
    }
}

impl InventoryLookup for MemoryInventory {
    fn fetch(&self, components: &[String]) -> LookupResult<HashMap<String, Decimal>> {
        Ok(components
            .iter()
            .filter_map(|id| self.stock.get(id).map(|qty| (id.clone(), *qty)))
            .collect())
    }
}
