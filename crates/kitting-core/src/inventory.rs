//! 庫存模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 庫存記錄（來自庫存查詢）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    /// 物料ID
    pub component_id: String,

    /// 現有庫存
    pub on_hand_qty: Decimal,

    /// 倉庫
    pub warehouse_id: Option<String>,
}

impl Inventory {
    /// 創建新的庫存記錄
    pub fn new(component_id: impl Into<String>, on_hand_qty: Decimal) -> Self {
        Self {
            component_id: component_id.into(),
            on_hand_qty,
            warehouse_id: None,
        }
    }

    /// 建構器模式：設置倉庫
    pub fn with_warehouse_id(mut self, warehouse_id: String) -> Self {
        self.warehouse_id = Some(warehouse_id);
        self
    }
}

/// 庫存帳
///
/// 一次模擬獨占的可變庫存池。扣帳允許把庫存扣成負數，負值代表已被
/// 前面工單超額預佔，後續工單看到的有效庫存為 0。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryLedger {
    stock: HashMap<String, Decimal>,
}

impl InventoryLedger {
    /// 創建空的庫存帳
    pub fn new() -> Self {
        Self::default()
    }

    /// 由庫存記錄建立（同一物料多倉庫合計）
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Inventory>) -> Self {
        let mut ledger = Self::new();
        for record in records {
            *ledger
                .stock
                .entry(record.component_id.clone())
                .or_insert(Decimal::ZERO) += record.on_hand_qty;
        }
        ledger
    }

    /// 設置物料現有量
    pub fn set(&mut self, component_id: impl Into<String>, quantity: Decimal) {
        self.stock.insert(component_id.into(), quantity);
    }

    /// 已登錄物料的帳面量
    pub fn get(&self, component_id: &str) -> Option<Decimal> {
        self.stock.get(component_id).copied()
    }

    /// 帳面現有量（未登錄的物料為 0，可能為負）
    pub fn on_hand(&self, component_id: &str) -> Decimal {
        self.get(component_id).unwrap_or(Decimal::ZERO)
    }

    /// 有效庫存 = max(0, 帳面現有量)
    pub fn effective(&self, component_id: &str) -> Decimal {
        self.on_hand(component_id).max(Decimal::ZERO)
    }

    /// 扣帳（不做下限檢查，超出數值範圍時飽和）
    pub fn deplete(&mut self, component_id: &str, quantity: Decimal) {
        match self.stock.get_mut(component_id) {
            Some(qty) => *qty = qty.saturating_sub(quantity),
            None => {
                self.stock.insert(component_id.to_string(), -quantity);
            }
        }
    }

    /// 是否已被超額預佔
    pub fn is_over_committed(&self, component_id: &str) -> bool {
        self.on_hand(component_id) < Decimal::ZERO
    }

    pub fn len(&self) -> usize {
        self.stock.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stock.is_empty()
    }

    /// 遍歷所有物料
    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.stock.iter().map(|(id, qty)| (id.as_str(), *qty))
    }
}

impl FromIterator<(String, Decimal)> for InventoryLedger {
    fn from_iter<T: IntoIterator<Item = (String, Decimal)>>(iter: T) -> Self {
        Self {
            stock: iter.into_iter().collect(),
        }
    }
}
