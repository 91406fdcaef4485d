//! 工單用料模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 工單用料明細（一張工單的一個元件）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomLine {
    /// 元件品號
    pub component_id: String,

    /// 元件品名
    pub name: Option<String>,

    /// 單位
    pub unit: String,

    /// 需領用量（整張工單）
    pub required_qty: Decimal,

    /// 已領用量
    pub issued_qty: Decimal,
}

impl BomLine {
    /// 創建新的用料明細（負數量會被截為 0）
    pub fn new(component_id: impl Into<String>, required_qty: Decimal, issued_qty: Decimal) -> Self {
        Self {
            component_id: component_id.into(),
            name: None,
            unit: String::new(),
            required_qty: required_qty.max(Decimal::ZERO),
            issued_qty: issued_qty.max(Decimal::ZERO),
        }
    }

    /// 建構器模式：設置品名
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name = if name.trim().is_empty() {
            None
        } else {
            Some(name)
        };
        self
    }

    /// 建構器模式：設置單位
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// 未領量 = max(0, 需領 - 已領)
    pub fn remaining_need(&self) -> Decimal {
        (self.required_qty - self.issued_qty).max(Decimal::ZERO)
    }

    /// 顯示用品名，缺失時為 `?`
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("?")
    }
}
