//! 工單模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bom::BomLine;

/// 工單鍵（單別 + 單號），在一次模擬中唯一
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderKey {
    /// 工單單別
    pub order_type: String,

    /// 工單單號
    pub order_number: String,
}

impl OrderKey {
    /// 創建新的工單鍵（會去除前後空白）
    pub fn new(order_type: impl Into<String>, order_number: impl Into<String>) -> Self {
        Self {
            order_type: order_type.into().trim().to_string(),
            order_number: order_number.into().trim().to_string(),
        }
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.order_type, self.order_number)
    }
}

/// 工單狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// 未完工
    Open,
    /// 已完工（ERP 結案碼）
    Completed,
}

impl OrderStatus {
    /// 由 ERP 狀態碼解析
    ///
    /// `Y`（已完工）、`y`（指定完工）視為完工，其餘一律視為未完工。
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "Y" | "y" => OrderStatus::Completed,
            other if other.eq_ignore_ascii_case("completed") => OrderStatus::Completed,
            _ => OrderStatus::Open,
        }
    }

    pub fn is_completed(&self) -> bool {
        *self == OrderStatus::Completed
    }
}

/// 排程來源列（由外部抽取，尚未經過過濾）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRow {
    /// 工單鍵
    pub key: OrderKey,

    /// 計劃開工日（無法解析時為 None）
    pub start_date: Option<NaiveDate>,

    /// 該期計劃數量
    pub plan_qty: Option<Decimal>,

    /// 原始列號（同日排序的決勝鍵）
    pub row_index: usize,
}

impl OrderRow {
    /// 創建新的來源列
    pub fn new(key: OrderKey, row_index: usize) -> Self {
        Self {
            key,
            start_date: None,
            plan_qty: None,
            row_index,
        }
    }

    /// 建構器模式：設置開工日
    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// 建構器模式：設置計劃數量
    pub fn with_plan_qty(mut self, plan_qty: Decimal) -> Self {
        self.plan_qty = Some(plan_qty);
        self
    }

    /// 檢查是否可進入排程佇列（有日期且計劃數量為正）
    pub fn is_schedulable(&self) -> bool {
        self.start_date.is_some() && self.plan_qty.is_some_and(|q| q > Decimal::ZERO)
    }
}

/// 工單（來源列 + ERP 資料合併後的結果，模擬期間不可變）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    /// 工單鍵
    pub key: OrderKey,

    /// 工單狀態
    pub status: OrderStatus,

    /// 預計產量
    pub total_qty: Decimal,

    /// 計劃開工日
    pub start_date: Option<NaiveDate>,

    /// 每期計劃數量（僅每日狀態檢查使用）
    pub plan_qty: Option<Decimal>,

    /// 用料明細
    pub bom: Vec<BomLine>,
}

impl WorkOrder {
    /// 創建新的工單
    pub fn new(key: OrderKey, status: OrderStatus, total_qty: Decimal) -> Self {
        Self {
            key,
            status,
            total_qty,
            start_date: None,
            plan_qty: None,
            bom: Vec::new(),
        }
    }

    /// 建構器模式：設置開工日
    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// 建構器模式：設置每期計劃數量
    pub fn with_plan_qty(mut self, plan_qty: Decimal) -> Self {
        self.plan_qty = Some(plan_qty);
        self
    }

    /// 建構器模式：設置用料明細
    pub fn with_bom(mut self, bom: Vec<BomLine>) -> Self {
        self.bom = bom;
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    /// 預計產量是否可用於計算單位用量
    pub fn has_valid_quantity(&self) -> bool {
        self.total_qty > Decimal::ZERO
    }
}
