//! # Kitting Core
//!
//! 齊料模擬的核心資料模型與類型定義

pub mod bom;
pub mod config;
pub mod inventory;
pub mod order;
pub mod result;
pub mod snapshot;

// Re-export 主要類型
pub use bom::BomLine;
pub use config::{DemandAggregation, SimulationConfig};
pub use inventory::{Inventory, InventoryLedger};
pub use order::{OrderKey, OrderRow, OrderStatus, WorkOrder};
pub use result::{ShortageLine, SimulationResult, Tier};
pub use snapshot::{ErpOrderRecord, ErpSnapshot};

/// 齊料模擬錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum KittingError {
    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("無效的日期: {0}")]
    InvalidDate(String),

    #[error("配置解析失敗: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KittingError>;
