//! 模擬結果模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::order::OrderKey;

/// 齊料分級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    /// 已完工
    Completed,
    /// 已領齊
    FullyIssued,
    /// 倉庫齊料
    WarehouseSufficient,
    /// 缺料
    Short,
    /// 預計產量異常（≤ 0，無法計算單位用量）
    DegenerateQuantity,
    /// 查無 ERP 資料
    NoData,
}

impl Tier {
    /// 所有分級（報表彙總順序）
    pub const ALL: [Tier; 6] = [
        Tier::Completed,
        Tier::FullyIssued,
        Tier::WarehouseSufficient,
        Tier::Short,
        Tier::DegenerateQuantity,
        Tier::NoData,
    ];

    /// 機器可讀代碼
    pub fn code(&self) -> &'static str {
        match self {
            Tier::Completed => "completed",
            Tier::FullyIssued => "fully-issued",
            Tier::WarehouseSufficient => "warehouse-sufficient",
            Tier::Short => "short",
            Tier::DegenerateQuantity => "degenerate-quantity",
            Tier::NoData => "no-data",
        }
    }

    /// 報表顯示名稱
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Completed => "已完工",
            Tier::FullyIssued => "已領齊",
            Tier::WarehouseSufficient => "倉庫齊料",
            Tier::Short => "缺料",
            Tier::DegenerateQuantity => "數量異常",
            Tier::NoData => "無資料",
        }
    }

    /// 工單是否可完成全部產量
    pub fn is_kitted(&self) -> bool {
        matches!(
            self,
            Tier::Completed | Tier::FullyIssued | Tier::WarehouseSufficient
        )
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 缺料明細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortageLine {
    pub component_id: String,
    pub name: String,
    pub missing_qty: Decimal,
    pub unit: String,
}

impl ShortageLine {
    pub fn new(
        component_id: impl Into<String>,
        name: impl Into<String>,
        missing_qty: Decimal,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            component_id: component_id.into(),
            name: name.into(),
            missing_qty,
            unit: unit.into(),
        }
    }

    /// 格式：`品號,品名,缺<數量><單位>`，數量去除多餘的尾零
    pub fn render(&self) -> String {
        format!(
            "{},{},缺{}{}",
            self.component_id,
            self.name,
            self.missing_qty.normalize(),
            self.unit
        )
    }
}

/// 單張工單的模擬結果（建立後不再變更）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// 工單鍵
    pub key: OrderKey,

    /// 齊料分級
    pub tier: Tier,

    /// 齊套率 [0, 1]
    pub completion_rate: Decimal,

    /// 可生產數量（整數，不超過預計產量）
    pub achievable_qty: Decimal,

    /// 缺料明細
    pub shortages: Vec<ShortageLine>,

    /// 當期是否缺料（僅啟用每日狀態檢查時有值）
    pub daily_short: Option<bool>,

    /// 預計產量
    pub total_qty: Decimal,

    /// 計劃開工日
    pub start_date: Option<NaiveDate>,

    /// 當期計劃數量
    pub plan_qty: Option<Decimal>,
}

impl SimulationResult {
    /// 創建新的結果
    pub fn new(key: OrderKey, tier: Tier, completion_rate: Decimal, achievable_qty: Decimal) -> Self {
        Self {
            key,
            tier,
            completion_rate,
            achievable_qty,
            shortages: Vec::new(),
            daily_short: None,
            total_qty: Decimal::ZERO,
            start_date: None,
            plan_qty: None,
        }
    }

    /// 查無資料的結果
    pub fn no_data(key: OrderKey) -> Self {
        Self::new(key, Tier::NoData, Decimal::ZERO, Decimal::ZERO)
    }

    /// 建構器模式：設置缺料明細
    pub fn with_shortages(mut self, shortages: Vec<ShortageLine>) -> Self {
        self.shortages = shortages;
        self
    }

    /// 建構器模式：設置當期缺料旗標
    pub fn with_daily_short(mut self, daily_short: bool) -> Self {
        self.daily_short = Some(daily_short);
        self
    }

    /// 建構器模式：設置工單上下文（預計產量、開工日、當期計劃數量）
    pub fn with_context(
        mut self,
        total_qty: Decimal,
        start_date: Option<NaiveDate>,
        plan_qty: Option<Decimal>,
    ) -> Self {
        self.total_qty = total_qty;
        self.start_date = start_date;
        self.plan_qty = plan_qty;
        self
    }

    pub fn is_short(&self) -> bool {
        self.tier == Tier::Short
    }

    /// 缺料說明文字（各缺料行以 `; ` 連接）
    pub fn shortage_text(&self) -> String {
        self.shortages
            .iter()
            .map(ShortageLine::render)
            .collect::<Vec<_>>()
            .join("; ")
    }
}
