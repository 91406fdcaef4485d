//! 模擬配置模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{KittingError, Result};

/// 預設缺料容差（吸收 ERP 小數尾差）
pub const DEFAULT_SHORTAGE_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// 預設查詢批量
pub const DEFAULT_LOOKUP_BATCH_SIZE: usize = 500;

/// 需求彙總方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DemandAggregation {
    /// 單期：取工單最早一列的計劃數量
    #[default]
    SinglePeriod,
    /// 區間合計：分析區間內同一工單各列的計劃數量加總
    SummedRange,
}

/// 齊料模擬配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// 是否計算當期缺料旗標
    pub daily_short_check: bool,

    /// 需求彙總方式
    pub demand_aggregation: DemandAggregation,

    /// 缺料判定容差
    pub shortage_epsilon: Decimal,

    /// 分析區間起日（含）
    pub window_start: Option<NaiveDate>,

    /// 分析區間迄日（含）
    pub window_end: Option<NaiveDate>,

    /// ERP/庫存查詢每批的鍵數量
    pub lookup_batch_size: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            daily_short_check: false,
            demand_aggregation: DemandAggregation::SinglePeriod,
            shortage_epsilon: DEFAULT_SHORTAGE_EPSILON,
            window_start: None,
            window_end: None,
            lookup_batch_size: DEFAULT_LOOKUP_BATCH_SIZE,
        }
    }
}

impl SimulationConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 讀取（缺少的欄位使用預設值）
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：啟用當期缺料檢查
    pub fn with_daily_short_check(mut self, enabled: bool) -> Self {
        self.daily_short_check = enabled;
        self
    }

    /// 建構器模式：設置需求彙總方式
    pub fn with_demand_aggregation(mut self, aggregation: DemandAggregation) -> Self {
        self.demand_aggregation = aggregation;
        self
    }

    /// 建構器模式：設置缺料容差
    pub fn with_shortage_epsilon(mut self, epsilon: Decimal) -> Self {
        self.shortage_epsilon = epsilon;
        self
    }

    /// 建構器模式：設置分析區間
    pub fn with_window(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.window_start = start;
        self.window_end = end;
        self
    }

    /// 建構器模式：設置查詢批量
    pub fn with_lookup_batch_size(mut self, size: usize) -> Self {
        self.lookup_batch_size = size;
        self
    }

    /// 檢查日期是否落在分析區間內
    pub fn in_window(&self, date: NaiveDate) -> bool {
        self.window_start.map_or(true, |start| date >= start)
            && self.window_end.map_or(true, |end| date <= end)
    }

    /// 驗證配置
    pub fn validate(&self) -> Result<()> {
        if self.shortage_epsilon < Decimal::ZERO {
            return Err(KittingError::InvalidConfig(format!(
                "缺料容差不可為負: {}",
                self.shortage_epsilon
            )));
        }

        if self.lookup_batch_size == 0 {
            return Err(KittingError::InvalidConfig(
                "查詢批量必須大於 0".to_string(),
            ));
        }

        if let (Some(start), Some(end)) = (self.window_start, self.window_end) {
            if start > end {
                return Err(KittingError::InvalidDate(format!(
                    "分析區間起日 {} 晚於迄日 {}",
                    start, end
                )));
            }
        }

        Ok(())
    }
}
