//! # Kitting Calculation Engine
//!
//! 依開工順序逐張工單模擬齊料、分級與庫存預佔

pub mod classifier;
pub mod requirement;
pub mod sequencer;
pub mod simulator;

// Re-export 主要類型
pub use classifier::{AvailabilityClassifier, ClassifierPolicy};
pub use requirement::{LineRequirement, OrderRequirement, RequirementResolver};
pub use sequencer::{OrderSequencer, QueuedOrder};
pub use simulator::{simulate, Simulator};

use kitting_core::{OrderKey, SimulationResult, Tier};
use std::collections::BTreeMap;
use uuid::Uuid;

/// 一次模擬的完整結果
#[derive(Debug, Clone)]
pub struct SimulationRun {
    /// 模擬批次ID
    pub run_id: Uuid,

    /// 各工單結果（與佇列同序）
    pub results: Vec<SimulationResult>,

    /// 警告信息
    pub warnings: Vec<SimulationWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl SimulationRun {
    /// 創建空的模擬結果
    pub fn empty() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            results: Vec::new(),
            warnings: Vec::new(),
            calculation_time_ms: None,
        }
    }

    /// 由結果建立，並為無資料與數量異常的工單產生警告
    pub fn from_results(results: Vec<SimulationResult>) -> Self {
        let mut run = Self::empty();
        for result in &results {
            match result.tier {
                Tier::NoData => run.add_warning(SimulationWarning::warning(
                    result.key.clone(),
                    "查無 ERP 工單或用料資料".to_string(),
                )),
                Tier::DegenerateQuantity => run.add_warning(SimulationWarning::error(
                    result.key.clone(),
                    format!("預計產量 {} 無法計算單位用量", result.total_qty),
                )),
                _ => {}
            }
        }
        run.results = results;
        run
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: SimulationWarning) {
        self.warnings.push(warning);
    }

    /// 各分級工單數
    pub fn tier_counts(&self) -> BTreeMap<Tier, usize> {
        let mut counts = BTreeMap::new();
        for result in &self.results {
            *counts.entry(result.tier).or_insert(0) += 1;
        }
        counts
    }

    /// 可完成全部產量的工單數
    pub fn kitted_count(&self) -> usize {
        self.results.iter().filter(|r| r.tier.is_kitted()).count()
    }
}

/// 模擬警告
#[derive(Debug, Clone)]
pub struct SimulationWarning {
    pub key: OrderKey,
    pub message: String,
    pub severity: WarningSeverity,
}

impl SimulationWarning {
    pub fn new(key: OrderKey, message: String, severity: WarningSeverity) -> Self {
        Self {
            key,
            message,
            severity,
        }
    }

    pub fn warning(key: OrderKey, message: String) -> Self {
        Self::new(key, message, WarningSeverity::Warning)
    }

    pub fn error(key: OrderKey, message: String) -> Self {
        Self::new(key, message, WarningSeverity::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_warnings_follow_tiers() {
        let degenerate = SimulationResult::new(
            OrderKey::new("5101", "ZERO"),
            Tier::DegenerateQuantity,
            Decimal::ZERO,
            Decimal::ZERO,
        );
        let missing = SimulationResult::no_data(OrderKey::new("5101", "404"));
        let kitted = SimulationResult::new(
            OrderKey::new("5101", "OK"),
            Tier::WarehouseSufficient,
            Decimal::ONE,
            Decimal::from(10),
        );

        let run = SimulationRun::from_results(vec![degenerate, missing, kitted]);

        assert_eq!(run.results.len(), 3);
        assert_eq!(run.warnings.len(), 2);
        assert_eq!(run.warnings[0].key, OrderKey::new("5101", "ZERO"));
        assert_eq!(run.warnings[0].severity, WarningSeverity::Error);
        assert_eq!(run.warnings[1].key, OrderKey::new("5101", "404"));
        assert_eq!(run.warnings[1].severity, WarningSeverity::Warning);
        assert_eq!(run.kitted_count(), 1);
        assert_eq!(run.tier_counts().get(&Tier::DegenerateQuantity), Some(&1));
    }
}
