//! 齊料分級與庫存預佔
//!
//! 每張工單依下列順序判定，先符合者為準：
//!
//! 1. 已完工：不看用料，不動庫存。
//! 2. 查無用料：無資料。
//! 3. 未領總量為 0：已領齊，不動庫存。
//! 4. 預計產量 ≤ 0：數量異常，不動庫存。
//! 5. 逐行比對有效庫存：沒有缺料行為倉庫齊料，否則為缺料。
//!
//! 進入第 5 步的工單一律以全部未領量扣帳，缺料行也不例外，
//! 讓不足的差額成為負庫存留給後續工單。

use kitting_core::{
    InventoryLedger, ShortageLine, SimulationConfig, SimulationResult, Tier, WorkOrder,
};
use rust_decimal::Decimal;

use crate::requirement::{OrderRequirement, RequirementResolver};

/// 分級策略
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierPolicy {
    /// 是否計算當期缺料旗標
    pub daily_short_check: bool,
    /// 缺料判定容差
    pub shortage_epsilon: Decimal,
}

impl From<&SimulationConfig> for ClassifierPolicy {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            daily_short_check: config.daily_short_check,
            shortage_epsilon: config.shortage_epsilon,
        }
    }
}

impl Default for ClassifierPolicy {
    fn default() -> Self {
        Self::from(&SimulationConfig::default())
    }
}

/// 齊料分級器
#[derive(Debug, Clone, Default)]
pub struct AvailabilityClassifier {
    policy: ClassifierPolicy,
}

impl AvailabilityClassifier {
    /// 創建分級器
    pub fn new(policy: ClassifierPolicy) -> Self {
        Self { policy }
    }

    /// 分級並預佔庫存
    pub fn classify(&self, order: &WorkOrder, ledger: &mut InventoryLedger) -> SimulationResult {
        let requirement = RequirementResolver::resolve(order);
        let result = self.evaluate_requirement(order, &requirement, ledger);

        if matches!(result.tier, Tier::WarehouseSufficient | Tier::Short) {
            Self::reserve(&requirement, ledger);
        }

        tracing::debug!(
            "工單 {} 分級 {}，齊套率 {}，可產 {}",
            order.key,
            result.tier,
            result.completion_rate,
            result.achievable_qty
        );

        result
    }

    /// 只分級，不動庫存
    pub fn evaluate(&self, order: &WorkOrder, ledger: &InventoryLedger) -> SimulationResult {
        let requirement = RequirementResolver::resolve(order);
        self.evaluate_requirement(order, &requirement, ledger)
    }

    fn evaluate_requirement(
        &self,
        order: &WorkOrder,
        requirement: &OrderRequirement<'_>,
        ledger: &InventoryLedger,
    ) -> SimulationResult {
        let full_qty = order.total_qty.max(Decimal::ZERO).floor();
        let daily_check = self.policy.daily_short_check;

        let base = |tier: Tier, rate: Decimal, achievable: Decimal| {
            SimulationResult::new(order.key.clone(), tier, rate, achievable).with_context(
                order.total_qty,
                order.start_date,
                order.plan_qty,
            )
        };

        if order.is_completed() {
            let result = base(Tier::Completed, Decimal::ONE, full_qty);
            return if daily_check {
                result.with_daily_short(false)
            } else {
                result
            };
        }

        if order.bom.is_empty() {
            tracing::warn!("工單 {} 查無用料明細", order.key);
            return base(Tier::NoData, Decimal::ZERO, Decimal::ZERO);
        }

        if requirement.is_fully_issued() {
            let result = base(Tier::FullyIssued, Decimal::ONE, full_qty);
            return if daily_check {
                result.with_daily_short(false)
            } else {
                result
            };
        }

        if !requirement.has_valid_quantity {
            tracing::warn!(
                "工單 {} 預計產量 {} 無法計算單位用量，標記為數量異常",
                order.key,
                order.total_qty
            );
            return base(Tier::DegenerateQuantity, Decimal::ZERO, Decimal::ZERO);
        }

        let epsilon = self.policy.shortage_epsilon;
        let mut rate = Decimal::ONE;
        let mut min_sets: Option<Decimal> = None;
        let mut shortages = Vec::new();
        let mut daily_short = false;

        for req in requirement.consuming_lines() {
            let effective = ledger.effective(&req.line.component_id);

            if req.remaining_need > Decimal::ZERO {
                let line_rate = if effective >= req.remaining_need {
                    Decimal::ONE
                } else {
                    effective
                        .checked_div(req.remaining_need)
                        .unwrap_or(Decimal::ZERO)
                };
                rate = rate.min(line_rate);

                if effective < req.remaining_need.saturating_sub(epsilon) {
                    shortages.push(ShortageLine::new(
                        req.line.component_id.clone(),
                        req.line.display_name(),
                        req.remaining_need - effective,
                        req.line.unit.clone(),
                    ));
                }
            }

            if let Some(sets) = req.supported_sets(effective, order.total_qty) {
                min_sets = Some(min_sets.map_or(sets, |m| m.min(sets)));
            }

            if daily_check {
                if let Some(plan_qty) = order.plan_qty {
                    if let Some(need) = req.period_need(plan_qty, order.total_qty) {
                        if effective < need.saturating_sub(epsilon) {
                            daily_short = true;
                        }
                    }
                }
            }
        }

        let result = if shortages.is_empty() {
            // 缺口只存在於已領帳面，倉庫量足以完成整張工單
            base(Tier::WarehouseSufficient, Decimal::ONE, full_qty)
        } else {
            let achievable = min_sets.map_or(full_qty, |sets| sets.min(full_qty));
            base(Tier::Short, rate.max(Decimal::ZERO), achievable).with_shortages(shortages)
        };

        if daily_check {
            result.with_daily_short(daily_short)
        } else {
            result
        }
    }

    /// 以全部未領量扣帳
    fn reserve(requirement: &OrderRequirement<'_>, ledger: &mut InventoryLedger) {
        for req in &requirement.lines {
            ledger.deplete(&req.line.component_id, req.remaining_need);
        }
    }
}
