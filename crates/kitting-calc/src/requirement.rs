//! 工單未領需求計算

use kitting_core::{BomLine, WorkOrder};
use rust_decimal::Decimal;

/// 單行用料需求
#[derive(Debug, Clone)]
pub struct LineRequirement<'a> {
    /// 用料明細
    pub line: &'a BomLine,
    /// 單位用量（預計產量 ≤ 0 時為 None）
    pub unit_use: Option<Decimal>,
    /// 未領量
    pub remaining_need: Decimal,
}

impl<'a> LineRequirement<'a> {
    /// 是否參與齊套計算
    pub fn is_consuming(&self) -> bool {
        self.unit_use.is_some_and(|u| u > Decimal::ZERO)
    }

    /// 已領量加上可用庫存能支撐的套數
    ///
    /// 以 `(已領 + 有效庫存) * 預計產量 / 需領` 計算，等同除以單位用量，
    /// 但不會先把無限小數的單位用量捨入。乘積超出 `Decimal` 範圍時改除以
    /// 單位用量，仍溢位則視為無上限。
    pub fn supported_sets(&self, effective: Decimal, total_qty: Decimal) -> Option<Decimal> {
        let unit_use = self.unit_use.filter(|u| *u > Decimal::ZERO)?;
        let available = self.line.issued_qty.saturating_add(effective);

        let sets = available
            .checked_mul(total_qty)
            .and_then(|product| product.checked_div(self.line.required_qty))
            .or_else(|| available.checked_div(unit_use))
            .unwrap_or(Decimal::MAX);
        Some(sets.floor())
    }

    /// 當期需領量 = min(未領量, 當期計劃數量 * 單位用量)
    pub fn period_need(&self, plan_qty: Decimal, total_qty: Decimal) -> Option<Decimal> {
        let unit_use = self.unit_use.filter(|u| *u > Decimal::ZERO)?;

        let period_draw = plan_qty
            .checked_mul(self.line.required_qty)
            .and_then(|product| product.checked_div(total_qty))
            .or_else(|| plan_qty.checked_mul(unit_use))
            .unwrap_or(Decimal::MAX);
        Some(self.remaining_need.min(period_draw))
    }
}

/// 整張工單的需求
#[derive(Debug, Clone)]
pub struct OrderRequirement<'a> {
    /// 各行需求（與用料明細同序）
    pub lines: Vec<LineRequirement<'a>>,
    /// 未領總量
    pub total_remaining_demand: Decimal,
    /// 預計產量是否可用
    pub has_valid_quantity: bool,
}

impl<'a> OrderRequirement<'a> {
    /// 是否已全部領齊
    pub fn is_fully_issued(&self) -> bool {
        self.total_remaining_demand.is_zero()
    }

    /// 參與齊套計算的行
    pub fn consuming_lines(&self) -> impl Iterator<Item = &LineRequirement<'a>> {
        self.lines.iter().filter(|req| req.is_consuming())
    }
}

/// 需求計算器（無狀態，每張工單由 ERP 快照重新計算）
pub struct RequirementResolver;

impl RequirementResolver {
    /// 計算工單各行的單位用量與未領量
    pub fn resolve(order: &WorkOrder) -> OrderRequirement<'_> {
        let has_valid_quantity = order.has_valid_quantity();

        let lines: Vec<LineRequirement<'_>> = order
            .bom
            .iter()
            .map(|line| LineRequirement {
                line,
                unit_use: has_valid_quantity.then(|| {
                    line.required_qty
                        .checked_div(order.total_qty)
                        .unwrap_or(Decimal::MAX)
                }),
                remaining_need: line.remaining_need(),
            })
            .collect();

        let total_remaining_demand = lines
            .iter()
            .fold(Decimal::ZERO, |acc, req| acc.saturating_add(req.remaining_need));

        OrderRequirement {
            lines,
            total_remaining_demand,
            has_valid_quantity,
        }
    }
}
