//! 齊料模擬主流程

use kitting_core::{ErpSnapshot, InventoryLedger, SimulationConfig, SimulationResult};
use rust_decimal::Decimal;
use std::slice;

use crate::classifier::{AvailabilityClassifier, ClassifierPolicy};
use crate::sequencer::QueuedOrder;
use crate::SimulationRun;

/// 齊料模擬器
///
/// 依佇列順序逐張工單分級並扣帳。實作 `Iterator`，呼叫端可隨時停止，
/// 已取得的結果即為已處理工單的部分結果。
pub struct Simulator<'a> {
    /// 已排序的工單佇列
    queue: slice::Iter<'a, QueuedOrder>,

    /// ERP 快照（唯讀）
    snapshot: &'a ErpSnapshot,

    /// 庫存帳（本次模擬獨占）
    ledger: &'a mut InventoryLedger,

    classifier: AvailabilityClassifier,

    processed: usize,
}

impl<'a> Simulator<'a> {
    /// 創建新的模擬器
    pub fn new(
        queue: &'a [QueuedOrder],
        snapshot: &'a ErpSnapshot,
        ledger: &'a mut InventoryLedger,
        config: &SimulationConfig,
    ) -> Self {
        Self {
            queue: queue.iter(),
            snapshot,
            ledger,
            classifier: AvailabilityClassifier::new(ClassifierPolicy::from(config)),
            processed: 0,
        }
    }

    /// 已處理工單數
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// 處理整個佇列
    pub fn run(mut self) -> SimulationRun {
        let start_time = std::time::Instant::now();
        let total = self.queue.len();

        tracing::info!("開始齊料模擬：工單 {} 張，ERP 記錄 {} 筆", total, self.snapshot.len());

        let results: Vec<SimulationResult> = self.by_ref().collect();

        let over_committed = self.over_committed();
        if !over_committed.is_empty() {
            tracing::info!("超額預佔物料 {} 個: {}", over_committed.len(), over_committed.join(", "));
        }

        let mut run = SimulationRun::from_results(results);
        run.calculation_time_ms = Some(start_time.elapsed().as_millis());

        tracing::info!("齊料模擬完成，耗時 {:?}", start_time.elapsed());
        for (tier, count) in run.tier_counts() {
            tracing::info!("  {}: {}", tier.label(), count);
        }

        run
    }

    /// 已被扣成負數的物料（依品號排序）
    pub fn over_committed(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .ledger
            .iter()
            .map(|(id, _)| id)
            .filter(|id| self.ledger.is_over_committed(id))
            .collect();
        ids.sort_unstable();
        ids
    }

    fn simulate_one(&mut self, queued: &QueuedOrder) -> SimulationResult {
        let Some(record) = self.snapshot.get(&queued.key) else {
            tracing::warn!("工單 {} 查無 ERP 資料", queued.key);
            return SimulationResult::no_data(queued.key.clone()).with_context(
                Decimal::ZERO,
                Some(queued.start_date),
                Some(queued.plan_qty),
            );
        };

        let order = record
            .to_work_order(queued.key.clone())
            .with_start_date(queued.start_date)
            .with_plan_qty(queued.plan_qty);

        self.classifier.classify(&order, self.ledger)
    }
}

impl Iterator for Simulator<'_> {
    type Item = SimulationResult;

    fn next(&mut self) -> Option<Self::Item> {
        let queued = self.queue.next()?;
        let result = self.simulate_one(queued);
        self.processed += 1;
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.queue.size_hint()
    }
}

/// 模擬整個佇列，回傳與佇列同序的結果
pub fn simulate(
    queue: &[QueuedOrder],
    snapshot: &ErpSnapshot,
    ledger: &mut InventoryLedger,
    config: &SimulationConfig,
) -> Vec<SimulationResult> {
    Simulator::new(queue, snapshot, ledger, config).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use kitting_core::{BomLine, ErpOrderRecord, OrderKey, OrderStatus, Tier};
    use proptest::prelude::*;

    fn queued(number: &str, day: u32, index: usize) -> QueuedOrder {
        QueuedOrder {
            key: OrderKey::new("5101", number),
            start_date: NaiveDate::from_ymd_opt(2025, 11, day).unwrap(),
            row_index: index,
            plan_qty: Decimal::from(10),
        }
    }

    fn record(total_qty: i64, lines: &[(&str, i64, i64)]) -> ErpOrderRecord {
        ErpOrderRecord::new(OrderStatus::Open, Decimal::from(total_qty)).with_bom(
            lines
                .iter()
                .map(|(id, req, iss)| BomLine::new(*id, Decimal::from(*req), Decimal::from(*iss)))
                .collect(),
        )
    }

    #[test]
    fn test_earlier_order_claims_stock_first() {
        let queue = vec![queued("O1", 1, 0), queued("O2", 2, 1)];
        let snapshot: ErpSnapshot = vec![
            (OrderKey::new("5101", "O1"), record(100, &[("P", 50, 0)])),
            (OrderKey::new("5101", "O2"), record(10, &[("P", 10, 0)])),
        ]
        .into_iter()
        .collect();
        let mut ledger: InventoryLedger =
            vec![("P".to_string(), Decimal::from(30))].into_iter().collect();

        let results = simulate(&queue, &snapshot, &mut ledger, &SimulationConfig::new());

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].tier, Tier::Short);
        assert_eq!(results[0].achievable_qty, Decimal::from(60));
        assert_eq!(results[1].tier, Tier::Short);
        assert_eq!(results[1].completion_rate, Decimal::ZERO);
        assert_eq!(results[1].achievable_qty, Decimal::ZERO);
        assert_eq!(ledger.on_hand("P"), Decimal::from(-30));
    }

    #[test]
    fn test_over_committed_components() {
        let queue = vec![queued("O1", 1, 0)];
        let snapshot: ErpSnapshot = vec![(
            OrderKey::new("5101", "O1"),
            record(10, &[("P", 20, 0), ("Q", 5, 0), ("R", 3, 0)]),
        )]
        .into_iter()
        .collect();
        let mut ledger: InventoryLedger = vec![
            ("P".to_string(), Decimal::from(10)),
            ("Q".to_string(), Decimal::from(50)),
        ]
        .into_iter()
        .collect();

        let mut simulator = Simulator::new(&queue, &snapshot, &mut ledger, &SimulationConfig::new());
        assert!(simulator.next().is_some());

        assert_eq!(simulator.over_committed(), vec!["P", "R"]);
    }

    #[test]
    fn test_missing_key_is_no_data_and_run_continues() {
        let queue = vec![queued("MISSING", 1, 0), queued("O2", 2, 1)];
        let snapshot: ErpSnapshot = vec![(OrderKey::new("5101", "O2"), record(10, &[("P", 10, 0)]))]
            .into_iter()
            .collect();
        let mut ledger: InventoryLedger =
            vec![("P".to_string(), Decimal::from(10))].into_iter().collect();

        let results = simulate(&queue, &snapshot, &mut ledger, &SimulationConfig::new());

        assert_eq!(results[0].tier, Tier::NoData);
        assert_eq!(results[0].start_date, NaiveDate::from_ymd_opt(2025, 11, 1));
        assert_eq!(results[1].tier, Tier::WarehouseSufficient);
    }

    #[test]
    fn test_partial_iteration_keeps_processed_results() {
        let queue = vec![queued("O1", 1, 0), queued("O2", 2, 1), queued("O3", 3, 2)];
        let snapshot: ErpSnapshot = ["O1", "O2", "O3"]
            .iter()
            .map(|n| (OrderKey::new("5101", *n), record(1, &[("P", 1, 0)])))
            .collect();
        let mut ledger: InventoryLedger =
            vec![("P".to_string(), Decimal::from(5))].into_iter().collect();

        let mut simulator = Simulator::new(&queue, &snapshot, &mut ledger, &SimulationConfig::new());
        let partial: Vec<_> = simulator.by_ref().take(2).collect();

        assert_eq!(partial.len(), 2);
        assert_eq!(simulator.processed(), 2);
        assert!(simulator.over_committed().is_empty());
        drop(simulator);
        // 第三張未處理，只扣了兩張
        assert_eq!(ledger.on_hand("P"), Decimal::from(3));
    }

    #[test]
    fn test_run_collects_summary() {
        let queue = vec![queued("O1", 1, 0), queued("X", 2, 1)];
        let snapshot: ErpSnapshot = vec![(OrderKey::new("5101", "O1"), record(5, &[("P", 5, 5)]))]
            .into_iter()
            .collect();
        let mut ledger = InventoryLedger::new();

        let run = Simulator::new(&queue, &snapshot, &mut ledger, &SimulationConfig::new()).run();

        assert_eq!(run.results.len(), 2);
        assert!(run.calculation_time_ms.is_some());
        let counts = run.tier_counts();
        assert_eq!(counts.get(&Tier::FullyIssued), Some(&1));
        assert_eq!(counts.get(&Tier::NoData), Some(&1));
        assert_eq!(run.warnings.len(), 1);
    }

    prop_compose! {
        fn arb_orders()(
            orders in prop::collection::vec(
                (1i64..50, prop::collection::vec((0usize..4, 0i64..40, 0i64..40), 1..4), any::<bool>()),
                1..12,
            )
        ) -> Vec<(i64, Vec<(usize, i64, i64)>, bool)> {
            orders
        }
    }

    fn build(
        orders: &[(i64, Vec<(usize, i64, i64)>, bool)],
    ) -> (Vec<QueuedOrder>, ErpSnapshot) {
        let components = ["A", "B", "C", "D"];
        let mut queue = Vec::new();
        let mut snapshot = ErpSnapshot::new();
        for (i, (total, lines, completed)) in orders.iter().enumerate() {
            let number = format!("N{}", i);
            queue.push(queued(&number, 1, i));
            let status = if *completed { OrderStatus::Completed } else { OrderStatus::Open };
            let bom = lines
                .iter()
                .map(|(c, req, iss)| {
                    BomLine::new(components[*c], Decimal::from(*req), Decimal::from(*iss))
                })
                .collect();
            snapshot.insert(
                OrderKey::new("5101", number),
                ErpOrderRecord::new(status, Decimal::from(*total)).with_bom(bom),
            );
        }
        (queue, snapshot)
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// 相同輸入重複模擬，結果與庫存完全一致
        #[test]
        fn simulation_is_deterministic(orders in arb_orders(), stock in 0i64..100) {
            let (queue, snapshot) = build(&orders);
            let initial: InventoryLedger = ["A", "B", "C", "D"]
                .iter()
                .map(|c| (c.to_string(), Decimal::from(stock)))
                .collect();

            let mut first = initial.clone();
            let mut second = initial.clone();
            let config = SimulationConfig::new();

            prop_assert_eq!(
                simulate(&queue, &snapshot, &mut first, &config),
                simulate(&queue, &snapshot, &mut second, &config)
            );
            prop_assert_eq!(first, second);
        }

        /// 每張工單扣帳量等於其未領量合計（缺料與否皆同）
        #[test]
        fn depletion_is_monotone(orders in arb_orders(), stock in 0i64..100) {
            let (queue, snapshot) = build(&orders);
            let mut ledger: InventoryLedger = ["A", "B", "C", "D"]
                .iter()
                .map(|c| (c.to_string(), Decimal::from(stock)))
                .collect();
            let config = SimulationConfig::new();

            for queued in &queue {
                let before = ledger.clone();
                let results = simulate(slice::from_ref(queued), &snapshot, &mut ledger, &config);
                let result = &results[0];
                let record = snapshot.get(&queued.key).unwrap();

                for component in ["A", "B", "C", "D"] {
                    let need: Decimal = record
                        .bom
                        .iter()
                        .filter(|line| line.component_id == component)
                        .map(|line| line.remaining_need())
                        .sum();
                    let expected = match result.tier {
                        Tier::WarehouseSufficient | Tier::Short => before.on_hand(component) - need,
                        _ => before.on_hand(component),
                    };
                    prop_assert_eq!(ledger.on_hand(component), expected);
                }

                prop_assert!(result.completion_rate >= Decimal::ZERO);
                prop_assert!(result.completion_rate <= Decimal::ONE);
                prop_assert!(result.achievable_qty <= record.total_qty);
                if result.tier == Tier::Completed || result.tier == Tier::FullyIssued {
                    prop_assert_eq!(&ledger, &before);
                }
            }
        }
    }
}
