//! CSV 檔案來源
//!
//! 表頭同時接受英文欄名與 ERP 匯出的中文欄名。

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use kitting_core::{
    BomLine, ErpOrderRecord, ErpSnapshot, Inventory, InventoryLedger, OrderKey, OrderRow,
    OrderStatus,
};
use rust_decimal::Decimal;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{LookupError, LookupResult};
use crate::lookup::{ErpLookup, InventoryLookup, OrderSource};

const ORDER_TYPE: &[&str] = &["order_type", "工單單別"];
const ORDER_NUMBER: &[&str] = &["order_number", "工單單號"];
const START_DATE: &[&str] = &["start_date", "預計開工"];
const PLAN_QTY: &[&str] = &["plan_qty", "計劃數量"];
const STATUS: &[&str] = &["status", "狀態碼"];
const TOTAL_QTY: &[&str] = &["total_qty", "預計產量"];
const COMPONENT: &[&str] = &["component", "元件品號"];
const NAME: &[&str] = &["name", "品名"];
const UNIT: &[&str] = &["unit", "單位"];
const REQUIRED: &[&str] = &["req", "需領用量"];
const ISSUED: &[&str] = &["iss", "已領用量"];
const ON_HAND: &[&str] = &["qty", "庫存數量"];
const WAREHOUSE: &[&str] = &["warehouse", "庫別"];

/// 解析日期（`YYYY-MM-DD`、`YYYY/MM/DD`、`YYYYMMDD`，可帶時間）
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            ["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// 解析數值（容許千分位逗號與科學記號）
pub fn parse_decimal(value: &str) -> Option<Decimal> {
    let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

/// 表頭欄位索引
struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        Self {
            index: headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.trim().trim_start_matches('\u{feff}').to_string(), i))
                .collect(),
        }
    }

    fn find(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|alias| self.index.get(*alias).copied())
    }

    fn require(&self, aliases: &[&str]) -> LookupResult<usize> {
        self.find(aliases).ok_or_else(|| LookupError::FieldMissing {
            row: 1,
            field: aliases[0].to_string(),
        })
    }
}

fn open_reader(path: &Path) -> LookupResult<csv::Reader<File>> {
    if !path.exists() {
        return Err(LookupError::FileNotFound(path.display().to_string()));
    }

    let file = File::open(path)?;
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(file))
}

fn cell(record: &StringRecord, idx: Option<usize>) -> &str {
    idx.and_then(|i| record.get(i)).unwrap_or("")
}

fn line_of(record: &StringRecord) -> usize {
    record
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or_default()
}

/// 數值欄位：空白為 0，格式錯誤回報
fn quantity(record: &StringRecord, idx: Option<usize>, field: &str) -> LookupResult<Decimal> {
    let raw = cell(record, idx);
    if raw.is_empty() {
        return Ok(Decimal::ZERO);
    }
    parse_decimal(raw).ok_or_else(|| LookupError::InvalidNumber {
        row: line_of(record),
        field: field.to_string(),
        value: raw.to_string(),
    })
}

/// CSV 排程來源（欄位：order_type, order_number, start_date, plan_qty）
pub struct CsvOrderSource {
    path: PathBuf,
}

impl CsvOrderSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OrderSource for CsvOrderSource {
    fn extract(&self) -> LookupResult<Vec<OrderRow>> {
        let mut reader = open_reader(&self.path)?;
        let columns = Columns::from_headers(reader.headers()?);
        let type_col = columns.require(ORDER_TYPE)?;
        let number_col = columns.require(ORDER_NUMBER)?;
        let start_date = columns.find(START_DATE);
        let plan_qty = columns.find(PLAN_QTY);

        let mut rows = Vec::new();
        for (row_index, result) in reader.records().enumerate() {
            let record = result?;
            let order_type = cell(&record, Some(type_col));
            let order_number = cell(&record, Some(number_col));

            // 非工單列（空白、小計等）
            if order_type.is_empty() || order_number.is_empty() {
                continue;
            }

            let mut row = OrderRow::new(OrderKey::new(order_type, order_number), row_index);
            if let Some(date) = parse_date(cell(&record, start_date)) {
                row = row.with_start_date(date);
            }
            if let Some(qty) = parse_decimal(cell(&record, plan_qty)) {
                row = row.with_plan_qty(qty);
            }
            rows.push(row);
        }

        tracing::info!("讀取排程 {} 列: {}", rows.len(), self.path.display());
        Ok(rows)
    }
}

/// CSV ERP 快照（每列一筆用料：order_type, order_number, status, total_qty,
/// component, name, unit, req, iss）
pub struct CsvErpSource {
    snapshot: ErpSnapshot,
}

impl CsvErpSource {
    /// 讀取整個檔案
    pub fn open(path: impl AsRef<Path>) -> LookupResult<Self> {
        let path = path.as_ref();
        let mut reader = open_reader(path)?;
        let columns = Columns::from_headers(reader.headers()?);
        let order_type = columns.require(ORDER_TYPE)?;
        let order_number = columns.require(ORDER_NUMBER)?;
        let total_qty = columns.require(TOTAL_QTY)?;
        let status = columns.find(STATUS);
        let component = columns.find(COMPONENT);
        let name = columns.find(NAME);
        let unit = columns.find(UNIT);
        let required = columns.find(REQUIRED);
        let issued = columns.find(ISSUED);

        let mut records: HashMap<OrderKey, ErpOrderRecord> = HashMap::new();
        for result in reader.records() {
            let record = result?;
            let key = OrderKey::new(
                cell(&record, Some(order_type)),
                cell(&record, Some(order_number)),
            );
            if key.order_type.is_empty() || key.order_number.is_empty() {
                continue;
            }

            // 表頭欄位以該工單第一列為準
            let entry = match records.entry(key) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => entry.insert(ErpOrderRecord::new(
                    OrderStatus::from_code(cell(&record, status)),
                    quantity(&record, Some(total_qty), TOTAL_QTY[0])?,
                )),
            };

            // 工單存在但無用料的列
            let component_id = cell(&record, component);
            if component_id.is_empty() {
                continue;
            }

            entry.bom.push(
                BomLine::new(
                    component_id,
                    quantity(&record, required, REQUIRED[0])?,
                    quantity(&record, issued, ISSUED[0])?,
                )
                .with_name(cell(&record, name))
                .with_unit(cell(&record, unit)),
            );
        }

        tracing::info!("讀取 ERP 工單 {} 張: {}", records.len(), path.display());
        Ok(Self {
            snapshot: records.into_iter().collect(),
        })
    }
}

impl ErpLookup for CsvErpSource {
    fn fetch(&self, keys: &[OrderKey]) -> LookupResult<ErpSnapshot> {
        Ok(keys
            .iter()
            .filter_map(|key| {
                self.snapshot
                    .get(key)
                    .map(|record| (key.clone(), record.clone()))
            })
            .collect())
    }
}

/// CSV 庫存（欄位：component, qty, warehouse；同物料多列視為多倉合計）
pub struct CsvInventorySource {
    ledger: InventoryLedger,
}

impl CsvInventorySource {
    pub fn open(path: impl AsRef<Path>) -> LookupResult<Self> {
        let path = path.as_ref();
        let mut reader = open_reader(path)?;
        let columns = Columns::from_headers(reader.headers()?);
        let component = columns.require(COMPONENT)?;
        let on_hand = columns.require(ON_HAND)?;
        let warehouse = columns.find(WAREHOUSE);

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            let component_id = cell(&record, Some(component));
            if component_id.is_empty() {
                continue;
            }

            let mut inventory =
                Inventory::new(component_id, quantity(&record, Some(on_hand), ON_HAND[0])?);
            let warehouse_id = cell(&record, warehouse);
            if !warehouse_id.is_empty() {
                inventory = inventory.with_warehouse_id(warehouse_id.to_string());
            }
            records.push(inventory);
        }

        let ledger = InventoryLedger::from_records(&records);
        tracing::info!(
            "讀取庫存 {} 列，{} 個物料: {}",
            records.len(),
            ledger.len(),
            path.display()
        );
        Ok(Self { ledger })
    }
}

impl InventoryLookup for CsvInventorySource {
    fn fetch(&self, components: &[String]) -> LookupResult<HashMap<String, Decimal>> {
        Ok(components
            .iter()
            .filter_map(|id| self.ledger.get(id).map(|qty| (id.clone(), qty)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[rstest]
    #[case("2025-11-03", Some((2025, 11, 3)))]
    #[case("2025/11/03", Some((2025, 11, 3)))]
    #[case("20251103", Some((2025, 11, 3)))]
    #[case("2025-11-03 00:00:00", Some((2025, 11, 3)))]
    #[case("11/03", None)]
    #[case("", None)]
    fn test_parse_date(#[case] raw: &str, #[case] expected: Option<(i32, u32, u32)>) {
        let expected = expected.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
        assert_eq!(parse_date(raw), expected);
    }

    #[rstest]
    #[case("12", Some(Decimal::from(12)))]
    #[case(" 1,200 ", Some(Decimal::from(1200)))]
    #[case("1e3", Some(Decimal::from(1000)))]
    #[case("abc", None)]
    #[case("", None)]
    fn test_parse_decimal(#[case] raw: &str, #[case] expected: Option<Decimal>) {
        assert_eq!(parse_decimal(raw), expected);
    }

    #[test]
    fn test_order_source_keeps_row_index() {
        let file = temp_csv(
            "order_type,order_number,start_date,plan_qty\n\
             5101,A,2025-11-02,10\n\
             ,,,\n\
             5101,B,bad-date,5\n\
             5101,C,2025-11-01,\n",
        );

        let rows = CsvOrderSource::new(file.path()).extract().unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].row_index, 0);
        assert_eq!(rows[1].key.order_number, "B");
        assert_eq!(rows[1].row_index, 2);
        assert_eq!(rows[1].start_date, None);
        assert_eq!(rows[2].plan_qty, None);
        assert!(rows[0].is_schedulable());
        assert!(!rows[1].is_schedulable());
        assert!(!rows[2].is_schedulable());
    }

    #[test]
    fn test_order_source_chinese_headers() {
        let file = temp_csv("工單單別,工單單號,預計開工,計劃數量\n5101,X,20251105,3\n");

        let rows = CsvOrderSource::new(file.path()).extract().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].start_date, NaiveDate::from_ymd_opt(2025, 11, 5));
    }

    #[test]
    fn test_order_source_missing_file() {
        let err = CsvOrderSource::new("/nonexistent/orders.csv")
            .extract()
            .unwrap_err();
        assert!(matches!(err, LookupError::FileNotFound(_)));
    }

    #[test]
    fn test_erp_source_groups_lines() {
        let file = temp_csv(
            "order_type,order_number,status,total_qty,component,name,unit,req,iss\n\
             5101,A,1,100,P,螺絲,PCS,50,0\n\
             5101,A,1,100,Q,,KG,2.5,1\n\
             5101,B,Y,40,P,螺絲,PCS,80,0\n\
             5101,C,1,10,,,,,\n",
        );

        let erp = CsvErpSource::open(file.path()).unwrap();
        let keys = vec![
            OrderKey::new("5101", "A"),
            OrderKey::new("5101", "B"),
            OrderKey::new("5101", "C"),
            OrderKey::new("5101", "Z"),
        ];
        let snapshot = erp.fetch(&keys).unwrap();

        assert_eq!(snapshot.len(), 3);
        let a = snapshot.get(&OrderKey::new("5101", "A")).unwrap();
        assert_eq!(a.total_qty, Decimal::from(100));
        assert_eq!(a.bom.len(), 2);
        assert_eq!(a.bom[1].display_name(), "?");
        assert_eq!(a.bom[1].remaining_need(), Decimal::from_str("1.5").unwrap());

        let b = snapshot.get(&OrderKey::new("5101", "B")).unwrap();
        assert!(b.status.is_completed());

        let c = snapshot.get(&OrderKey::new("5101", "C")).unwrap();
        assert!(c.bom.is_empty());
    }

    #[test]
    fn test_erp_source_blank_quantities_read_as_zero() {
        let file = temp_csv(
            "order_type,order_number,status,total_qty,component,name,unit,req,iss\n\
             5101,A,1,100,P,螺絲,PCS,50,\n\
             5101,A,1,100,Q,墊片,PCS,,\n",
        );

        let erp = CsvErpSource::open(file.path()).unwrap();
        let snapshot = erp.fetch(&[OrderKey::new("5101", "A")]).unwrap();
        let a = snapshot.get(&OrderKey::new("5101", "A")).unwrap();

        assert_eq!(a.bom.len(), 2);
        assert_eq!(a.bom[0].issued_qty, Decimal::ZERO);
        assert_eq!(a.bom[0].remaining_need(), Decimal::from(50));
        assert_eq!(a.bom[1].required_qty, Decimal::ZERO);
        assert_eq!(a.bom[1].issued_qty, Decimal::ZERO);
        assert_eq!(a.bom[1].remaining_need(), Decimal::ZERO);
    }

    #[test]
    fn test_erp_source_invalid_number() {
        let file = temp_csv(
            "order_type,order_number,status,total_qty,component,req,iss\n\
             5101,A,1,100,P,abc,0\n",
        );

        let err = CsvErpSource::open(file.path()).err().unwrap();
        assert!(matches!(
            err,
            LookupError::InvalidNumber { row: 2, ref field, .. } if field == "req"
        ));
    }

    #[test]
    fn test_inventory_source_sums_warehouses() {
        let file = temp_csv("component,qty,warehouse\nP,10,W1\nP,5,W2\nQ,-3,W1\n");

        let inventory = CsvInventorySource::open(file.path()).unwrap();
        let stock = inventory
            .fetch(&["P".to_string(), "Q".to_string(), "R".to_string()])
            .unwrap();

        assert_eq!(stock.get("P"), Some(&Decimal::from(15)));
        assert_eq!(stock.get("Q"), Some(&Decimal::from(-3)));
        assert_eq!(stock.get("R"), None);
    }

    #[test]
    fn test_inventory_source_missing_column() {
        let file = temp_csv("component,amount\nP,10\n");
        assert!(matches!(
            CsvInventorySource::open(file.path()).err().unwrap(),
            LookupError::FieldMissing { .. }
        ));
    }
}
