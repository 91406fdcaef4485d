//! # Kitting IO
//!
//! 排程、ERP、庫存的查詢介面與 CSV/記憶體實作，以及結果報表輸出

pub mod csv_source;
pub mod error;
pub mod lookup;
pub mod memory;
pub mod report;

// Re-export 主要類型
pub use csv_source::{parse_date, parse_decimal, CsvErpSource, CsvInventorySource, CsvOrderSource};
pub use error::{LookupError, LookupResult};
pub use lookup::{
    fetch_in_batches, fetch_ledger, fetch_snapshot, ErpLookup, InventoryLookup, OrderSource,
    ResultSink,
};
pub use memory::{MemoryErp, MemoryInventory, MemoryOrderSource};
pub use report::{summary_line, CsvReportSink, TextReportSink};
