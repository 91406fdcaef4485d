//! # Kitting
//!
//! 工單齊料模擬：依計劃開工順序逐張工單預佔庫存，判定齊料分級、
//! 齊套率、可產數量與缺料明細。

pub mod logging;
pub mod pipeline;

pub use kitting_calc::{SimulationRun, SimulationWarning, WarningSeverity};
pub use kitting_core::{SimulationConfig, SimulationResult, Tier};
pub use pipeline::run;
