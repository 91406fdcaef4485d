//! 外部查詢與輸出錯誤類型

use thiserror::Error;

/// 查詢/輸出錯誤
///
/// 查不到的工單或物料不是錯誤（由部分結果表達），這裡只描述真正的失敗。
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("檔案不存在: {0}")]
    FileNotFound(String),

    #[error("檔案讀寫失敗: {0}")]
    Io(String),

    #[error("CSV 解析失敗: {0}")]
    CsvParse(String),

    #[error("缺少欄位 {field}（行 {row}）")]
    FieldMissing { row: usize, field: String },

    #[error("數值格式錯誤 (行 {row}, 欄位 {field}): {value}")]
    InvalidNumber {
        row: usize,
        field: String,
        value: String,
    },

    #[error("查詢失敗: {0}")]
    FetchFailed(String),

    #[error("第 {batch} 批查詢失敗: {source}")]
    BatchFailed {
        batch: usize,
        #[source]
        source: Box<LookupError>,
    },
}

impl From<std::io::Error> for LookupError {
    fn from(err: std::io::Error) -> Self {
        LookupError::Io(err.to_string())
    }
}

impl From<csv::Error> for LookupError {
    fn from(err: csv::Error) -> Self {
        LookupError::CsvParse(err.to_string())
    }
}

/// Result 類型別名
pub type LookupResult<T> = Result<T, LookupError>;
