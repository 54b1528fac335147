// Document store data types.
// Defines cell values, pending writes, and the values API wire format.

use serde::{Deserialize, Serialize};

use super::range::CellRange;

/// Rows of cell values, each cell rendered as a string.
pub type CellValues = Vec<Vec<String>>;

/// One range update queued during a sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub range: CellRange,
    pub values: CellValues,
}

impl PendingWrite {
    /// Write `values` to `range`.
    pub fn new(range: CellRange, values: CellValues) -> Self {
        Self { range, values }
    }

    /// Single-row write.
    pub fn row(range: CellRange, row: Vec<String>) -> Self {
        Self::new(range, vec![row])
    }
}

/// Acknowledgement of a batched write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateAck {
    #[serde(default)]
    pub total_updated_ranges: u64,
    #[serde(default)]
    pub total_updated_cells: u64,
}

/// Response body of a values read.
#[derive(Debug, Deserialize)]
pub(crate) struct ValueRangeResponse {
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl ValueRangeResponse {
    /// Flatten JSON cells of any type into strings.
    pub fn into_cells(self) -> CellValues {
        self.values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect()
    }
}

fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// One range in a batched write request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValueRangeBody {
    pub range: String,
    pub major_dimension: &'static str,
    pub values: CellValues,
}

/// Request body of a batched write.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BatchUpdateRequest {
    pub value_input_option: &'static str,
    pub data: Vec<ValueRangeBody>,
}

impl BatchUpdateRequest {
    /// Request body for `writes`.
    pub fn from_writes(writes: &[PendingWrite]) -> Self {
        Self {
            value_input_option: "USER_ENTERED",
            data: writes
                .iter()
                .map(|w| ValueRangeBody {
                    range: w.range.to_string(),
                    major_dimension: "ROWS",
                    values: w.values.clone(),
                })
                .collect(),
        }
    }
}

/// Error envelope returned by the values API.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}
