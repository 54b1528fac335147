// Sync target layout and row parsing.
// Describes where one entity family keeps its keys, address, status, and coordinates.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};
use crate::sheets::{CellRange, CellValues, Column, PendingWrite};

fn default_first_row() -> u32 {
    2
}

/// Status column rule marking rows whose coordinates must be cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRule {
    pub column: Column,
    /// Cell values (trimmed, exact match) that mean "inactive".
    pub inactive_values: Vec<String>,
}

impl StatusRule {
    /// Whether a status cell marks the row inactive.
    pub fn is_inactive(&self, value: &str) -> bool {
        let value = value.trim();
        !value.is_empty() && self.inactive_values.iter().any(|v| v.trim() == value)
    }
}

/// One sheet of address-bearing rows kept in sync with its coordinate columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncTarget {
    /// Prefix of entity ids, e.g. `store` gives `store_12`.
    pub namespace: String,
    pub sheet: String,
    /// First data row (one-based), below any header.
    #[serde(default = "default_first_row")]
    pub first_row: u32,
    /// Columns forming the entity key, joined with `_`.
    pub key_columns: Vec<Column>,
    /// Columns forming the address, joined with a space.
    pub address_columns: Vec<Column>,
    pub lat_column: Column,
    pub lng_column: Column,
    /// Human-readable name used in logs.
    #[serde(default)]
    pub label_column: Option<Column>,
    #[serde(default)]
    pub status: Option<StatusRule>,
}

/// One parsed data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRow {
    pub entity_id: String,
    /// Sheet row number (one-based).
    pub row: u32,
    pub label: String,
    pub address: String,
    pub lat: String,
    pub lng: String,
    pub inactive: bool,
}

impl AddressRow {
    /// Both coordinate cells are filled.
    pub fn has_coordinates(&self) -> bool {
        !self.lat.is_empty() && !self.lng.is_empty()
    }

    /// At least one coordinate cell is filled.
    pub fn has_any_coordinate(&self) -> bool {
        !self.lat.is_empty() || !self.lng.is_empty()
    }
}

impl SyncTarget {
    /// Check the layout is usable.
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: &str| {
            Err(SyncError::Config(format!(
                "target {:?}: {}",
                self.namespace, reason
            )))
        };

        if self.namespace.trim().is_empty() {
            return fail("namespace is empty");
        }
        if self.sheet.trim().is_empty() {
            return fail("sheet is empty");
        }
        if self.first_row == 0 {
            return fail("first_row is one-based");
        }
        if self.key_columns.is_empty() {
            return fail("no key columns");
        }
        if self.address_columns.is_empty() {
            return fail("no address columns");
        }
        if self.lat_column == self.lng_column {
            return fail("lat_column and lng_column are the same");
        }
        Ok(())
    }

    fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.key_columns
            .iter()
            .chain(&self.address_columns)
            .copied()
            .chain([self.lat_column, self.lng_column])
            .chain(self.label_column)
            .chain(self.status.as_ref().map(|s| s.column))
    }

    /// Range covering every column this target reads, starting at column A.
    pub fn read_range(&self) -> CellRange {
        let last = self.columns().max().unwrap_or(Column(0));
        CellRange::columns(&self.sheet, Column(0), last, self.first_row)
    }

    /// Parse rows read from [`read_range`](Self::read_range). Rows without a key are skipped.
    pub fn parse_rows(&self, values: &CellValues) -> Vec<AddressRow> {
        values
            .iter()
            .enumerate()
            .filter_map(|(offset, cells)| self.parse_row(self.first_row + offset as u32, cells))
            .collect()
    }

    fn parse_row(&self, row: u32, cells: &[String]) -> Option<AddressRow> {
        let cell = |column: Column| cells.get(column.index()).map_or("", |c| c.trim());

        let key_parts: Vec<&str> = self.key_columns.iter().map(|&c| cell(c)).collect();
        if key_parts.iter().all(|part| part.is_empty()) {
            return None;
        }

        let address = self
            .address_columns
            .iter()
            .map(|&c| cell(c))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Some(AddressRow {
            entity_id: format!("{}_{}", self.namespace, key_parts.join("_")),
            row,
            label: self.label_column.map(cell).unwrap_or_default().to_string(),
            address,
            lat: cell(self.lat_column).to_string(),
            lng: cell(self.lng_column).to_string(),
            inactive: self
                .status
                .as_ref()
                .is_some_and(|rule| rule.is_inactive(cell(rule.column))),
        })
    }

    /// Writes setting one row's coordinate cells. Adjacent columns share one range.
    pub fn coordinate_writes(&self, row: u32, lat: String, lng: String) -> Vec<PendingWrite> {
        if self.lng_column == self.lat_column.next() {
            let range = CellRange::row_span(&self.sheet, row, self.lat_column, self.lng_column);
            vec![PendingWrite::row(range, vec![lat, lng])]
        } else if self.lat_column == self.lng_column.next() {
            let range = CellRange::row_span(&self.sheet, row, self.lng_column, self.lat_column);
            vec![PendingWrite::row(range, vec![lng, lat])]
        } else {
            vec![
                PendingWrite::row(CellRange::cell(&self.sheet, row, self.lat_column), vec![lat]),
                PendingWrite::row(CellRange::cell(&self.sheet, row, self.lng_column), vec![lng]),
            ]
        }
    }
}
