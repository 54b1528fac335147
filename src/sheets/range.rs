// A1-notation helpers.
// Converts between column letters and indices and renders cell ranges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// A zero-based spreadsheet column, written as letters (`A`, `Z`, `AA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Column(pub u32);

impl Column {
    /// Zero-based index of this column.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The column immediately to the right.
    pub fn next(self) -> Column {
        Column(self.0 + 1)
    }

    /// Column letters for this index.
    pub fn letters(self) -> String {
        let mut n = self.0 + 1;
        let mut letters = Vec::new();
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push(b'A' + rem as u8);
            n = (n - 1) / 26;
        }
        letters.reverse();
        String::from_utf8(letters).unwrap_or_default()
    }
}

impl FromStr for Column {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(SyncError::Config(format!("invalid column letters: {:?}", s)));
        }

        let mut n: u32 = 0;
        for c in s.chars() {
            let digit = (c.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
            n = n
                .checked_mul(26)
                .and_then(|n| n.checked_add(digit))
                .ok_or_else(|| SyncError::Config(format!("column out of range: {}", s)))?;
        }
        Ok(Column(n - 1))
    }
}

impl TryFrom<String> for Column {
    type Error = SyncError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Column> for String {
    fn from(column: Column) -> Self {
        column.letters()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.letters())
    }
}

/// A rectangular cell range on one sheet.
///
/// Rows are one-based as in A1 notation. An `end_row` of `None` leaves the
/// range open to the bottom of the sheet (`Stores!A2:H`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRange {
    pub sheet: String,
    pub start_col: Column,
    pub start_row: u32,
    pub end_col: Column,
    pub end_row: Option<u32>,
}

impl CellRange {
    /// Columns `start..=end` from `first_row` down to the last row of the sheet.
    pub fn columns(sheet: impl Into<String>, start: Column, end: Column, first_row: u32) -> Self {
        Self {
            sheet: sheet.into(),
            start_col: start,
            start_row: first_row,
            end_col: end,
            end_row: None,
        }
    }

    /// Columns `start..=end` on a single row.
    pub fn row_span(sheet: impl Into<String>, row: u32, start: Column, end: Column) -> Self {
        Self {
            sheet: sheet.into(),
            start_col: start,
            start_row: row,
            end_col: end,
            end_row: Some(row),
        }
    }

    /// A single cell.
    pub fn cell(sheet: impl Into<String>, row: u32, column: Column) -> Self {
        Self::row_span(sheet, row, column, column)
    }

    /// Sheet name as it must appear in A1 notation.
    pub fn quoted_sheet(&self) -> String {
        quote_sheet_name(&self.sheet)
    }
}

/// Quote a sheet name for A1 notation unless it is a plain identifier.
pub fn quote_sheet_name(sheet: &str) -> String {
    let plain = !sheet.is_empty() && sheet.chars().all(|c| c.is_alphanumeric() || c == '_');
    if plain {
        sheet.to_string()
    } else {
        format!("'{}'", sheet.replace('\'', "''"))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}{}", self.quoted_sheet(), self.start_col, self.start_row)?;
        match self.end_row {
            Some(end_row) if end_row == self.start_row && self.end_col == self.start_col => Ok(()),
            Some(end_row) => write!(f, ":{}{}", self.end_col, end_row),
            None => write!(f, ":{}", self.end_col),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(Column(0).letters(), "A");
        assert_eq!(Column(25).letters(), "Z");
        assert_eq!(Column(26).letters(), "AA");
        assert_eq!(Column(27).letters(), "AB");
        assert_eq!(Column(701).letters(), "ZZ");
        assert_eq!(Column(702).letters(), "AAA");
    }

    #[test]
    fn test_column_parse() {
        assert_eq!("A".parse::<Column>().unwrap(), Column(0));
        assert_eq!("h".parse::<Column>().unwrap(), Column(7));
        assert_eq!("AA".parse::<Column>().unwrap(), Column(26));
        assert_eq!(" ZZ ".parse::<Column>().unwrap(), Column(701));
        assert!("".parse::<Column>().is_err());
        assert!("A1".parse::<Column>().is_err());
    }

    #[test]
    fn test_column_serde_as_letters() {
        let json = serde_json::to_string(&Column(27)).unwrap();
        assert_eq!(json, "\"AB\"");
        let column: Column = serde_json::from_str("\"F\"").unwrap();
        assert_eq!(column, Column(5));
        assert!(serde_json::from_str::<Column>("\"F5\"").is_err());
    }

    #[test]
    fn test_range_display() {
        let open = CellRange::columns("Stores", Column(0), Column(7), 2);
        assert_eq!(open.to_string(), "Stores!A2:H");

        let span = CellRange::row_span("Stores", 5, Column(5), Column(6));
        assert_eq!(span.to_string(), "Stores!F5:G5");

        let cell = CellRange::cell("Stores", 3, Column(2));
        assert_eq!(cell.to_string(), "Stores!C3");
    }

    #[test]
    fn test_sheet_name_quoting() {
        let range = CellRange::cell("Sales Points", 1, Column(0));
        assert_eq!(range.to_string(), "'Sales Points'!A1");

        let range = CellRange::cell("판매점", 1, Column(0));
        assert_eq!(range.to_string(), "판매점!A1");

        let range = CellRange::cell("Bob's", 1, Column(0));
        assert_eq!(range.to_string(), "'Bob''s'!A1");
    }
}
