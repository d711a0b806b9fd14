//! Reader for the `;`-delimited tables written by the instrumentation.
//!
//! Columns are located by name (with aliases), never by position, so files
//! from different collector versions parse the same way.

use crate::utils::error::ParseError;
use csv::{ReaderBuilder, Trim};
use log::debug;
use std::fs::File;
use std::io;
use std::path::Path;
use std::str::FromStr;

/// A parsed delimited file: header plus raw string cells
#[derive(Debug, Clone)]
pub struct DelimitedTable {
    columns: Vec<String>,
    rows: Vec<Row>,
}

/// One data row and the 1-based line it came from
#[derive(Debug, Clone)]
pub struct Row {
    pub line: usize,
    cells: Vec<String>,
}

impl Row {
    /// Raw cell text
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }

    /// Parse a cell; empty cells become `None`
    pub fn parse_optional<T: FromStr>(
        &self,
        index: usize,
        column: &str,
    ) -> Result<Option<T>, ParseError> {
        let raw = self.cell(index).trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
            return Ok(None);
        }
        raw.parse::<T>()
            .map(Some)
            .map_err(|_| ParseError::InvalidValue {
                line: self.line,
                column: column.to_string(),
                value: raw.to_string(),
            })
    }

    /// Parse a cell that must be present
    pub fn parse_required<T: FromStr>(&self, index: usize, column: &str) -> Result<T, ParseError> {
        self.parse_optional(index, column)?
            .ok_or_else(|| ParseError::InvalidValue {
                line: self.line,
                column: column.to_string(),
                value: String::new(),
            })
    }
}

impl DelimitedTable {
    /// Parse table text with the given delimiter
    pub fn parse(content: &str, delimiter: u8) -> Result<Self, ParseError> {
        Self::from_reader(content.as_bytes(), delimiter)
    }

    /// Parse a table from any reader
    ///
    /// Blank lines are skipped. Quoted fields may span lines. Every data row
    /// must have as many fields as the header.
    pub fn from_reader<R: io::Read>(reader: R, delimiter: u8) -> Result<Self, ParseError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(false)
            .trim(Trim::Headers)
            .from_reader(reader);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if columns.is_empty() {
            return Err(ParseError::Empty);
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(Row {
                line: record.position().map(|p| p.line() as usize).unwrap_or(0),
                cells: record.iter().map(str::to_string).collect(),
            });
        }

        Ok(Self { columns, rows })
    }

    /// Read and parse a file
    pub fn read(path: impl AsRef<Path>, delimiter: u8) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(file, delimiter)?;
        debug!(
            "Read {} rows x {} columns from {}",
            table.rows.len(),
            table.columns.len(),
            path.display()
        );
        Ok(table)
    }

    /// Index of the first column matching any alias
    pub fn column(&self, aliases: &[&str]) -> Result<usize, ParseError> {
        aliases
            .iter()
            .find_map(|alias| self.columns.iter().position(|c| c == alias))
            .ok_or_else(|| ParseError::MissingColumn {
                expected: aliases.iter().map(|a| a.to_string()).collect(),
            })
    }

    /// Index of a column that may be absent
    pub fn optional_column(&self, aliases: &[&str]) -> Option<usize> {
        self.column(aliases).ok()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_aliases() {
        let table = DelimitedTable::parse("socket;epoch;pkg;dram\n0;1;10.5;\n", b';').unwrap();
        let pkg = table.column(&["package", "pkg"]).unwrap();
        let dram = table.column(&["dram"]).unwrap();

        let row = &table.rows()[0];
        assert_eq!(row.parse_optional::<f64>(pkg, "package").unwrap(), Some(10.5));
        assert_eq!(row.parse_optional::<f64>(dram, "dram").unwrap(), None);
    }

    #[test]
    fn test_row_width_mismatch() {
        let err = DelimitedTable::parse("a;b\n1;2\n3\n", b';').unwrap_err();
        assert!(matches!(
            err,
            ParseError::RowWidth {
                line: 3,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_missing_column_and_bad_value() {
        let table = DelimitedTable::parse("a;b\nx;2\n", b';').unwrap();
        assert!(table.column(&["c"]).is_err());

        let a = table.column(&["a"]).unwrap();
        assert!(table.rows()[0].parse_required::<u64>(a, "a").is_err());
    }

    #[test]
    fn test_quoted_fields() {
        let table = DelimitedTable::parse("method,energy\n\"a.B.c(int,long)\",2.5\n", b',').unwrap();
        let method = table.column(&["method"]).unwrap();
        assert_eq!(table.rows()[0].cell(method), "a.B.c(int,long)");
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(
            DelimitedTable::parse("\n\n", b';'),
            Err(ParseError::Empty)
        ));
    }

    #[test]
    fn test_quoted_field_spans_lines() {
        let table =
            DelimitedTable::parse("method,energy\n\"a.B.c(\"\"x\ny\"\")\",2.5\nd.E.f,1\n", b',')
                .unwrap();
        let method = table.column(&["method"]).unwrap();

        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[0].cell(method), "a.B.c(\"x\ny\")");
        assert_eq!(table.rows()[1].line, 4);
    }

    #[test]
    fn test_header_is_trimmed() {
        let table = DelimitedTable::parse(" epoch ; dram\n1;2\n", b';').unwrap();
        assert!(table.column(&["epoch"]).is_ok());
        assert!(table.column(&["dram"]).is_ok());
    }
}
