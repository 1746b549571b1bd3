//! Spreadsheet file codec.
//!
//! Reads the first worksheet of Excel / OpenDocument workbooks and CSV files
//! into a [`Table`], and writes tables back out as `.xlsx` or `.csv`.

use crate::domain::{DataError, DataResult, Table, Value};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDateTime;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::collections::HashSet;
use std::path::Path;

/// File formats understood by [`SpreadsheetCodec`], chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    /// Anything calamine can open: xlsx, xlsm, xlsb, xls, ods.
    Workbook,
    Xlsx,
    Csv,
}

impl SpreadsheetFormat {
    fn extension(path: &Path) -> String {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default()
    }

    pub fn for_reading(path: &Path) -> Option<Self> {
        match Self::extension(path).as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SpreadsheetFormat::Workbook),
            "csv" => Some(SpreadsheetFormat::Csv),
            _ => None,
        }
    }

    pub fn for_writing(path: &Path) -> Option<Self> {
        match Self::extension(path).as_str() {
            "xlsx" => Some(SpreadsheetFormat::Xlsx),
            "csv" => Some(SpreadsheetFormat::Csv),
            _ => None,
        }
    }
}

pub struct SpreadsheetCodec;

impl SpreadsheetCodec {
    /// Parses the first sheet of `path`; the first row is the header.
    pub fn read(path: &Path) -> DataResult<Table> {
        let mut table = match SpreadsheetFormat::for_reading(path) {
            Some(SpreadsheetFormat::Csv) => Self::read_csv(path)?,
            Some(_) => Self::read_workbook(path)?,
            None => {
                return Err(DataError::Parse(format!(
                    "Unsupported spreadsheet format: {}",
                    path.display()
                )));
            }
        };
        table.normalize_numeric_columns();
        Ok(table)
    }

    /// Writes `table` to `path`, replacing any existing file.
    pub fn write(table: &Table, path: &Path) -> DataResult<()> {
        match SpreadsheetFormat::for_writing(path) {
            Some(SpreadsheetFormat::Csv) => Self::write_csv(table, path),
            Some(_) => Self::write_xlsx(table, path)
                .map_err(|e| DataError::Write(format!("{}: {}", path.display(), e))),
            None => Err(DataError::Write(format!(
                "Unsupported export format: {} (use .xlsx or .csv)",
                path.display()
            ))),
        }
    }

    fn read_workbook(path: &Path) -> DataResult<Table> {
        let parse_err = |e: calamine::Error| DataError::Parse(format!("{}: {}", path.display(), e));

        let mut workbook = open_workbook_auto(path).map_err(parse_err)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| DataError::Parse(format!("{}: workbook has no worksheets", path.display())))?
            .map_err(parse_err)?;

        let mut rows = range
            .rows()
            .skip_while(|row| row.iter().all(|cell| matches!(cell, Data::Empty)));
        let header = rows
            .next()
            .ok_or_else(|| DataError::Parse(format!("{}: no header row", path.display())))?;

        let columns = unique_headers(header.iter().map(header_name));
        let mut table = Table::new(columns);
        for row in rows {
            table.push_row(row.iter().map(cell_value).collect());
        }
        Ok(table)
    }

    fn read_csv(path: &Path) -> DataResult<Table> {
        let parse_err = |e: csv::Error| DataError::Parse(format!("{}: {}", path.display(), e));

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(parse_err)?;

        let headers = reader.headers().map_err(parse_err)?.clone();
        if headers.is_empty() {
            return Err(DataError::Parse(format!("{}: no header row", path.display())));
        }

        let mut table = Table::new(unique_headers(headers.iter().map(str::to_string)));
        for record in reader.records() {
            let record = record.map_err(parse_err)?;
            table.push_row(record.iter().map(Value::infer).collect());
        }
        Ok(table)
    }

    fn write_xlsx(table: &Table, path: &Path) -> Result<(), XlsxError> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();

        {
            let sheet = workbook.add_worksheet();
            for (col, name) in table.columns().iter().enumerate() {
                sheet.write_string_with_format(0, col_index(col)?, name, &bold)?;
            }

            for (idx, row) in table.rows().iter().enumerate() {
                let row_num = u32::try_from(idx + 1)
                    .map_err(|_| XlsxError::RowColumnLimitError)?;
                for (col, value) in row.iter().enumerate() {
                    let col = col_index(col)?;
                    match value {
                        Value::Null => {}
                        Value::Integer(i) => {
                            sheet.write_number(row_num, col, *i as f64)?;
                        }
                        Value::Real(r) => {
                            sheet.write_number(row_num, col, *r)?;
                        }
                        Value::Text(s) => {
                            sheet.write_string(row_num, col, s)?;
                        }
                    }
                }
            }
        }

        workbook.save(path)
    }

    fn write_csv(table: &Table, path: &Path) -> DataResult<()> {
        let write_err = |e: csv::Error| DataError::Write(format!("{}: {}", path.display(), e));

        let mut writer = csv::Writer::from_path(path).map_err(write_err)?;
        writer.write_record(table.columns()).map_err(write_err)?;
        for row in table.rows() {
            writer
                .write_record(row.iter().map(|v| v.to_string()))
                .map_err(write_err)?;
        }
        writer
            .flush()
            .map_err(|e| DataError::Write(format!("{}: {}", path.display(), e)))
    }
}

fn col_index(col: usize) -> Result<u16, XlsxError> {
    u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)
}

fn header_name(cell: &Data) -> String {
    match cell {
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => cell_value(other).to_string(),
    }
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::Int(i) => Value::Integer(*i),
        Data::Float(f) => Value::Real(*f),
        Data::Bool(b) => Value::Integer(i64::from(*b)),
        Data::String(s) => Value::Text(s.clone()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => Value::Text(format_timestamp(&naive)),
            None => Value::Real(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Text(s.clone()),
    }
}

/// Timestamps are stored as text in the layout SQLite's date functions accept.
fn format_timestamp(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Fills blank header cells and disambiguates repeated names with `.1`, `.2`, ...
fn unique_headers(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for (idx, name) in names.enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            name
        };

        let mut candidate = base.clone();
        let mut suffix = 0;
        while seen.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}.{}", base, suffix);
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    out
}
