//! Reads an uploaded attendee file into a header row plus raw data rows.
//!
//! Workbooks (xlsx, xlsm, xlsb, xls, ods) go through calamine and only the
//! first sheet is read. Delimited text (csv, txt) goes through the csv crate
//! with the delimiter sniffed from the header line. Every cell is rendered to
//! a string; interpretation is left to the row validator.

use crate::{ImporterError, Result};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use encoding_rs::WINDOWS_1252;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// First row of the sheet as headers, remaining rows as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawSheet {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Workbook,
    Delimited,
}

impl SheetFormat {
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SheetFormat::Workbook),
            "csv" | "txt" => Ok(SheetFormat::Delimited),
            "" => Err(ImporterError::UnsupportedFile(format!(
                "'{}' has no extension",
                file_name
            ))),
            other => Err(ImporterError::UnsupportedFile(format!(
                ".{} (expected xlsx, xls, ods or csv)",
                other
            ))),
        }
    }
}

pub async fn read_path(path: &Path) -> Result<RawSheet> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string();

    // Reject unsupported files before touching the disk
    SheetFormat::from_file_name(&file_name)?;

    let bytes = tokio::fs::read(path).await?;
    read_bytes(&file_name, bytes)
}

/// Parses a file's binary content. The file name is only used to pick the
/// format.
pub fn read_bytes(file_name: &str, bytes: Vec<u8>) -> Result<RawSheet> {
    let format = SheetFormat::from_file_name(file_name)?;

    let mut grid = match format {
        SheetFormat::Workbook => read_workbook(bytes)?,
        SheetFormat::Delimited => read_delimited(&bytes)?,
    };

    if grid.is_empty() {
        return Err(ImporterError::EmptySheet);
    }

    let headers: Vec<String> = grid.remove(0).into_iter().map(|h| h.trim().to_string()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(ImporterError::EmptySheet);
    }
    if !grid.iter().any(|row| row.iter().any(|cell| !cell.trim().is_empty())) {
        return Err(ImporterError::EmptySheet);
    }

    debug!(
        "Read {} data row(s) with {} column(s) from {}",
        grid.len(),
        headers.len(),
        file_name
    );

    Ok(RawSheet::new(headers, grid))
}

fn read_workbook(bytes: Vec<u8>) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ImporterError::EmptySheet)??;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect())
}

fn read_delimited(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let text = decode_text(bytes);
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(&text);

    let delimiter = sniff_delimiter(text.lines().next().unwrap_or_default());

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    Ok(rows)
}

/// Spreadsheet tools on Windows still export CSV as Windows-1252 (a superset
/// of Latin-1's printable range); fall back to it when the content is not
/// valid UTF-8.
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            debug!("Content is not UTF-8, decoding as Windows-1252");
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            text.into_owned()
        }
    }
}

fn sniff_delimiter(header_line: &str) -> u8 {
    [b',', b';', b'\t']
        .into_iter()
        .map(|d| (d, header_line.bytes().filter(|b| *b == d).count()))
        .max_by_key(|(_, count)| *count)
        .filter(|(_, count)| *count > 0)
        .map(|(d, _)| d)
        .unwrap_or(b',')
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            // Document numbers typed into Excel come back as floats
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format!("{}", dt),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}
