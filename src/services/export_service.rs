use chrono::{DateTime, Local};
use rust_xlsxwriter::{Format, Workbook};

use crate::error::AppError;
use crate::models::{CellValue, PropertyRecord, COLUMNS};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ExportFormat::Csv => "text/csv",
        }
    }

    pub fn encode(&self, rows: &[PropertyRecord]) -> Result<Vec<u8>, AppError> {
        match self {
            ExportFormat::Xlsx => export_xlsx(rows),
            ExportFormat::Csv => export_csv(rows),
        }
    }
}

/// `property_export_<YYYY-MM>.<ext>`, stamped with the export moment.
pub fn export_filename(format: ExportFormat, now: DateTime<Local>) -> String {
    format!("property_export_{}.{}", now.format("%Y-%m"), format.extension())
}

/// UTF-8 comma-separated text with a header row.
pub fn export_csv(rows: &[PropertyRecord]) -> Result<Vec<u8>, AppError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(COLUMNS)?;
    for row in rows {
        wtr.write_record(row.cells().iter().map(|c| c.to_string()))?;
    }
    wtr.into_inner()
        .map_err(|e| AppError::Export(e.to_string()))
}

/// Single-sheet workbook with a bold header row.
pub fn export_xlsx(rows: &[PropertyRecord]) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Properties")?;

    for (col, title) in COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &header)?;
    }
    for (r, record) in rows.iter().enumerate() {
        let row = (r + 1) as u32;
        for (c, cell) in record.cells().iter().enumerate() {
            let col = c as u16;
            match cell {
                CellValue::Text(s) => {
                    worksheet.write_string(row, col, s.as_str())?;
                }
                CellValue::Integer(n) => {
                    worksheet.write_number(row, col, f64::from(*n))?;
                }
                CellValue::Float(x) => {
                    worksheet.write_number(row, col, *x)?;
                }
                CellValue::Bool(b) => {
                    worksheet.write_boolean(row, col, *b)?;
                }
            }
        }
    }

    let buffer = workbook.save_to_buffer()?;
    Ok(buffer)
}
