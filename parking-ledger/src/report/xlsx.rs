//! `.xlsx` serialization of a [`TabularDocument`]

use parking_common::{Error, Result};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, XlsxError};

use super::document::{Cell, Sheet, SheetFormat, TabularDocument};

/// MIME type of the rendered workbook
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Render every sheet into an in-memory workbook
pub fn render(document: &TabularDocument) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    for sheet in &document.sheets {
        write_sheet(&mut workbook, sheet).map_err(report_error)?;
    }

    workbook.save_to_buffer().map_err(report_error)
}

fn report_error(e: XlsxError) -> Error {
    Error::Report(e.to_string())
}

fn cell_format(format: &SheetFormat, bold: bool) -> Format {
    let mut cell = Format::new();
    if format.center_aligned {
        cell = cell
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);
    }
    if format.thin_border {
        cell = cell.set_border(FormatBorder::Thin);
    }
    if bold {
        cell = cell.set_bold();
    }
    cell
}

fn write_sheet(workbook: &mut Workbook, sheet: &Sheet) -> std::result::Result<(), XlsxError> {
    let header_format = cell_format(&sheet.format, sheet.format.header_bold);
    let body_format = cell_format(&sheet.format, false);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet.name.as_str())?;

    for (col, title) in sheet.header.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, title.as_str(), &header_format)?;
    }

    for (index, row) in sheet.rows.iter().enumerate() {
        let row_num = (index + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(text) => {
                    worksheet.write_string_with_format(row_num, col, text.as_str(), &body_format)?
                }
                Cell::Number(n) => {
                    worksheet.write_number_with_format(row_num, col, *n as f64, &body_format)?
                }
                Cell::Empty => worksheet.write_blank(row_num, col, &body_format)?,
            };
        }
    }

    for col in 0..sheet.column_count() {
        worksheet.set_column_width(col as u16, sheet.format.column_width)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::document::Sheet;

    #[test]
    fn test_render_produces_zip_container() {
        let mut document = TabularDocument::new();
        document.push_sheet(Sheet::stats("Summary"));

        let bytes = render(&document).unwrap();
        assert!(bytes.starts_with(b"PK"), "xlsx is a zip archive");
    }

    #[test]
    fn test_duplicate_sheet_names_are_report_errors() {
        let mut document = TabularDocument::new();
        document.push_sheet(Sheet::stats("2024-01-01"));
        document.push_sheet(Sheet::stats("2024-01-01"));

        let err = render(&document).unwrap_err();
        assert!(matches!(err, Error::Report(_)));
    }
}
