//! CSV export
//!
//! Writes expenses in the import layout: date, amount, category and
//! subcategory, one header row first.

use std::io::Write;

use csv::WriterBuilder;

use crate::error::{SpendError, SpendResult};
use crate::models::Expense;

/// Header written before the records
pub const CSV_HEADER: [&str; 4] = ["date", "amount", "category", "subcategory"];

fn export_error<E: std::fmt::Display>(e: E) -> SpendError {
    SpendError::Export(e.to_string())
}

/// Export expenses as CSV separated by `delimiter`
///
/// Amounts are written with two decimals and `.` as the decimal point.
pub fn export_expenses_csv<W: Write>(
    expenses: &[Expense],
    writer: W,
    delimiter: char,
) -> SpendResult<()> {
    let delimiter = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| SpendError::Validation(format!("Unsupported delimiter '{}'", delimiter)))?;

    let mut writer = WriterBuilder::new().delimiter(delimiter).from_writer(writer);
    writer.write_record(CSV_HEADER).map_err(export_error)?;

    for expense in expenses {
        writer
            .write_record([
                expense.date.format("%Y-%m-%d").to_string(),
                expense.amount.format_with_symbol(""),
                expense.category.clone(),
                expense.subcategory.clone(),
            ])
            .map_err(export_error)?;
    }

    writer.flush().map_err(export_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use crate::services::parse_expenses_csv;
    use chrono::NaiveDate;

    fn sample() -> Vec<Expense> {
        vec![
            Expense::with_details(
                NaiveDate::from_ymd_opt(2022, 4, 2).unwrap(),
                Money::from_cents(282),
                "food",
                "meat",
            ),
            Expense::with_details(
                NaiveDate::from_ymd_opt(2022, 4, 3).unwrap(),
                Money::from_cents(-250),
                "refunds, misc",
                "",
            ),
        ]
    }

    #[test]
    fn test_export_layout() {
        let mut output = Vec::new();
        export_expenses_csv(&sample(), &mut output, ';').unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "date;amount;category;subcategory");
        assert_eq!(lines[1], "2022-04-02;2.82;food;meat");
        assert_eq!(lines[2], "2022-04-03;-2.50;refunds, misc;");
    }

    #[test]
    fn test_export_reimports() {
        for delimiter in [';', ','] {
            let mut output = Vec::new();
            export_expenses_csv(&sample(), &mut output, delimiter).unwrap();

            let parsed = parse_expenses_csv(&output).unwrap();
            assert_eq!(parsed.len(), 2);
            for (original, restored) in sample().iter().zip(&parsed) {
                assert_eq!(restored.date, original.date);
                assert_eq!(restored.amount, original.amount);
                assert_eq!(restored.category, original.category);
                assert_eq!(restored.subcategory, original.subcategory);
            }
        }
    }

    #[test]
    fn test_rejects_non_ascii_delimiter() {
        let err = export_expenses_csv(&sample(), Vec::new(), '§').unwrap_err();
        assert!(err.is_validation());
    }
}
