//! CSV import
//!
//! Turns an uploaded expenses CSV into [`Expense`] records and, through
//! [`ImportService`], into stored expenses.
//!
//! The expected layout is four columns in order: date, amount, category and
//! subcategory. The first record is a header and is never imported. Files may
//! be separated by `;` or `,`; semicolon is tried first and comma is the
//! fallback, over the same buffered bytes.

use std::io::Read;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{ParseError, SpendResult};
use crate::models::{Expense, Money, MonthYear};
use crate::services::ExpenseService;
use crate::storage::Storage;

/// Number of columns every record must have
pub const EXPECTED_FIELDS: usize = 4;

/// Date layout of the first column
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const PRIMARY_DELIMITER: u8 = b';';
const FALLBACK_DELIMITER: u8 = b',';

/// Failure of a single delimiter attempt
#[derive(Debug)]
struct AttemptError {
    /// Whether the header split into the expected number of columns
    header_matched: bool,
    error: ParseError,
}

/// Parse an expenses CSV held in memory
///
/// Any malformed record aborts the whole parse. Input with no data rows fails
/// with [`ParseError::NoData`].
pub fn parse_expenses_csv(bytes: &[u8]) -> Result<Vec<Expense>, ParseError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ParseError::NoData);
    }

    let primary = match parse_with_delimiter(bytes, PRIMARY_DELIMITER) {
        Ok(expenses) => return Ok(expenses),
        Err(e) => e,
    };

    tracing::debug!(
        error = %primary.error,
        "';' separated parse failed, retrying with ','"
    );

    let fallback = match parse_with_delimiter(bytes, FALLBACK_DELIMITER) {
        Ok(expenses) => return Ok(expenses),
        Err(e) => e,
    };

    Err(select_error(primary, fallback))
}

/// Read an expenses CSV from any reader
///
/// The reader is drained into memory first so both delimiters can be tried.
pub fn read_expenses_csv<R: Read>(mut reader: R) -> Result<Vec<Expense>, ParseError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| ParseError::Read(e.to_string()))?;
    parse_expenses_csv(&bytes)
}

/// Pick the error to report once both delimiters have failed
///
/// The delimiter whose header looked right produced the meaningful error.
/// When neither did, the file uses some other separator.
fn select_error(primary: AttemptError, fallback: AttemptError) -> ParseError {
    if primary.header_matched {
        return primary.error;
    }
    if fallback.header_matched {
        return fallback.error;
    }
    match primary.error {
        ParseError::Read(_) => primary.error,
        _ => ParseError::UnsupportedDelimiter,
    }
}

fn parse_with_delimiter(bytes: &[u8], delimiter: u8) -> Result<Vec<Expense>, AttemptError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::Fields)
        .from_reader(bytes);

    let mut header_matched = false;
    let fail = |header_matched: bool, error: ParseError| AttemptError {
        header_matched,
        error,
    };

    let mut expenses = Vec::new();
    let mut record = StringRecord::new();
    let mut seen_header = false;

    loop {
        match reader.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => return Err(fail(header_matched, ParseError::Read(e.to_string()))),
        }

        if is_blank(&record) {
            continue;
        }

        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.len() != EXPECTED_FIELDS {
            return Err(fail(
                header_matched,
                ParseError::FieldCount {
                    line,
                    expected: EXPECTED_FIELDS,
                    found: record.len(),
                },
            ));
        }

        if !seen_header {
            seen_header = true;
            header_matched = true;
            continue;
        }

        let expense = parse_record(&record, line).map_err(|e| fail(header_matched, e))?;
        expenses.push(expense);
    }

    if expenses.is_empty() {
        return Err(fail(header_matched, ParseError::NoData));
    }

    Ok(expenses)
}

/// A line holding nothing but whitespace
fn is_blank(record: &StringRecord) -> bool {
    record.len() == 1 && record.get(0).map_or(true, |f| f.trim().is_empty())
}

fn parse_record(record: &StringRecord, line: u64) -> Result<Expense, ParseError> {
    let field = |idx: usize| record.get(idx).unwrap_or_default();

    let date = parse_date(field(0)).ok_or_else(|| ParseError::InvalidDate {
        line,
        value: field(0).to_string(),
    })?;
    let amount = parse_amount(field(1)).ok_or_else(|| ParseError::InvalidAmount {
        line,
        value: field(1).to_string(),
    })?;

    Ok(Expense::with_details(date, amount, field(2), field(3)))
}

/// `%Y` accepts signed years of any width, so the month key range is checked too
fn parse_date(s: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(s, DATE_FORMAT).ok()?;
    MonthYear::try_from_date(date).ok()?;
    Some(date)
}

/// Parse a decimal amount, accepting `,` as the decimal separator
fn parse_amount(s: &str) -> Option<Money> {
    let value: f32 = s.replace(',', ".").parse().ok()?;
    Money::try_from_amount(value)
}

/// Whether an incoming expense already exists in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStatus {
    /// Will be imported
    New,
    /// Same date, amount and classifiers as a stored expense
    Duplicate,
}

/// Preview entry for import review
#[derive(Debug, Clone)]
pub struct ImportPreviewEntry {
    pub expense: Expense,
    pub status: ImportStatus,
}

/// Outcome of a completed import
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub duplicates_skipped: usize,
    /// Display IDs of the stored expenses
    pub imported_ids: Vec<String>,
}

/// Imports parsed expenses into the store
pub struct ImportService<'a> {
    storage: &'a Storage,
}

impl<'a> ImportService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Flag which parsed expenses are already stored
    ///
    /// Matching is on date, amount, category and subcategory. Repeated rows
    /// inside the same file are all kept, since two identical purchases on
    /// one day are legitimate.
    pub fn generate_preview(&self, parsed: Vec<Expense>) -> SpendResult<Vec<ImportPreviewEntry>> {
        let existing = self.storage.expenses.get_all()?;

        Ok(parsed
            .into_iter()
            .map(|expense| {
                let status = if existing.iter().any(|e| same_fingerprint(e, &expense)) {
                    ImportStatus::Duplicate
                } else {
                    ImportStatus::New
                };
                ImportPreviewEntry { expense, status }
            })
            .collect())
    }

    /// Store every new entry of a preview
    pub fn import_from_preview(&self, preview: Vec<ImportPreviewEntry>) -> SpendResult<ImportResult> {
        let mut result = ImportResult::default();
        let mut to_create = Vec::new();

        for entry in preview {
            match entry.status {
                ImportStatus::New => to_create.push(entry.expense),
                ImportStatus::Duplicate => result.duplicates_skipped += 1,
            }
        }

        let created = ExpenseService::new(self.storage).create_batch(to_create)?;
        result.imported = created.len();
        result.imported_ids = created.iter().map(|e| e.id.to_string()).collect();

        tracing::info!(
            imported = result.imported,
            duplicates = result.duplicates_skipped,
            "import finished"
        );

        Ok(result)
    }
}

fn same_fingerprint(a: &Expense, b: &Expense) -> bool {
    a.date == b.date
        && a.amount == b.amount
        && a.category == b.category
        && a.subcategory == b.subcategory
}
