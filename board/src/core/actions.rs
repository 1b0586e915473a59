//! Record actions outside drag and drop: add, edit, destructive delete, import

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use shared::{format_timestamp, timestamp_now, Investor, InvestorStatus, RecordId};
use crate::core::validation::check_record;
use crate::error::{BoardError, BoardResult};

pub const IMPORT_UNNAMED: &str = "Senza nome";

/// One spreadsheet row, keyed by column header
pub type ImportRow = Map<String, Value>;

pub mod headers {
    pub const NAME: &str = "Investitore";
    pub const KIND: &str = "Tipologia";
    pub const DESCRIPTION: &str = "Descrizione / Operazione";
    pub const INVESTMENT_MIN: &str = "Investimento Min";
    pub const INVESTMENT_MAX: &str = "Investimento Max";
    pub const EMAIL: &str = "Email";
    pub const LINKEDIN: &str = "LinkedIn";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Updated,
    Added,
}

impl Upserted {
    /// Note sent with the metadata update after the change
    pub fn note(&self, name: &str) -> String {
        match self {
            Upserted::Updated => format!("Aggiornato investitore: {name}"),
            Upserted::Added => format!("Nuovo investitore: {name}"),
        }
    }
}

pub fn removal_note(name: &str) -> String {
    format!("Eliminato investitore: {name}")
}

/// Blank record for the add-in-column form
pub fn new_draft(status: InvestorStatus) -> Investor {
    Investor::new(RecordId::generate(), "", status, timestamp_now())
}

/// Replace an existing record in place or insert a new one at the top of its status group
pub fn upsert(records: &mut Vec<Investor>, record: Investor) -> BoardResult<Upserted> {
    if let Some(index) = records.iter().position(|existing| existing.id == record.id) {
        check_record(index, &record)?;
        records[index] = record;
        return Ok(Upserted::Updated);
    }

    let index = records
        .iter()
        .position(|existing| existing.status == record.status)
        .unwrap_or(0);
    check_record(index, &record)?;
    records.insert(index, record);
    Ok(Upserted::Added)
}

/// Destructive delete, unlike the delete zone which only relabels
pub fn remove(records: &mut Vec<Investor>, id: &RecordId) -> BoardResult<Investor> {
    let index = records
        .iter()
        .position(|record| &record.id == id)
        .ok_or_else(|| BoardError::RecordNotFound { id: id.to_string() })?;
    Ok(records.remove(index))
}

/// Map spreadsheet rows to fresh records in the first pipeline stage
pub fn import(rows: &[ImportRow], now: DateTime<Utc>) -> Vec<Investor> {
    let created_at = format_timestamp(now);
    let millis = now.timestamp_millis();

    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let mut record = Investor::new(
                RecordId::new(format!("investor-{millis}-{index}")),
                cell_text(row, headers::NAME).unwrap_or_else(|| IMPORT_UNNAMED.to_string()),
                InvestorStatus::first(),
                created_at.clone(),
            );
            record.kind = cell_text(row, headers::KIND).unwrap_or_default();
            record.description = cell_text(row, headers::DESCRIPTION).unwrap_or_default();
            record.investment_min = cell_number(row, headers::INVESTMENT_MIN);
            record.investment_max = cell_number(row, headers::INVESTMENT_MAX);
            record.email = cell_text(row, headers::EMAIL).unwrap_or_default();
            record.linkedin = cell_text(row, headers::LINKEDIN).unwrap_or_default();
            record
        })
        .collect()
}

/// Parse a JSON array of row objects, as produced by a sheet-to-JSON export
pub fn parse_rows(text: &str) -> BoardResult<Vec<ImportRow>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(row) => Ok(row),
                _ => Err(BoardError::format(format!("import row {index} is not an object"))),
            })
            .collect(),
        _ => Err(BoardError::format("import file must contain an array of rows")),
    }
}

fn cell_text(row: &ImportRow, header: &str) -> Option<String> {
    let text = match row.get(header)? {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Blank and zero cells stay absent
fn cell_number(row: &ImportRow, header: &str) -> Option<f64> {
    let value = match row.get(header)? {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (value.is_finite() && value != 0.0).then_some(value)
}
