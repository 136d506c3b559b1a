use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use tradetracker_core::{Category, Money, Transaction, TransactionKind};

use crate::summary::UNCATEGORIZED;

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid transaction on line {line}: {message}")]
    InvalidRow { line: u64, message: String },
}

/// Flat row written for each exported transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Type")]
    pub kind: TransactionKind,
    #[serde(rename = "Amount")]
    pub amount: Money,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Notes")]
    pub notes: String,
}

pub fn export_rows(transactions: &[Transaction], categories: &[Category]) -> Vec<ExportRow> {
    let names: HashMap<&str, &str> = categories.iter().map(|c| (c.id.as_str(), c.name.as_str())).collect();
    transactions
        .iter()
        .map(|t| ExportRow {
            date: t.transaction_date,
            kind: t.kind,
            amount: t.amount,
            description: t.description.clone(),
            category: t
                .category_id
                .as_ref()
                .and_then(|id| names.get(id.as_str()).copied())
                .unwrap_or(UNCATEGORIZED)
                .to_string(),
            notes: t.voice_input.clone().unwrap_or_default(),
        })
        .collect()
}

/// Serializes any flat rows with a header line.
pub fn write_csv<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<(), CsvError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Reads `type,amount,description,category_id,transaction_date` rows
/// (plus optional `id`, `voice_input`, `receipt_url`). Non-positive amounts
/// are rejected with their line number.
pub fn read_transactions_csv<R: Read>(reader: R) -> Result<Vec<Transaction>, CsvError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut out = Vec::new();
    for result in rdr.deserialize::<Transaction>() {
        let tx = result?;
        if tx.amount.amount() <= rust_decimal::Decimal::ZERO {
            return Err(CsvError::InvalidRow {
                line: out.len() as u64 + 2,
                message: format!("amount must be positive, got {}", tx.amount.amount()),
            });
        }
        out.push(tx);
    }
    tracing::debug!(count = out.len(), "transactions loaded from csv");
    Ok(out)
}

pub fn read_transactions_path(path: &Path) -> Result<Vec<Transaction>, CsvError> {
    read_transactions_csv(File::open(path)?)
}
