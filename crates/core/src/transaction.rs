use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::category::{CategoryId, TransactionKind};
use crate::money::Money;
use crate::parsed::{ParseMethod, ParsedTransaction};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransactionError {
    #[error("Parsed result was not successful")]
    NotParsed,
    #[error("Transaction type is missing")]
    MissingKind,
    #[error("Amount must be positive, got {0:?}")]
    NonPositiveAmount(Option<Decimal>),
    #[error("Description is empty")]
    EmptyDescription,
}

/// A recorded income or expense entry, as supplied to analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Money,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub transaction_date: NaiveDate,
    #[serde(default)]
    pub voice_input: Option<String>,
    #[serde(default)]
    pub receipt_url: Option<String>,
}

/// A transaction ready to be handed to storage, built from a parser result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Money,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub transaction_date: NaiveDate,
    pub source: ParseMethod,
    pub voice_input: Option<String>,
}

impl NewTransaction {
    pub fn from_parsed(
        parsed: &ParsedTransaction,
        transaction_date: NaiveDate,
    ) -> Result<NewTransaction, TransactionError> {
        if !parsed.success {
            return Err(TransactionError::NotParsed);
        }
        let kind = parsed.kind.ok_or(TransactionError::MissingKind)?;
        let amount = parsed
            .positive_amount()
            .ok_or(TransactionError::NonPositiveAmount(parsed.amount))?;
        let description = parsed.description.trim();
        if description.is_empty() {
            return Err(TransactionError::EmptyDescription);
        }

        Ok(NewTransaction {
            kind,
            amount: Money::from_decimal(amount),
            description: description.to_string(),
            category_id: parsed.category_id.clone(),
            transaction_date,
            source: parsed.method,
            voice_input: None,
        })
    }

    pub fn with_voice_input(mut self, transcript: impl Into<String>) -> Self {
        self.voice_input = Some(transcript.into());
        self
    }
}
