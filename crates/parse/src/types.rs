use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tradetracker_core::ParsedTransaction;

/// Upper bound on purchased items kept from one receipt.
pub const MAX_LINE_ITEMS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub amount: Option<Decimal>,
    pub quantity: Option<u32>,
}

impl LineItem {
    pub fn named(description: impl Into<String>) -> Self {
        Self { description: description.into(), amount: None, quantity: None }
    }
}

/// A receipt parse: the unified transaction plus receipt-only fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedReceipt {
    #[serde(flatten)]
    pub transaction: ParsedTransaction,
    pub vendor: Option<String>,
    pub items: Vec<LineItem>,
    pub transaction_date: Option<NaiveDate>,
}

/// Short human summary: vendor, first three items, remaining count, date.
pub fn receipt_summary(receipt: &ParsedReceipt) -> String {
    let mut parts = Vec::new();

    if let Some(vendor) = &receipt.vendor {
        parts.push(format!("from {vendor}"));
    }

    if !receipt.items.is_empty() {
        let shown: Vec<&str> = receipt
            .items
            .iter()
            .take(3)
            .map(|i| i.description.as_str())
            .collect();
        parts.push(format!("items: {}", shown.join(", ")));
        if receipt.items.len() > 3 {
            parts.push(format!("and {} more", receipt.items.len() - 3));
        }
    }

    if let Some(date) = receipt.transaction_date {
        parts.push(format!("on {date}"));
    }

    if parts.is_empty() {
        "Receipt details extracted".to_string()
    } else {
        parts.join(" ")
    }
}
