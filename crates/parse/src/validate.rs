use serde::{Deserialize, Serialize};
use std::fmt;

use tradetracker_core::ParsedTransaction;

use crate::types::ParsedReceipt;

pub const MIN_CONFIDENCE: f32 = 0.3;
pub const MIN_DESCRIPTION_CHARS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationIssue {
    NotParsed,
    InvalidKind,
    InvalidAmount,
    MissingReceiptAmount,
    DescriptionTooShort,
    LowConfidence,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ValidationIssue::NotParsed => "Failed to parse transaction",
            ValidationIssue::InvalidKind => "Invalid transaction type",
            ValidationIssue::InvalidAmount => "Invalid amount",
            ValidationIssue::MissingReceiptAmount => "Could not extract valid amount from receipt",
            ValidationIssue::DescriptionTooShort => "Description too short",
            ValidationIssue::LowConfidence => "Low confidence in parsing",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub reasons: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn from_reasons(reasons: Vec<ValidationIssue>) -> Self {
        Self { valid: reasons.is_empty(), reasons }
    }

    pub fn contains(&self, issue: ValidationIssue) -> bool {
        self.reasons.contains(&issue)
    }

    pub fn messages(&self) -> Vec<String> {
        self.reasons.iter().map(ToString::to_string).collect()
    }
}

/// Every check runs; all failing reasons are reported.
fn check(result: &ParsedTransaction, amount_issue: ValidationIssue) -> Vec<ValidationIssue> {
    let mut reasons = Vec::new();
    if !result.success {
        reasons.push(ValidationIssue::NotParsed);
    }
    if result.kind.is_none() {
        reasons.push(ValidationIssue::InvalidKind);
    }
    if result.positive_amount().is_none() {
        reasons.push(amount_issue);
    }
    if result.description.chars().count() < MIN_DESCRIPTION_CHARS {
        reasons.push(ValidationIssue::DescriptionTooShort);
    }
    if result.confidence < MIN_CONFIDENCE || result.confidence.is_nan() {
        reasons.push(ValidationIssue::LowConfidence);
    }
    reasons
}

pub fn validate(result: &ParsedTransaction) -> ValidationReport {
    ValidationReport::from_reasons(check(result, ValidationIssue::InvalidAmount))
}

/// Receipt flavour: a missing amount is reported as a receipt extraction failure.
pub fn validate_receipt(receipt: &ParsedReceipt) -> ValidationReport {
    ValidationReport::from_reasons(check(
        &receipt.transaction,
        ValidationIssue::MissingReceiptAmount,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tradetracker_core::{ParseMethod, TransactionKind};

    fn good() -> ParsedTransaction {
        ParsedTransaction {
            success: true,
            kind: Some(TransactionKind::Income),
            amount: Some(Decimal::from(2000)),
            description: "Sold rice".to_string(),
            category_id: None,
            confidence: 0.8,
            method: ParseMethod::PatternMatching,
        }
    }

    #[test]
    fn accepts_good_result() {
        let report = validate(&good());
        assert!(report.valid);
        assert!(report.reasons.is_empty());
    }

    #[test]
    fn rejects_non_positive_amount() {
        for amount in [Decimal::ZERO, Decimal::from(-10)] {
            let report = validate(&ParsedTransaction { amount: Some(amount), ..good() });
            assert!(!report.valid);
            assert!(report.contains(ValidationIssue::InvalidAmount));
        }
    }

    #[test]
    fn collects_all_reasons() {
        let report = validate(&ParsedTransaction::unparsed("hi", ParseMethod::PatternMatching));
        assert_eq!(
            report.reasons,
            vec![
                ValidationIssue::NotParsed,
                ValidationIssue::InvalidKind,
                ValidationIssue::InvalidAmount,
                ValidationIssue::DescriptionTooShort,
                ValidationIssue::LowConfidence,
            ]
        );
    }

    #[test]
    fn confidence_threshold_is_inclusive() {
        assert!(validate(&ParsedTransaction { confidence: 0.3, ..good() }).valid);
        assert!(!validate(&ParsedTransaction { confidence: 0.29, ..good() }).valid);
    }

    #[test]
    fn receipt_missing_amount_reason() {
        let receipt = ParsedReceipt {
            transaction: ParsedTransaction {
                success: false,
                kind: Some(TransactionKind::Expense),
                amount: None,
                description: "Receipt purchase".to_string(),
                category_id: None,
                confidence: 0.5,
                method: ParseMethod::SimpleParsing,
            },
            vendor: None,
            items: vec![],
            transaction_date: None,
        };
        let report = validate_receipt(&receipt);
        assert_eq!(
            report.reasons,
            vec![ValidationIssue::NotParsed, ValidationIssue::MissingReceiptAmount]
        );
        assert_eq!(report.messages()[1], "Could not extract valid amount from receipt");
    }
}
