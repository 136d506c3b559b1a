use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::category::{CategoryId, TransactionKind};

/// Provenance marker: which parsing stage produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMethod {
    #[serde(rename = "pattern_matching")]
    PatternMatching,
    #[serde(rename = "openai_api")]
    OpenAiApi,
    #[serde(rename = "ai_receipt_parsing")]
    AiReceiptParsing,
    #[serde(rename = "simple_parsing")]
    SimpleParsing,
}

impl ParseMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseMethod::PatternMatching => "pattern_matching",
            ParseMethod::OpenAiApi => "openai_api",
            ParseMethod::AiReceiptParsing => "ai_receipt_parsing",
            ParseMethod::SimpleParsing => "simple_parsing",
        }
    }
}

impl fmt::Display for ParseMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unified output of every parser. Built fresh per call and consumed
/// immediately by the caller.
///
/// `confidence` is only comparable between results of the same `method`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub success: bool,
    #[serde(rename = "type")]
    pub kind: Option<TransactionKind>,
    pub amount: Option<Decimal>,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub confidence: f32,
    pub method: ParseMethod,
}

impl ParsedTransaction {
    /// An unsuccessful result carrying the caller's text as its description.
    pub fn unparsed(description: impl Into<String>, method: ParseMethod) -> Self {
        ParsedTransaction {
            success: false,
            kind: None,
            amount: None,
            description: description.into(),
            category_id: None,
            confidence: 0.0,
            method,
        }
    }

    /// The amount, only when it is strictly positive.
    pub fn positive_amount(&self) -> Option<Decimal> {
        self.amount.filter(|a| a.is_sign_positive() && !a.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_tags_serialize_to_wire_names() {
        assert_eq!(
            serde_json::to_string(&ParseMethod::OpenAiApi).unwrap(),
            "\"openai_api\""
        );
        assert_eq!(
            serde_json::to_string(&ParseMethod::PatternMatching).unwrap(),
            "\"pattern_matching\""
        );
        assert_eq!(ParseMethod::AiReceiptParsing.to_string(), "ai_receipt_parsing");
    }

    #[test]
    fn unparsed_has_no_kind_or_amount() {
        let p = ParsedTransaction::unparsed("hello there", ParseMethod::PatternMatching);
        assert!(!p.success);
        assert!(p.kind.is_none());
        assert!(p.amount.is_none());
        assert_eq!(p.confidence, 0.0);
        assert_eq!(p.description, "hello there");
    }

    #[test]
    fn kind_serialized_as_type() {
        let mut p = ParsedTransaction::unparsed("x", ParseMethod::SimpleParsing);
        p.kind = Some(TransactionKind::Expense);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["type"], "expense");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn positive_amount_rejects_zero_and_negative() {
        let mut p = ParsedTransaction::unparsed("x", ParseMethod::SimpleParsing);
        p.amount = Some(Decimal::ZERO);
        assert!(p.positive_amount().is_none());
        p.amount = Some(Decimal::from(-5));
        assert!(p.positive_amount().is_none());
        p.amount = Some(Decimal::from(5));
        assert_eq!(p.positive_amount(), Some(Decimal::from(5)));
    }
}
