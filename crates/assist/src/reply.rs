use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use tradetracker_core::{Category, ParseMethod, ParsedTransaction, TransactionKind};
use tradetracker_parse::{describe, find_by_name, LineItem, ParsedReceipt, MAX_LINE_ITEMS};

use crate::parser::FallbackReason;

pub const DEFAULT_REMOTE_CONFIDENCE: f32 = 0.7;

#[derive(Debug, Deserialize)]
struct VoiceReply {
    #[serde(rename = "type")]
    kind: Option<String>,
    amount: Option<Value>,
    description: Option<String>,
    category: Option<String>,
    confidence: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ReceiptReply {
    amount: Option<Value>,
    description: Option<String>,
    category: Option<String>,
    vendor: Option<String>,
    items: Option<Value>,
    date: Option<String>,
    confidence: Option<Value>,
}

/// Accepts a JSON number or a numeric string ("1,200"). Only positive values count.
pub fn amount_from_json(value: &Value) -> Option<Decimal> {
    let amount = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(Decimal::from(i)),
            None => n.as_f64().and_then(Decimal::from_f64).map(|d| d.round_dp(2)),
        },
        Value::String(s) => Decimal::from_str(&s.trim().replace(',', "")).ok(),
        _ => None,
    }?;
    (amount.is_sign_positive() && !amount.is_zero()).then_some(amount)
}

/// The reply's own confidence when it lies within `[0, 1]`, else the default.
pub fn reply_confidence(confidence: Option<f64>) -> f32 {
    confidence
        .filter(|c| c.is_finite() && (0.0..=1.0).contains(c))
        .map(|c| c as f32)
        .unwrap_or(DEFAULT_REMOTE_CONFIDENCE)
}

/// A number, or a numeric string such as "0.9". Anything else is ignored.
pub fn confidence_from_json(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_json<T: for<'de> Deserialize<'de>>(raw: &str) -> Result<T, FallbackReason> {
    serde_json::from_str(raw.trim()).map_err(|e| FallbackReason::MalformedReply(e.to_string()))
}

pub fn voice_from_reply(
    raw: &str,
    text: &str,
    categories: &[Category],
) -> Result<ParsedTransaction, FallbackReason> {
    let reply: VoiceReply = parse_json(raw)?;

    let kind = reply
        .kind
        .as_deref()
        .and_then(|k| TransactionKind::from_str(k).ok())
        .ok_or_else(|| FallbackReason::UnusableReply("missing or invalid type".to_string()))?;
    let amount = reply
        .amount
        .as_ref()
        .and_then(amount_from_json)
        .ok_or_else(|| FallbackReason::UnusableReply("missing or non-positive amount".to_string()))?;

    let category_id = reply
        .category
        .as_deref()
        .and_then(|name| find_by_name(name, categories, kind))
        .map(|c| c.id.clone());

    Ok(ParsedTransaction {
        success: true,
        kind: Some(kind),
        amount: Some(amount),
        description: non_empty(reply.description).unwrap_or_else(|| describe(text, kind, amount)),
        category_id,
        confidence: reply_confidence(confidence_from_json(reply.confidence.as_ref())),
        method: ParseMethod::OpenAiApi,
    })
}

fn item_name(value: &Value) -> Option<String> {
    let name = match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map
            .get("name")
            .or_else(|| map.get("description"))
            .and_then(Value::as_str),
        _ => None,
    }?;
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

pub fn receipt_from_reply(
    raw: &str,
    categories: &[Category],
) -> Result<ParsedReceipt, FallbackReason> {
    let reply: ReceiptReply = parse_json(raw)?;

    let amount = reply
        .amount
        .as_ref()
        .and_then(amount_from_json)
        .ok_or_else(|| FallbackReason::UnusableReply("missing or non-positive amount".to_string()))?;

    let vendor = non_empty(reply.vendor);
    let description = non_empty(reply.description).unwrap_or_else(|| match &vendor {
        Some(v) => format!("Purchase from {v}"),
        None => "Receipt purchase".to_string(),
    });
    let category_id = reply
        .category
        .as_deref()
        .and_then(|name| find_by_name(name, categories, TransactionKind::Expense))
        .map(|c| c.id.clone());
    // `null` or a non-list means no items.
    let items = reply
        .items
        .as_ref()
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(item_name)
        .take(MAX_LINE_ITEMS)
        .map(LineItem::named)
        .collect();
    let transaction_date = reply
        .date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());

    Ok(ParsedReceipt {
        transaction: ParsedTransaction {
            success: true,
            kind: Some(TransactionKind::Expense),
            amount: Some(amount),
            description,
            category_id,
            confidence: reply_confidence(confidence_from_json(reply.confidence.as_ref())),
            method: ParseMethod::AiReceiptParsing,
        },
        vendor,
        items,
        transaction_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tradetracker_core::CategoryId;

    fn cats() -> Vec<Category> {
        vec![
            Category::new("c1", "Sales", TransactionKind::Income),
            Category::new("c2", "Transport", TransactionKind::Expense),
            Category::new("c3", "Food & Meals", TransactionKind::Expense),
        ]
    }

    #[test]
    fn voice_reply_maps_category_by_exact_name() {
        let raw = r#"{"type":"expense","amount":800,"description":"Transport fuel","category":"transport","confidence":0.95}"#;
        let p = voice_from_reply(raw, "bought fuel", &cats()).unwrap();
        assert_eq!(p.kind, Some(TransactionKind::Expense));
        assert_eq!(p.amount, Some(Decimal::from(800)));
        assert_eq!(p.category_id, Some(CategoryId::new("c2")));
        assert_eq!(p.method, ParseMethod::OpenAiApi);
        assert!((p.confidence - 0.95).abs() < 1e-6);
    }

    #[test]
    fn voice_reply_category_of_other_kind_is_dropped() {
        let raw = r#"{"type":"income","amount":800,"description":"Fuel resale","category":"Transport"}"#;
        let p = voice_from_reply(raw, "sold fuel", &cats()).unwrap();
        assert!(p.success);
        assert!(p.category_id.is_none());
    }

    #[test]
    fn voice_reply_confidence_defaults() {
        let raw = r#"{"type":"income","amount":10,"description":"Tips"}"#;
        assert_eq!(voice_from_reply(raw, "x", &[]).unwrap().confidence, DEFAULT_REMOTE_CONFIDENCE);
        let raw = r#"{"type":"income","amount":10,"description":"Tips","confidence":7}"#;
        assert_eq!(voice_from_reply(raw, "x", &[]).unwrap().confidence, DEFAULT_REMOTE_CONFIDENCE);
    }

    #[test]
    fn voice_reply_without_description_is_synthesized() {
        let raw = r#"{"type":"income","amount":"2,000"}"#;
        let p = voice_from_reply(raw, "sold rice for 2,000", &[]).unwrap();
        assert_eq!(p.amount, Some(Decimal::from(2000)));
        assert_eq!(p.description, "Sold rice for");
    }

    #[test]
    fn voice_reply_needs_type_and_amount() {
        assert!(matches!(
            voice_from_reply(r#"{"amount":5}"#, "x", &[]),
            Err(FallbackReason::UnusableReply(_))
        ));
        assert!(matches!(
            voice_from_reply(r#"{"type":"income","amount":0}"#, "x", &[]),
            Err(FallbackReason::UnusableReply(_))
        ));
        assert!(matches!(
            voice_from_reply(r#"{"type":"transfer","amount":5}"#, "x", &[]),
            Err(FallbackReason::UnusableReply(_))
        ));
    }

    #[test]
    fn non_json_reply_is_malformed() {
        assert!(matches!(
            voice_from_reply("Sure! Here is the JSON: {}", "x", &[]),
            Err(FallbackReason::MalformedReply(_))
        ));
    }

    #[test]
    fn receipt_reply_full() {
        let raw = r#"{"type":"expense","amount":350,"description":"Groceries from Naivas","category":"Food & Meals","vendor":"Naivas Supermarket","items":["Bread","Milk",{"name":"Eggs"}],"date":"2024-03-12","confidence":0.9}"#;
        let r = receipt_from_reply(raw, &cats()).unwrap();
        assert_eq!(r.transaction.method, ParseMethod::AiReceiptParsing);
        assert_eq!(r.transaction.kind, Some(TransactionKind::Expense));
        assert_eq!(r.transaction.category_id, Some(CategoryId::new("c3")));
        assert_eq!(r.vendor.as_deref(), Some("Naivas Supermarket"));
        assert_eq!(r.items.len(), 3);
        assert_eq!(r.items[2].description, "Eggs");
        assert_eq!(r.transaction_date, NaiveDate::from_ymd_opt(2024, 3, 12));
    }

    #[test]
    fn receipt_reply_with_null_items_is_kept() {
        let raw = r#"{"type":"expense","amount":350,"vendor":"Naivas","items":null,"category":null,"confidence":null}"#;
        let r = receipt_from_reply(raw, &cats()).unwrap();
        assert_eq!(r.transaction.amount, Some(Decimal::from(350)));
        assert!(r.items.is_empty());
        assert_eq!(r.transaction.confidence, DEFAULT_REMOTE_CONFIDENCE);
    }

    #[test]
    fn non_numeric_confidence_uses_default() {
        let raw = r#"{"type":"income","amount":2000,"description":"Sold rice","confidence":"high"}"#;
        let p = voice_from_reply(raw, "sold rice", &[]).unwrap();
        assert_eq!(p.amount, Some(Decimal::from(2000)));
        assert_eq!(p.confidence, DEFAULT_REMOTE_CONFIDENCE);

        let raw = r#"{"type":"income","amount":2000,"confidence":"0.9"}"#;
        assert!((voice_from_reply(raw, "sold rice", &[]).unwrap().confidence - 0.9).abs() < 1e-6);

        let raw = r#"{"amount":80,"confidence":{"score":1}}"#;
        assert_eq!(receipt_from_reply(raw, &[]).unwrap().transaction.confidence, DEFAULT_REMOTE_CONFIDENCE);
    }

    #[test]
    fn receipt_reply_defaults_description_from_vendor() {
        let raw = r#"{"amount":99.5,"vendor":"Shell","date":null}"#;
        let r = receipt_from_reply(raw, &[]).unwrap();
        assert_eq!(r.transaction.description, "Purchase from Shell");
        assert_eq!(r.transaction.amount, Some(Decimal::from_str("99.5").unwrap()));
        assert!(r.transaction_date.is_none());
    }

    #[test]
    fn amount_from_json_shapes() {
        assert_eq!(amount_from_json(&json!(12.75)), Some(Decimal::from_str("12.75").unwrap()));
        assert_eq!(amount_from_json(&json!("1,500")), Some(Decimal::from(1500)));
        assert_eq!(amount_from_json(&json!(-3)), None);
        assert_eq!(amount_from_json(&json!(null)), None);
        assert_eq!(amount_from_json(&json!("abc")), None);
    }
}
