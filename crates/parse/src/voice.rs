use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

use tradetracker_core::{Category, ParseMethod, ParsedTransaction, TransactionKind};

use crate::categorize::KeywordCategorizer;
use crate::normalize::{capitalize_first, collapse_whitespace, normalize};

pub const PATTERN_CONFIDENCE: f32 = 0.8;
pub const CATEGORY_BONUS: f32 = 0.1;

macro_rules! amount {
    () => {
        r"(\d+(?:,\d{3})*(?:\.\d{2})?)"
    };
}

macro_rules! currency {
    () => {
        r"\s*(?:shillings?|ksh|kes|dollars?|usd)?"
    };
}

macro_rules! bank {
    ($name:ident, [$($pat:expr),+ $(,)?]) => {
        fn $name() -> &'static [Regex] {
            static R: OnceLock<Vec<Regex>> = OnceLock::new();
            R.get_or_init(|| {
                vec![$(Regex::new($pat).expect("invalid regex")),+]
            })
        }
    };
}

bank!(income_bank, [
    concat!(r"(?i)(?:sold|earned|received|got|made)\s+(?:.*?)\s+(?:for|worth|of)\s+", amount!(), currency!()),
    concat!(r"(?i)(?:income|revenue|sales?)\s+(?:of|worth)\s+", amount!(), currency!()),
    concat!(r"(?i)(?:client|customer)\s+paid\s+(?:me\s+)?", amount!(), currency!()),
]);

bank!(expense_bank, [
    concat!(r"(?i)(?:bought|purchased|spent|paid)\s+(?:.*?)\s+(?:for|worth|of)\s+", amount!(), currency!()),
    concat!(r"(?i)(?:expense|cost)\s+(?:of|worth)\s+", amount!(), currency!()),
    concat!(r"(?i)(?:transport|fuel|food|lunch)\s+(?:cost|was)\s+", amount!(), currency!()),
]);

fn amount_run() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(concat!(r"(?i)", amount!(), currency!())).expect("invalid regex"))
}

/// Strip thousands separators and parse.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(&raw.replace(',', "")).ok()
}

/// First pattern whose amount is positive. A zero amount is not a match.
fn first_amount(bank: &[Regex], text: &str) -> Option<Decimal> {
    bank.iter().find_map(|re| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| parse_amount(m.as_str()))
            .filter(|a| *a > Decimal::ZERO)
    })
}

/// Income always first: a phrase matching both banks is income.
fn classify(normalized: &str) -> Option<(TransactionKind, Decimal)> {
    if let Some(amount) = first_amount(income_bank(), normalized) {
        return Some((TransactionKind::Income, amount));
    }
    first_amount(expense_bank(), normalized).map(|a| (TransactionKind::Expense, a))
}

/// Remove amount runs, tidy and capitalize; short leftovers become
/// "Income of N" / "Expense of N".
pub fn describe(original: &str, kind: TransactionKind, amount: Decimal) -> String {
    let stripped = amount_run().replace_all(original, "");
    let description = capitalize_first(&collapse_whitespace(&stripped));
    if description.chars().count() < 5 {
        format!("{} of {}", kind.label(), amount.normalize())
    } else {
        description
    }
}

/// Offline parser for spoken transaction phrases, using the built-in voice
/// keyword table.
pub fn parse(text: &str, categories: &[Category]) -> ParsedTransaction {
    let normalized = normalize(text);
    tracing::debug!(input = %normalized, "pattern parsing voice input");

    let Some((kind, amount)) = classify(&normalized) else {
        return ParsedTransaction::unparsed(text, ParseMethod::PatternMatching);
    };

    let mut confidence = PATTERN_CONFIDENCE;
    let category_id = KeywordCategorizer::voice()
        .infer(&normalized, categories, kind)
        .map(|c| {
            confidence += CATEGORY_BONUS;
            c.id.clone()
        });

    ParsedTransaction {
        success: true,
        kind: Some(kind),
        amount: Some(amount),
        description: describe(text, kind, amount),
        category_id,
        confidence,
        method: ParseMethod::PatternMatching,
    }
}
