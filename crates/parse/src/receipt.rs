use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;

use tradetracker_core::{Category, ParseMethod, ParsedTransaction, TransactionKind};

use crate::categorize::KeywordCategorizer;
use crate::normalize::normalize;
use crate::types::{LineItem, ParsedReceipt, MAX_LINE_ITEMS};
use crate::voice::parse_amount;

pub const SIMPLE_CONFIDENCE: f32 = 0.5;
pub const DEFAULT_DESCRIPTION: &str = "Receipt purchase";

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

macro_rules! amount {
    () => {
        r"(\d+(?:,\d{3})*(?:\.\d{2})?)"
    };
}

fn total_bank() -> &'static [Regex] {
    static R: OnceLock<Vec<Regex>> = OnceLock::new();
    R.get_or_init(|| {
        [
            concat!(r"\bgrand\s*total[:\s]*(?:ksh?|kes)?\.?\s*", amount!()),
            concat!(r"\btotal[:\s]*(?:ksh?|kes)?\.?\s*", amount!()),
            concat!(r"\bamount(?:\s+due)?[:\s]*(?:ksh?|kes)?\.?\s*", amount!()),
            concat!(r"\b(?:ksh?|kes)\.?\s*", amount!()),
            concat!(amount!(), r"\s*(?:ksh?|kes)\b"),
        ]
        .iter()
        .map(|p| Regex::new(p).expect("invalid regex"))
        .collect()
    })
}

re!(re_vendor_suffix,
    r"(?im)^[ \t]*([a-z][a-z &'.\-]*(?:supermarket|store|shop|mart|ltd|limited))\b");
re!(re_vendor_doc,
    r"(?im)^[ \t]*([a-z][a-z &'.\-]*?)[ \t]+(?:receipt|invoice)\b");

re!(re_line_item,
    concat!(r"(?i)^\s*([a-z][a-z0-9 &'./\-]*?)\s+(?:(\d{1,3})\s*[x@]\s*)?(?:ksh?|kes)?\.?\s*", amount!(), r"\s*$"));

re!(re_date_iso, r"\b(\d{4})-(\d{2})-(\d{2})\b");
re!(re_date_month_name,
    r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sep|sept|oct|nov|dec)\.?\s+(\d{1,2}),?\s+(\d{4})\b");
re!(re_date_day_month,
    r"(?i)\b(\d{1,2})\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?,?\s+(\d{4})\b");
re!(re_date_numeric, r"\b(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{2,4})\b");

re!(re_phone, r"\(?\+?\d{3}\)?[\s\-]?\d{3}[\s\-]?\d{3,4}");
re!(re_url, r"(?i)(https?://|www\.)\S+");

/// Words that mark a priced line as a summary row rather than a purchase.
const NON_ITEM_WORDS: &[&str] = &[
    "subtotal", "total", "tax", "vat", "change", "cash", "balance", "amount", "tendered", "paid",
    "card", "mpesa", "m-pesa", "till", "receipt", "invoice", "tel", "date", "discount",
];

/// Whole-word match on any of `NON_ITEM_WORDS`.
fn re_non_item() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        let words: Vec<String> = NON_ITEM_WORDS.iter().map(|w| regex::escape(w)).collect();
        Regex::new(&format!(r"(?i)\b(?:{})\b", words.join("|"))).expect("invalid regex")
    })
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Offline receipt parser. Always classifies as an expense.
pub fn parse_receipt(ocr_text: &str, categories: &[Category]) -> ParsedReceipt {
    let text = normalize(ocr_text);
    tracing::debug!(chars = text.len(), "simple receipt parsing");

    let amount = extract_total(&text);
    let vendor = extract_vendor(ocr_text);
    let items = extract_items(ocr_text);
    let transaction_date = extract_date(ocr_text);

    let description = match (&vendor, amount) {
        (Some(v), _) => format!("Purchase from {v}"),
        (None, Some(a)) => format!("Receipt expense of KES {}", a.normalize()),
        (None, None) => DEFAULT_DESCRIPTION.to_string(),
    };

    let category_id = KeywordCategorizer::receipt()
        .infer(&text, categories, TransactionKind::Expense)
        .map(|c| c.id.clone());

    ParsedReceipt {
        transaction: ParsedTransaction {
            success: amount.is_some(),
            kind: Some(TransactionKind::Expense),
            amount,
            description,
            category_id,
            confidence: SIMPLE_CONFIDENCE,
            method: ParseMethod::SimpleParsing,
        },
        vendor,
        items,
        transaction_date,
    }
}

/// Labeled totals in priority order, then bare currency-tagged amounts.
/// A zero amount does not count as a match.
pub fn extract_total(normalized: &str) -> Option<Decimal> {
    total_bank().iter().find_map(|re| {
        re.captures(normalized)
            .and_then(|c| c.get(1))
            .and_then(|m| parse_amount(m.as_str()))
            .filter(|a| *a > Decimal::ZERO)
    })
}

// ── Vendor ───────────────────────────────────────────────────────────────────

pub fn extract_vendor(text: &str) -> Option<String> {
    for re in [re_vendor_suffix(), re_vendor_doc()] {
        if let Some(m) = re.captures(text).and_then(|c| c.get(1)) {
            let v = m.as_str().trim();
            if !v.is_empty() {
                return Some(v.to_string());
            }
        }
    }
    header_vendor(text)
}

/// Best-looking header line: all-caps and longer lines score higher.
fn header_vendor(text: &str) -> Option<String> {
    text.lines()
        .take(10)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter(|l| !re_phone().is_match(l))
        .filter(|l| !re_url().is_match(l))
        .filter(|l| !re_date_numeric().is_match(l) && !re_date_iso().is_match(l))
        .filter(|l| l.len() >= 3 && l.len() <= 50)
        .filter(|l| !l.starts_with(|c: char| c.is_ascii_digit()))
        .filter(|l| !l.chars().any(|c| c.is_ascii_digit()))
        .filter(|l| l.chars().next().is_some_and(char::is_uppercase))
        .max_by_key(|l| {
            let all_caps = l.chars().filter(|c| c.is_alphabetic()).all(char::is_uppercase);
            (if all_caps { 2i32 } else { 0 }) + (l.len() as i32).min(20)
        })
        .map(str::to_string)
}

// ── Line items ───────────────────────────────────────────────────────────────

pub fn extract_items(text: &str) -> Vec<LineItem> {
    text.lines()
        .filter(|line| !re_non_item().is_match(line))
        .filter_map(|line| {
            let c = re_line_item().captures(line)?;
            let description = c.get(1)?.as_str().trim().to_string();
            if description.chars().filter(|ch| ch.is_alphabetic()).count() < 2 {
                return None;
            }
            Some(LineItem {
                description,
                quantity: c.get(2).and_then(|q| q.as_str().parse().ok()),
                amount: c.get(3).and_then(|a| parse_amount(a.as_str())),
            })
        })
        .take(MAX_LINE_ITEMS)
        .collect()
}

// ── Date ─────────────────────────────────────────────────────────────────────

/// ISO first, then month names, then numeric dates read day-first.
pub fn extract_date(text: &str) -> Option<NaiveDate> {
    try_iso(text)
        .or_else(|| try_month_name(text))
        .or_else(|| try_day_month(text))
        .or_else(|| try_numeric(text))
}

fn try_iso(text: &str) -> Option<NaiveDate> {
    let c = re_date_iso().captures(text)?;
    NaiveDate::from_ymd_opt(c[1].parse().ok()?, c[2].parse().ok()?, c[3].parse().ok()?)
}

fn try_month_name(text: &str) -> Option<NaiveDate> {
    let c = re_date_month_name().captures(text)?;
    let month = month_number(&c[1])?;
    NaiveDate::from_ymd_opt(c[3].parse().ok()?, month, c[2].parse().ok()?)
}

fn try_day_month(text: &str) -> Option<NaiveDate> {
    let c = re_date_day_month().captures(text)?;
    let month = month_number(&c[2])?;
    NaiveDate::from_ymd_opt(c[3].parse().ok()?, month, c[1].parse().ok()?)
}

fn try_numeric(text: &str) -> Option<NaiveDate> {
    let c = re_date_numeric().captures(text)?;
    let day: u32 = c[1].parse().ok()?;
    let month: u32 = c[2].parse().ok()?;
    let year: i32 = c[3].parse().ok()?;
    let year = if year < 100 { 2000 + year } else { year };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.to_lowercase().chars().take(3).collect();
    let n = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(n)
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use tradetracker_core::CategoryId;

    const NAIVAS: &str = "NAIVAS SUPERMARKET\nTel 0712 345678\n12/03/2024\nBread 150\nMilk 2 x 100\nSubtotal 350\nVAT 0.00\nTOTAL KES 350.00\nCash 500\nChange 150";

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn full_receipt() {
        let cats = vec![Category::new("f", "Food & Meals", TransactionKind::Expense)];
        let r = parse_receipt(NAIVAS, &cats);
        assert!(r.transaction.success);
        assert_eq!(r.transaction.kind, Some(TransactionKind::Expense));
        assert_eq!(r.transaction.amount, Some(dec("350.00")));
        assert_eq!(r.transaction.method, ParseMethod::SimpleParsing);
        assert_eq!(r.transaction.category_id, Some(CategoryId::new("f")));
        assert_eq!(r.vendor.as_deref(), Some("NAIVAS SUPERMARKET"));
        assert_eq!(r.transaction.description, "Purchase from NAIVAS SUPERMARKET");
        assert_eq!(r.transaction_date, NaiveDate::from_ymd_opt(2024, 3, 12));
    }

    #[test]
    fn items_exclude_summary_rows() {
        let r = parse_receipt(NAIVAS, &[]);
        let names: Vec<&str> = r.items.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(names, vec!["Bread", "Milk"]);
        assert_eq!(r.items[1].quantity, Some(2));
        assert_eq!(r.items[1].amount, Some(dec("100")));
    }

    #[test]
    fn item_names_containing_summary_words_are_kept() {
        let text = "Hotel breakfast 450\nCardamom 120\nDates 200\nTotal 770";
        let names: Vec<String> = extract_items(text).into_iter().map(|i| i.description).collect();
        assert_eq!(names, vec!["Hotel breakfast", "Cardamom", "Dates"]);
    }

    #[test]
    fn items_are_bounded() {
        let text: String = (0..25).map(|i| format!("Item{} {}\n", "x".repeat(i % 3 + 2), 10 + i)).collect();
        assert_eq!(extract_items(&text).len(), MAX_LINE_ITEMS);
    }

    #[test]
    fn subtotal_does_not_win_over_total() {
        assert_eq!(extract_total("subtotal 300\ntax 50\ntotal 350"), Some(dec("350")));
    }

    #[test]
    fn grand_total_preferred() {
        assert_eq!(extract_total("total 300\ngrand total: 1,450.50"), Some(dec("1450.50")));
    }

    #[test]
    fn amount_due_label() {
        assert_eq!(extract_total("amount due: ksh 780"), Some(dec("780")));
    }

    #[test]
    fn currency_tagged_fallbacks() {
        assert_eq!(extract_total("paid ksh. 1,200"), Some(dec("1200")));
        assert_eq!(extract_total("fare 90 kes"), Some(dec("90")));
    }

    #[test]
    fn missing_amount_is_unsuccessful_expense() {
        let r = parse_receipt("thank you for visiting", &[]);
        assert!(!r.transaction.success);
        assert_eq!(r.transaction.kind, Some(TransactionKind::Expense));
        assert!(r.transaction.amount.is_none());
        assert_eq!(r.transaction.description, DEFAULT_DESCRIPTION);
        assert_eq!(r.transaction.confidence, SIMPLE_CONFIDENCE);
    }

    #[test]
    fn zero_total_is_not_a_transaction() {
        let r = parse_receipt("TOTAL 0.00", &[]);
        assert!(!r.transaction.success);
        assert_eq!(r.transaction.amount, None);
        assert_eq!(r.transaction.description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn zero_total_falls_through_to_tagged_amount() {
        assert_eq!(extract_total("total 0.00\npaid ksh 50"), Some(dec("50")));
    }

    #[test]
    fn description_without_vendor_uses_amount() {
        let r = parse_receipt("total 99.50", &[]);
        assert_eq!(r.transaction.description, "Receipt expense of KES 99.5");
    }

    #[test]
    fn vendor_from_receipt_header() {
        assert_eq!(extract_vendor("Java House Receipt\nTotal 400").as_deref(), Some("Java House"));
    }

    #[test]
    fn vendor_header_heuristic_prefers_caps() {
        let text = "Welcome\nKAMAU HARDWARE\nP.O. Box 100\nTotal 400";
        assert_eq!(extract_vendor(text).as_deref(), Some("KAMAU HARDWARE"));
    }

    #[test]
    fn vendor_suffix_ignores_shopping() {
        // "shopping" must not satisfy the "shop" suffix.
        assert_eq!(extract_vendor("thank you for shopping\n"), None);
    }

    #[test]
    fn dates_in_several_formats() {
        assert_eq!(extract_date("2024-01-15"), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(extract_date("March 5, 2024"), NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(extract_date("15 Jan 2024"), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(extract_date("05/02/24"), NaiveDate::from_ymd_opt(2024, 2, 5));
        assert_eq!(extract_date("no date here"), None);
    }

    #[test]
    fn category_restricted_to_expense() {
        let cats = vec![Category::new("i", "Food & Meals", TransactionKind::Income)];
        let r = parse_receipt(NAIVAS, &cats);
        assert!(r.transaction.category_id.is_none());
    }

    #[test]
    fn no_panic_on_garbage_input() {
        let _ = parse_receipt("!@#$%^&*()\n\0\x01\x02", &[]);
    }
}
