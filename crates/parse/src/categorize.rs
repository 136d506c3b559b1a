use std::sync::OnceLock;

use tradetracker_core::{Category, TransactionKind};

/// Keyword table used for spoken input, in priority order.
pub const VOICE_KEYWORDS: &[(&str, &[&str])] = &[
    ("Sales", &["sold", "sale", "customer", "client", "product", "goods"]),
    ("Services", &["service", "work", "job", "consultation", "repair", "fix"]),
    ("Other Income", &["bonus", "gift", "refund", "interest", "dividend"]),
    ("Inventory", &["bought", "purchase", "stock", "goods", "materials", "supplies"]),
    ("Transport", &["transport", "fuel", "petrol", "diesel", "taxi", "bus", "matatu"]),
    ("Food & Meals", &["food", "lunch", "dinner", "breakfast", "meal", "tea", "coffee"]),
    ("Utilities", &["electricity", "water", "internet", "phone", "airtime", "data"]),
    ("Marketing", &["advert", "marketing", "promotion", "banner", "flyer"]),
    ("Other Expenses", &["expense", "cost", "fee", "charge", "payment"]),
];

/// Keyword table used for OCR receipt text, in priority order.
pub const RECEIPT_KEYWORDS: &[(&str, &[&str])] = &[
    ("Food & Meals", &["food", "meal", "restaurant", "cafe", "supermarket", "grocery"]),
    ("Transport", &["fuel", "petrol", "diesel", "parking", "taxi", "bus"]),
    ("Utilities", &["electricity", "water", "internet", "phone", "airtime"]),
    ("Inventory", &["wholesale", "supplies", "materials", "stock"]),
    ("Other Expenses", &["receipt", "purchase", "payment"]),
];

/// One row of a keyword table: a category label and the words that imply it.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordRule {
    pub label: String,
    pub keywords: Vec<String>,
}

/// Priority-ordered keyword lookup that maps free text onto a caller category.
///
/// Matching is plain substring search on both the keyword and the label, so
/// short keywords can hit inside unrelated words ("tea" in "steam").
#[derive(Debug, Clone)]
pub struct KeywordCategorizer {
    rules: Vec<KeywordRule>,
}

impl KeywordCategorizer {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|r| KeywordRule {
                label: r.label.to_lowercase(),
                keywords: r.keywords.into_iter().map(|k| k.to_lowercase()).collect(),
            })
            .collect();
        Self { rules }
    }

    pub fn from_table(table: &[(&str, &[&str])]) -> Self {
        Self::new(
            table
                .iter()
                .map(|(label, keywords)| KeywordRule {
                    label: label.to_string(),
                    keywords: keywords.iter().map(|k| k.to_string()).collect(),
                })
                .collect(),
        )
    }

    pub fn voice() -> &'static KeywordCategorizer {
        static VOICE: OnceLock<KeywordCategorizer> = OnceLock::new();
        VOICE.get_or_init(|| KeywordCategorizer::from_table(VOICE_KEYWORDS))
    }

    pub fn receipt() -> &'static KeywordCategorizer {
        static RECEIPT: OnceLock<KeywordCategorizer> = OnceLock::new();
        RECEIPT.get_or_init(|| KeywordCategorizer::from_table(RECEIPT_KEYWORDS))
    }

    /// First keyword present in `normalized_text` whose label has a matching
    /// category of `kind` wins. Categories of the other kind are never returned.
    pub fn infer<'a>(
        &self,
        normalized_text: &str,
        categories: &'a [Category],
        kind: TransactionKind,
    ) -> Option<&'a Category> {
        let candidates: Vec<(&'a Category, String)> = categories
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| (c, c.name.to_lowercase()))
            .collect();
        if candidates.is_empty() {
            return None;
        }

        for rule in &self.rules {
            for keyword in &rule.keywords {
                if !normalized_text.contains(keyword.as_str()) {
                    continue;
                }
                if let Some((category, _)) =
                    candidates.iter().find(|(_, name)| name.contains(rule.label.as_str()))
                {
                    return Some(category);
                }
            }
        }
        None
    }
}

/// Case-insensitive exact name lookup restricted to categories of `kind`.
pub fn find_by_name<'a>(
    name: &str,
    categories: &'a [Category],
    kind: TransactionKind,
) -> Option<&'a Category> {
    let wanted = name.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    categories
        .iter()
        .filter(|c| c.kind == kind)
        .find(|c| c.name.to_lowercase() == wanted)
}
