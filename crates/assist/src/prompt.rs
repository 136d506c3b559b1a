use tradetracker_core::{Category, TransactionKind};
use tradetracker_parse::normalize;

use crate::client::CompletionRequest;

pub const TEMPERATURE: f32 = 0.1;
pub const VOICE_MAX_TOKENS: u32 = 200;
pub const RECEIPT_MAX_TOKENS: u32 = 300;

const VOICE_SYSTEM: &str = "You parse spoken transaction notes for a small business bookkeeping app. \
Respond with a single valid JSON object only, no additional text.";

const RECEIPT_SYSTEM: &str = "You parse receipt text for small business expense tracking in Kenya. \
Respond with a single valid JSON object only, no additional text.";

/// "Sales (income), Transport (expense)", or "none".
fn voice_category_list(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "none".to_string();
    }
    categories
        .iter()
        .map(|c| format!("{} ({})", c.name, c.kind))
        .collect::<Vec<_>>()
        .join(", ")
}

fn expense_category_list(categories: &[Category]) -> String {
    let names: Vec<&str> = categories
        .iter()
        .filter(|c| c.kind == TransactionKind::Expense)
        .map(|c| c.name.as_str())
        .collect();
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

pub fn voice_request(text: &str, categories: &[Category]) -> CompletionRequest {
    let prompt = format!(
        r#"Parse this spoken transaction for a small business tracker:
"{text}"

Available categories: {categories}

Reply with JSON shaped like:
{{
  "type": "income" or "expense",
  "amount": number without currency symbols,
  "description": "short clear description",
  "category": "exact category name from the list above",
  "confidence": 0.0-1.0
}}

Rules:
- If the amount is unclear, use a confidence below 0.5
- The category must be copied exactly from the list
- Keep the description short and professional
- Amounts are usually Kenyan shillings; expect words like matatu, ksh, bob

Examples:
"i sold 5 bags of rice for 2000 shillings" -> {{"type": "income", "amount": 2000, "description": "Sold 5 bags of rice", "category": "Sales", "confidence": 0.9}}
"bought transport fuel for 800 shillings" -> {{"type": "expense", "amount": 800, "description": "Transport fuel", "category": "Transport", "confidence": 0.9}}"#,
        text = normalize(text),
        categories = voice_category_list(categories),
    );

    CompletionRequest {
        system: VOICE_SYSTEM.to_string(),
        prompt,
        temperature: TEMPERATURE,
        max_tokens: VOICE_MAX_TOKENS,
    }
}

/// The OCR text is embedded verbatim.
pub fn receipt_request(ocr_text: &str, categories: &[Category]) -> CompletionRequest {
    let prompt = format!(
        r#"Parse this receipt OCR text for a small business expense tracker:

"{ocr_text}"

Available expense categories: {categories}

Reply with JSON shaped like:
{{
  "type": "expense",
  "amount": total amount as a number without currency symbols,
  "description": "short description of the purchase",
  "category": "best matching category from the list",
  "vendor": "store or vendor name",
  "items": ["item1", "item2"],
  "date": "YYYY-MM-DD" or null,
  "confidence": 0.0-1.0
}}

Rules:
- Use the final TOTAL (labels like Total, Amount Due, Grand Total), not tax lines or subtotals
- Pick the category from the purchased items or the vendor type
- Currency is usually KES / shillings
- Use null for the date when it is unclear

Example:
Receipt from "Naivas Supermarket" with "Bread 150, Milk 200, Total: 350" ->
{{"type": "expense", "amount": 350, "description": "Groceries from Naivas", "category": "Food & Meals", "vendor": "Naivas Supermarket", "items": ["Bread", "Milk"], "date": null, "confidence": 0.9}}"#,
        categories = expense_category_list(categories),
    );

    CompletionRequest {
        system: RECEIPT_SYSTEM.to_string(),
        prompt,
        temperature: TEMPERATURE,
        max_tokens: RECEIPT_MAX_TOKENS,
    }
}
