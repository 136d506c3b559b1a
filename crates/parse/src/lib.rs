pub mod categorize;
pub mod normalize;
pub mod receipt;
pub mod types;
pub mod validate;
pub mod voice;

pub use categorize::{find_by_name, KeywordCategorizer, KeywordRule};
pub use normalize::normalize;
pub use receipt::parse_receipt;
pub use types::{receipt_summary, LineItem, ParsedReceipt, MAX_LINE_ITEMS};
pub use validate::{validate, validate_receipt, ValidationIssue, ValidationReport};
pub use voice::{describe, parse};
