pub mod category;
pub mod money;
pub mod parsed;
pub mod period;
pub mod transaction;

pub use category::{default_categories, Category, CategoryId, TransactionKind, DEFAULT_CATEGORIES};
pub use money::Money;
pub use parsed::{ParseMethod, ParsedTransaction};
pub use period::{DateRange, Period};
pub use transaction::{NewTransaction, Transaction, TransactionError};
