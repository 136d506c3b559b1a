use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub String);

impl CategoryId {
    pub fn new(id: impl Into<String>) -> Self {
        CategoryId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two mutually exclusive classifications a transaction can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// Capitalized label used in synthesized descriptions ("Income of 500").
    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(format!("Unknown transaction kind: '{other}'")),
        }
    }
}

pub const DEFAULT_ICON: &str = "📦";
pub const DEFAULT_COLOR: &str = "#6B7280";

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// A user-owned label used to bucket transactions. Read-only for the parsers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub kind: TransactionKind,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Category {
    pub fn new(id: &str, name: &str, kind: TransactionKind) -> Self {
        Category {
            id: CategoryId::new(id),
            name: name.to_string(),
            kind,
            icon: default_icon(),
            color: default_color(),
            is_default: false,
        }
    }
}

/// Seed set handed to new users: (id, name, kind, icon, color).
pub const DEFAULT_CATEGORIES: &[(&str, &str, TransactionKind, &str, &str)] = &[
    ("sales", "Sales", TransactionKind::Income, "💰", "#10B981"),
    ("services", "Services", TransactionKind::Income, "🛠️", "#3B82F6"),
    ("other-income", "Other Income", TransactionKind::Income, "🎁", "#8B5CF6"),
    ("inventory", "Inventory", TransactionKind::Expense, "📦", "#F59E0B"),
    ("transport", "Transport", TransactionKind::Expense, "🚌", "#EF4444"),
    ("food", "Food & Meals", TransactionKind::Expense, "🍽️", "#F97316"),
    ("utilities", "Utilities", TransactionKind::Expense, "💡", "#06B6D4"),
    ("marketing", "Marketing", TransactionKind::Expense, "📣", "#EC4899"),
    ("other-expenses", "Other Expenses", TransactionKind::Expense, "🧾", "#6B7280"),
];

pub fn default_categories() -> Vec<Category> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(id, name, kind, icon, color)| Category {
            id: CategoryId::new(*id),
            name: name.to_string(),
            kind: *kind,
            icon: icon.to_string(),
            color: color.to_string(),
            is_default: true,
        })
        .collect()
}
