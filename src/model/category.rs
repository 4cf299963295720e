use crate::model::TransactionType;
use serde::{Deserialize, Serialize};

/// The fixed set of categories. Which ones are valid for a transaction depends on its
/// `TransactionType`, see `TransactionType::categories`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    // income
    Salary,
    SideIncome,
    Allowance,
    // expense
    Food,
    DailyGoods,
    Housing,
    Social,
    Entertainment,
    Transport,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

/// One entry of a category table: the category and the color its chart slice is drawn with.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct CategorySpec {
    pub category: Category,
    pub color: &'static str,
}

const fn spec(category: Category, color: &'static str) -> CategorySpec {
    CategorySpec { category, color }
}

const INCOME_CATEGORIES: &[CategorySpec] = &[
    spec(Category::Salary, "#4caf50"),
    spec(Category::SideIncome, "#8bc34a"),
    spec(Category::Allowance, "#cddc39"),
];

const EXPENSE_CATEGORIES: &[CategorySpec] = &[
    spec(Category::Food, "#f44336"),
    spec(Category::DailyGoods, "#ff9800"),
    spec(Category::Housing, "#9c27b0"),
    spec(Category::Social, "#e91e63"),
    spec(Category::Entertainment, "#3f51b5"),
    spec(Category::Transport, "#009688"),
];

impl TransactionType {
    /// The categories (and their chart colors) that are valid for this type, in display order.
    pub fn categories(self) -> &'static [CategorySpec] {
        match self {
            TransactionType::Income => INCOME_CATEGORIES,
            TransactionType::Expense => EXPENSE_CATEGORIES,
        }
    }

    /// Returns the color of `category` when it belongs to this type, `None` otherwise.
    pub fn color_of(self, category: Category) -> Option<&'static str> {
        self.categories()
            .iter()
            .find(|spec| spec.category == category)
            .map(|spec| spec.color)
    }

    pub fn allows(self, category: Category) -> bool {
        self.color_of(category).is_some()
    }
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Salary,
        Category::SideIncome,
        Category::Allowance,
        Category::Food,
        Category::DailyGoods,
        Category::Housing,
        Category::Social,
        Category::Entertainment,
        Category::Transport,
    ];

    /// The type whose domain contains this category.
    pub fn kind(self) -> TransactionType {
        match self {
            Category::Salary | Category::SideIncome | Category::Allowance => {
                TransactionType::Income
            }
            _ => TransactionType::Expense,
        }
    }
}
