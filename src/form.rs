//! The transaction entry form: its field values and which transaction, if any, it is editing.

use crate::model::{day_key, Transaction, TransactionType};
use crate::validation::TransactionInput;
use chrono::NaiveDate;
use serde::Serialize;

/// Field values of the entry form plus the transaction selected for editing.
///
/// With no selection, submitting the form creates a transaction. With a selection, it updates the
/// selected one.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct TransactionForm {
    r#type: TransactionType,
    date: String,
    amount: i64,
    /// Empty while no category is chosen.
    category: String,
    content: String,
    selected: Option<Transaction>,
}

impl TransactionForm {
    /// An empty expense form dated `current_day`.
    pub fn new(current_day: NaiveDate) -> Self {
        Self {
            r#type: TransactionType::Expense,
            date: day_key(current_day),
            amount: 0,
            category: String::new(),
            content: String::new(),
            selected: None,
        }
    }

    pub fn r#type(&self) -> TransactionType {
        self.r#type
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn selected(&self) -> Option<&Transaction> {
        self.selected.as_ref()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_ref().map(Transaction::id)
    }

    /// Switches between income and expense. A change of type clears the category, since the two
    /// types have disjoint category sets.
    pub fn set_type(&mut self, kind: TransactionType) {
        if self.r#type != kind {
            self.r#type = kind;
            self.category.clear();
        }
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        self.date = date.into();
    }

    pub fn set_amount(&mut self, amount: i64) {
        self.amount = amount;
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Keeps the date in step with the selected calendar day while nothing is being edited.
    pub fn follow_day(&mut self, current_day: NaiveDate) {
        if self.selected.is_none() {
            self.date = day_key(current_day);
        }
    }

    /// Loads `transaction` into the form for editing.
    ///
    /// The category is only carried over if it belongs to the transaction's type.
    pub fn select(&mut self, transaction: Transaction) {
        self.r#type = transaction.r#type;
        self.date = transaction.date.clone();
        self.amount = transaction.amount.signed();
        self.category = if transaction.is_consistent() {
            transaction.category.to_string()
        } else {
            String::new()
        };
        self.content = transaction.content.clone();
        self.selected = Some(transaction);
    }

    /// Drops any selection and restores the defaults, dated `current_day`.
    pub fn reset(&mut self, current_day: NaiveDate) {
        *self = Self::new(current_day);
    }

    /// The raw values to validate on submit.
    pub fn input(&self) -> TransactionInput {
        TransactionInput {
            r#type: self.r#type.to_string(),
            date: self.date.clone(),
            amount: self.amount,
            category: self.category.clone(),
            content: self.content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use crate::test::txn;
    use crate::validation::{validate, Field, FieldErrorKind};

    fn may(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn test_defaults() {
        let form = TransactionForm::new(may(17));
        assert_eq!(form.r#type(), TransactionType::Expense);
        assert_eq!(form.date(), "2024-05-17");
        assert_eq!(form.amount(), 0);
        assert_eq!(form.category(), "");
        assert_eq!(form.content(), "");
        assert!(form.selected().is_none());
    }

    #[test]
    fn test_toggle_type_clears_category() {
        let mut form = TransactionForm::new(may(17));
        form.set_category("food");
        form.set_type(TransactionType::Expense);
        assert_eq!(form.category(), "food");
        form.set_type(TransactionType::Income);
        assert_eq!(form.category(), "");

        let errors = validate(&form.input()).unwrap_err();
        assert!(errors.contains(Field::Category, &FieldErrorKind::NotSelected));
    }

    #[test]
    fn test_date_follows_day_only_without_selection() {
        let mut form = TransactionForm::new(may(17));
        form.follow_day(may(3));
        assert_eq!(form.date(), "2024-05-03");

        form.select(txn(
            "t1",
            TransactionType::Expense,
            "2024-05-10",
            800,
            Category::Food,
        ));
        form.follow_day(may(20));
        assert_eq!(form.date(), "2024-05-10");
    }

    #[test]
    fn test_select_loads_fields() {
        let mut form = TransactionForm::new(may(17));
        form.select(txn(
            "t1",
            TransactionType::Income,
            "2024-05-25",
            5000,
            Category::Allowance,
        ));
        assert_eq!(form.selected_id(), Some("t1"));
        let input = form.input();
        assert_eq!(input.r#type, "income");
        assert_eq!(input.date, "2024-05-25");
        assert_eq!(input.amount, 5000);
        assert_eq!(input.category, "allowance");
        assert!(validate(&input).is_ok());
    }

    #[test]
    fn test_select_drops_category_outside_domain() {
        let mut form = TransactionForm::new(may(17));
        form.select(txn(
            "bad",
            TransactionType::Income,
            "2024-05-25",
            5000,
            Category::Food,
        ));
        assert_eq!(form.r#type(), TransactionType::Income);
        assert_eq!(form.category(), "");
    }

    #[test]
    fn test_reset_clears_selection() {
        let mut form = TransactionForm::new(may(17));
        form.select(txn(
            "t1",
            TransactionType::Expense,
            "2024-05-10",
            800,
            Category::Food,
        ));
        form.reset(may(11));
        assert_eq!(form, TransactionForm::new(may(11)));
    }
}
