use crate::model::{Amount, Category};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Whether a transaction brings money in or sends it out.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    #[default]
    Expense,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// The validated body of a transaction, as sent to the store on create and update. It has no id;
/// the store assigns one on creation.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TransactionPayload {
    pub r#type: TransactionType,
    /// ISO 8601 calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub amount: Amount,
    pub category: Category,
    pub content: String,
}

/// A persisted transaction: a payload plus the id the store assigned to it.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    pub id: String,
    pub r#type: TransactionType,
    pub date: String,
    pub amount: Amount,
    pub category: Category,
    pub content: String,
}

impl Transaction {
    pub fn new(id: impl Into<String>, payload: TransactionPayload) -> Self {
        let TransactionPayload {
            r#type,
            date,
            amount,
            category,
            content,
        } = payload;
        Self {
            id: id.into(),
            r#type,
            date,
            amount,
            category,
            content,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns a copy of everything but the id.
    pub fn payload(&self) -> TransactionPayload {
        TransactionPayload {
            r#type: self.r#type,
            date: self.date.clone(),
            amount: self.amount,
            category: self.category,
            content: self.content.clone(),
        }
    }

    /// Replaces every field except the id with those of `payload`.
    pub fn apply(&mut self, payload: TransactionPayload) {
        let id = std::mem::take(&mut self.id);
        *self = Transaction::new(id, payload);
    }

    /// True when the category belongs to the category domain of the transaction's type.
    pub fn is_consistent(&self) -> bool {
        self.r#type.allows(self.category)
    }

    /// True when `date` falls in the same year-month as `month`.
    pub fn in_month(&self, month: NaiveDate) -> bool {
        self.date.starts_with(&month_key(month))
    }

    pub fn on_day(&self, day: NaiveDate) -> bool {
        self.date == day_key(day)
    }
}

/// Formats the year-month prefix of ISO dates in `month`, e.g. `2024-05`.
pub fn month_key(month: NaiveDate) -> String {
    format!("{:04}-{:02}", month.year(), month.month())
}

/// Formats `day` as an ISO date, e.g. `2024-05-03`.
pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::lunch;

    #[test]
    fn test_serialize_uses_type_key() {
        let txn = Transaction::new("abc123", lunch("2024-05-03", 1200));
        let json = serde_json::to_value(&txn).unwrap();
        assert_eq!(json["id"], "abc123");
        assert_eq!(json["type"], "expense");
        assert_eq!(json["category"], "food");
        assert_eq!(json["amount"], 1200);
        assert_eq!(json["date"], "2024-05-03");
    }

    #[test]
    fn test_apply_preserves_id() {
        let mut txn = Transaction::new("abc123", lunch("2024-05-03", 1200));
        let mut payload = txn.payload();
        payload.amount = Amount::new(900);
        payload.content = "dinner".to_string();
        txn.apply(payload);
        assert_eq!(txn.id(), "abc123");
        assert_eq!(txn.amount.value(), 900);
        assert_eq!(txn.content, "dinner");
    }

    #[test]
    fn test_consistency() {
        let mut txn = Transaction::new("x", lunch("2024-05-03", 1));
        assert!(txn.is_consistent());
        txn.r#type = TransactionType::Income;
        assert!(!txn.is_consistent());
    }

    #[test]
    fn test_month_and_day_filters() {
        let txn = Transaction::new("x", lunch("2024-05-03", 1));
        let may = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let june = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(txn.in_month(may));
        assert!(!txn.in_month(june));
        assert!(txn.on_day(NaiveDate::from_ymd_opt(2024, 5, 3).unwrap()));
        assert!(!txn.on_day(NaiveDate::from_ymd_opt(2024, 5, 30).unwrap()));
    }
}
