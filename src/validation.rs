//! Checks a transaction as entered by the user before anything is sent to the store.
//!
//! `validate` turns raw form input into a `TransactionPayload`, or reports every offending field
//! so each message can be shown next to its input.

use crate::model::{Amount, Category, TransactionPayload, TransactionType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const CONTENT_MAX_CHARS: usize = 50;
pub const AMOUNT_MIN: i64 = 1;

/// A transaction as entered in the form, before validation. All values are raw.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TransactionInput {
    pub r#type: String,
    pub date: String,
    pub amount: i64,
    /// Empty means no category has been chosen yet.
    pub category: String,
    pub content: String,
}

impl From<TransactionPayload> for TransactionInput {
    fn from(payload: TransactionPayload) -> Self {
        Self {
            r#type: payload.r#type.to_string(),
            date: payload.date,
            amount: payload.amount.signed(),
            category: payload.category.to_string(),
            content: payload.content,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Type,
    Date,
    Amount,
    Category,
    Content,
}

serde_plain::derive_display_from_serialize!(Field);

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum FieldErrorKind {
    Missing,
    Invalid(String),
    TooShort,
    TooLong,
    OutOfRange,
    /// The category is still the empty "not selected" value.
    NotSelected,
    /// A real category, but one that belongs to the other transaction type.
    WrongCategoryDomain(TransactionType),
}

/// Why a single field was rejected.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct FieldError {
    pub field: Field,
    pub kind: FieldErrorKind,
}

impl FieldError {
    fn new(field: Field, kind: FieldErrorKind) -> Self {
        Self { field, kind }
    }

    /// The message shown next to the offending input.
    pub fn message(&self) -> String {
        use FieldErrorKind::*;
        match (&self.field, &self.kind) {
            (Field::Type, Missing) => "Choose income or expense".to_string(),
            (Field::Type, Invalid(value)) => format!("'{value}' is not a transaction type"),
            (Field::Date, Missing) => "Enter a date".to_string(),
            (Field::Date, Invalid(value)) => format!("'{value}' is not a YYYY-MM-DD date"),
            (Field::Amount, OutOfRange) => format!("Enter an amount of at least {AMOUNT_MIN}"),
            (Field::Content, TooShort) => "Enter the content".to_string(),
            (Field::Content, TooLong) => {
                format!("Content must be {CONTENT_MAX_CHARS} characters or fewer")
            }
            (Field::Category, NotSelected) => "Choose a category".to_string(),
            (Field::Category, Invalid(value)) => format!("'{value}' is not a category"),
            (Field::Category, WrongCategoryDomain(kind)) => {
                format!("This category cannot be used for {kind}")
            }
            (field, kind) => format!("Invalid {field}: {kind:?}"),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message())
    }
}

/// Every field error found in one submission. Never empty.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// The error for `field`, if that field was rejected.
    pub fn get(&self, field: Field) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field == field)
    }

    pub fn contains(&self, field: Field, kind: &FieldErrorKind) -> bool {
        self.get(field).is_some_and(|e| &e.kind == kind)
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "invalid transaction: {}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Validates `input` and, if every field passes, returns the payload to persist.
pub fn validate(input: &TransactionInput) -> Result<TransactionPayload, ValidationErrors> {
    let mut errors = Vec::new();

    let kind = if input.r#type.is_empty() {
        errors.push(FieldError::new(Field::Type, FieldErrorKind::Missing));
        None
    } else {
        match TransactionType::from_str(&input.r#type) {
            Ok(kind) => Some(kind),
            Err(_) => {
                errors.push(FieldError::new(
                    Field::Type,
                    FieldErrorKind::Invalid(input.r#type.clone()),
                ));
                None
            }
        }
    };

    if input.date.is_empty() {
        errors.push(FieldError::new(Field::Date, FieldErrorKind::Missing));
    } else if NaiveDate::parse_from_str(&input.date, "%Y-%m-%d").is_err() {
        errors.push(FieldError::new(
            Field::Date,
            FieldErrorKind::Invalid(input.date.clone()),
        ));
    }

    let amount = (input.amount >= AMOUNT_MIN).then(|| input.amount.unsigned_abs());
    if amount.is_none() {
        errors.push(FieldError::new(Field::Amount, FieldErrorKind::OutOfRange));
    }

    let content_len = input.content.chars().count();
    if content_len == 0 {
        errors.push(FieldError::new(Field::Content, FieldErrorKind::TooShort));
    } else if content_len > CONTENT_MAX_CHARS {
        errors.push(FieldError::new(Field::Content, FieldErrorKind::TooLong));
    }

    let category = if input.category.is_empty() {
        errors.push(FieldError::new(Field::Category, FieldErrorKind::NotSelected));
        None
    } else {
        match Category::from_str(&input.category) {
            Ok(category) => match kind {
                Some(kind) if !kind.allows(category) => {
                    errors.push(FieldError::new(
                        Field::Category,
                        FieldErrorKind::WrongCategoryDomain(kind),
                    ));
                    None
                }
                _ => Some(category),
            },
            Err(_) => {
                errors.push(FieldError::new(
                    Field::Category,
                    FieldErrorKind::Invalid(input.category.clone()),
                ));
                None
            }
        }
    };

    match (kind, amount, category) {
        (Some(kind), Some(amount), Some(category)) if errors.is_empty() => {
            Ok(TransactionPayload {
                r#type: kind,
                date: input.date.clone(),
                amount: Amount::new(amount),
                category,
                content: input.content.clone(),
            })
        }
        _ => Err(ValidationErrors(errors)),
    }
}
