//! This file defines the `Category` type: a named bucket for transactions
//! that can optionally generate transactions on a schedule, plus the closed
//! enumerations that drive the recurrence logic.

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    models::{DatabaseID, UserID},
};

/// Whether a category collects money coming in or going out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryType {
    Income,
    Expense,
}

impl CategoryType {
    /// The string stored in the database, identical to the JSON encoding.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Income => "Income",
            CategoryType::Expense => "Expense",
        }
    }
}

impl FromStr for CategoryType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Income" => Ok(CategoryType::Income),
            "Expense" => Ok(CategoryType::Expense),
            other => Err(format!("{other} is not a valid category type")),
        }
    }
}

impl Display for CategoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The discriminant between plain categories and categories that generate
/// transactions on a schedule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    #[default]
    #[serde(rename = "one-time")]
    OneTime,
    #[serde(rename = "recurring")]
    Recurring,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::OneTime => "one-time",
            TransactionType::Recurring => "recurring",
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "one-time" => Ok(TransactionType::OneTime),
            "recurring" => Ok(TransactionType::Recurring),
            other => Err(format!("{other} is not a valid transaction type")),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How often a recurring category generates a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    /// A calendar month of variable length.
    Monthly,
    /// Three calendar months.
    Quarterly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "quarterly" => Ok(Frequency::Quarterly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(format!("{other} is not a valid frequency")),
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The name of a category.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an error if `name` is an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        if name.trim().is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.trim().to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty
    /// invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The recurrence cursor of a recurring category: when it was last turned
/// into a transaction and when it is next due.
///
/// Both fields are always set together; a category is either fully
/// scheduled or not scheduled at all.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleCursor {
    pub last_processed_date: DateTime<Utc>,
    pub next_processed_date: DateTime<Utc>,
}

/// A category for expenses and income, e.g., 'Groceries', 'Rent', 'Wages'.
///
/// Categories marked recurring carry a [Frequency], a default amount and a
/// [ScheduleCursor]; the daily job turns each due category into a concrete
/// transaction. `is_recurring` is denormalized from `transaction_type` so
/// the due-category query can filter on it directly, and the recurrence
/// state machine keeps the two in sync on every write.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: DatabaseID,
    pub name: CategoryName,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    pub transaction_type: TransactionType,
    pub is_recurring: bool,
    pub frequency: Option<Frequency>,
    /// The amount materialized into each generated transaction.
    /// Present and positive iff the category is recurring.
    pub default_amount: Option<f64>,
    /// Optional spending cap, informational only.
    pub budget: Option<f64>,
    pub is_active: bool,
    /// System-seeded categories visible to all users.
    pub is_default: bool,
    /// The owning user. Absent for default categories.
    pub created_by: Option<UserID>,
    pub last_processed_date: Option<DateTime<Utc>>,
    pub next_processed_date: Option<DateTime<Utc>>,
}

impl Category {
    /// The schedule cursor, if this category has one.
    pub fn cursor(&self) -> Option<ScheduleCursor> {
        match (self.last_processed_date, self.next_processed_date) {
            (Some(last_processed_date), Some(next_processed_date)) => Some(ScheduleCursor {
                last_processed_date,
                next_processed_date,
            }),
            _ => None,
        }
    }

    /// Whether the recurrence invariant holds: `is_recurring` is true iff
    /// the frequency, a positive default amount and both cursor dates are
    /// present, and false iff all four are absent.
    pub fn recurrence_invariant_holds(&self) -> bool {
        if self.is_recurring {
            self.transaction_type == TransactionType::Recurring
                && self.frequency.is_some()
                && self.default_amount.is_some_and(|amount| amount > 0.0)
                && self.cursor().is_some()
        } else {
            self.transaction_type == TransactionType::OneTime
                && self.frequency.is_none()
                && self.default_amount.is_none()
                && self.last_processed_date.is_none()
                && self.next_processed_date.is_none()
        }
    }
}

/// The data needed to create a new [Category], before it has an ID.
///
/// The recurrence fields must come from the recurrence state machine, not
/// straight from user input.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryData {
    pub name: CategoryName,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub category_type: CategoryType,
    pub transaction_type: TransactionType,
    pub is_recurring: bool,
    pub frequency: Option<Frequency>,
    pub default_amount: Option<f64>,
    pub budget: Option<f64>,
    pub is_active: bool,
    pub is_default: bool,
    pub created_by: Option<UserID>,
    pub last_processed_date: Option<DateTime<Utc>>,
    pub next_processed_date: Option<DateTime<Utc>>,
}

impl CategoryData {
    /// Attach a database ID, producing the persisted form.
    pub fn into_category(self, id: DatabaseID) -> Category {
        Category {
            id,
            name: self.name,
            description: self.description,
            icon: self.icon,
            color: self.color,
            category_type: self.category_type,
            transaction_type: self.transaction_type,
            is_recurring: self.is_recurring,
            frequency: self.frequency,
            default_amount: self.default_amount,
            budget: self.budget,
            is_active: self.is_active,
            is_default: self.is_default,
            created_by: self.created_by,
            last_processed_date: self.last_processed_date,
            next_processed_date: self.next_processed_date,
        }
    }
}
