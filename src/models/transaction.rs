//! This file defines the `Transaction` type, a single ledger entry. A
//! transaction is either entered by a user or generated by the recurring
//! category processor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CategoryType, DatabaseID, UserID};

/// A single ledger entry attributed to a user and a category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: DatabaseID,
    /// The owning user.
    #[serde(rename = "user")]
    pub user_id: UserID,
    /// Income or Expense, inherited from the category at creation time.
    #[serde(rename = "type")]
    pub transaction_type: CategoryType,
    pub title: String,
    pub amount: f64,
    #[serde(rename = "category")]
    pub category_id: DatabaseID,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
}

/// The data needed to create a new [Transaction], before it has an ID.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionData {
    pub user_id: UserID,
    pub transaction_type: CategoryType,
    pub title: String,
    pub amount: f64,
    pub category_id: DatabaseID,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
}

impl TransactionData {
    /// Attach a database ID, producing the persisted form.
    pub fn into_transaction(self, id: DatabaseID) -> Transaction {
        Transaction {
            id,
            user_id: self.user_id,
            transaction_type: self.transaction_type,
            title: self.title,
            amount: self.amount,
            category_id: self.category_id,
            description: self.description,
            date: self.date,
        }
    }
}
