//! This file defines the `Budget` type: a spending limit for one category
//! over a date range. Budgets are informational, nothing in the application
//! blocks a transaction for exceeding one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{DatabaseID, UserID};

/// A spending limit for a category over a date range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: DatabaseID,
    #[serde(rename = "user")]
    pub user_id: UserID,
    #[serde(rename = "category")]
    pub category_id: DatabaseID,
    pub limit: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// The data needed to create a new [Budget], before it has an ID.
#[derive(Clone, Debug, PartialEq)]
pub struct BudgetData {
    pub user_id: UserID,
    pub category_id: DatabaseID,
    pub limit: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl BudgetData {
    /// Attach a database ID, producing the persisted form.
    pub fn into_budget(self, id: DatabaseID) -> Budget {
        Budget {
            id,
            user_id: self.user_id,
            category_id: self.category_id,
            limit: self.limit,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}
