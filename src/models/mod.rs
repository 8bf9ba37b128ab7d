//! The domain types of the application: users, categories, transactions and
//! budgets, plus the newtypes that keep their IDs and credentials apart.

mod budget;
mod category;
mod password;
mod transaction;
mod user;

pub use budget::{Budget, BudgetData};
pub use category::{
    Category, CategoryData, CategoryName, CategoryType, Frequency, ScheduleCursor, TransactionType,
};
pub use password::{PasswordHash, ValidatedPassword};
pub use transaction::{Transaction, TransactionData};
pub use user::{Role, User, UserID};

/// An alias for ID types for database objects, e.g. categories and transactions.
pub type DatabaseID = i64;
