//! The endpoints for the REST API.
//!
//! This module avoids hard-coding route strings in multiple places (routing
//! and tests), making it easier to update routes and reducing the likelihood
//! of bugs from typos.

pub const REGISTER: &str = "/api/auth/register";
pub const LOG_IN: &str = "/api/auth/login";

pub const USERS: &str = "/api/users";
pub const ME: &str = "/api/users/me";

pub const CATEGORIES: &str = "/api/categories";
pub const RECURRING_CATEGORIES: &str = "/api/categories/recurring";
pub const CATEGORY: &str = "/api/categories/{id}";

pub const TRANSACTIONS: &str = "/api/transactions";
pub const TRANSACTION: &str = "/api/transactions/{id}";

pub const BUDGETS: &str = "/api/budgets";
pub const BUDGET: &str = "/api/budgets/{id}";

pub const PROCESS_RECURRING: &str = "/api/recurring/process";
