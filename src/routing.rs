//! Application router configuration.

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::{
    AppState,
    auth::{log_in_endpoint, register_endpoint},
    budget::{
        create_budget_endpoint, delete_budget_endpoint, get_budget_endpoint,
        list_budgets_endpoint, update_budget_endpoint,
    },
    category::{
        create_category_endpoint, delete_category_endpoint, get_category_endpoint,
        list_categories_endpoint, list_recurring_categories_endpoint, update_category_endpoint,
    },
    endpoints,
    recurring::process_recurring_endpoint,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
        list_transactions_endpoint, update_transaction_endpoint,
    },
    user::{get_me_endpoint, list_users_endpoint},
};

/// Return a router with all the app's routes.
///
/// Everything except registration and sign-in requires a bearer token; the
/// [Claims](crate::auth::Claims) extractor on each protected handler
/// enforces that.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::REGISTER, post(register_endpoint))
        .route(endpoints::LOG_IN, post(log_in_endpoint))
        .route(endpoints::ME, get(get_me_endpoint))
        .route(endpoints::USERS, get(list_users_endpoint))
        .route(endpoints::CATEGORIES, post(create_category_endpoint))
        .route(endpoints::CATEGORIES, get(list_categories_endpoint))
        .route(
            endpoints::RECURRING_CATEGORIES,
            get(list_recurring_categories_endpoint),
        )
        .route(endpoints::CATEGORY, get(get_category_endpoint))
        .route(endpoints::CATEGORY, put(update_category_endpoint))
        .route(endpoints::CATEGORY, delete(delete_category_endpoint))
        .route(endpoints::TRANSACTIONS, post(create_transaction_endpoint))
        .route(endpoints::TRANSACTIONS, get(list_transactions_endpoint))
        .route(endpoints::TRANSACTION, get(get_transaction_endpoint))
        .route(endpoints::TRANSACTION, put(update_transaction_endpoint))
        .route(endpoints::TRANSACTION, delete(delete_transaction_endpoint))
        .route(endpoints::BUDGETS, post(create_budget_endpoint))
        .route(endpoints::BUDGETS, get(list_budgets_endpoint))
        .route(endpoints::BUDGET, get(get_budget_endpoint))
        .route(endpoints::BUDGET, put(update_budget_endpoint))
        .route(endpoints::BUDGET, delete(delete_budget_endpoint))
        .route(endpoints::PROCESS_RECURRING, post(process_recurring_endpoint))
        .with_state(state)
}
