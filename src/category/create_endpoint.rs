//! Defines the endpoint for creating a new category.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::Claims,
    category::{db::insert_category, recurrence::resolve_recurrence},
    models::{Category, CategoryData, CategoryName, CategoryType, Frequency, TransactionType},
};

/// The data for creating a category.
///
/// Recurrence configuration is validated by the recurrence state machine
/// before anything is persisted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    /// Defaults to one-time when omitted.
    #[serde(default)]
    pub transaction_type: TransactionType,
    pub frequency: Option<Frequency>,
    pub default_amount: Option<f64>,
    pub budget: Option<f64>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

/// A route handler for creating a new category.
///
/// Categories created by admins become shared defaults, visible to every
/// user and owned by none; everyone else gets a personal category.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_category_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let name = CategoryName::new(&request.name)?;

    let recurrence = resolve_recurrence(
        request.transaction_type,
        request.frequency,
        request.default_amount,
        None,
        Utc::now(),
    )?;

    let is_default = claims.is_admin();
    let data = CategoryData {
        name,
        description: request.description,
        icon: request.icon,
        color: request.color,
        category_type: request.category_type,
        transaction_type: recurrence.transaction_type,
        is_recurring: recurrence.is_recurring,
        frequency: recurrence.frequency,
        default_amount: recurrence.default_amount,
        budget: request.budget,
        is_active: request.is_active,
        is_default,
        // Shared defaults have no owner to attribute generated transactions to.
        created_by: if is_default {
            None
        } else {
            Some(claims.user_id())
        },
        last_processed_date: recurrence.cursor.map(|cursor| cursor.last_processed_date),
        next_processed_date: recurrence.cursor.map(|cursor| cursor.next_processed_date),
    };

    let connection = state.db_connection.lock().unwrap();

    let category = insert_category(data, &connection)?;

    Ok((StatusCode::CREATED, Json(category)))
}

#[cfg(test)]
mod create_category_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_utils::{register_test_user, test_server};

    #[tokio::test]
    async fn creating_a_recurring_category_initializes_its_schedule() {
        let (server, _) = test_server();
        let token = register_test_user(&server, "ada@example.com", "averysafeandsecurepassword")
            .await;

        let response = server
            .post("/api/categories")
            .authorization_bearer(&token)
            .content_type("application/json")
            .json(&json!({
                "name": "Rent",
                "type": "Expense",
                "transactionType": "recurring",
                "frequency": "monthly",
                "defaultAmount": 1250.0,
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let category = response.json::<serde_json::Value>();
        assert_eq!(category["isRecurring"], true);
        assert_eq!(category["frequency"], "monthly");
        assert!(category["lastProcessedDate"].is_string());
        assert!(category["nextProcessedDate"].is_string());
        assert_eq!(category["isDefault"], false);
    }

    #[tokio::test]
    async fn creating_a_recurring_category_without_frequency_is_rejected() {
        let (server, _) = test_server();
        let token = register_test_user(&server, "ada@example.com", "averysafeandsecurepassword")
            .await;

        let response = server
            .post("/api/categories")
            .authorization_bearer(&token)
            .content_type("application/json")
            .json(&json!({
                "name": "Rent",
                "type": "Expense",
                "transactionType": "recurring",
                "defaultAmount": 1250.0,
            }))
            .await;

        response.assert_status_bad_request();
        let body = response.json::<serde_json::Value>();
        assert!(body["error"].as_str().unwrap().contains("frequency"));
    }

    #[tokio::test]
    async fn creating_a_one_time_category_carries_no_recurrence_fields() {
        let (server, _) = test_server();
        let token = register_test_user(&server, "ada@example.com", "averysafeandsecurepassword")
            .await;

        let response = server
            .post("/api/categories")
            .authorization_bearer(&token)
            .content_type("application/json")
            .json(&json!({
                "name": "Groceries",
                "type": "Expense",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let category = response.json::<serde_json::Value>();
        assert_eq!(category["isRecurring"], false);
        assert!(category["frequency"].is_null());
        assert!(category["nextProcessedDate"].is_null());
    }

    #[tokio::test]
    async fn categories_created_by_admins_are_shared_defaults() {
        let (server, state) = test_server();
        let token = crate::test_utils::insert_admin_and_token(&state);

        let response = server
            .post("/api/categories")
            .authorization_bearer(&token)
            .content_type("application/json")
            .json(&json!({
                "name": "Charity",
                "type": "Expense",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let category = response.json::<serde_json::Value>();
        assert_eq!(category["isDefault"], true);
        assert!(category["createdBy"].is_null());
    }

    #[tokio::test]
    async fn creating_a_category_requires_authentication() {
        let (server, _) = test_server();

        let response = server
            .post("/api/categories")
            .content_type("application/json")
            .json(&json!({ "name": "Rent", "type": "Expense" }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}
