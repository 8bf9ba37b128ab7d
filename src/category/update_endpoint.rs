//! Defines the endpoint for updating a category.
//!
//! Updates are partial: fields absent from the request keep their stored
//! values. The merged result is re-validated by the recurrence state
//! machine before it is written, so no update can leave a recurring
//! category without its configuration.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::Claims,
    category::{
        db::{get_category, update_category},
        recurrence::resolve_recurrence,
    },
    models::{Category, CategoryName, CategoryType, DatabaseID, Frequency, TransactionType},
};

/// A partial update of a category.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    #[serde(rename = "type")]
    pub category_type: Option<CategoryType>,
    pub transaction_type: Option<TransactionType>,
    pub frequency: Option<Frequency>,
    pub default_amount: Option<f64>,
    pub budget: Option<f64>,
    pub is_active: Option<bool>,
}

/// A route handler for updating a category.
///
/// Owners can update their own categories; shared defaults can only be
/// updated by admins.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn update_category_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(category_id): Path<DatabaseID>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>, Error> {
    let connection = state.db_connection.lock().unwrap();

    let existing = get_category(category_id, &connection)?;

    if !claims.is_admin() {
        let is_owner = existing.created_by == Some(claims.user_id());
        if existing.is_default || !is_owner {
            return Err(Error::Forbidden);
        }
    }

    let name = match &request.name {
        Some(name) => CategoryName::new(name)?,
        None => existing.name.clone(),
    };

    // Merge the partial update onto the stored record, then let the state
    // machine decide the recurrence fields. Switching to one-time clears
    // them; staying recurring keeps the existing schedule cursor.
    let transaction_type = request
        .transaction_type
        .unwrap_or(existing.transaction_type);
    let recurrence = resolve_recurrence(
        transaction_type,
        request.frequency.or(existing.frequency),
        request.default_amount.or(existing.default_amount),
        existing.cursor(),
        Utc::now(),
    )?;

    let updated = Category {
        id: existing.id,
        name,
        description: request.description.or(existing.description),
        icon: request.icon.or(existing.icon),
        color: request.color.or(existing.color),
        category_type: request.category_type.unwrap_or(existing.category_type),
        transaction_type: recurrence.transaction_type,
        is_recurring: recurrence.is_recurring,
        frequency: recurrence.frequency,
        default_amount: recurrence.default_amount,
        budget: request.budget.or(existing.budget),
        is_active: request.is_active.unwrap_or(existing.is_active),
        is_default: existing.is_default,
        created_by: existing.created_by,
        last_processed_date: recurrence.cursor.map(|cursor| cursor.last_processed_date),
        next_processed_date: recurrence.cursor.map(|cursor| cursor.next_processed_date),
    };

    update_category(&updated, &connection)?;

    Ok(Json(updated))
}

#[cfg(test)]
mod update_category_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    use crate::test_utils::{register_test_user, test_server};

    async fn create_recurring_category(server: &TestServer, token: &str) -> serde_json::Value {
        let response = server
            .post("/api/categories")
            .authorization_bearer(token)
            .content_type("application/json")
            .json(&json!({
                "name": "Rent",
                "type": "Expense",
                "transactionType": "recurring",
                "frequency": "monthly",
                "defaultAmount": 500.0,
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        response.json::<serde_json::Value>()
    }

    #[tokio::test]
    async fn switching_to_one_time_clears_the_recurrence_fields() {
        let (server, _) = test_server();
        let token = register_test_user(&server, "ada@example.com", "averysafeandsecurepassword")
            .await;
        let category = create_recurring_category(&server, &token).await;

        let response = server
            .put(&format!("/api/categories/{}", category["id"]))
            .authorization_bearer(&token)
            .content_type("application/json")
            .json(&json!({ "transactionType": "one-time" }))
            .await;

        response.assert_status_ok();
        let updated = response.json::<serde_json::Value>();
        assert_eq!(updated["isRecurring"], false);
        assert!(updated["frequency"].is_null());
        assert!(updated["defaultAmount"].is_null());
        assert!(updated["lastProcessedDate"].is_null());
        assert!(updated["nextProcessedDate"].is_null());
    }

    #[tokio::test]
    async fn editing_the_amount_does_not_reset_the_schedule() {
        let (server, _) = test_server();
        let token = register_test_user(&server, "ada@example.com", "averysafeandsecurepassword")
            .await;
        let category = create_recurring_category(&server, &token).await;

        let response = server
            .put(&format!("/api/categories/{}", category["id"]))
            .authorization_bearer(&token)
            .content_type("application/json")
            .json(&json!({ "defaultAmount": 750.0 }))
            .await;

        response.assert_status_ok();
        let updated = response.json::<serde_json::Value>();
        assert_eq!(updated["defaultAmount"], 750.0);
        assert_eq!(updated["nextProcessedDate"], category["nextProcessedDate"]);
        assert_eq!(updated["lastProcessedDate"], category["lastProcessedDate"]);
    }

    #[tokio::test]
    async fn making_a_one_time_category_recurring_without_frequency_is_rejected() {
        let (server, _) = test_server();
        let token = register_test_user(&server, "ada@example.com", "averysafeandsecurepassword")
            .await;

        let category = server
            .post("/api/categories")
            .authorization_bearer(&token)
            .content_type("application/json")
            .json(&json!({ "name": "Groceries", "type": "Expense" }))
            .await
            .json::<serde_json::Value>();

        let response = server
            .put(&format!("/api/categories/{}", category["id"]))
            .authorization_bearer(&token)
            .content_type("application/json")
            .json(&json!({
                "transactionType": "recurring",
                "defaultAmount": 100.0,
            }))
            .await;

        response.assert_status_bad_request();
        let body = response.json::<serde_json::Value>();
        assert!(body["error"].as_str().unwrap().contains("frequency"));
    }

    #[tokio::test]
    async fn users_cannot_update_other_users_categories() {
        let (server, _) = test_server();
        let owner_token =
            register_test_user(&server, "ada@example.com", "averysafeandsecurepassword").await;
        let category = create_recurring_category(&server, &owner_token).await;

        let other_token =
            register_test_user(&server, "grace@example.com", "averysafeandsecurepassword").await;

        let response = server
            .put(&format!("/api/categories/{}", category["id"]))
            .authorization_bearer(&other_token)
            .content_type("application/json")
            .json(&json!({ "name": "Hijacked" }))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn updating_a_missing_category_is_not_found() {
        let (server, _) = test_server();
        let token = register_test_user(&server, "ada@example.com", "averysafeandsecurepassword")
            .await;

        let response = server
            .put("/api/categories/424242")
            .authorization_bearer(&token)
            .content_type("application/json")
            .json(&json!({ "name": "Ghost" }))
            .await;

        response.assert_status_not_found();
    }
}
