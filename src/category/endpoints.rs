//! The read and delete endpoints for categories.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::Claims,
    category::db::{delete_category, get_category, list_categories, list_recurring_categories},
    models::{Category, CategoryType, DatabaseID},
};

/// Optional filters for the category list.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListQuery {
    #[serde(rename = "type")]
    pub category_type: Option<CategoryType>,
}

/// Optional filters for the recurring category list.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringCategoryQuery {
    #[serde(rename = "type")]
    pub category_type: Option<CategoryType>,
    pub is_active: Option<bool>,
}

/// A route handler for getting a category by its ID.
///
/// Responds with 404 rather than 403 for another user's category, so a
/// caller cannot probe which IDs exist.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_category_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(category_id): Path<DatabaseID>,
) -> Result<Json<Category>, Error> {
    let connection = state.db_connection.lock().unwrap();

    let category = get_category(category_id, &connection)?;

    let is_visible = claims.is_admin()
        || category.is_default
        || category.created_by == Some(claims.user_id());

    if is_visible {
        Ok(Json(category))
    } else {
        Err(Error::NotFound)
    }
}

/// A route handler for listing the categories visible to the caller: their
/// own plus the shared defaults, or everything for admins.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_categories_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Query(query): Query<CategoryListQuery>,
) -> Result<Json<Vec<Category>>, Error> {
    let viewer = if claims.is_admin() {
        None
    } else {
        Some(claims.user_id())
    };

    let connection = state.db_connection.lock().unwrap();

    list_categories(viewer, query.category_type, &connection).map(Json)
}

/// A route handler for listing the caller's recurring categories, soonest
/// due first.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_recurring_categories_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Query(query): Query<RecurringCategoryQuery>,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = state.db_connection.lock().unwrap();

    list_recurring_categories(
        claims.user_id(),
        query.category_type,
        query.is_active,
        &connection,
    )
    .map(Json)
}

/// A route handler for deleting a category. Owners can delete their own
/// categories, admins anything.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_category_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(category_id): Path<DatabaseID>,
) -> Result<Json<serde_json::Value>, Error> {
    let connection = state.db_connection.lock().unwrap();

    let category = get_category(category_id, &connection)?;

    if !claims.is_admin() && category.created_by != Some(claims.user_id()) {
        return Err(Error::Forbidden);
    }

    delete_category(category_id, &connection)?;

    Ok(Json(
        serde_json::json!({ "message": "Category deleted successfully" }),
    ))
}
