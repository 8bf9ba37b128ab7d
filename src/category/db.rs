//! SQL for creating, retrieving, updating and deleting categories.

use rusqlite::{Connection, Row, types::Value};

use crate::{
    Error,
    db::{CreateTable, MapRow, parse_optional_text_column, parse_text_column},
    models::{Category, CategoryData, CategoryName, CategoryType, DatabaseID, UserID},
};

/// The column list used by every category query, in table order.
const CATEGORY_COLUMNS: &str = "id, name, description, icon, color, type, transaction_type, \
    is_recurring, frequency, default_amount, budget, is_active, is_default, created_by, \
    last_processed_date, next_processed_date";

impl CreateTable for Category {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS category (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                icon TEXT,
                color TEXT,
                type TEXT NOT NULL,
                transaction_type TEXT NOT NULL,
                is_recurring INTEGER NOT NULL DEFAULT 0,
                frequency TEXT,
                default_amount REAL,
                budget REAL,
                is_active INTEGER NOT NULL DEFAULT 1,
                is_default INTEGER NOT NULL DEFAULT 0,
                created_by INTEGER,
                last_processed_date TEXT,
                next_processed_date TEXT,
                FOREIGN KEY(created_by) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for Category {
    type ReturnType = Self;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self, rusqlite::Error> {
        let raw_name: String = row.get(offset + 1)?;

        Ok(Self {
            id: row.get(offset)?,
            name: CategoryName::new_unchecked(&raw_name),
            description: row.get(offset + 2)?,
            icon: row.get(offset + 3)?,
            color: row.get(offset + 4)?,
            category_type: parse_text_column(row, offset + 5)?,
            transaction_type: parse_text_column(row, offset + 6)?,
            is_recurring: row.get(offset + 7)?,
            frequency: parse_optional_text_column(row, offset + 8)?,
            default_amount: row.get(offset + 9)?,
            budget: row.get(offset + 10)?,
            is_active: row.get(offset + 11)?,
            is_default: row.get(offset + 12)?,
            created_by: row.get::<_, Option<i64>>(offset + 13)?.map(UserID::new),
            last_processed_date: row.get(offset + 14)?,
            next_processed_date: row.get(offset + 15)?,
        })
    }
}

/// Insert a category into the database.
///
/// # Errors
/// This function will return an error if `created_by` does not refer to a
/// valid user, or if there is an SQL error.
pub fn insert_category(data: CategoryData, connection: &Connection) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (
            name, description, icon, color, type, transaction_type, is_recurring,
            frequency, default_amount, budget, is_active, is_default, created_by,
            last_processed_date, next_processed_date
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        (
            data.name.as_ref(),
            &data.description,
            &data.icon,
            &data.color,
            data.category_type.as_str(),
            data.transaction_type.as_str(),
            data.is_recurring,
            data.frequency.map(|frequency| frequency.as_str()),
            data.default_amount,
            data.budget,
            data.is_active,
            data.is_default,
            data.created_by.map(|user_id| user_id.as_i64()),
            data.last_processed_date,
            data.next_processed_date,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(data.into_category(id))
}

/// Retrieve a category by its ID.
///
/// # Errors
/// Returns [Error::NotFound] if no category has `category_id`.
pub fn get_category(category_id: DatabaseID, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category WHERE id = :id"
        ))?
        .query_row(&[(":id", &category_id)], Category::map_row)
        .map_err(|error| error.into())
}

/// Overwrite the stored category with `category`, matched by its ID.
///
/// # Errors
/// Returns [Error::NotFound] if the category no longer exists.
pub fn update_category(category: &Category, connection: &Connection) -> Result<(), Error> {
    let rows_updated = connection.execute(
        "UPDATE category SET
            name = ?1, description = ?2, icon = ?3, color = ?4, type = ?5,
            transaction_type = ?6, is_recurring = ?7, frequency = ?8,
            default_amount = ?9, budget = ?10, is_active = ?11,
            last_processed_date = ?12, next_processed_date = ?13
        WHERE id = ?14",
        (
            category.name.as_ref(),
            &category.description,
            &category.icon,
            &category.color,
            category.category_type.as_str(),
            category.transaction_type.as_str(),
            category.is_recurring,
            category.frequency.map(|frequency| frequency.as_str()),
            category.default_amount,
            category.budget,
            category.is_active,
            category.last_processed_date,
            category.next_processed_date,
            category.id,
        ),
    )?;

    if rows_updated == 0 {
        Err(Error::NotFound)
    } else {
        Ok(())
    }
}

/// Delete a category by its ID.
///
/// # Errors
/// Returns [Error::NotFound] if no category has `category_id`.
pub fn delete_category(category_id: DatabaseID, connection: &Connection) -> Result<(), Error> {
    let rows_deleted = connection.execute("DELETE FROM category WHERE id = ?1", (category_id,))?;

    if rows_deleted == 0 {
        Err(Error::NotFound)
    } else {
        Ok(())
    }
}

/// Retrieve the categories visible to `viewer`: their own plus the shared
/// defaults, or every category when `viewer` is [None] (admin access).
/// Optionally filtered by category type.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn list_categories(
    viewer: Option<UserID>,
    category_type: Option<CategoryType>,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    let mut clauses = Vec::new();
    let mut params = Vec::new();

    if let Some(user_id) = viewer {
        clauses.push("(is_default = 1 OR created_by = ?)");
        params.push(Value::Integer(user_id.as_i64()));
    }

    if let Some(category_type) = category_type {
        clauses.push("type = ?");
        params.push(Value::Text(category_type.as_str().to_string()));
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category{where_clause} ORDER BY name"
        ))?
        .query_map(rusqlite::params_from_iter(params), Category::map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Retrieve `owner`'s recurring categories, optionally filtered by category
/// type and active flag, soonest due first.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn list_recurring_categories(
    owner: UserID,
    category_type: Option<CategoryType>,
    is_active: Option<bool>,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    let mut clauses = vec!["transaction_type = ?", "created_by = ?"];
    let mut params = vec![
        Value::Text("recurring".to_string()),
        Value::Integer(owner.as_i64()),
    ];

    if let Some(category_type) = category_type {
        clauses.push("type = ?");
        params.push(Value::Text(category_type.as_str().to_string()));
    }

    if let Some(is_active) = is_active {
        clauses.push("is_active = ?");
        params.push(Value::Integer(is_active as i64));
    }

    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category WHERE {} ORDER BY next_processed_date ASC",
            clauses.join(" AND ")
        ))?
        .query_map(rusqlite::params_from_iter(params), Category::map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

#[cfg(test)]
mod category_db_tests {
    use chrono::{TimeZone, Utc};
    use rusqlite::Connection;

    use super::{
        delete_category, get_category, insert_category, list_categories,
        list_recurring_categories, update_category,
    };
    use crate::{
        Error,
        db::initialize,
        models::{
            CategoryData, CategoryName, CategoryType, Frequency, PasswordHash, Role,
            TransactionType, UserID,
        },
        user::insert_user,
    };

    fn init_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn insert_test_user(conn: &Connection, email: &str) -> UserID {
        insert_user(
            "Test",
            "User",
            &email.parse().unwrap(),
            PasswordHash::new_unchecked("notarealhash"),
            Role::User,
            conn,
        )
        .unwrap()
        .id
    }

    fn one_time_category(name: &str, owner: UserID) -> CategoryData {
        CategoryData {
            name: CategoryName::new_unchecked(name),
            description: None,
            icon: None,
            color: None,
            category_type: CategoryType::Expense,
            transaction_type: TransactionType::OneTime,
            is_recurring: false,
            frequency: None,
            default_amount: None,
            budget: None,
            is_active: true,
            is_default: false,
            created_by: Some(owner),
            last_processed_date: None,
            next_processed_date: None,
        }
    }

    #[test]
    fn insert_and_get_round_trips_all_fields() {
        let conn = init_db();
        let owner = insert_test_user(&conn, "owner@example.com");

        let now = Utc.with_ymd_and_hms(2024, 8, 7, 0, 0, 0).unwrap();
        let data = CategoryData {
            name: CategoryName::new_unchecked("Rent"),
            description: Some("Monthly rent".to_string()),
            icon: Some("home".to_string()),
            color: Some("#FF5733".to_string()),
            category_type: CategoryType::Expense,
            transaction_type: TransactionType::Recurring,
            is_recurring: true,
            frequency: Some(Frequency::Monthly),
            default_amount: Some(1250.0),
            budget: Some(1500.0),
            is_active: true,
            is_default: false,
            created_by: Some(owner),
            last_processed_date: Some(now),
            next_processed_date: Some(now + chrono::Months::new(1)),
        };

        let inserted = insert_category(data, &conn).unwrap();
        let selected = get_category(inserted.id, &conn).unwrap();

        assert_eq!(inserted, selected);
        assert_eq!(selected.frequency, Some(Frequency::Monthly));
        assert_eq!(selected.created_by, Some(owner));
    }

    #[test]
    fn insert_fails_with_invalid_owner() {
        let conn = init_db();

        let result = insert_category(one_time_category("Foo", UserID::new(999)), &conn);

        assert_eq!(result, Err(Error::InvalidForeignKey));
    }

    #[test]
    fn get_fails_with_invalid_id() {
        let conn = init_db();

        assert_eq!(get_category(1337, &conn), Err(Error::NotFound));
    }

    #[test]
    fn update_overwrites_stored_category() {
        let conn = init_db();
        let owner = insert_test_user(&conn, "owner@example.com");
        let mut category = insert_category(one_time_category("Foo", owner), &conn).unwrap();

        category.name = CategoryName::new_unchecked("Bar");
        category.is_active = false;
        update_category(&category, &conn).unwrap();

        let selected = get_category(category.id, &conn).unwrap();
        assert_eq!(selected.name.as_ref(), "Bar");
        assert!(!selected.is_active);
    }

    #[test]
    fn delete_removes_the_category() {
        let conn = init_db();
        let owner = insert_test_user(&conn, "owner@example.com");
        let category = insert_category(one_time_category("Foo", owner), &conn).unwrap();

        delete_category(category.id, &conn).unwrap();

        assert_eq!(get_category(category.id, &conn), Err(Error::NotFound));
        assert_eq!(delete_category(category.id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn list_returns_own_and_default_categories_only() {
        let conn = init_db();
        let owner = insert_test_user(&conn, "owner@example.com");
        let other = insert_test_user(&conn, "other@example.com");

        insert_category(one_time_category("Mine", owner), &conn).unwrap();
        insert_category(one_time_category("Theirs", other), &conn).unwrap();

        let visible = list_categories(Some(owner), None, &conn).unwrap();

        assert!(visible.iter().any(|category| category.name.as_ref() == "Mine"));
        assert!(visible.iter().all(|category| category.name.as_ref() != "Theirs"));
        // The seeded defaults are visible to everyone.
        assert!(visible.iter().any(|category| category.is_default));
    }

    #[test]
    fn list_without_viewer_returns_everything() {
        let conn = init_db();
        let owner = insert_test_user(&conn, "owner@example.com");
        let other = insert_test_user(&conn, "other@example.com");

        insert_category(one_time_category("Mine", owner), &conn).unwrap();
        insert_category(one_time_category("Theirs", other), &conn).unwrap();

        let all = list_categories(None, None, &conn).unwrap();

        assert!(all.iter().any(|category| category.name.as_ref() == "Mine"));
        assert!(all.iter().any(|category| category.name.as_ref() == "Theirs"));
    }

    #[test]
    fn list_filters_by_category_type() {
        let conn = init_db();
        let owner = insert_test_user(&conn, "owner@example.com");

        let mut income = one_time_category("Wages", owner);
        income.category_type = CategoryType::Income;
        insert_category(income, &conn).unwrap();
        insert_category(one_time_category("Groceries", owner), &conn).unwrap();

        let income_only = list_categories(Some(owner), Some(CategoryType::Income), &conn).unwrap();

        assert!(
            income_only
                .iter()
                .all(|category| category.category_type == CategoryType::Income)
        );
        assert!(income_only.iter().any(|category| category.name.as_ref() == "Wages"));
    }

    #[test]
    fn list_recurring_sorts_by_next_due_date() {
        let conn = init_db();
        let owner = insert_test_user(&conn, "owner@example.com");
        let now = Utc.with_ymd_and_hms(2024, 8, 7, 0, 0, 0).unwrap();

        for (name, days_until_due) in [("Later", 20), ("Sooner", 2)] {
            let mut data = one_time_category(name, owner);
            data.transaction_type = TransactionType::Recurring;
            data.is_recurring = true;
            data.frequency = Some(Frequency::Monthly);
            data.default_amount = Some(100.0);
            data.last_processed_date = Some(now);
            data.next_processed_date = Some(now + chrono::Days::new(days_until_due));
            insert_category(data, &conn).unwrap();
        }

        let recurring = list_recurring_categories(owner, None, None, &conn).unwrap();

        let names: Vec<&str> = recurring
            .iter()
            .map(|category| category.name.as_ref())
            .collect();
        assert_eq!(names, vec!["Sooner", "Later"]);
    }
}
