//! User persistence and the user-facing account endpoints.

use axum::{Json, extract::State};
use email_address::EmailAddress;
use rusqlite::{Connection, Row};

use crate::{
    AppState, Error,
    auth::Claims,
    db::{CreateTable, MapRow, parse_text_column},
    models::{PasswordHash, Role, User, UserID},
};

impl CreateTable for User {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'user',
                currency TEXT NOT NULL DEFAULT 'USD',
                is_active INTEGER NOT NULL DEFAULT 1
                )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for User {
    type ReturnType = Self;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self, rusqlite::Error> {
        let raw_email: String = row.get(offset + 3)?;
        let raw_password_hash: String = row.get(offset + 4)?;

        Ok(Self {
            id: UserID::new(row.get(offset)?),
            first_name: row.get(offset + 1)?,
            last_name: row.get(offset + 2)?,
            email: EmailAddress::new_unchecked(raw_email),
            password_hash: PasswordHash::new_unchecked(&raw_password_hash),
            role: parse_text_column(row, offset + 5)?,
            currency: row.get(offset + 6)?,
            is_active: row.get(offset + 7)?,
        })
    }
}

const USER_COLUMNS: &str = "id, first_name, last_name, email, password, role, currency, is_active";

/// Insert a user into the database.
///
/// # Errors
/// Returns [Error::DuplicateEmail] if `email` is already registered.
pub fn insert_user(
    first_name: &str,
    last_name: &str,
    email: &EmailAddress,
    password_hash: PasswordHash,
    role: Role,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (first_name, last_name, email, password, role) VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            first_name,
            last_name,
            email.as_str(),
            password_hash.to_string(),
            role.as_str(),
        ),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    get_user_by_id(id, connection)
}

/// Get the user with `email`, or [Error::NotFound] if there is none.
pub fn get_user_by_email(email: &EmailAddress, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!("SELECT {USER_COLUMNS} FROM user WHERE email = :email"))?
        .query_row(&[(":email", &email.as_str())], User::map_row)
        .map_err(|error| error.into())
}

/// Get the user with `user_id`, or [Error::NotFound] if there is none.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!("SELECT {USER_COLUMNS} FROM user WHERE id = :id"))?
        .query_row(&[(":id", &user_id.as_i64())], User::map_row)
        .map_err(|error| error.into())
}

/// Get every registered user.
pub fn list_users(connection: &Connection) -> Result<Vec<User>, Error> {
    connection
        .prepare(&format!("SELECT {USER_COLUMNS} FROM user ORDER BY id"))?
        .query_map([], User::map_row)?
        .map(|maybe_user| maybe_user.map_err(|error| error.into()))
        .collect()
}

/// A route handler for getting the authenticated user's own profile.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_me_endpoint(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<User>, Error> {
    let connection = state.db_connection.lock().unwrap();

    get_user_by_id(claims.user_id(), &connection).map(Json)
}

/// A route handler for listing all users. Admin only.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_users_endpoint(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<User>>, Error> {
    claims.require_admin()?;

    let connection = state.db_connection.lock().unwrap();

    list_users(&connection).map(Json)
}

#[cfg(test)]
mod user_db_tests {
    use rusqlite::Connection;

    use super::{get_user_by_email, get_user_by_id, insert_user, list_users};
    use crate::{
        Error,
        db::initialize,
        models::{PasswordHash, Role},
    };

    fn init_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn insert_user_succeeds() {
        let conn = init_db();

        let user = insert_user(
            "Ada",
            "Lovelace",
            &"ada@example.com".parse().unwrap(),
            PasswordHash::new_unchecked("notarealhash"),
            Role::User,
            &conn,
        )
        .unwrap();

        assert!(user.id.as_i64() > 0);
        assert_eq!(user.first_name, "Ada");
        assert_eq!(user.role, Role::User);
        assert!(user.is_active);
        assert_eq!(user.currency, "USD");
    }

    #[test]
    fn insert_user_fails_on_duplicate_email() {
        let conn = init_db();
        let email = "ada@example.com".parse().unwrap();

        insert_user(
            "Ada",
            "Lovelace",
            &email,
            PasswordHash::new_unchecked("notarealhash"),
            Role::User,
            &conn,
        )
        .unwrap();

        let result = insert_user(
            "Other",
            "Person",
            &email,
            PasswordHash::new_unchecked("anotherhash"),
            Role::User,
            &conn,
        );

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_user_by_email_round_trips() {
        let conn = init_db();
        let email: email_address::EmailAddress = "ada@example.com".parse().unwrap();

        let inserted = insert_user(
            "Ada",
            "Lovelace",
            &email,
            PasswordHash::new_unchecked("notarealhash"),
            Role::Admin,
            &conn,
        )
        .unwrap();

        let selected = get_user_by_email(&email, &conn).unwrap();

        assert_eq!(inserted, selected);
        assert_eq!(selected.role, Role::Admin);
    }

    #[test]
    fn get_user_fails_with_unknown_email() {
        let conn = init_db();

        let result = get_user_by_email(&"nobody@example.com".parse().unwrap(), &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_user_fails_with_unknown_id() {
        let conn = init_db();

        let result = get_user_by_id(crate::models::UserID::new(42), &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn list_users_returns_everyone() {
        let conn = init_db();

        for email in ["a@example.com", "b@example.com"] {
            insert_user(
                "Test",
                "User",
                &email.parse().unwrap(),
                PasswordHash::new_unchecked(email),
                Role::User,
                &conn,
            )
            .unwrap();
        }

        assert_eq!(list_users(&conn).unwrap().len(), 2);
    }
}
