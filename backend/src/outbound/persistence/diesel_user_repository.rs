//! PostgreSQL-backed `UserRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{
    SearchCondition, SearchConnective, SearchOperator, StoredCredential, UserRepository,
    UserSearch, UserSearchField,
};
use crate::domain::{Email, PhoneNumber, RepositoryError, User};

use super::diesel_helpers::{expect_one_row, map_diesel_error, map_pool_error, to_row_count};
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// DDL issued by `initialize`. The cascade clears dependent subtype and
/// donation rows so the reset is order-insensitive.
const DROP_USERS: &str = "DROP TABLE IF EXISTS users CASCADE";
const CREATE_USERS: &str = r"CREATE TABLE users (
    email VARCHAR(255) PRIMARY KEY
        CHECK (email ~ '^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$'),
    name VARCHAR(50) NOT NULL,
    phone_number VARCHAR(10) NOT NULL CHECK (phone_number ~ '^[0-9]{10}$'),
    password_hash VARCHAR(100) NOT NULL
)";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Convert a database row to a domain user.
///
/// Rows only land through validated inserts, so a failure here means the
/// table was modified out of band.
fn row_to_user(row: UserRow) -> Result<User, RepositoryError> {
    let email = Email::new(row.email)
        .map_err(|err| RepositoryError::query(format!("corrupted user email: {err}")))?;
    let phone_number = PhoneNumber::new(row.phone_number)
        .map_err(|err| RepositoryError::query(format!("corrupted phone number: {err}")))?;
    User::new(email, row.name, phone_number)
        .map_err(|err| RepositoryError::query(format!("corrupted user row: {err}")))
}

/// Boxed predicate over the users table, so conditions compose at runtime.
type UserPredicate =
    Box<dyn BoxableExpression<users::table, diesel::pg::Pg, SqlType = diesel::sql_types::Bool>>;

/// Escape LIKE wildcards so a contains-condition matches the literal value.
fn like_pattern(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    format!("%{escaped}%")
}

/// Translate one condition into a bound Diesel expression. Values are always
/// bound parameters, never interpolated into SQL text.
fn condition_predicate(condition: &SearchCondition) -> UserPredicate {
    let value = condition.value.clone();
    match (condition.field, condition.op) {
        (UserSearchField::Email, SearchOperator::Equals) => Box::new(users::email.eq(value)),
        (UserSearchField::Email, SearchOperator::NotEquals) => Box::new(users::email.ne(value)),
        (UserSearchField::Email, SearchOperator::Contains) => {
            Box::new(users::email.like(like_pattern(&value)))
        }
        (UserSearchField::Name, SearchOperator::Equals) => Box::new(users::name.eq(value)),
        (UserSearchField::Name, SearchOperator::NotEquals) => Box::new(users::name.ne(value)),
        (UserSearchField::Name, SearchOperator::Contains) => {
            Box::new(users::name.like(like_pattern(&value)))
        }
        (UserSearchField::PhoneNumber, SearchOperator::Equals) => {
            Box::new(users::phone_number.eq(value))
        }
        (UserSearchField::PhoneNumber, SearchOperator::NotEquals) => {
            Box::new(users::phone_number.ne(value))
        }
        (UserSearchField::PhoneNumber, SearchOperator::Contains) => {
            Box::new(users::phone_number.like(like_pattern(&value)))
        }
    }
}

/// Fold every condition into one predicate joined by the search connective.
fn search_predicate(search: &UserSearch) -> Option<UserPredicate> {
    let mut folded: Option<UserPredicate> = None;
    for condition in search.conditions() {
        let next = condition_predicate(condition);
        folded = Some(match folded {
            None => next,
            Some(acc) => match search.connective() {
                SearchConnective::And => Box::new(acc.and(next)),
                SearchConnective::Or => Box::new(acc.or(next)),
            },
        });
    }
    folded
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn fetch_all(&self) -> Result<Vec<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .order(users::email.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(email.as_str())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn credential_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredential>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let hash: Option<String> = users::table
            .find(email.as_str())
            .select(users::password_hash)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(hash.map(|password_hash| StoredCredential {
            email: email.clone(),
            password_hash,
        }))
    }

    async fn initialize(&self) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::sql_query(DROP_USERS)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        diesel::sql_query(CREATE_USERS)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        debug!("users table recreated");
        Ok(())
    }

    async fn insert(&self, user: &User, password_hash: &str) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewUserRow {
            email: user.email.as_str(),
            name: &user.name,
            phone_number: user.phone_number.as_str(),
            password_hash,
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_phone_number(
        &self,
        email: &Email,
        phone_number: &PhoneNumber,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::update(users::table.find(email.as_str()))
            .set(users::phone_number.eq(phone_number.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        expect_one_row(affected, "user")
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(to_row_count(count))
    }

    async fn search(&self, search: &UserSearch) -> Result<Vec<User>, RepositoryError> {
        let Some(predicate) = search_predicate(search) else {
            return Ok(Vec::new());
        };

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .filter(predicate)
            .select(UserRow::as_select())
            .order(users::email.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
