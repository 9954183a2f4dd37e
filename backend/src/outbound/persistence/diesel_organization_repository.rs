//! PostgreSQL-backed `OrganizationRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::ports::{OrganizationRepository, StoredCredential};
use crate::domain::{Email, Organization, OrganizationColumn, RepositoryError};

use super::diesel_helpers::{expect_one_row, map_diesel_error, map_pool_error, to_row_count};
use super::models::{NewOrganizationRow, OrganizationRow};
use super::pool::DbPool;
use super::schema::volunteer_organizations;

const DROP_ORGANIZATIONS: &str = "DROP TABLE IF EXISTS volunteer_organizations CASCADE";
const CREATE_ORGANIZATIONS: &str = r"CREATE TABLE volunteer_organizations (
    email VARCHAR(255) PRIMARY KEY
        CHECK (email ~ '^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$'),
    name VARCHAR(100) NOT NULL,
    field VARCHAR(50) NOT NULL,
    address VARCHAR(255) NOT NULL,
    verification VARCHAR(255) NOT NULL,
    password_hash VARCHAR(100) NOT NULL,
    UNIQUE (name, field)
)";

/// Diesel-backed implementation of the `OrganizationRepository` port.
#[derive(Clone)]
pub struct DieselOrganizationRepository {
    pool: DbPool,
}

impl DieselOrganizationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Convert a database row to a domain organization.
fn row_to_organization(row: OrganizationRow) -> Result<Organization, RepositoryError> {
    let email = Email::new(row.email)
        .map_err(|err| RepositoryError::query(format!("corrupted organization email: {err}")))?;
    Organization::new(email, row.name, row.field, row.address, row.verification)
        .map_err(|err| RepositoryError::query(format!("corrupted organization row: {err}")))
}

/// JSON field name a projected column appears under.
fn column_key(column: OrganizationColumn) -> &'static str {
    match column {
        OrganizationColumn::Email => "email",
        OrganizationColumn::Name => "name",
        OrganizationColumn::Field => "field",
        OrganizationColumn::Address => "address",
        OrganizationColumn::Verification => "verification",
    }
}

/// Pick the requested column value out of a full row.
fn column_value(row: &OrganizationRow, column: OrganizationColumn) -> Value {
    match column {
        OrganizationColumn::Email => Value::String(row.email.clone()),
        OrganizationColumn::Name => Value::String(row.name.clone()),
        OrganizationColumn::Field => Value::String(row.field.clone()),
        OrganizationColumn::Address => Value::String(row.address.clone()),
        OrganizationColumn::Verification => Value::String(row.verification.clone()),
    }
}

#[async_trait]
impl OrganizationRepository for DieselOrganizationRepository {
    async fn fetch_all(&self) -> Result<Vec<Organization>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<OrganizationRow> = volunteer_organizations::table
            .select(OrganizationRow::as_select())
            .order(volunteer_organizations::email.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_organization).collect()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Organization>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<OrganizationRow> = volunteer_organizations::table
            .find(email.as_str())
            .select(OrganizationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_organization).transpose()
    }

    async fn credential_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredential>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let hash: Option<String> = volunteer_organizations::table
            .find(email.as_str())
            .select(volunteer_organizations::password_hash)
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

        diesel::sql_query(DROP_ORGANIZATIONS)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        diesel::sql_query(CREATE_ORGANIZATIONS)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        debug!("volunteer_organizations table recreated");
        Ok(())
    }

    async fn insert(
        &self,
        organization: &Organization,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewOrganizationRow {
            email: organization.email.as_str(),
            name: &organization.name,
            field: &organization.field,
            address: &organization.address,
            verification: &organization.verification,
            password_hash,
        };

        diesel::insert_into(volunteer_organizations::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_details(
        &self,
        email: &Email,
        address: &str,
        name: &str,
        field: &str,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::update(volunteer_organizations::table.find(email.as_str()))
            .set((
                volunteer_organizations::address.eq(address),
                volunteer_organizations::name.eq(name),
                volunteer_organizations::field.eq(field),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        expect_one_row(affected, "organization")
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = volunteer_organizations::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(to_row_count(count))
    }

    async fn projection(
        &self,
        columns: &[OrganizationColumn],
    ) -> Result<Vec<Map<String, Value>>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<OrganizationRow> = volunteer_organizations::table
            .select(OrganizationRow::as_select())
            .order(volunteer_organizations::email.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|&column| (column_key(column).to_owned(), column_value(row, column)))
                    .collect()
            })
            .collect())
    }
}
