//! PostgreSQL-backed `DonationRepository` implementation using Diesel.
//!
//! Besides plain CRUD, this adapter carries the two reporting queries that
//! don't map onto the query builder: the relational division behind
//! `donors_in_every_fund` and the nested aggregation behind
//! `funds_above_average`. Both run as raw SQL with typed result rows.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{DonationRepository, FundDonationTotal};
use crate::domain::{
    Donation, DonationId, Donor, Email, FundId, NewDonation, RepositoryError,
};

use super::diesel_helpers::{expect_one_row, map_diesel_error, map_pool_error, to_row_count};
use super::models::{DonationRow, DonationUpdate, NewDonationRow};
use super::pool::DbPool;
use super::schema::donations;

const DROP_DONATIONS: &str = "DROP TABLE IF EXISTS donations CASCADE";
const CREATE_DONATIONS: &str = r"CREATE TABLE donations (
    id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
    amount BIGINT NOT NULL CHECK (amount > 0),
    donated_on DATE NOT NULL,
    content VARCHAR(255) NOT NULL,
    user_email VARCHAR(255)
        REFERENCES users (email) ON DELETE CASCADE,
    org_email VARCHAR(255)
        REFERENCES volunteer_organizations (email) ON DELETE CASCADE,
    fund_id BIGINT NOT NULL
        REFERENCES funds (id) ON DELETE CASCADE,
    CHECK ((user_email IS NULL) <> (org_email IS NULL))
)";

/// Users who have donated to every existing fund. Classic relational
/// division: no fund may exist that the candidate has not donated to.
const DONORS_IN_EVERY_FUND: &str = r"
    SELECT DISTINCT d0.user_email AS email
    FROM donations d0
    WHERE d0.user_email IS NOT NULL
      AND NOT EXISTS (
        SELECT 1 FROM funds f
        WHERE NOT EXISTS (
            SELECT 1 FROM donations d
            WHERE d.user_email = d0.user_email AND d.fund_id = f.id
        )
      )
    ORDER BY email";

/// Funds whose donation total beats the average total across all funds.
const FUNDS_ABOVE_AVERAGE: &str = r"
    SELECT d.fund_id AS fund_id, SUM(d.amount)::BIGINT AS total
    FROM donations d
    GROUP BY d.fund_id
    HAVING SUM(d.amount) > (
        SELECT AVG(per_fund.total)
        FROM (
            SELECT SUM(amount) AS total
            FROM donations
            GROUP BY fund_id
        ) per_fund
    )
    ORDER BY fund_id";

#[derive(QueryableByName)]
struct DonorEmailRow {
    #[diesel(sql_type = Text)]
    email: String,
}

#[derive(QueryableByName)]
struct FundTotalRow {
    #[diesel(sql_type = BigInt)]
    fund_id: i64,
    #[diesel(sql_type = BigInt)]
    total: i64,
}

/// Diesel-backed implementation of the `DonationRepository` port.
#[derive(Clone)]
pub struct DieselDonationRepository {
    pool: DbPool,
}

impl DieselDonationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Convert a database row to a domain donation.
fn row_to_donation(row: DonationRow) -> Result<Donation, RepositoryError> {
    let user_email = row
        .user_email
        .map(Email::new)
        .transpose()
        .map_err(|err| RepositoryError::query(format!("corrupted donor email: {err}")))?;
    let org_email = row
        .org_email
        .map(Email::new)
        .transpose()
        .map_err(|err| RepositoryError::query(format!("corrupted donor email: {err}")))?;
    let donor = Donor::from_emails(user_email, org_email)
        .map_err(|err| RepositoryError::query(format!("corrupted donation row: {err}")))?;

    Ok(Donation {
        id: DonationId(row.id),
        amount: row.amount,
        donated_on: row.donated_on,
        content: row.content,
        donor,
        fund_id: FundId(row.fund_id),
    })
}

#[async_trait]
impl DonationRepository for DieselDonationRepository {
    async fn fetch_all(&self) -> Result<Vec<Donation>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<DonationRow> = donations::table
            .select(DonationRow::as_select())
            .order(donations::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_donation).collect()
    }

    async fn for_user(&self, email: &Email) -> Result<Vec<Donation>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<DonationRow> = donations::table
            .filter(donations::user_email.eq(email.as_str()))
            .select(DonationRow::as_select())
            .order(donations::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_donation).collect()
    }

    async fn initialize(&self) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::sql_query(DROP_DONATIONS)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        diesel::sql_query(CREATE_DONATIONS)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        debug!("donations table recreated");
        Ok(())
    }

    async fn insert(&self, donation: &NewDonation) -> Result<DonationId, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewDonationRow {
            amount: donation.amount,
            donated_on: donation.donated_on,
            content: &donation.content,
            user_email: donation.donor.user_email().map(Email::as_str),
            org_email: donation.donor.org_email().map(Email::as_str),
            fund_id: donation.fund_id.0,
        };

        let id: i64 = diesel::insert_into(donations::table)
            .values(&row)
            .returning(donations::id)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(DonationId(id))
    }

    async fn update(
        &self,
        id: DonationId,
        donation: &NewDonation,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = DonationUpdate {
            amount: donation.amount,
            donated_on: donation.donated_on,
            content: &donation.content,
            user_email: donation.donor.user_email().map(Email::as_str),
            org_email: donation.donor.org_email().map(Email::as_str),
            fund_id: donation.fund_id.0,
        };

        let affected = diesel::update(donations::table.find(id.0))
            .set(&changeset)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        expect_one_row(affected, "donation")
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = donations::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(to_row_count(count))
    }

    async fn donors_in_every_fund(&self) -> Result<Vec<Email>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<DonorEmailRow> = diesel::sql_query(DONORS_IN_EVERY_FUND)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|row| {
                Email::new(row.email)
                    .map_err(|err| RepositoryError::query(format!("corrupted donor email: {err}")))
            })
            .collect()
    }

    async fn funds_above_average(&self) -> Result<Vec<FundDonationTotal>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<FundTotalRow> = diesel::sql_query(FUNDS_ABOVE_AVERAGE)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows
            .into_iter()
            .map(|row| FundDonationTotal {
                fund_id: FundId(row.fund_id),
                total: row.total,
            })
            .collect())
    }
}
