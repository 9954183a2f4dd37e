//! PostgreSQL-backed `FundRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::FundRepository;
use crate::domain::{Fund, FundId, NewFund, RepositoryError};

use super::diesel_helpers::{expect_one_row, map_diesel_error, map_pool_error, to_row_count};
use super::models::{FundRow, NewFundRow};
use super::pool::DbPool;
use super::schema::funds;

const DROP_FUNDS: &str = "DROP TABLE IF EXISTS funds CASCADE";
const CREATE_FUNDS: &str = r"CREATE TABLE funds (
    id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
    purpose VARCHAR(255) NOT NULL,
    balance BIGINT NOT NULL,
    verification VARCHAR(255) NOT NULL
)";

/// Diesel-backed implementation of the `FundRepository` port.
#[derive(Clone)]
pub struct DieselFundRepository {
    pool: DbPool,
}

impl DieselFundRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn row_to_fund(row: FundRow) -> Fund {
    Fund {
        id: FundId(row.id),
        purpose: row.purpose,
        balance: row.balance,
        verification: row.verification,
    }
}

#[async_trait]
impl FundRepository for DieselFundRepository {
    async fn fetch_all(&self) -> Result<Vec<Fund>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<FundRow> = funds::table
            .select(FundRow::as_select())
            .order(funds::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_fund).collect())
    }

    async fn with_balance_above(&self, threshold: i64) -> Result<Vec<Fund>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<FundRow> = funds::table
            .filter(funds::balance.gt(threshold))
            .select(FundRow::as_select())
            .order(funds::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_fund).collect())
    }

    async fn initialize(&self) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::sql_query(DROP_FUNDS)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        diesel::sql_query(CREATE_FUNDS)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        debug!("funds table recreated");
        Ok(())
    }

    async fn insert(&self, fund: &NewFund) -> Result<FundId, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewFundRow {
            purpose: &fund.purpose,
            balance: fund.balance,
            verification: &fund.verification,
        };

        let id: i64 = diesel::insert_into(funds::table)
            .values(&row)
            .returning(funds::id)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(FundId(id))
    }

    async fn update_balance(&self, id: FundId, balance: i64) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::update(funds::table.find(id.0))
            .set(funds::balance.eq(balance))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        expect_one_row(affected, "fund")
    }

    async fn delete(&self, id: FundId) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::delete(funds::table.find(id.0))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        expect_one_row(affected, "fund")
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = funds::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(to_row_count(count))
    }
}
