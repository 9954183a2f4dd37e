//! PostgreSQL-backed `IndividualFundRepository` implementation using Diesel.
//!
//! Individual funds span two tables: the shared `funds` base row and the
//! `individual_funds` subtype row. Writes that touch both run inside one
//! transaction so a failure on either statement rolls the other back.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::IndividualFundRepository;
use crate::domain::{
    Email, FundId, FundOwnership, FundPatch, IndividualFundPatch, NewFund, OwnedFund,
    RepositoryError, Ssn,
};

use super::diesel_helpers::{map_diesel_error, map_pool_error, to_row_count};
use super::diesel_fund_repository::row_to_fund;
use super::models::{
    FundChangeset, FundRow, IndividualFundChangeset, IndividualFundRow, NewFundRow,
    NewIndividualFundRow,
};
use super::pool::DbPool;
use super::schema::{funds, individual_funds};

const DROP_INDIVIDUAL_FUNDS: &str = "DROP TABLE IF EXISTS individual_funds CASCADE";
const CREATE_INDIVIDUAL_FUNDS: &str = r"CREATE TABLE individual_funds (
    fund_id BIGINT PRIMARY KEY
        REFERENCES funds (id) ON DELETE CASCADE,
    ssn BIGINT NOT NULL CHECK (ssn BETWEEN 0 AND 999999999),
    user_email VARCHAR(255) NOT NULL
        REFERENCES users (email) ON DELETE CASCADE
)";

/// Diesel-backed implementation of the `IndividualFundRepository` port.
#[derive(Clone)]
pub struct DieselIndividualFundRepository {
    pool: DbPool,
}

impl DieselIndividualFundRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Join a base row with its subtype row into one domain value.
fn rows_to_owned_fund(
    fund: FundRow,
    subtype: IndividualFundRow,
) -> Result<OwnedFund, RepositoryError> {
    let ssn = Ssn::new(subtype.ssn)
        .map_err(|err| RepositoryError::query(format!("corrupted ssn: {err}")))?;
    let user_email = Email::new(subtype.user_email)
        .map_err(|err| RepositoryError::query(format!("corrupted owner email: {err}")))?;
    Ok(OwnedFund {
        fund: row_to_fund(fund),
        ownership: FundOwnership::Individual { ssn, user_email },
    })
}

#[async_trait]
impl IndividualFundRepository for DieselIndividualFundRepository {
    async fn fetch_all(&self) -> Result<Vec<OwnedFund>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(IndividualFundRow, FundRow)> = individual_funds::table
            .inner_join(funds::table)
            .select((IndividualFundRow::as_select(), FundRow::as_select()))
            .order(funds::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|(subtype, fund)| rows_to_owned_fund(fund, subtype))
            .collect()
    }

    async fn initialize(&self) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::sql_query(DROP_INDIVIDUAL_FUNDS)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        diesel::sql_query(CREATE_INDIVIDUAL_FUNDS)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        debug!("individual_funds table recreated");
        Ok(())
    }

    async fn insert(
        &self,
        fund: &NewFund,
        ssn: Ssn,
        user_email: &Email,
    ) -> Result<FundId, RepositoryError> {
        use diesel_async::scoped_futures::ScopedFutureExt as _;
        use diesel_async::AsyncConnection as _;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let base_row = NewFundRow {
            purpose: &fund.purpose,
            balance: fund.balance,
            verification: &fund.verification,
        };

        // Base and subtype rows land together or not at all.
        let id = conn
            .transaction(|conn| {
                async move {
                    let id: i64 = diesel::insert_into(funds::table)
                        .values(&base_row)
                        .returning(funds::id)
                        .get_result(conn)
                        .await?;

                    let subtype_row = NewIndividualFundRow {
                        fund_id: id,
                        ssn: ssn.value(),
                        user_email: user_email.as_str(),
                    };
                    diesel::insert_into(individual_funds::table)
                        .values(&subtype_row)
                        .execute(conn)
                        .await?;

                    Ok::<i64, diesel::result::Error>(id)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(FundId(id))
    }

    async fn update_fund_and_subtype(
        &self,
        id: FundId,
        fund: &FundPatch,
        subtype: &IndividualFundPatch,
    ) -> Result<(), RepositoryError> {
        use diesel_async::scoped_futures::ScopedFutureExt as _;
        use diesel_async::AsyncConnection as _;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let fund_changeset = FundChangeset {
            purpose: fund.purpose.as_deref(),
            balance: fund.balance,
            verification: fund.verification.as_deref(),
        };
        let subtype_changeset = IndividualFundChangeset {
            ssn: subtype.ssn.map(Ssn::value),
            user_email: subtype.user_email.as_ref().map(Email::as_str),
        };
        let apply_fund = !fund.is_empty();
        let apply_subtype = !subtype.is_empty();

        conn.transaction(|conn| {
            async move {
                let known: i64 = individual_funds::table
                    .filter(individual_funds::fund_id.eq(id.0))
                    .count()
                    .get_result(conn)
                    .await?;
                if known == 0 {
                    return Err(diesel::result::Error::NotFound);
                }

                if apply_fund {
                    let affected = diesel::update(funds::table.find(id.0))
                        .set(&fund_changeset)
                        .execute(conn)
                        .await?;
                    if affected == 0 {
                        return Err(diesel::result::Error::NotFound);
                    }
                }

                if apply_subtype {
                    let affected =
                        diesel::update(individual_funds::table.find(id.0))
                            .set(&subtype_changeset)
                            .execute(conn)
                            .await?;
                    if affected == 0 {
                        return Err(diesel::result::Error::NotFound);
                    }
                }

                Ok::<(), diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = individual_funds::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(to_row_count(count))
    }
}
