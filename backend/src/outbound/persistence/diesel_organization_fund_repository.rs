//! PostgreSQL-backed `OrganizationFundRepository` implementation using Diesel.
//!
//! Mirrors the individual-fund adapter for the organization subtype: base and
//! subtype writes share a transaction, and the tax identifier carries a
//! table-level uniqueness constraint.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::OrganizationFundRepository;
use crate::domain::{
    Email, FundId, FundOwnership, FundPatch, NewFund, OrganizationFundPatch, OwnedFund,
    RepositoryError, TaxId,
};

use super::diesel_helpers::{map_diesel_error, map_pool_error, to_row_count};
use super::diesel_fund_repository::row_to_fund;
use super::models::{
    FundChangeset, FundRow, NewFundRow, NewOrganizationFundRow, OrganizationFundChangeset,
    OrganizationFundRow,
};
use super::pool::DbPool;
use super::schema::{funds, organization_funds};

const DROP_ORGANIZATION_FUNDS: &str = "DROP TABLE IF EXISTS organization_funds CASCADE";
const CREATE_ORGANIZATION_FUNDS: &str = r"CREATE TABLE organization_funds (
    fund_id BIGINT PRIMARY KEY
        REFERENCES funds (id) ON DELETE CASCADE,
    tax_id BIGINT NOT NULL UNIQUE CHECK (tax_id BETWEEN 0 AND 999999999),
    org_email VARCHAR(255) NOT NULL
        REFERENCES volunteer_organizations (email) ON DELETE CASCADE
)";

/// Diesel-backed implementation of the `OrganizationFundRepository` port.
#[derive(Clone)]
pub struct DieselOrganizationFundRepository {
    pool: DbPool,
}

impl DieselOrganizationFundRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Join a base row with its subtype row into one domain value.
fn rows_to_owned_fund(
    fund: FundRow,
    subtype: OrganizationFundRow,
) -> Result<OwnedFund, RepositoryError> {
    let tax_id = TaxId::new(subtype.tax_id)
        .map_err(|err| RepositoryError::query(format!("corrupted tax id: {err}")))?;
    let org_email = Email::new(subtype.org_email)
        .map_err(|err| RepositoryError::query(format!("corrupted owner email: {err}")))?;
    Ok(OwnedFund {
        fund: row_to_fund(fund),
        ownership: FundOwnership::Organization { tax_id, org_email },
    })
}

#[async_trait]
impl OrganizationFundRepository for DieselOrganizationFundRepository {
    async fn fetch_all(&self) -> Result<Vec<OwnedFund>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(OrganizationFundRow, FundRow)> = organization_funds::table
            .inner_join(funds::table)
            .select((OrganizationFundRow::as_select(), FundRow::as_select()))
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

        diesel::sql_query(DROP_ORGANIZATION_FUNDS)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        diesel::sql_query(CREATE_ORGANIZATION_FUNDS)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        debug!("organization_funds table recreated");
        Ok(())
    }

    async fn insert(
        &self,
        fund: &NewFund,
        tax_id: TaxId,
        org_email: &Email,
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

                    let subtype_row = NewOrganizationFundRow {
                        fund_id: id,
                        tax_id: tax_id.value(),
                        org_email: org_email.as_str(),
                    };
                    diesel::insert_into(organization_funds::table)
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
        subtype: &OrganizationFundPatch,
    ) -> Result<(), RepositoryError> {
        use diesel_async::scoped_futures::ScopedFutureExt as _;
        use diesel_async::AsyncConnection as _;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let fund_changeset = FundChangeset {
            purpose: fund.purpose.as_deref(),
            balance: fund.balance,
            verification: fund.verification.as_deref(),
        };
        let subtype_changeset = OrganizationFundChangeset {
            tax_id: subtype.tax_id.map(TaxId::value),
        };
        let apply_fund = !fund.is_empty();
        let apply_subtype = !subtype.is_empty();

        conn.transaction(|conn| {
            async move {
                let known: i64 = organization_funds::table
                    .filter(organization_funds::fund_id.eq(id.0))
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
                        diesel::update(organization_funds::table.find(id.0))
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

        let count: i64 = organization_funds::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(to_row_count(count))
    }
}
