//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::NaiveDate;
use diesel::prelude::*;

use super::schema::{
    donations, funds, individual_funds, organization_funds, users, volunteer_organizations,
};

/// Row struct for reading public user fields; never selects the hash.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub email: String,
    pub name: String,
    pub phone_number: String,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub phone_number: &'a str,
    pub password_hash: &'a str,
}

/// Row struct for reading public organization fields; never selects the hash.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = volunteer_organizations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrganizationRow {
    pub email: String,
    pub name: String,
    pub field: String,
    pub address: String,
    pub verification: String,
}

/// Insertable struct for creating new organization records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = volunteer_organizations)]
pub(crate) struct NewOrganizationRow<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub field: &'a str,
    pub address: &'a str,
    pub verification: &'a str,
    pub password_hash: &'a str,
}

// ---------------------------------------------------------------------------
// Fund models
// ---------------------------------------------------------------------------

/// Row struct for reading from the funds table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = funds)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FundRow {
    pub id: i64,
    pub purpose: String,
    pub balance: i64,
    pub verification: String,
}

/// Insertable struct for creating new fund records; the store picks the id.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = funds)]
pub(crate) struct NewFundRow<'a> {
    pub purpose: &'a str,
    pub balance: i64,
    pub verification: &'a str,
}

/// Partial update for the funds table. `None` fields stay untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = funds)]
pub(crate) struct FundChangeset<'a> {
    pub purpose: Option<&'a str>,
    pub balance: Option<i64>,
    pub verification: Option<&'a str>,
}

/// Row struct for reading from the individual_funds table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = individual_funds)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct IndividualFundRow {
    pub ssn: i64,
    pub user_email: String,
}

/// Insertable struct for creating new individual subtype records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = individual_funds)]
pub(crate) struct NewIndividualFundRow<'a> {
    pub fund_id: i64,
    pub ssn: i64,
    pub user_email: &'a str,
}

/// Partial update for the individual_funds table.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = individual_funds)]
pub(crate) struct IndividualFundChangeset<'a> {
    pub ssn: Option<i64>,
    pub user_email: Option<&'a str>,
}

/// Row struct for reading from the organization_funds table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = organization_funds)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrganizationFundRow {
    pub tax_id: i64,
    pub org_email: String,
}

/// Insertable struct for creating new organization subtype records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = organization_funds)]
pub(crate) struct NewOrganizationFundRow<'a> {
    pub fund_id: i64,
    pub tax_id: i64,
    pub org_email: &'a str,
}

/// Partial update for the organization_funds table.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = organization_funds)]
pub(crate) struct OrganizationFundChangeset {
    pub tax_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// Donation models
// ---------------------------------------------------------------------------

/// Row struct for reading from the donations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = donations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DonationRow {
    pub id: i64,
    pub amount: i64,
    pub donated_on: NaiveDate,
    pub content: String,
    pub user_email: Option<String>,
    pub org_email: Option<String>,
    pub fund_id: i64,
}

/// Insertable struct for creating new donation records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = donations)]
pub(crate) struct NewDonationRow<'a> {
    pub amount: i64,
    pub donated_on: NaiveDate,
    pub content: &'a str,
    pub user_email: Option<&'a str>,
    pub org_email: Option<&'a str>,
    pub fund_id: i64,
}

/// Full-row replacement for updating an existing donation.
///
/// Both donor columns are always written so a donor change clears the old
/// column instead of leaving two set.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = donations)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct DonationUpdate<'a> {
    pub amount: i64,
    pub donated_on: NaiveDate,
    pub content: &'a str,
    pub user_email: Option<&'a str>,
    pub org_email: Option<&'a str>,
    pub fund_id: i64,
}
