//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the DDL issued by the repositories'
//! `initialize` operations exactly; Diesel uses them for compile-time query
//! validation and type-safe SQL generation.

diesel::table! {
    /// Individual donor accounts, keyed by email.
    users (email) {
        /// Primary key: the user's email address.
        email -> Varchar,
        /// Display name (max 50 characters).
        name -> Varchar,
        /// Ten-digit contact number.
        phone_number -> Varchar,
        /// Salted bcrypt hash of the login password.
        password_hash -> Varchar,
    }
}

diesel::table! {
    /// Volunteer organization accounts, keyed by email.
    ///
    /// `(name, field)` carries a composite uniqueness constraint.
    volunteer_organizations (email) {
        /// Primary key: the organization's email address.
        email -> Varchar,
        /// Organization name (max 100 characters).
        name -> Varchar,
        /// Field of work (max 50 characters).
        field -> Varchar,
        /// Mailing address.
        address -> Varchar,
        /// Verification status text.
        verification -> Varchar,
        /// Salted bcrypt hash of the login password.
        password_hash -> Varchar,
    }
}

diesel::table! {
    /// Base donation-campaign records.
    funds (id) {
        /// Primary key: store-generated identity.
        id -> BigInt,
        /// What the campaign raises money for.
        purpose -> Varchar,
        /// Current balance in minor units.
        balance -> BigInt,
        /// Verification status text.
        verification -> Varchar,
    }
}

diesel::table! {
    /// Subtype rows for funds owned by an individual user.
    individual_funds (fund_id) {
        /// Primary key and foreign key onto `funds.id`.
        fund_id -> BigInt,
        /// Owner's nine-digit social security number.
        ssn -> BigInt,
        /// Owning user's email; cascades with the user row.
        user_email -> Varchar,
    }
}

diesel::table! {
    /// Subtype rows for funds owned by a volunteer organization.
    organization_funds (fund_id) {
        /// Primary key and foreign key onto `funds.id`.
        fund_id -> BigInt,
        /// Organization's unique nine-digit tax identifier.
        tax_id -> BigInt,
        /// Owning organization's email; cascades with the organization row.
        org_email -> Varchar,
    }
}

diesel::table! {
    /// Recorded donations; exactly one of the two donor columns is set.
    donations (id) {
        /// Primary key: store-generated identity.
        id -> BigInt,
        /// Amount in minor units; always positive.
        amount -> BigInt,
        /// Calendar date the donation was made.
        donated_on -> Date,
        /// Free-text note attached by the donor.
        content -> Varchar,
        /// Donating user's email, when a user paid.
        user_email -> Nullable<Varchar>,
        /// Donating organization's email, when an organization paid.
        org_email -> Nullable<Varchar>,
        /// Target campaign; cascades with the fund row.
        fund_id -> BigInt,
    }
}

diesel::joinable!(individual_funds -> funds (fund_id));
diesel::joinable!(individual_funds -> users (user_email));
diesel::joinable!(organization_funds -> funds (fund_id));
diesel::joinable!(organization_funds -> volunteer_organizations (org_email));
diesel::joinable!(donations -> funds (fund_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    volunteer_organizations,
    funds,
    individual_funds,
    organization_funds,
    donations,
);
