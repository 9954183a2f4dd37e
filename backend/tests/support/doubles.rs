//! In-memory repository doubles shared across the integration suites.
//!
//! One `MemoryDb` backs every repository handle so foreign keys, cascades,
//! and the two-table fund updates behave like the SQL adapters.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;
use serde_json::{Map, Value};

use givelog::domain::ports::{
    DonationRepository, FundDonationTotal, FundRepository, IndividualFundRepository,
    OrganizationFundRepository, OrganizationRepository, RepositoryError, SearchOperator,
    StoredCredential, UserRepository, UserSearch, UserSearchField,
};
use givelog::domain::{
    AuthService, BcryptPasswordHasher, Donation, DonationId, Donor, Email, Fund, FundId,
    FundOwnership, FundPatch, IndividualFundPatch, NewDonation, NewFund, Organization,
    OrganizationColumn, OrganizationFundPatch, OwnedFund, PhoneNumber, Ssn, TaxId, TokenSigner,
    User,
};
use givelog::inbound::http::HttpState;

#[derive(Default)]
pub struct MemoryDb {
    users: BTreeMap<String, (User, String)>,
    organizations: BTreeMap<String, (Organization, String)>,
    funds: BTreeMap<i64, Fund>,
    individual_funds: BTreeMap<i64, (Ssn, Email)>,
    organization_funds: BTreeMap<i64, (TaxId, Email)>,
    donations: BTreeMap<i64, Donation>,
    next_fund_id: i64,
    next_donation_id: i64,
}

impl MemoryDb {
    fn insert_fund(&mut self, fund: &NewFund) -> FundId {
        self.next_fund_id += 1;
        let id = self.next_fund_id;
        self.funds.insert(
            id,
            Fund {
                id: FundId(id),
                purpose: fund.purpose.clone(),
                balance: fund.balance,
                verification: fund.verification.clone(),
            },
        );
        FundId(id)
    }

    fn fk_user(&self, email: &Email) -> Result<(), RepositoryError> {
        if self.users.contains_key(email.as_str()) {
            Ok(())
        } else {
            Err(RepositoryError::not_found(
                "referenced record does not exist",
            ))
        }
    }

    fn fk_organization(&self, email: &Email) -> Result<(), RepositoryError> {
        if self.organizations.contains_key(email.as_str()) {
            Ok(())
        } else {
            Err(RepositoryError::not_found(
                "referenced record does not exist",
            ))
        }
    }

    fn fk_fund(&self, id: FundId) -> Result<(), RepositoryError> {
        if self.funds.contains_key(&id.0) {
            Ok(())
        } else {
            Err(RepositoryError::not_found(
                "referenced record does not exist",
            ))
        }
    }

    fn patch_fund(&mut self, id: FundId, patch: &FundPatch) {
        if let Some(fund) = self.funds.get_mut(&id.0) {
            if let Some(purpose) = &patch.purpose {
                fund.purpose = purpose.clone();
            }
            if let Some(balance) = patch.balance {
                fund.balance = balance;
            }
            if let Some(verification) = &patch.verification {
                fund.verification = verification.clone();
            }
        }
    }
}

pub type SharedDb = Arc<Mutex<MemoryDb>>;

pub struct MemoryUsers(pub SharedDb);
pub struct MemoryOrganizations(pub SharedDb);
pub struct MemoryFunds(pub SharedDb);
pub struct MemoryIndividualFunds(pub SharedDb);
pub struct MemoryOrganizationFunds(pub SharedDb);
pub struct MemoryDonations(pub SharedDb);

fn holds(user: &User, field: UserSearchField, op: SearchOperator, value: &str) -> bool {
    let actual = match field {
        UserSearchField::Email => user.email.as_str(),
        UserSearchField::Name => &user.name,
        UserSearchField::PhoneNumber => user.phone_number.as_str(),
    };
    match op {
        SearchOperator::Equals => actual == value,
        SearchOperator::NotEquals => actual != value,
        SearchOperator::Contains => actual.contains(value),
    }
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn fetch_all(&self) -> Result<Vec<User>, RepositoryError> {
        let db = self.0.lock().expect("db lock");
        Ok(db.users.values().map(|(u, _)| u.clone()).collect())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let db = self.0.lock().expect("db lock");
        Ok(db.users.get(email.as_str()).map(|(u, _)| u.clone()))
    }

    async fn credential_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredential>, RepositoryError> {
        let db = self.0.lock().expect("db lock");
        Ok(db.users.get(email.as_str()).map(|(u, hash)| StoredCredential {
            email: u.email.clone(),
            password_hash: hash.clone(),
        }))
    }

    async fn initialize(&self) -> Result<(), RepositoryError> {
        self.0.lock().expect("db lock").users.clear();
        Ok(())
    }

    async fn insert(&self, user: &User, password_hash: &str) -> Result<(), RepositoryError> {
        let mut db = self.0.lock().expect("db lock");
        if db.users.contains_key(user.email.as_str()) {
            return Err(RepositoryError::conflict("duplicate record"));
        }
        db.users.insert(
            user.email.as_str().to_owned(),
            (user.clone(), password_hash.to_owned()),
        );
        Ok(())
    }

    async fn update_phone_number(
        &self,
        email: &Email,
        phone_number: &PhoneNumber,
    ) -> Result<(), RepositoryError> {
        let mut db = self.0.lock().expect("db lock");
        match db.users.get_mut(email.as_str()) {
            Some((user, _)) => {
                user.phone_number = phone_number.clone();
                Ok(())
            }
            None => Err(RepositoryError::not_found("user not found")),
        }
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.0.lock().expect("db lock").users.len() as u64)
    }

    async fn search(&self, search: &UserSearch) -> Result<Vec<User>, RepositoryError> {
        let db = self.0.lock().expect("db lock");
        Ok(db
            .users
            .values()
            .map(|(u, _)| u)
            .filter(|user| {
                let mut outcomes = search
                    .conditions()
                    .iter()
                    .map(|c| holds(user, c.field, c.op, &c.value));
                match search.connective() {
                    givelog::domain::SearchConnective::And => outcomes.all(|o| o),
                    givelog::domain::SearchConnective::Or => outcomes.any(|o| o),
                }
            })
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[async_trait]
impl OrganizationRepository for MemoryOrganizations {
    async fn fetch_all(&self) -> Result<Vec<Organization>, RepositoryError> {
        let db = self.0.lock().expect("db lock");
        Ok(db.organizations.values().map(|(o, _)| o.clone()).collect())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Organization>, RepositoryError> {
        let db = self.0.lock().expect("db lock");
        Ok(db.organizations.get(email.as_str()).map(|(o, _)| o.clone()))
    }

    async fn credential_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredential>, RepositoryError> {
        let db = self.0.lock().expect("db lock");
        Ok(db
            .organizations
            .get(email.as_str())
            .map(|(o, hash)| StoredCredential {
                email: o.email.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn initialize(&self) -> Result<(), RepositoryError> {
        self.0.lock().expect("db lock").organizations.clear();
        Ok(())
    }

    async fn insert(
        &self,
        organization: &Organization,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let mut db = self.0.lock().expect("db lock");
        if db.organizations.contains_key(organization.email.as_str()) {
            return Err(RepositoryError::conflict("duplicate record"));
        }
        db.organizations.insert(
            organization.email.as_str().to_owned(),
            (organization.clone(), password_hash.to_owned()),
        );
        Ok(())
    }

    async fn update_details(
        &self,
        email: &Email,
        address: &str,
        name: &str,
        field: &str,
    ) -> Result<(), RepositoryError> {
        let mut db = self.0.lock().expect("db lock");
        match db.organizations.get_mut(email.as_str()) {
            Some((org, _)) => {
                org.address = address.to_owned();
                org.name = name.to_owned();
                org.field = field.to_owned();
                Ok(())
            }
            None => Err(RepositoryError::not_found("organization not found")),
        }
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.0.lock().expect("db lock").organizations.len() as u64)
    }

    async fn projection(
        &self,
        columns: &[OrganizationColumn],
    ) -> Result<Vec<Map<String, Value>>, RepositoryError> {
        let db = self.0.lock().expect("db lock");
        Ok(db
            .organizations
            .values()
            .map(|(org, _)| {
                let mut row = Map::new();
                for column in columns {
                    let (key, value) = match column {
                        OrganizationColumn::Email => ("email", org.email.as_str()),
                        OrganizationColumn::Name => ("name", org.name.as_str()),
                        OrganizationColumn::Field => ("field", org.field.as_str()),
                        OrganizationColumn::Address => ("address", org.address.as_str()),
                        OrganizationColumn::Verification => {
                            ("verification", org.verification.as_str())
                        }
                    };
                    row.insert(key.to_owned(), Value::String(value.to_owned()));
                }
                row
            })
            .collect())
    }
}

#[async_trait]
impl FundRepository for MemoryFunds {
    async fn fetch_all(&self) -> Result<Vec<Fund>, RepositoryError> {
        Ok(self.0.lock().expect("db lock").funds.values().cloned().collect())
    }

    async fn with_balance_above(&self, threshold: i64) -> Result<Vec<Fund>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .expect("db lock")
            .funds
            .values()
            .filter(|f| f.balance > threshold)
            .cloned()
            .collect())
    }

    async fn initialize(&self) -> Result<(), RepositoryError> {
        let mut db = self.0.lock().expect("db lock");
        db.funds.clear();
        db.individual_funds.clear();
        db.organization_funds.clear();
        db.donations.clear();
        Ok(())
    }

    async fn insert(&self, fund: &NewFund) -> Result<FundId, RepositoryError> {
        Ok(self.0.lock().expect("db lock").insert_fund(fund))
    }

    async fn update_balance(&self, id: FundId, balance: i64) -> Result<(), RepositoryError> {
        let mut db = self.0.lock().expect("db lock");
        match db.funds.get_mut(&id.0) {
            Some(fund) => {
                fund.balance = balance;
                Ok(())
            }
            None => Err(RepositoryError::not_found("fund not found")),
        }
    }

    async fn delete(&self, id: FundId) -> Result<(), RepositoryError> {
        let mut db = self.0.lock().expect("db lock");
        if db.funds.remove(&id.0).is_none() {
            return Err(RepositoryError::not_found("fund not found"));
        }
        db.individual_funds.remove(&id.0);
        db.organization_funds.remove(&id.0);
        db.donations.retain(|_, d| d.fund_id != id);
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.0.lock().expect("db lock").funds.len() as u64)
    }
}

#[async_trait]
impl IndividualFundRepository for MemoryIndividualFunds {
    async fn fetch_all(&self) -> Result<Vec<OwnedFund>, RepositoryError> {
        let db = self.0.lock().expect("db lock");
        Ok(db
            .individual_funds
            .iter()
            .filter_map(|(id, (ssn, user_email))| {
                db.funds.get(id).map(|fund| OwnedFund {
                    fund: fund.clone(),
                    ownership: FundOwnership::Individual {
                        ssn: *ssn,
                        user_email: user_email.clone(),
                    },
                })
            })
            .collect())
    }

    async fn initialize(&self) -> Result<(), RepositoryError> {
        self.0.lock().expect("db lock").individual_funds.clear();
        Ok(())
    }

    async fn insert(
        &self,
        fund: &NewFund,
        ssn: Ssn,
        user_email: &Email,
    ) -> Result<FundId, RepositoryError> {
        let mut db = self.0.lock().expect("db lock");
        db.fk_user(user_email)?;
        let id = db.insert_fund(fund);
        db.individual_funds.insert(id.0, (ssn, user_email.clone()));
        Ok(id)
    }

    async fn update_fund_and_subtype(
        &self,
        id: FundId,
        fund: &FundPatch,
        subtype: &IndividualFundPatch,
    ) -> Result<(), RepositoryError> {
        let mut db = self.0.lock().expect("db lock");
        if !db.individual_funds.contains_key(&id.0) {
            return Err(RepositoryError::not_found("individual fund not found"));
        }
        if let Some(user_email) = &subtype.user_email {
            db.fk_user(user_email)?;
        }
        db.patch_fund(id, fund);
        let row = db.individual_funds.get_mut(&id.0).expect("row exists");
        if let Some(ssn) = subtype.ssn {
            row.0 = ssn;
        }
        if let Some(user_email) = &subtype.user_email {
            row.1 = user_email.clone();
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.0.lock().expect("db lock").individual_funds.len() as u64)
    }
}

#[async_trait]
impl OrganizationFundRepository for MemoryOrganizationFunds {
    async fn fetch_all(&self) -> Result<Vec<OwnedFund>, RepositoryError> {
        let db = self.0.lock().expect("db lock");
        Ok(db
            .organization_funds
            .iter()
            .filter_map(|(id, (tax_id, org_email))| {
                db.funds.get(id).map(|fund| OwnedFund {
                    fund: fund.clone(),
                    ownership: FundOwnership::Organization {
                        tax_id: *tax_id,
                        org_email: org_email.clone(),
                    },
                })
            })
            .collect())
    }

    async fn initialize(&self) -> Result<(), RepositoryError> {
        self.0.lock().expect("db lock").organization_funds.clear();
        Ok(())
    }

    async fn insert(
        &self,
        fund: &NewFund,
        tax_id: TaxId,
        org_email: &Email,
    ) -> Result<FundId, RepositoryError> {
        let mut db = self.0.lock().expect("db lock");
        db.fk_organization(org_email)?;
        if db.organization_funds.values().any(|(t, _)| *t == tax_id) {
            return Err(RepositoryError::conflict("duplicate record"));
        }
        let id = db.insert_fund(fund);
        db.organization_funds.insert(id.0, (tax_id, org_email.clone()));
        Ok(id)
    }

    async fn update_fund_and_subtype(
        &self,
        id: FundId,
        fund: &FundPatch,
        subtype: &OrganizationFundPatch,
    ) -> Result<(), RepositoryError> {
        let mut db = self.0.lock().expect("db lock");
        if !db.organization_funds.contains_key(&id.0) {
            return Err(RepositoryError::not_found("organization fund not found"));
        }
        if let Some(tax_id) = subtype.tax_id {
            let taken = db
                .organization_funds
                .iter()
                .any(|(other, (t, _))| *other != id.0 && *t == tax_id);
            if taken {
                return Err(RepositoryError::conflict("duplicate record"));
            }
        }
        db.patch_fund(id, fund);
        if let Some(tax_id) = subtype.tax_id {
            let row = db.organization_funds.get_mut(&id.0).expect("row exists");
            row.0 = tax_id;
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.0.lock().expect("db lock").organization_funds.len() as u64)
    }
}

#[async_trait]
impl DonationRepository for MemoryDonations {
    async fn fetch_all(&self) -> Result<Vec<Donation>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .expect("db lock")
            .donations
            .values()
            .cloned()
            .collect())
    }

    async fn for_user(&self, email: &Email) -> Result<Vec<Donation>, RepositoryError> {
        let db = self.0.lock().expect("db lock");
        Ok(db
            .donations
            .values()
            .filter(|d| d.donor.user_email() == Some(email))
            .cloned()
            .collect())
    }

    async fn initialize(&self) -> Result<(), RepositoryError> {
        self.0.lock().expect("db lock").donations.clear();
        Ok(())
    }

    async fn insert(&self, donation: &NewDonation) -> Result<DonationId, RepositoryError> {
        let mut db = self.0.lock().expect("db lock");
        db.fk_fund(donation.fund_id)?;
        match &donation.donor {
            Donor::User { email } => db.fk_user(email)?,
            Donor::Organization { email } => db.fk_organization(email)?,
        }
        db.next_donation_id += 1;
        let id = db.next_donation_id;
        db.donations.insert(
            id,
            Donation {
                id: DonationId(id),
                amount: donation.amount,
                donated_on: donation.donated_on,
                content: donation.content.clone(),
                donor: donation.donor.clone(),
                fund_id: donation.fund_id,
            },
        );
        Ok(DonationId(id))
    }

    async fn update(
        &self,
        id: DonationId,
        donation: &NewDonation,
    ) -> Result<(), RepositoryError> {
        let mut db = self.0.lock().expect("db lock");
        if !db.donations.contains_key(&id.0) {
            return Err(RepositoryError::not_found("donation not found"));
        }
        db.fk_fund(donation.fund_id)?;
        db.donations.insert(
            id.0,
            Donation {
                id,
                amount: donation.amount,
                donated_on: donation.donated_on,
                content: donation.content.clone(),
                donor: donation.donor.clone(),
                fund_id: donation.fund_id,
            },
        );
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.0.lock().expect("db lock").donations.len() as u64)
    }

    async fn donors_in_every_fund(&self) -> Result<Vec<Email>, RepositoryError> {
        let db = self.0.lock().expect("db lock");
        let mut donors: Vec<Email> = db
            .donations
            .values()
            .filter_map(|d| d.donor.user_email())
            .filter(|email| {
                db.funds.keys().all(|fund_id| {
                    db.donations
                        .values()
                        .any(|d| d.fund_id.0 == *fund_id && d.donor.user_email() == Some(email))
                })
            })
            .cloned()
            .collect();
        donors.sort();
        donors.dedup();
        Ok(donors)
    }

    async fn funds_above_average(&self) -> Result<Vec<FundDonationTotal>, RepositoryError> {
        let db = self.0.lock().expect("db lock");
        let mut totals: BTreeMap<i64, i64> = BTreeMap::new();
        for donation in db.donations.values() {
            *totals.entry(donation.fund_id.0).or_insert(0) += donation.amount;
        }
        if totals.is_empty() {
            return Ok(Vec::new());
        }
        let average = totals.values().sum::<i64>() as f64 / totals.len() as f64;
        Ok(totals
            .into_iter()
            .filter(|(_, total)| (*total as f64) > average)
            .map(|(fund_id, total)| FundDonationTotal {
                fund_id: FundId(fund_id),
                total,
            })
            .collect())
    }
}

// bcrypt's cost floor; keeps test hashing fast.
const TEST_BCRYPT_COST: u32 = 4;

/// Build an [`HttpState`] over one shared in-memory database.
pub fn memory_state() -> HttpState {
    let db: SharedDb = Arc::new(Mutex::new(MemoryDb::default()));
    let users = Arc::new(MemoryUsers(Arc::clone(&db)));
    let organizations = Arc::new(MemoryOrganizations(Arc::clone(&db)));
    let auth = AuthService::new(
        Arc::clone(&users) as Arc<dyn UserRepository>,
        Arc::clone(&organizations) as Arc<dyn OrganizationRepository>,
        Arc::new(BcryptPasswordHasher::with_cost(TEST_BCRYPT_COST)),
        TokenSigner::new("integration-secret", Duration::days(30), Duration::days(1)),
    );
    HttpState {
        users,
        organizations,
        funds: Arc::new(MemoryFunds(Arc::clone(&db))),
        individual_funds: Arc::new(MemoryIndividualFunds(Arc::clone(&db))),
        organization_funds: Arc::new(MemoryOrganizationFunds(Arc::clone(&db))),
        donations: Arc::new(MemoryDonations(db)),
        auth,
    }
}
