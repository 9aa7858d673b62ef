//! Account and practitioner-profile database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Account, PractitionerProfile, Role};

const ACCOUNT_COLUMNS: &str = "account_id, email, name, role, active, created_at";

impl Database {
    /// Insert a new account. Emails are unique.
    pub fn insert_account(&self, account: &Account) -> DbResult<()> {
        if self.get_account_by_email(&account.email)?.is_some() {
            return Err(DbError::Constraint(format!(
                "Email already registered: {}",
                account.email
            )));
        }

        self.conn.execute(
            r#"
            INSERT INTO accounts (account_id, email, name, role, active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                account.account_id,
                account.email,
                account.name,
                account.role.code(),
                account.active,
                account.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get an account by ID.
    pub fn get_account(&self, account_id: &str) -> DbResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_id = ?");
        self.conn
            .query_row(&sql, [account_id], AccountRow::from_row)
            .optional()?
            .map(Account::try_from)
            .transpose()
    }

    /// Get an account by (case-insensitive) email.
    pub fn get_account_by_email(&self, email: &str) -> DbResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?");
        self.conn
            .query_row(&sql, [email.trim().to_lowercase()], AccountRow::from_row)
            .optional()?
            .map(Account::try_from)
            .transpose()
    }

    /// List all accounts, by name.
    pub fn list_accounts(&self) -> DbResult<Vec<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY name");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], AccountRow::from_row)?;

        let mut accounts = Vec::new();
        for row in rows {
            accounts.push(row?.try_into()?);
        }
        Ok(accounts)
    }

    /// Enable or disable login for an account.
    pub fn set_account_active(&self, account_id: &str, active: bool) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE accounts SET active = ?2 WHERE account_id = ?1",
            params![account_id, active],
        )?;
        Ok(rows_affected > 0)
    }

    /// Insert or replace a practitioner's profile.
    ///
    /// The owning account must exist and carry the practitioner role, and
    /// no other practitioner may hold the same registration (CRN).
    pub fn upsert_practitioner_profile(&self, profile: &PractitionerProfile) -> DbResult<()> {
        let account = self
            .get_account(&profile.account_id)?
            .ok_or_else(|| DbError::NotFound(format!("account {}", profile.account_id)))?;
        if !account.is_practitioner() {
            return Err(DbError::Constraint(format!(
                "Account {} is not a practitioner",
                account.account_id
            )));
        }

        let holder: Option<String> = self
            .conn
            .query_row(
                "SELECT account_id FROM practitioner_profiles WHERE registration = ?",
                [&profile.registration],
                |row| row.get(0),
            )
            .optional()?;
        if holder.is_some_and(|id| id != profile.account_id) {
            return Err(DbError::Constraint(format!(
                "Registration already in use: {}",
                profile.registration
            )));
        }

        self.conn.execute(
            r#"
            INSERT INTO practitioner_profiles (
                account_id, registration, address, number, complement, city, state, phone
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(account_id) DO UPDATE SET
                registration = excluded.registration,
                address = excluded.address,
                number = excluded.number,
                complement = excluded.complement,
                city = excluded.city,
                state = excluded.state,
                phone = excluded.phone
            "#,
            params![
                profile.account_id,
                profile.registration,
                profile.address,
                profile.number,
                profile.complement,
                profile.city,
                profile.state.to_uppercase(),
                profile.phone,
            ],
        )?;
        Ok(())
    }

    /// Create a practitioner account together with its profile.
    ///
    /// Both rows are written or neither is.
    pub fn register_practitioner(
        &self,
        account: &Account,
        profile: &PractitionerProfile,
    ) -> DbResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        self.insert_account(account)?;
        self.upsert_practitioner_profile(profile)?;
        tx.commit()?;

        tracing::info!(account_id = %account.account_id, "Registered practitioner");
        Ok(())
    }

    /// Get a practitioner's profile.
    pub fn get_practitioner_profile(&self, account_id: &str) -> DbResult<Option<PractitionerProfile>> {
        self.conn
            .query_row(
                r#"
                SELECT account_id, registration, address, number, complement, city, state, phone
                FROM practitioner_profiles
                WHERE account_id = ?
                "#,
                [account_id],
                |row| {
                    Ok(PractitionerProfile {
                        account_id: row.get(0)?,
                        registration: row.get(1)?,
                        address: row.get(2)?,
                        number: row.get(3)?,
                        complement: row.get(4)?,
                        city: row.get(5)?,
                        state: row.get(6)?,
                        phone: row.get(7)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }
}

/// Intermediate row struct for database mapping.
struct AccountRow {
    account_id: String,
    email: String,
    name: String,
    role: String,
    active: bool,
    created_at: String,
}

impl AccountRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            account_id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            role: row.get(3)?,
            active: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

impl TryFrom<AccountRow> for Account {
    type Error = DbError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let role = Role::from_code(&row.role)
            .ok_or_else(|| DbError::Constraint(format!("Unknown role: {}", row.role)))?;

        Ok(Account {
            account_id: row.account_id,
            email: row.email,
            name: row.name,
            role,
            active: row.active,
            created_at: row.created_at,
        })
    }
}
