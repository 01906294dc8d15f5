// crates/tally-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Billing Store
// Description: Durable billing-domain stores backed by SQLite WAL.
// Purpose: Persist tenants, accounts, memberships, roles, schedules, bills.
// Dependencies: tally-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements every `tally-core` store interface over `SQLite`.
//! One writer connection serializes mutations behind a mutex; reads use a
//! round-robin pool of additional connections for isolation under WAL. The
//! schema carries a version row and the store fails closed on a mismatch.
//! Security posture: database contents are untrusted; malformed rows surface
//! as corruption errors rather than panics.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::num::NonZeroU64;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use tally_core::Account;
use tally_core::AccountId;
use tally_core::AccountStore;
use tally_core::Address;
use tally_core::Bill;
use tally_core::BillId;
use tally_core::BillOutcome;
use tally_core::BillSchedule;
use tally_core::BillStore;
use tally_core::CurrencyCode;
use tally_core::HostName;
use tally_core::LookupId;
use tally_core::MembershipStore;
use tally_core::Money;
use tally_core::NewAccount;
use tally_core::NewBill;
use tally_core::NewSchedule;
use tally_core::NewTenant;
use tally_core::PrincipalId;
use tally_core::RoleId;
use tally_core::RoleName;
use tally_core::RoleStore;
use tally_core::ScheduleId;
use tally_core::ScheduleStore;
use tally_core::StoreError;
use tally_core::Tenant;
use tally_core::TenantDirectory;
use tally_core::TenantId;
use tally_core::Timestamp;
use tally_core::UpdateAccount;
use tally_core::format_date;
use tally_core::parse_date;
use thiserror::Error;
use time::Date;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` billing store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
/// - `read_pool_size` must be greater than zero.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Number of read-only connections used for read path isolation.
    #[serde(default = "default_read_pool_size")]
    pub read_pool_size: usize,
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default read connection pool size.
const fn default_read_pool_size() -> usize {
    4
}

/// Validates runtime limits in the store configuration.
fn validate_runtime_limits(config: &SqliteStoreConfig) -> Result<(), SqliteStoreError> {
    if config.read_pool_size == 0 {
        return Err(SqliteStoreError::Invalid(
            "read_pool_size must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding raw row payloads.
#[derive(Debug, Error, Clone)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption: a persisted row fails domain validation.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed billing store with WAL support.
///
/// # Invariants
/// - Mutations are serialized through the writer connection mutex.
/// - Reads rotate through a fixed pool of additional connections.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    /// Shared writer connection guarded by a mutex.
    write_connection: Arc<Mutex<Connection>>,
    /// Read connection pool used for read path isolation under WAL.
    read_connections: Arc<Vec<Mutex<Connection>>>,
    /// Round-robin cursor for read connection selection.
    read_cursor: Arc<AtomicUsize>,
}

impl SqliteStore {
    /// Opens an `SQLite`-backed billing store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized, or when the stored schema version is unsupported.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        validate_runtime_limits(config)?;
        let mut write_connection = open_connection(config)?;
        initialize_schema(&mut write_connection)?;
        let mut read_connections = Vec::with_capacity(config.read_pool_size);
        for _ in 0 .. config.read_pool_size {
            read_connections.push(Mutex::new(open_connection(config)?));
        }
        Ok(Self {
            write_connection: Arc::new(Mutex::new(write_connection)),
            read_connections: Arc::new(read_connections),
            read_cursor: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Locks the writer connection.
    fn write_lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.write_connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite write mutex poisoned".to_string()))
    }

    /// Locks the next read connection in round-robin order.
    fn read_lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        let index = self.read_cursor.fetch_add(1, Ordering::Relaxed) % self.read_connections.len();
        self.read_connections[index]
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite read mutex poisoned".to_string()))
    }

    /// Verifies the store can execute a simple SQL statement.
    fn check_connection(&self) -> Result<(), SqliteStoreError> {
        let guard = self.read_lock()?;
        guard
            .execute("SELECT 1", [])
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Tenant Directory
// ============================================================================

impl TenantDirectory for SqliteStore {
    fn tenant_by_host(&self, host: &HostName) -> Result<Option<TenantId>, StoreError> {
        let guard = self.read_lock()?;
        let raw: Option<i64> = guard
            .query_row(
                "SELECT tenant_id FROM tenant_hosts WHERE host = ?1",
                params![host.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        match raw {
            Some(value) => Ok(Some(TenantId::new(require_id(value, "tenant")?))),
            None => Ok(None),
        }
    }

    fn tenant_by_id(&self, tenant_id: TenantId) -> Result<Option<Tenant>, StoreError> {
        let guard = self.read_lock()?;
        let row = guard
            .query_row(
                "SELECT tenant_id, name, disabled, created_at, updated_at
                 FROM tenants WHERE tenant_id = ?1 AND disabled = 0",
                params![id_param(tenant_id.get(), "tenant")?],
                tenant_row,
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        match row {
            Some(row) => Ok(Some(tenant_record(row)?)),
            None => Ok(None),
        }
    }

    fn create_tenant(&self, tenant: NewTenant) -> Result<Tenant, StoreError> {
        let guard = self.write_lock()?;
        guard
            .execute(
                "INSERT INTO tenants (name, disabled, created_at, updated_at)
                 VALUES (?1, 0, ?2, ?2)",
                params![tenant.name, tenant.created_at.as_unix_millis()],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let id = TenantId::new(allocated_id(&guard, "tenant")?);
        Ok(Tenant {
            id,
            name: tenant.name.clone(),
            disabled: false,
            created_at: tenant.created_at,
            updated_at: tenant.created_at,
        })
    }

    fn bind_host(&self, host: HostName, tenant_id: TenantId) -> Result<(), StoreError> {
        let guard = self.write_lock()?;
        let existing: Option<i64> = guard
            .query_row(
                "SELECT tenant_id FROM tenant_hosts WHERE host = ?1",
                params![host.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        if let Some(bound) = existing {
            let bound = TenantId::new(require_id(bound, "tenant")?);
            if bound != tenant_id {
                return Err(StoreError::Invalid(format!(
                    "host {host} is already bound to tenant {bound}"
                )));
            }
            return Ok(());
        }
        guard
            .execute(
                "INSERT INTO tenant_hosts (host, tenant_id) VALUES (?1, ?2)",
                params![host.as_str(), id_param(tenant_id.get(), "tenant")?],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    fn readiness(&self) -> Result<(), StoreError> {
        Ok(self.check_connection()?)
    }
}

// ============================================================================
// SECTION: Membership Store
// ============================================================================

impl MembershipStore for SqliteStore {
    fn is_application_member(&self, principal_id: PrincipalId) -> Result<bool, StoreError> {
        let guard = self.read_lock()?;
        let found: Option<i64> = guard
            .query_row(
                "SELECT 1 FROM application_members WHERE principal_id = ?1",
                params![id_param(principal_id.get(), "principal")?],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(found.is_some())
    }

    fn is_tenant_member(
        &self,
        principal_id: PrincipalId,
        tenant_id: TenantId,
    ) -> Result<bool, StoreError> {
        let guard = self.read_lock()?;
        let found: Option<i64> = guard
            .query_row(
                "SELECT 1 FROM tenant_members WHERE principal_id = ?1 AND tenant_id = ?2",
                params![
                    id_param(principal_id.get(), "principal")?,
                    id_param(tenant_id.get(), "tenant")?
                ],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(found.is_some())
    }

    fn is_account_member(
        &self,
        principal_id: PrincipalId,
        account_id: AccountId,
    ) -> Result<bool, StoreError> {
        let guard = self.read_lock()?;
        let found: Option<i64> = guard
            .query_row(
                "SELECT 1 FROM account_members WHERE principal_id = ?1 AND account_id = ?2",
                params![
                    id_param(principal_id.get(), "principal")?,
                    id_param(account_id.get(), "account")?
                ],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(found.is_some())
    }

    fn grant_application_membership(&self, principal_id: PrincipalId) -> Result<(), StoreError> {
        let guard = self.write_lock()?;
        guard
            .execute(
                "INSERT OR IGNORE INTO application_members (principal_id) VALUES (?1)",
                params![id_param(principal_id.get(), "principal")?],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    fn grant_tenant_membership(
        &self,
        principal_id: PrincipalId,
        tenant_id: TenantId,
    ) -> Result<(), StoreError> {
        let guard = self.write_lock()?;
        guard
            .execute(
                "INSERT OR IGNORE INTO tenant_members (principal_id, tenant_id) VALUES (?1, ?2)",
                params![
                    id_param(principal_id.get(), "principal")?,
                    id_param(tenant_id.get(), "tenant")?
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    fn grant_account_membership(
        &self,
        principal_id: PrincipalId,
        account_id: AccountId,
    ) -> Result<(), StoreError> {
        let guard = self.write_lock()?;
        guard
            .execute(
                "INSERT OR IGNORE INTO account_members (principal_id, account_id) VALUES (?1, ?2)",
                params![
                    id_param(principal_id.get(), "principal")?,
                    id_param(account_id.get(), "account")?
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    fn revoke_application_membership(&self, principal_id: PrincipalId) -> Result<(), StoreError> {
        let guard = self.write_lock()?;
        guard
            .execute(
                "DELETE FROM application_members WHERE principal_id = ?1",
                params![id_param(principal_id.get(), "principal")?],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    fn revoke_tenant_membership(
        &self,
        principal_id: PrincipalId,
        tenant_id: TenantId,
    ) -> Result<(), StoreError> {
        let guard = self.write_lock()?;
        guard
            .execute(
                "DELETE FROM tenant_members WHERE principal_id = ?1 AND tenant_id = ?2",
                params![
                    id_param(principal_id.get(), "principal")?,
                    id_param(tenant_id.get(), "tenant")?
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    fn revoke_account_membership(
        &self,
        principal_id: PrincipalId,
        account_id: AccountId,
    ) -> Result<(), StoreError> {
        let guard = self.write_lock()?;
        guard
            .execute(
                "DELETE FROM account_members WHERE principal_id = ?1 AND account_id = ?2",
                params![
                    id_param(principal_id.get(), "principal")?,
                    id_param(account_id.get(), "account")?
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    fn readiness(&self) -> Result<(), StoreError> {
        Ok(self.check_connection()?)
    }
}

// ============================================================================
// SECTION: Role Store
// ============================================================================

impl RoleStore for SqliteStore {
    fn role_names_for(
        &self,
        principal_id: PrincipalId,
        tenant_id: TenantId,
    ) -> Result<Vec<RoleName>, StoreError> {
        let guard = self.read_lock()?;
        let mut statement = guard
            .prepare(
                "SELECT roles.name
                 FROM role_assignments
                 JOIN roles ON roles.role_id = role_assignments.role_id
                 WHERE role_assignments.principal_id = ?1 AND roles.tenant_id = ?2
                 ORDER BY roles.name",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map(
                params![
                    id_param(principal_id.get(), "principal")?,
                    id_param(tenant_id.get(), "tenant")?
                ],
                |row| row.get::<_, String>(0),
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let mut names = Vec::new();
        for name in rows {
            let name = name.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            names.push(RoleName::new(name));
        }
        Ok(names)
    }

    fn define_role(&self, tenant_id: TenantId, name: RoleName) -> Result<RoleId, StoreError> {
        let guard = self.write_lock()?;
        guard
            .execute(
                "INSERT INTO roles (tenant_id, name) VALUES (?1, ?2)",
                params![id_param(tenant_id.get(), "tenant")?, name.as_str()],
            )
            .map_err(|err| {
                if is_constraint_violation(&err) {
                    SqliteStoreError::Invalid(format!(
                        "role {name} already exists for tenant {tenant_id}"
                    ))
                } else {
                    SqliteStoreError::Db(err.to_string())
                }
            })?;
        Ok(RoleId::new(allocated_id(&guard, "role")?))
    }

    fn assign_role(&self, principal_id: PrincipalId, role_id: RoleId) -> Result<(), StoreError> {
        let guard = self.write_lock()?;
        guard
            .execute(
                "INSERT OR IGNORE INTO role_assignments (principal_id, role_id) VALUES (?1, ?2)",
                params![
                    id_param(principal_id.get(), "principal")?,
                    id_param(role_id.get(), "role")?
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    fn revoke_role(&self, principal_id: PrincipalId, role_id: RoleId) -> Result<(), StoreError> {
        let guard = self.write_lock()?;
        guard
            .execute(
                "DELETE FROM role_assignments WHERE principal_id = ?1 AND role_id = ?2",
                params![
                    id_param(principal_id.get(), "principal")?,
                    id_param(role_id.get(), "role")?
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Account Store
// ============================================================================

/// Column list shared by account queries.
const ACCOUNT_COLUMNS: &str = "account_id, tenant_id, name, street, city, region, postal_code, \
                               country, lookup_id, disabled, created_at, updated_at";

impl AccountStore for SqliteStore {
    fn account_by_id(&self, account_id: AccountId) -> Result<Option<Account>, StoreError> {
        let guard = self.read_lock()?;
        let row = guard
            .query_row(
                &format!(
                    "SELECT {ACCOUNT_COLUMNS} FROM accounts
                     WHERE account_id = ?1 AND disabled = 0"
                ),
                params![id_param(account_id.get(), "account")?],
                account_row,
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        match row {
            Some(row) => Ok(Some(account_record(row)?)),
            None => Ok(None),
        }
    }

    fn account_by_lookup(
        &self,
        tenant_id: TenantId,
        lookup_id: &LookupId,
    ) -> Result<Option<Account>, StoreError> {
        let guard = self.read_lock()?;
        let row = guard
            .query_row(
                &format!(
                    "SELECT {ACCOUNT_COLUMNS} FROM accounts
                     WHERE tenant_id = ?1 AND lookup_id = ?2 AND disabled = 0"
                ),
                params![id_param(tenant_id.get(), "tenant")?, lookup_id.as_str()],
                account_row,
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        match row {
            Some(row) => Ok(Some(account_record(row)?)),
            None => Ok(None),
        }
    }

    fn accounts_for_tenant(&self, tenant_id: TenantId) -> Result<Vec<Account>, StoreError> {
        let guard = self.read_lock()?;
        let mut statement = guard
            .prepare(&format!(
                "SELECT {ACCOUNT_COLUMNS} FROM accounts
                 WHERE tenant_id = ?1 AND disabled = 0
                 ORDER BY account_id"
            ))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map(params![id_param(tenant_id.get(), "tenant")?], account_row)
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let mut accounts = Vec::new();
        for row in rows {
            let row = row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            accounts.push(account_record(row)?);
        }
        Ok(accounts)
    }

    fn create_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let guard = self.write_lock()?;
        guard
            .execute(
                "INSERT INTO accounts (tenant_id, name, street, city, region, postal_code,
                     country, lookup_id, disabled, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?9)",
                params![
                    id_param(account.tenant_id.get(), "tenant")?,
                    account.name,
                    account.address.street,
                    account.address.city,
                    account.address.region,
                    account.address.postal_code,
                    account.address.country,
                    account.lookup_id.as_str(),
                    account.created_at.as_unix_millis(),
                ],
            )
            .map_err(|err| {
                if is_constraint_violation(&err) {
                    SqliteStoreError::Invalid(format!(
                        "lookup id {} already exists for tenant {}",
                        account.lookup_id, account.tenant_id
                    ))
                } else {
                    SqliteStoreError::Db(err.to_string())
                }
            })?;
        let id = AccountId::new(allocated_id(&guard, "account")?);
        Ok(Account {
            id,
            tenant_id: account.tenant_id,
            name: account.name.clone(),
            address: account.address.clone(),
            lookup_id: account.lookup_id.clone(),
            disabled: false,
            created_at: account.created_at,
            updated_at: account.created_at,
        })
    }

    fn update_account(
        &self,
        account_id: AccountId,
        update: UpdateAccount,
        updated_at: Timestamp,
    ) -> Result<Option<Account>, StoreError> {
        let guard = self.write_lock()?;
        let row = guard
            .query_row(
                &format!(
                    "SELECT {ACCOUNT_COLUMNS} FROM accounts
                     WHERE account_id = ?1 AND disabled = 0"
                ),
                params![id_param(account_id.get(), "account")?],
                account_row,
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut account = account_record(row)?;
        if let Some(name) = update.name {
            account.name = name;
        }
        if let Some(address) = update.address {
            account.address = address;
        }
        account.updated_at = updated_at;
        guard
            .execute(
                "UPDATE accounts
                 SET name = ?2, street = ?3, city = ?4, region = ?5, postal_code = ?6,
                     country = ?7, updated_at = ?8
                 WHERE account_id = ?1",
                params![
                    id_param(account_id.get(), "account")?,
                    account.name,
                    account.address.street,
                    account.address.city,
                    account.address.region,
                    account.address.postal_code,
                    account.address.country,
                    updated_at.as_unix_millis(),
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(Some(account))
    }

    fn disable_account(
        &self,
        account_id: AccountId,
        updated_at: Timestamp,
    ) -> Result<(), StoreError> {
        let guard = self.write_lock()?;
        guard
            .execute(
                "UPDATE accounts SET disabled = 1, updated_at = ?2
                 WHERE account_id = ?1 AND disabled = 0",
                params![
                    id_param(account_id.get(), "account")?,
                    updated_at.as_unix_millis()
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Schedule Store
// ============================================================================

/// Column list shared by schedule queries.
const SCHEDULE_COLUMNS: &str = "schedule_id, account_id, name, amount, currency, day_of_month, \
                                month_interval, begin_date, end_date, disabled, created_at, \
                                updated_at";

impl ScheduleStore for SqliteStore {
    fn schedule_by_id(
        &self,
        schedule_id: ScheduleId,
    ) -> Result<Option<BillSchedule>, StoreError> {
        let guard = self.read_lock()?;
        let row = guard
            .query_row(
                &format!(
                    "SELECT {SCHEDULE_COLUMNS} FROM schedules
                     WHERE schedule_id = ?1 AND disabled = 0"
                ),
                params![id_param(schedule_id.get(), "schedule")?],
                schedule_row,
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        match row {
            Some(row) => Ok(Some(schedule_record(row)?)),
            None => Ok(None),
        }
    }

    fn schedules_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<BillSchedule>, StoreError> {
        let guard = self.read_lock()?;
        let mut statement = guard
            .prepare(&format!(
                "SELECT {SCHEDULE_COLUMNS} FROM schedules
                 WHERE account_id = ?1 AND disabled = 0
                 ORDER BY schedule_id"
            ))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map(params![id_param(account_id.get(), "account")?], schedule_row)
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let mut schedules = Vec::new();
        for row in rows {
            let row = row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            schedules.push(schedule_record(row)?);
        }
        Ok(schedules)
    }

    fn active_schedules(&self, as_of: Date) -> Result<Vec<BillSchedule>, StoreError> {
        let guard = self.read_lock()?;
        // Dates are stored zero-padded ISO-8601, so text comparison is
        // chronological.
        let mut statement = guard
            .prepare(&format!(
                "SELECT {SCHEDULE_COLUMNS} FROM schedules
                 WHERE disabled = 0 AND begin_date <= ?1 AND end_date >= ?1
                 ORDER BY schedule_id"
            ))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map(params![format_date(as_of)], schedule_row)
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let mut schedules = Vec::new();
        for row in rows {
            let row = row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            schedules.push(schedule_record(row)?);
        }
        Ok(schedules)
    }

    fn create_schedule(&self, schedule: NewSchedule) -> Result<BillSchedule, StoreError> {
        schedule.validate().map_err(|err| StoreError::Invalid(err.to_string()))?;
        let end_date = schedule.effective_end_date();
        let guard = self.write_lock()?;
        guard
            .execute(
                "INSERT INTO schedules (account_id, name, amount, currency, day_of_month,
                     month_interval, begin_date, end_date, disabled, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?9)",
                params![
                    id_param(schedule.account_id.get(), "account")?,
                    schedule.name,
                    schedule.money.amount_text(),
                    schedule.money.currency.as_str(),
                    i64::from(schedule.day_of_month),
                    i64::from(schedule.month_interval),
                    format_date(schedule.begin_date),
                    format_date(end_date),
                    schedule.created_at.as_unix_millis(),
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let id = ScheduleId::new(allocated_id(&guard, "schedule")?);
        Ok(BillSchedule {
            id,
            account_id: schedule.account_id,
            name: schedule.name.clone(),
            money: schedule.money.clone(),
            day_of_month: schedule.day_of_month,
            month_interval: schedule.month_interval,
            begin_date: schedule.begin_date,
            end_date,
            disabled: false,
            created_at: schedule.created_at,
            updated_at: schedule.created_at,
        })
    }

    fn disable_schedule(
        &self,
        schedule_id: ScheduleId,
        updated_at: Timestamp,
    ) -> Result<(), StoreError> {
        let guard = self.write_lock()?;
        guard
            .execute(
                "UPDATE schedules SET disabled = 1, updated_at = ?2
                 WHERE schedule_id = ?1 AND disabled = 0",
                params![
                    id_param(schedule_id.get(), "schedule")?,
                    updated_at.as_unix_millis()
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Bill Store
// ============================================================================

/// Column list shared by bill queries.
const BILL_COLUMNS: &str = "bill_id, account_id, name, amount, currency, due_date, schedule_id, \
                            external_ref, disabled, created_at, updated_at";

impl BillStore for SqliteStore {
    fn bill_by_id(&self, bill_id: BillId) -> Result<Option<Bill>, StoreError> {
        let guard = self.read_lock()?;
        let row = guard
            .query_row(
                &format!(
                    "SELECT {BILL_COLUMNS} FROM bills WHERE bill_id = ?1 AND disabled = 0"
                ),
                params![id_param(bill_id.get(), "bill")?],
                bill_row,
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        match row {
            Some(row) => Ok(Some(bill_record(row)?)),
            None => Ok(None),
        }
    }

    fn bills_for_account(&self, account_id: AccountId) -> Result<Vec<Bill>, StoreError> {
        let guard = self.read_lock()?;
        let mut statement = guard
            .prepare(&format!(
                "SELECT {BILL_COLUMNS} FROM bills
                 WHERE account_id = ?1 AND disabled = 0
                 ORDER BY bill_id"
            ))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map(params![id_param(account_id.get(), "account")?], bill_row)
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let mut bills = Vec::new();
        for row in rows {
            let row = row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            bills.push(bill_record(row)?);
        }
        Ok(bills)
    }

    fn create_bill(&self, bill: NewBill) -> Result<Bill, StoreError> {
        let guard = self.write_lock()?;
        let schedule_id = match bill.schedule_id {
            Some(id) => Some(id_param(id.get(), "schedule")?),
            None => None,
        };
        guard
            .execute(
                "INSERT INTO bills (account_id, name, amount, currency, due_date, schedule_id,
                     external_ref, disabled, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?8)",
                params![
                    id_param(bill.account_id.get(), "account")?,
                    bill.name,
                    bill.money.amount_text(),
                    bill.money.currency.as_str(),
                    format_date(bill.due_date),
                    schedule_id,
                    bill.external_ref,
                    bill.created_at.as_unix_millis(),
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let id = BillId::new(allocated_id(&guard, "bill")?);
        Ok(Bill {
            id,
            account_id: bill.account_id,
            name: bill.name.clone(),
            money: bill.money.clone(),
            due_date: bill.due_date,
            schedule_id: bill.schedule_id,
            external_ref: bill.external_ref.clone(),
            disabled: false,
            created_at: bill.created_at,
            updated_at: bill.created_at,
        })
    }

    fn create_from_schedule(
        &self,
        schedule: &BillSchedule,
        due_date: Date,
        created_at: Timestamp,
    ) -> Result<BillOutcome, StoreError> {
        let guard = self.write_lock()?;
        let changed = guard
            .execute(
                "INSERT OR IGNORE INTO bills (account_id, name, amount, currency, due_date,
                     schedule_id, external_ref, disabled, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, 0, ?7, ?7)",
                params![
                    id_param(schedule.account_id.get(), "account")?,
                    format!("{} {}", schedule.name, format_date(due_date)),
                    schedule.money.amount_text(),
                    schedule.money.currency.as_str(),
                    format_date(due_date),
                    id_param(schedule.id.get(), "schedule")?,
                    created_at.as_unix_millis(),
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        if changed == 0 {
            return Ok(BillOutcome::AlreadyExists);
        }
        let id = BillId::new(allocated_id(&guard, "bill")?);
        Ok(BillOutcome::Created(Bill {
            id,
            account_id: schedule.account_id,
            name: format!("{} {}", schedule.name, format_date(due_date)),
            money: schedule.money.clone(),
            due_date,
            schedule_id: Some(schedule.id),
            external_ref: None,
            disabled: false,
            created_at,
            updated_at: created_at,
        }))
    }
}

// ============================================================================
// SECTION: Row Mapping
// ============================================================================

/// Raw tenant row before domain conversion.
struct TenantRow {
    /// Tenant rowid.
    id: i64,
    /// Display name.
    name: String,
    /// Soft-disable flag.
    disabled: i64,
    /// Creation time in unix millis.
    created_at: i64,
    /// Last update time in unix millis.
    updated_at: i64,
}

/// Maps a tenant row into raw columns.
fn tenant_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TenantRow> {
    Ok(TenantRow {
        id: row.get(0)?,
        name: row.get(1)?,
        disabled: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Converts a raw tenant row into a domain record.
fn tenant_record(row: TenantRow) -> Result<Tenant, SqliteStoreError> {
    Ok(Tenant {
        id: TenantId::new(require_id(row.id, "tenant")?),
        name: row.name,
        disabled: row.disabled != 0,
        created_at: Timestamp::from_unix_millis(row.created_at),
        updated_at: Timestamp::from_unix_millis(row.updated_at),
    })
}

/// Raw account row before domain conversion.
struct AccountRow {
    /// Account rowid.
    id: i64,
    /// Owning tenant rowid.
    tenant_id: i64,
    /// Display name.
    name: String,
    /// Street line.
    street: String,
    /// City or locality.
    city: String,
    /// Region, state, or province.
    region: String,
    /// Postal or ZIP code.
    postal_code: String,
    /// Country name or code.
    country: String,
    /// Tenant-scoped lookup identifier.
    lookup_id: String,
    /// Soft-disable flag.
    disabled: i64,
    /// Creation time in unix millis.
    created_at: i64,
    /// Last update time in unix millis.
    updated_at: i64,
}

/// Maps an account row into raw columns.
fn account_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AccountRow> {
    Ok(AccountRow {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        name: row.get(2)?,
        street: row.get(3)?,
        city: row.get(4)?,
        region: row.get(5)?,
        postal_code: row.get(6)?,
        country: row.get(7)?,
        lookup_id: row.get(8)?,
        disabled: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

/// Converts a raw account row into a domain record.
fn account_record(row: AccountRow) -> Result<Account, SqliteStoreError> {
    Ok(Account {
        id: AccountId::new(require_id(row.id, "account")?),
        tenant_id: TenantId::new(require_id(row.tenant_id, "tenant")?),
        name: row.name,
        address: Address {
            street: row.street,
            city: row.city,
            region: row.region,
            postal_code: row.postal_code,
            country: row.country,
        },
        lookup_id: LookupId::new(row.lookup_id),
        disabled: row.disabled != 0,
        created_at: Timestamp::from_unix_millis(row.created_at),
        updated_at: Timestamp::from_unix_millis(row.updated_at),
    })
}

/// Raw schedule row before domain conversion.
struct ScheduleRow {
    /// Schedule rowid.
    id: i64,
    /// Owning account rowid.
    account_id: i64,
    /// Display name.
    name: String,
    /// Decimal amount text.
    amount: String,
    /// Currency code text.
    currency: String,
    /// Day of month.
    day_of_month: i64,
    /// Months between occurrences.
    month_interval: i64,
    /// Validity window begin as ISO date text.
    begin_date: String,
    /// Validity window end as ISO date text.
    end_date: String,
    /// Soft-disable flag.
    disabled: i64,
    /// Creation time in unix millis.
    created_at: i64,
    /// Last update time in unix millis.
    updated_at: i64,
}

/// Maps a schedule row into raw columns.
fn schedule_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ScheduleRow> {
    Ok(ScheduleRow {
        id: row.get(0)?,
        account_id: row.get(1)?,
        name: row.get(2)?,
        amount: row.get(3)?,
        currency: row.get(4)?,
        day_of_month: row.get(5)?,
        month_interval: row.get(6)?,
        begin_date: row.get(7)?,
        end_date: row.get(8)?,
        disabled: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

/// Converts a raw schedule row into a domain record.
fn schedule_record(row: ScheduleRow) -> Result<BillSchedule, SqliteStoreError> {
    let day_of_month = u8::try_from(row.day_of_month)
        .map_err(|_| SqliteStoreError::Corrupt("schedule day_of_month out of range".to_string()))?;
    let month_interval = u32::try_from(row.month_interval).map_err(|_| {
        SqliteStoreError::Corrupt("schedule month_interval out of range".to_string())
    })?;
    Ok(BillSchedule {
        id: ScheduleId::new(require_id(row.id, "schedule")?),
        account_id: AccountId::new(require_id(row.account_id, "account")?),
        name: row.name,
        money: parse_money(&row.amount, &row.currency)?,
        day_of_month,
        month_interval,
        begin_date: require_date(&row.begin_date, "schedule begin_date")?,
        end_date: require_date(&row.end_date, "schedule end_date")?,
        disabled: row.disabled != 0,
        created_at: Timestamp::from_unix_millis(row.created_at),
        updated_at: Timestamp::from_unix_millis(row.updated_at),
    })
}

/// Raw bill row before domain conversion.
struct BillRow {
    /// Bill rowid.
    id: i64,
    /// Owning account rowid.
    account_id: i64,
    /// Display name.
    name: String,
    /// Decimal amount text.
    amount: String,
    /// Currency code text.
    currency: String,
    /// Due date as ISO date text.
    due_date: String,
    /// Originating schedule rowid, when generated.
    schedule_id: Option<i64>,
    /// External transaction reference.
    external_ref: Option<String>,
    /// Soft-disable flag.
    disabled: i64,
    /// Creation time in unix millis.
    created_at: i64,
    /// Last update time in unix millis.
    updated_at: i64,
}

/// Maps a bill row into raw columns.
fn bill_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BillRow> {
    Ok(BillRow {
        id: row.get(0)?,
        account_id: row.get(1)?,
        name: row.get(2)?,
        amount: row.get(3)?,
        currency: row.get(4)?,
        due_date: row.get(5)?,
        schedule_id: row.get(6)?,
        external_ref: row.get(7)?,
        disabled: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Converts a raw bill row into a domain record.
fn bill_record(row: BillRow) -> Result<Bill, SqliteStoreError> {
    let schedule_id = match row.schedule_id {
        Some(value) => Some(ScheduleId::new(require_id(value, "schedule")?)),
        None => None,
    };
    Ok(Bill {
        id: BillId::new(require_id(row.id, "bill")?),
        account_id: AccountId::new(require_id(row.account_id, "account")?),
        name: row.name,
        money: parse_money(&row.amount, &row.currency)?,
        due_date: require_date(&row.due_date, "bill due_date")?,
        schedule_id,
        external_ref: row.external_ref,
        disabled: row.disabled != 0,
        created_at: Timestamp::from_unix_millis(row.created_at),
        updated_at: Timestamp::from_unix_millis(row.updated_at),
    })
}

// ============================================================================
// SECTION: Conversion Helpers
// ============================================================================

/// Converts a stored rowid into a non-zero identifier.
fn require_id(value: i64, label: &str) -> Result<NonZeroU64, SqliteStoreError> {
    u64::try_from(value)
        .ok()
        .and_then(NonZeroU64::new)
        .ok_or_else(|| SqliteStoreError::Corrupt(format!("invalid {label} id: {value}")))
}

/// Converts a domain identifier into an `SQLite` integer parameter.
fn id_param(value: u64, label: &str) -> Result<i64, SqliteStoreError> {
    i64::try_from(value)
        .map_err(|_| SqliteStoreError::Invalid(format!("{label} id out of range: {value}")))
}

/// Returns the rowid assigned by the most recent insert.
fn allocated_id(connection: &Connection, label: &str) -> Result<NonZeroU64, SqliteStoreError> {
    require_id(connection.last_insert_rowid(), label)
}

/// Parses a stored amount/currency pair into money.
fn parse_money(amount: &str, currency: &str) -> Result<Money, SqliteStoreError> {
    let currency = CurrencyCode::new(currency)
        .map_err(|err| SqliteStoreError::Corrupt(format!("stored currency invalid: {err}")))?;
    Money::parse(amount, currency)
        .ok_or_else(|| SqliteStoreError::Corrupt("stored amount is not a decimal".to_string()))
}

/// Parses a stored ISO date, failing closed on malformed text.
fn require_date(value: &str, label: &str) -> Result<Date, SqliteStoreError> {
    parse_date(value).ok_or_else(|| SqliteStoreError::Corrupt(format!("invalid {label}: {value}")))
}

/// Returns whether a `rusqlite` error is a constraint violation.
fn is_constraint_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

// ============================================================================
// SECTION: Connection Setup
// ============================================================================

/// Ensures the parent directory of the store path exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS tenants (
                    tenant_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    disabled INTEGER NOT NULL DEFAULT 0,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS tenant_hosts (
                    host TEXT PRIMARY KEY,
                    tenant_id INTEGER NOT NULL REFERENCES tenants(tenant_id)
                );
                CREATE TABLE IF NOT EXISTS accounts (
                    account_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    tenant_id INTEGER NOT NULL REFERENCES tenants(tenant_id),
                    name TEXT NOT NULL,
                    street TEXT NOT NULL,
                    city TEXT NOT NULL,
                    region TEXT NOT NULL,
                    postal_code TEXT NOT NULL,
                    country TEXT NOT NULL,
                    lookup_id TEXT NOT NULL,
                    disabled INTEGER NOT NULL DEFAULT 0,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL,
                    UNIQUE (tenant_id, lookup_id)
                );
                CREATE INDEX IF NOT EXISTS idx_accounts_tenant
                    ON accounts (tenant_id);
                CREATE TABLE IF NOT EXISTS application_members (
                    principal_id INTEGER PRIMARY KEY
                );
                CREATE TABLE IF NOT EXISTS tenant_members (
                    principal_id INTEGER NOT NULL,
                    tenant_id INTEGER NOT NULL REFERENCES tenants(tenant_id),
                    PRIMARY KEY (principal_id, tenant_id)
                );
                CREATE TABLE IF NOT EXISTS account_members (
                    principal_id INTEGER NOT NULL,
                    account_id INTEGER NOT NULL REFERENCES accounts(account_id),
                    PRIMARY KEY (principal_id, account_id)
                );
                CREATE TABLE IF NOT EXISTS roles (
                    role_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    tenant_id INTEGER NOT NULL REFERENCES tenants(tenant_id),
                    name TEXT NOT NULL,
                    UNIQUE (tenant_id, name)
                );
                CREATE TABLE IF NOT EXISTS role_assignments (
                    principal_id INTEGER NOT NULL,
                    role_id INTEGER NOT NULL REFERENCES roles(role_id),
                    PRIMARY KEY (principal_id, role_id)
                );
                CREATE TABLE IF NOT EXISTS schedules (
                    schedule_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    account_id INTEGER NOT NULL REFERENCES accounts(account_id),
                    name TEXT NOT NULL,
                    amount TEXT NOT NULL,
                    currency TEXT NOT NULL,
                    day_of_month INTEGER NOT NULL,
                    month_interval INTEGER NOT NULL,
                    begin_date TEXT NOT NULL,
                    end_date TEXT NOT NULL,
                    disabled INTEGER NOT NULL DEFAULT 0,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_schedules_account
                    ON schedules (account_id);
                CREATE INDEX IF NOT EXISTS idx_schedules_window
                    ON schedules (begin_date, end_date);
                CREATE TABLE IF NOT EXISTS bills (
                    bill_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    account_id INTEGER NOT NULL REFERENCES accounts(account_id),
                    name TEXT NOT NULL,
                    amount TEXT NOT NULL,
                    currency TEXT NOT NULL,
                    due_date TEXT NOT NULL,
                    schedule_id INTEGER REFERENCES schedules(schedule_id),
                    external_ref TEXT,
                    disabled INTEGER NOT NULL DEFAULT 0,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_bills_account
                    ON bills (account_id);
                CREATE UNIQUE INDEX IF NOT EXISTS idx_bills_schedule_due
                    ON bills (schedule_id, due_date)
                    WHERE schedule_id IS NOT NULL;",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::*;

    #[test]
    fn config_defaults_apply() {
        let config: SqliteStoreConfig = toml::from_str("path = \"/tmp/tally.db\"").unwrap();
        assert_eq!(config.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
        assert_eq!(config.journal_mode, SqliteJournalMode::Wal);
        assert_eq!(config.sync_mode, SqliteSyncMode::Full);
        assert_eq!(config.read_pool_size, 4);
    }

    #[test]
    fn empty_path_rejected() {
        assert!(matches!(
            validate_store_path(Path::new("")),
            Err(SqliteStoreError::Invalid(_))
        ));
    }

    #[test]
    fn zero_read_pool_rejected() {
        let config = SqliteStoreConfig {
            path: PathBuf::from("/tmp/tally.db"),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteJournalMode::Wal,
            sync_mode: SqliteSyncMode::Full,
            read_pool_size: 0,
        };
        assert!(matches!(
            validate_runtime_limits(&config),
            Err(SqliteStoreError::Invalid(_))
        ));
    }

    #[test]
    fn overlong_component_rejected() {
        let long = "a".repeat(MAX_PATH_COMPONENT_LENGTH + 1);
        let path = PathBuf::from(format!("/tmp/{long}/tally.db"));
        assert!(matches!(
            validate_store_path(&path),
            Err(SqliteStoreError::Invalid(_))
        ));
    }

    #[test]
    fn id_round_trip() {
        let id = require_id(42, "tenant").unwrap();
        assert_eq!(id.get(), 42);
        assert!(require_id(0, "tenant").is_err());
        assert!(require_id(-7, "tenant").is_err());
    }
}
