// crates/tally-core/src/runtime/memory.rs
// ============================================================================
// Module: Tally In-Memory Store
// Description: In-memory implementation of every store interface.
// Purpose: Back tests and examples without a database.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryStore`] implements all six store interfaces over mutex-guarded
//! maps. It mirrors the durable store's visible semantics — soft-disable
//! filtering, composite lookup uniqueness, idempotent occurrence creation —
//! so runtime services behave identically against either backend.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::num::NonZeroU64;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use time::Date;

use crate::core::account::Account;
use crate::core::account::NewAccount;
use crate::core::account::UpdateAccount;
use crate::core::billing::Bill;
use crate::core::billing::BillSchedule;
use crate::core::billing::NewBill;
use crate::core::billing::NewSchedule;
use crate::core::identifiers::AccountId;
use crate::core::identifiers::BillId;
use crate::core::identifiers::HostName;
use crate::core::identifiers::LookupId;
use crate::core::identifiers::PrincipalId;
use crate::core::identifiers::RoleId;
use crate::core::identifiers::RoleName;
use crate::core::identifiers::ScheduleId;
use crate::core::identifiers::TenantId;
use crate::core::membership::Role;
use crate::core::tenant::NewTenant;
use crate::core::tenant::Tenant;
use crate::core::time::Timestamp;
use crate::core::time::format_date;
use crate::interfaces::AccountStore;
use crate::interfaces::BillOutcome;
use crate::interfaces::BillStore;
use crate::interfaces::MembershipStore;
use crate::interfaces::RoleStore;
use crate::interfaces::ScheduleStore;
use crate::interfaces::StoreError;
use crate::interfaces::TenantDirectory;
use crate::runtime::recurrence::is_active;

// ============================================================================
// SECTION: Storage
// ============================================================================

/// Mutable table state behind the store mutex.
#[derive(Debug, Default)]
struct Inner {
    /// Monotonic identifier source shared by every table.
    next_id: u64,
    /// Tenant rows keyed by identifier.
    tenants: BTreeMap<TenantId, Tenant>,
    /// Host bindings keyed by normalized host.
    hosts: BTreeMap<HostName, TenantId>,
    /// Account rows keyed by identifier.
    accounts: BTreeMap<AccountId, Account>,
    /// Application-wide member set.
    app_members: BTreeSet<PrincipalId>,
    /// Tenant-level membership pairs.
    tenant_members: BTreeSet<(PrincipalId, TenantId)>,
    /// Account-level membership pairs.
    account_members: BTreeSet<(PrincipalId, AccountId)>,
    /// Role rows keyed by identifier.
    roles: BTreeMap<RoleId, Role>,
    /// Role assignment pairs.
    assignments: BTreeSet<(PrincipalId, RoleId)>,
    /// Schedule rows keyed by identifier.
    schedules: BTreeMap<ScheduleId, BillSchedule>,
    /// Bill rows keyed by identifier.
    bills: BTreeMap<BillId, Bill>,
}

impl Inner {
    /// Allocates the next non-zero identifier.
    fn allocate(&mut self) -> Result<NonZeroU64, StoreError> {
        self.next_id += 1;
        NonZeroU64::new(self.next_id)
            .ok_or_else(|| StoreError::Store("identifier allocation overflowed".to_string()))
    }
}

/// In-memory store implementing every Tally store interface.
///
/// # Invariants
/// - Table access is serialized through a mutex; clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    /// Shared table state.
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the table state, mapping poisoning onto a store error.
    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Store("store lock poisoned".to_string()))
    }

    /// Soft-disables a tenant (test and provisioning surface).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lock cannot be acquired.
    pub fn disable_tenant(&self, tenant_id: TenantId) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if let Some(tenant) = inner.tenants.get_mut(&tenant_id) {
            tenant.disabled = true;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Tenant Directory
// ============================================================================

impl TenantDirectory for InMemoryStore {
    fn tenant_by_host(&self, host: &HostName) -> Result<Option<TenantId>, StoreError> {
        Ok(self.lock()?.hosts.get(host).copied())
    }

    fn tenant_by_id(&self, tenant_id: TenantId) -> Result<Option<Tenant>, StoreError> {
        Ok(self
            .lock()?
            .tenants
            .get(&tenant_id)
            .filter(|tenant| !tenant.disabled)
            .cloned())
    }

    fn create_tenant(&self, tenant: NewTenant) -> Result<Tenant, StoreError> {
        let mut inner = self.lock()?;
        let id = TenantId::new(inner.allocate()?);
        let record = Tenant {
            id,
            name: tenant.name,
            disabled: false,
            created_at: tenant.created_at,
            updated_at: tenant.created_at,
        };
        inner.tenants.insert(id, record.clone());
        Ok(record)
    }

    fn bind_host(&self, host: HostName, tenant_id: TenantId) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if let Some(existing) = inner.hosts.get(&host)
            && *existing != tenant_id
        {
            return Err(StoreError::Invalid(format!(
                "host {host} is already bound to tenant {existing}"
            )));
        }
        inner.hosts.insert(host, tenant_id);
        Ok(())
    }
}

// ============================================================================
// SECTION: Membership Store
// ============================================================================

impl MembershipStore for InMemoryStore {
    fn is_application_member(&self, principal_id: PrincipalId) -> Result<bool, StoreError> {
        Ok(self.lock()?.app_members.contains(&principal_id))
    }

    fn is_tenant_member(
        &self,
        principal_id: PrincipalId,
        tenant_id: TenantId,
    ) -> Result<bool, StoreError> {
        Ok(self.lock()?.tenant_members.contains(&(principal_id, tenant_id)))
    }

    fn is_account_member(
        &self,
        principal_id: PrincipalId,
        account_id: AccountId,
    ) -> Result<bool, StoreError> {
        Ok(self.lock()?.account_members.contains(&(principal_id, account_id)))
    }

    fn grant_application_membership(&self, principal_id: PrincipalId) -> Result<(), StoreError> {
        self.lock()?.app_members.insert(principal_id);
        Ok(())
    }

    fn grant_tenant_membership(
        &self,
        principal_id: PrincipalId,
        tenant_id: TenantId,
    ) -> Result<(), StoreError> {
        self.lock()?.tenant_members.insert((principal_id, tenant_id));
        Ok(())
    }

    fn grant_account_membership(
        &self,
        principal_id: PrincipalId,
        account_id: AccountId,
    ) -> Result<(), StoreError> {
        self.lock()?.account_members.insert((principal_id, account_id));
        Ok(())
    }

    fn revoke_application_membership(&self, principal_id: PrincipalId) -> Result<(), StoreError> {
        self.lock()?.app_members.remove(&principal_id);
        Ok(())
    }

    fn revoke_tenant_membership(
        &self,
        principal_id: PrincipalId,
        tenant_id: TenantId,
    ) -> Result<(), StoreError> {
        self.lock()?.tenant_members.remove(&(principal_id, tenant_id));
        Ok(())
    }

    fn revoke_account_membership(
        &self,
        principal_id: PrincipalId,
        account_id: AccountId,
    ) -> Result<(), StoreError> {
        self.lock()?.account_members.remove(&(principal_id, account_id));
        Ok(())
    }
}

// ============================================================================
// SECTION: Role Store
// ============================================================================

impl RoleStore for InMemoryStore {
    fn role_names_for(
        &self,
        principal_id: PrincipalId,
        tenant_id: TenantId,
    ) -> Result<Vec<RoleName>, StoreError> {
        let inner = self.lock()?;
        let mut names = Vec::new();
        for (principal, role_id) in &inner.assignments {
            if *principal != principal_id {
                continue;
            }
            if let Some(role) = inner.roles.get(role_id)
                && role.tenant_id == tenant_id
            {
                names.push(role.name.clone());
            }
        }
        Ok(names)
    }

    fn define_role(&self, tenant_id: TenantId, name: RoleName) -> Result<RoleId, StoreError> {
        let mut inner = self.lock()?;
        if inner
            .roles
            .values()
            .any(|role| role.tenant_id == tenant_id && role.name == name)
        {
            return Err(StoreError::Invalid(format!(
                "role {name} already exists for tenant {tenant_id}"
            )));
        }
        let id = RoleId::new(inner.allocate()?);
        inner.roles.insert(
            id,
            Role {
                id,
                tenant_id,
                name,
            },
        );
        Ok(id)
    }

    fn assign_role(&self, principal_id: PrincipalId, role_id: RoleId) -> Result<(), StoreError> {
        self.lock()?.assignments.insert((principal_id, role_id));
        Ok(())
    }

    fn revoke_role(&self, principal_id: PrincipalId, role_id: RoleId) -> Result<(), StoreError> {
        self.lock()?.assignments.remove(&(principal_id, role_id));
        Ok(())
    }
}

// ============================================================================
// SECTION: Account Store
// ============================================================================

impl AccountStore for InMemoryStore {
    fn account_by_id(&self, account_id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self
            .lock()?
            .accounts
            .get(&account_id)
            .filter(|account| !account.disabled)
            .cloned())
    }

    fn account_by_lookup(
        &self,
        tenant_id: TenantId,
        lookup_id: &LookupId,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self
            .lock()?
            .accounts
            .values()
            .find(|account| {
                !account.disabled
                    && account.tenant_id == tenant_id
                    && account.lookup_id == *lookup_id
            })
            .cloned())
    }

    fn accounts_for_tenant(&self, tenant_id: TenantId) -> Result<Vec<Account>, StoreError> {
        Ok(self
            .lock()?
            .accounts
            .values()
            .filter(|account| !account.disabled && account.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    fn create_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut inner = self.lock()?;
        if inner.accounts.values().any(|existing| {
            existing.tenant_id == account.tenant_id && existing.lookup_id == account.lookup_id
        }) {
            return Err(StoreError::Invalid(format!(
                "lookup id {} already exists for tenant {}",
                account.lookup_id, account.tenant_id
            )));
        }
        let id = AccountId::new(inner.allocate()?);
        let record = Account {
            id,
            tenant_id: account.tenant_id,
            name: account.name,
            address: account.address,
            lookup_id: account.lookup_id,
            disabled: false,
            created_at: account.created_at,
            updated_at: account.created_at,
        };
        inner.accounts.insert(id, record.clone());
        Ok(record)
    }

    fn update_account(
        &self,
        account_id: AccountId,
        update: UpdateAccount,
        updated_at: Timestamp,
    ) -> Result<Option<Account>, StoreError> {
        let mut inner = self.lock()?;
        let Some(account) = inner.accounts.get_mut(&account_id) else {
            return Ok(None);
        };
        if account.disabled {
            return Ok(None);
        }
        if let Some(name) = update.name {
            account.name = name;
        }
        if let Some(address) = update.address {
            account.address = address;
        }
        account.updated_at = updated_at;
        Ok(Some(account.clone()))
    }

    fn disable_account(
        &self,
        account_id: AccountId,
        updated_at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if let Some(account) = inner.accounts.get_mut(&account_id)
            && !account.disabled
        {
            account.disabled = true;
            account.updated_at = updated_at;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Schedule Store
// ============================================================================

impl ScheduleStore for InMemoryStore {
    fn schedule_by_id(
        &self,
        schedule_id: ScheduleId,
    ) -> Result<Option<BillSchedule>, StoreError> {
        Ok(self
            .lock()?
            .schedules
            .get(&schedule_id)
            .filter(|schedule| !schedule.disabled)
            .cloned())
    }

    fn schedules_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<BillSchedule>, StoreError> {
        Ok(self
            .lock()?
            .schedules
            .values()
            .filter(|schedule| !schedule.disabled && schedule.account_id == account_id)
            .cloned()
            .collect())
    }

    fn active_schedules(&self, as_of: Date) -> Result<Vec<BillSchedule>, StoreError> {
        Ok(self
            .lock()?
            .schedules
            .values()
            .filter(|schedule| is_active(schedule, as_of))
            .cloned()
            .collect())
    }

    fn create_schedule(&self, schedule: NewSchedule) -> Result<BillSchedule, StoreError> {
        schedule.validate().map_err(|err| StoreError::Invalid(err.to_string()))?;
        let mut inner = self.lock()?;
        let id = ScheduleId::new(inner.allocate()?);
        let record = BillSchedule {
            id,
            account_id: schedule.account_id,
            name: schedule.name.clone(),
            money: schedule.money.clone(),
            day_of_month: schedule.day_of_month,
            month_interval: schedule.month_interval,
            begin_date: schedule.begin_date,
            end_date: schedule.effective_end_date(),
            disabled: false,
            created_at: schedule.created_at,
            updated_at: schedule.created_at,
        };
        inner.schedules.insert(id, record.clone());
        Ok(record)
    }

    fn disable_schedule(
        &self,
        schedule_id: ScheduleId,
        updated_at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if let Some(schedule) = inner.schedules.get_mut(&schedule_id)
            && !schedule.disabled
        {
            schedule.disabled = true;
            schedule.updated_at = updated_at;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Bill Store
// ============================================================================

impl BillStore for InMemoryStore {
    fn bill_by_id(&self, bill_id: BillId) -> Result<Option<Bill>, StoreError> {
        Ok(self
            .lock()?
            .bills
            .get(&bill_id)
            .filter(|bill| !bill.disabled)
            .cloned())
    }

    fn bills_for_account(&self, account_id: AccountId) -> Result<Vec<Bill>, StoreError> {
        Ok(self
            .lock()?
            .bills
            .values()
            .filter(|bill| !bill.disabled && bill.account_id == account_id)
            .cloned()
            .collect())
    }

    fn create_bill(&self, bill: NewBill) -> Result<Bill, StoreError> {
        let mut inner = self.lock()?;
        let id = BillId::new(inner.allocate()?);
        let record = Bill {
            id,
            account_id: bill.account_id,
            name: bill.name,
            money: bill.money,
            due_date: bill.due_date,
            schedule_id: bill.schedule_id,
            external_ref: bill.external_ref,
            disabled: false,
            created_at: bill.created_at,
            updated_at: bill.created_at,
        };
        inner.bills.insert(id, record.clone());
        Ok(record)
    }

    fn create_from_schedule(
        &self,
        schedule: &BillSchedule,
        due_date: Date,
        created_at: Timestamp,
    ) -> Result<BillOutcome, StoreError> {
        let mut inner = self.lock()?;
        let exists = inner
            .bills
            .values()
            .any(|bill| bill.schedule_id == Some(schedule.id) && bill.due_date == due_date);
        if exists {
            return Ok(BillOutcome::AlreadyExists);
        }
        let id = BillId::new(inner.allocate()?);
        let record = Bill {
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
        };
        inner.bills.insert(id, record.clone());
        Ok(BillOutcome::Created(record))
    }
}
