//! The three entity collections and their persistence.
//!
//! Each mutation builds the next state of the affected collection, writes it to the store, and
//! only then replaces the in-memory copy. A failed write therefore leaves memory and storage in
//! agreement.

use crate::model::{Item, Items, Project, Projects, Transaction, Transactions, User, Users};
use crate::store::{Store, PROJECTS_KEY, TRANSACTIONS_KEY, USERS_KEY};
use crate::Result;
use anyhow::{bail, ensure};
use serde::Serialize;
use tracing::{debug, info};

/// The label used wherever a transaction's project cannot be found.
pub const UNKNOWN_PROJECT: &str = "Unknown";

/// What `Ledger::delete_project` removed.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDeletion {
    pub project: Project,
    pub transactions_removed: usize,
}

/// Projects, transactions and users, hydrated from and written back to a [`Store`].
#[derive(Debug)]
pub struct Ledger {
    store: Store,
    projects: Projects,
    transactions: Transactions,
    users: Users,
}

impl Ledger {
    /// Reads all three collections. A missing or malformed users record yields the bootstrap
    /// administrator; missing or malformed projects and transactions yield empty collections.
    pub fn load(store: Store) -> Self {
        let projects: Projects = store.load(PROJECTS_KEY, Items::default);
        let transactions: Transactions = store.load(TRANSACTIONS_KEY, Items::default);
        let users: Users = store.load(USERS_KEY, bootstrap_users);
        debug!(
            "Loaded {} projects, {} transactions and {} users",
            projects.len(),
            transactions.len(),
            users.len()
        );
        Self {
            store,
            projects,
            transactions,
            users,
        }
    }

    pub fn projects(&self) -> &Projects {
        &self.projects
    }

    pub fn transactions(&self) -> &Transactions {
        &self.transactions
    }

    pub fn users(&self) -> &Users {
        &self.users
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// The name of the project with `project_id`, or `Unknown`.
    pub fn project_name(&self, project_id: &str) -> &str {
        self.projects
            .get(project_id)
            .map(|p| p.name.as_str())
            .unwrap_or(UNKNOWN_PROJECT)
    }

    /// Finds a user by username, ignoring case.
    pub fn find_user(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.has_username(username))
    }

    // Projects

    /// Adds `project` at the front of the list.
    pub fn add_project(&mut self, project: Project) -> Result<()> {
        ensure!(
            !project.name.trim().is_empty(),
            "A project must have a name"
        );
        let mut next = self.projects.clone();
        next.prepend(project)?;
        self.commit_projects(next)
    }

    /// Replaces the project with the same id. Returns `false` when there is no such project, in
    /// which case nothing is written.
    pub fn update_project(&mut self, project: Project) -> Result<bool> {
        let mut next = self.projects.clone();
        if !next.update(project) {
            return Ok(false);
        }
        self.commit_projects(next)?;
        Ok(true)
    }

    /// Deletes the project and every transaction that references it, as one operation.
    ///
    /// The transactions are written before the projects: if the second write fails, the project
    /// is still present but none of its transactions are, so no transaction is ever left pointing
    /// at a missing project.
    pub fn delete_project(&mut self, id: &str) -> Result<Option<ProjectDeletion>> {
        let mut next_projects = self.projects.clone();
        let project = match next_projects.delete(id) {
            Some(project) => project,
            None => return Ok(None),
        };
        let mut next_transactions = self.transactions.clone();
        let transactions_removed = next_transactions.retain(|t| t.project_id() != id);

        self.commit_transactions(next_transactions)?;
        self.commit_projects(next_projects)?;
        info!(
            "Deleted project '{}' and {} of its transactions",
            project.id, transactions_removed
        );
        Ok(Some(ProjectDeletion {
            project,
            transactions_removed,
        }))
    }

    // Transactions

    /// Adds `transaction` at the front of the list. Its project must exist.
    pub fn add_transaction(&mut self, transaction: Transaction) -> Result<()> {
        self.check_project_reference(&transaction)?;
        let mut next = self.transactions.clone();
        next.prepend(transaction)?;
        self.commit_transactions(next)
    }

    /// Replaces the transaction with the same id. Returns `false` when there is no such
    /// transaction, in which case nothing is written.
    pub fn update_transaction(&mut self, transaction: Transaction) -> Result<bool> {
        if !self.transactions.contains(transaction.id()) {
            return Ok(false);
        }
        self.check_project_reference(&transaction)?;
        let mut next = self.transactions.clone();
        let _ = next.update(transaction);
        self.commit_transactions(next)?;
        Ok(true)
    }

    pub fn delete_transaction(&mut self, id: &str) -> Result<Option<Transaction>> {
        let mut next = self.transactions.clone();
        let removed = next.delete(id);
        if removed.is_some() {
            self.commit_transactions(next)?;
        }
        Ok(removed)
    }

    /// Transactions whose description, project name or category contains `query`, ignoring case.
    /// An empty query matches everything.
    pub fn search_transactions(&self, query: &str) -> Vec<&Transaction> {
        let needle = query.trim().to_lowercase();
        self.transactions
            .iter()
            .filter(|t| {
                needle.is_empty()
                    || t.description().to_lowercase().contains(&needle)
                    || self
                        .project_name(t.project_id())
                        .to_lowercase()
                        .contains(&needle)
                    || t.category()
                        .is_some_and(|c| c.to_string().to_lowercase().contains(&needle))
            })
            .collect()
    }

    // Users

    /// Adds `user` at the end of the list. Usernames are unique regardless of case.
    pub fn add_user(&mut self, user: User) -> Result<()> {
        ensure!(
            !user.username.trim().is_empty(),
            "A user must have a username"
        );
        self.check_username_free(&user)?;
        let mut next = self.users.clone();
        next.append(user)?;
        self.commit_users(next)
    }

    /// Replaces the user with the same id. Returns `false` when there is no such user, in which
    /// case nothing is written.
    pub fn update_user(&mut self, user: User) -> Result<bool> {
        if !self.users.contains(user.id()) {
            return Ok(false);
        }
        self.check_username_free(&user)?;
        let mut next = self.users.clone();
        let _ = next.update(user);
        self.commit_users(next)?;
        Ok(true)
    }

    /// Deletes the user. Projects and transactions are not affected.
    pub fn delete_user(&mut self, id: &str) -> Result<Option<User>> {
        let mut next = self.users.clone();
        let removed = next.delete(id);
        if removed.is_some() {
            self.commit_users(next)?;
        }
        Ok(removed)
    }

    fn check_project_reference(&self, transaction: &Transaction) -> Result<()> {
        if !self.projects.contains(transaction.project_id()) {
            bail!(
                "Transaction '{}' references project '{}' which does not exist",
                transaction.id(),
                transaction.project_id()
            );
        }
        Ok(())
    }

    fn check_username_free(&self, user: &User) -> Result<()> {
        if let Some(existing) = self.find_user(&user.username) {
            if existing.id != user.id {
                bail!("The username '{}' is already taken", user.username);
            }
        }
        Ok(())
    }

    fn commit_projects(&mut self, next: Projects) -> Result<()> {
        self.store.save(PROJECTS_KEY, &next)?;
        self.projects = next;
        Ok(())
    }

    fn commit_transactions(&mut self, next: Transactions) -> Result<()> {
        self.store.save(TRANSACTIONS_KEY, &next)?;
        self.transactions = next;
        Ok(())
    }

    fn commit_users(&mut self, next: Users) -> Result<()> {
        self.store.save(USERS_KEY, &next)?;
        self.users = next;
        Ok(())
    }
}

fn bootstrap_users() -> Users {
    let mut users = Users::default();
    // A fresh collection cannot already contain the admin id.
    let _ = users.append(User::bootstrap_admin());
    users
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserRole;
    use crate::store::{MemoryStorage, Storage};
    use crate::test::{expense, income, project};

    fn ledger() -> Ledger {
        Ledger::load(Store::new(MemoryStorage::new()))
    }

    fn seeded() -> Ledger {
        let mut ledger = ledger();
        ledger.add_project(project("p1", "Grand Hotel")).unwrap();
        ledger.add_project(project("p2", "Seaside Inn")).unwrap();
        ledger.add_transaction(income("t1", "p1", "500")).unwrap();
        ledger.add_transaction(expense("t2", "p1", "200")).unwrap();
        ledger.add_transaction(income("t3", "p2", "75")).unwrap();
        ledger
    }

    /// A storage that refuses to write one key.
    #[derive(Debug, Default)]
    struct RefusingStorage {
        inner: MemoryStorage,
        refuse: Option<&'static str>,
    }

    impl Storage for RefusingStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>> {
            self.inner.get_item(key)
        }

        fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
            if self.refuse == Some(key) {
                bail!("quota exceeded");
            }
            self.inner.set_item(key, value)
        }

        fn remove_item(&mut self, key: &str) -> Result<()> {
            self.inner.remove_item(key)
        }
    }

    #[test]
    fn test_empty_store_has_bootstrap_admin() {
        let ledger = ledger();
        assert!(ledger.projects().is_empty());
        assert!(ledger.transactions().is_empty());
        assert_eq!(ledger.users().len(), 1);
        let admin = ledger.find_user("ADMIN").unwrap();
        assert_eq!(admin.role, UserRole::Admin);
    }

    #[test]
    fn test_malformed_users_fall_back_to_bootstrap_admin() {
        let mut storage = MemoryStorage::new();
        storage.set_item(USERS_KEY, "[{\"id\": 1}").unwrap();
        storage.set_item(PROJECTS_KEY, "undefined").unwrap();
        let ledger = Ledger::load(Store::new(storage));
        assert_eq!(ledger.users().data()[0].username, "admin");
        assert!(ledger.projects().is_empty());
    }

    #[test]
    fn test_new_items_are_prepended_and_persisted() {
        let ledger = seeded();
        let ids: Vec<&str> = ledger.transactions().iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec!["t3", "t2", "t1"]);
        let reloaded = Ledger::load(Store::new(copy_storage(&ledger)));
        assert_eq!(reloaded.projects(), ledger.projects());
        assert_eq!(reloaded.transactions(), ledger.transactions());
    }

    fn copy_storage(ledger: &Ledger) -> MemoryStorage {
        let mut storage = MemoryStorage::new();
        for key in [PROJECTS_KEY, TRANSACTIONS_KEY, USERS_KEY] {
            if let Some(raw) = ledger.store().raw(key).unwrap() {
                storage.set_item(key, &raw).unwrap();
            }
        }
        storage
    }

    #[test]
    fn test_delete_project_cascades() {
        let mut ledger = seeded();
        let deletion = ledger.delete_project("p1").unwrap().unwrap();
        assert_eq!(deletion.project.id, "p1");
        assert_eq!(deletion.transactions_removed, 2);
        assert!(ledger
            .transactions()
            .iter()
            .all(|t| t.project_id() != "p1"));
        assert_eq!(ledger.transactions().len(), 1);

        let reloaded = Ledger::load(Store::new(copy_storage(&ledger)));
        assert!(!reloaded.projects().contains("p1"));
        assert!(reloaded
            .transactions()
            .iter()
            .all(|t| t.project_id() != "p1"));
    }

    #[test]
    fn test_delete_missing_project_is_noop() {
        let mut ledger = seeded();
        assert!(ledger.delete_project("nope").unwrap().is_none());
        assert_eq!(ledger.projects().len(), 2);
        assert_eq!(ledger.transactions().len(), 3);
    }

    #[test]
    fn test_delete_project_failed_project_write_leaves_no_orphans() {
        let mut ledger = Ledger::load(Store::new(RefusingStorage::default()));
        ledger.add_project(project("p1", "Grand Hotel")).unwrap();
        ledger.add_transaction(income("t1", "p1", "10")).unwrap();

        let storage = RefusingStorage {
            inner: copy_storage(&ledger),
            refuse: Some(PROJECTS_KEY),
        };
        let mut ledger = Ledger::load(Store::new(storage));

        assert!(ledger.delete_project("p1").is_err());
        assert!(ledger.projects().contains("p1"));
        assert!(ledger.transactions().is_empty());
        let raw = ledger.store().raw(TRANSACTIONS_KEY).unwrap().unwrap();
        assert_eq!(raw, "[]");
    }

    #[test]
    fn test_failed_write_keeps_memory_unchanged() {
        let storage = RefusingStorage {
            inner: MemoryStorage::new(),
            refuse: Some(PROJECTS_KEY),
        };
        let mut ledger = Ledger::load(Store::new(storage));
        let err = ledger.add_project(project("p1", "Grand Hotel")).unwrap_err();
        assert!(format!("{err:#}").contains("quota exceeded"));
        assert!(ledger.projects().is_empty());
    }

    #[test]
    fn test_update_unchanged_is_byte_identical() {
        let mut ledger = seeded();
        let before_t = ledger.store().raw(TRANSACTIONS_KEY).unwrap();
        let before_p = ledger.store().raw(PROJECTS_KEY).unwrap();
        let t = ledger.transactions().get("t2").unwrap().clone();
        let p = ledger.projects().get("p1").unwrap().clone();
        assert!(ledger.update_transaction(t).unwrap());
        assert!(ledger.update_project(p).unwrap());
        assert_eq!(ledger.store().raw(TRANSACTIONS_KEY).unwrap(), before_t);
        assert_eq!(ledger.store().raw(PROJECTS_KEY).unwrap(), before_p);
    }

    #[test]
    fn test_update_missing_is_noop() {
        let mut ledger = seeded();
        assert!(!ledger.update_project(project("p9", "Nowhere")).unwrap());
        assert!(!ledger
            .update_transaction(income("t9", "p1", "1"))
            .unwrap());
        assert_eq!(ledger.projects().len(), 2);
        assert_eq!(ledger.transactions().len(), 3);
    }

    #[test]
    fn test_transaction_requires_existing_project() {
        let mut ledger = seeded();
        let err = ledger
            .add_transaction(income("t9", "ghost", "1"))
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
        assert!(!ledger.transactions().contains("t9"));
    }

    #[test]
    fn test_project_name_unknown() {
        let ledger = seeded();
        assert_eq!(ledger.project_name("p1"), "Grand Hotel");
        assert_eq!(ledger.project_name("gone"), UNKNOWN_PROJECT);
    }

    #[test]
    fn test_search_transactions() {
        let ledger = seeded();
        let ids = |q: &str| -> Vec<String> {
            ledger
                .search_transactions(q)
                .iter()
                .map(|t| t.id().to_string())
                .collect()
        };
        assert_eq!(ids("seaside"), vec!["t3"]);
        assert_eq!(ids("PAYROLL"), vec!["t2"]);
        assert_eq!(ids("income t1"), vec!["t1"]);
        assert_eq!(ids("").len(), 3);
        assert!(ids("zzz").is_empty());
    }

    #[test]
    fn test_users_unique_case_insensitive() {
        let mut ledger = ledger();
        let err = ledger
            .add_user(User::new("2", "Admin", UserRole::Staff))
            .unwrap_err();
        assert!(err.to_string().contains("already taken"));
        ledger
            .add_user(User::new("2", "maria", UserRole::Staff))
            .unwrap();
        let ids: Vec<&str> = ledger.users().iter().map(|u| u.id()).collect();
        assert_eq!(ids, vec!["1", "2"]);

        let mut renamed = ledger.users().get("2").unwrap().clone();
        renamed.username = "ADMIN".to_string();
        assert!(ledger.update_user(renamed).is_err());
    }

    #[test]
    fn test_delete_user_leaves_data_alone() {
        let mut ledger = seeded();
        ledger
            .add_user(User::new("2", "maria", UserRole::Staff))
            .unwrap();
        assert!(ledger.delete_user("2").unwrap().is_some());
        assert!(ledger.delete_user("2").unwrap().is_none());
        assert_eq!(ledger.projects().len(), 2);
        assert_eq!(ledger.transactions().len(), 3);
    }
}
