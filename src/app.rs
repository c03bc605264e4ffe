//! The application state: the entity collections, the session and the theme, behind one owner.
//!
//! Every mutating operation except the theme requires a logged-in user, and each one checks the
//! capability it needs against the session's resolved permissions before touching anything.

use crate::dashboard::Dashboard;
use crate::export::{self, CsvExport};
use crate::ledger::{Ledger, ProjectDeletion};
use crate::model::{
    Capability, Permissions, Project, Projects, Theme, Transaction, Transactions, User, Users,
    DEFAULT_PASSWORD,
};
use crate::session::{self, Session};
use crate::store::Store;
use crate::Result;
use anyhow::{anyhow, bail, ensure};
use chrono::NaiveDate;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The one message returned for every failed login, whatever the reason.
pub const LOGIN_REJECTED: &str = "Unauthorized access. Please verify credentials.";

const DEFAULT_LOGIN_DELAY: Duration = Duration::from_millis(1200);

/// How logins are checked.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AuthSettings {
    /// Accepted for any account that has no password of its own.
    pub default_password: String,
    /// How long a login waits before answering.
    pub login_delay: Duration,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            default_password: DEFAULT_PASSWORD.to_string(),
            login_delay: DEFAULT_LOGIN_DELAY,
        }
    }
}

#[derive(Debug)]
pub struct App {
    ledger: Ledger,
    session: Session,
    auth: AuthSettings,
}

impl App {
    /// Hydrates everything from `store`. This never fails: each unreadable record falls back to
    /// its default on its own.
    pub fn open(store: Store, auth: AuthSettings) -> Self {
        let session = Session::load(&store);
        let ledger = Ledger::load(store);
        Self {
            ledger,
            session,
            auth,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn projects(&self) -> &Projects {
        self.ledger.projects()
    }

    pub fn transactions(&self) -> &Transactions {
        self.ledger.transactions()
    }

    pub fn users(&self) -> &Users {
        self.ledger.users()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The logged-in user, if any.
    pub fn user(&self) -> Option<&User> {
        self.session.user()
    }

    pub fn permissions(&self) -> Permissions {
        self.session.permissions()
    }

    pub fn theme(&self) -> Theme {
        self.session.theme()
    }

    /// Fails unless somebody is logged in and their permissions grant `capability`.
    pub fn require(&self, capability: Capability) -> Result<()> {
        let user = self.logged_in()?;
        ensure!(
            self.session.permissions().allows(capability),
            "Permission denied: '{}' does not have the '{}' permission",
            user.username,
            capability
        );
        Ok(())
    }

    fn logged_in(&self) -> Result<&User> {
        self.session
            .user()
            .ok_or_else(|| anyhow!("You are not logged in"))
    }

    // Session

    /// Checks `username` (ignoring case) and `password` against the stored users and, on
    /// success, starts a session for the matched user with a fresh token.
    ///
    /// The answer always comes after the configured delay. Any failure returns
    /// [`LOGIN_REJECTED`] and leaves the current session as it was.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<User> {
        tokio::time::sleep(self.auth.login_delay).await;
        let matched = self
            .ledger
            .find_user(username)
            .filter(|u| match u.password.as_deref() {
                Some(stored) if stored == password => true,
                Some(stored) if !stored.is_empty() => false,
                _ => password == self.auth.default_password,
            })
            .cloned();
        let mut user = match matched {
            Some(user) => user,
            None => {
                warn!("Rejected a login for '{username}'");
                bail!(LOGIN_REJECTED);
            }
        };
        user.token = Some(session::generate_token());
        self.session.set_user(self.ledger.store_mut(), user.clone())?;
        info!("Logged in as '{}'", user.username);
        Ok(user)
    }

    /// Ends the session. Logging out when nobody is logged in is not an error.
    pub fn logout(&mut self) -> Result<()> {
        if let Some(user) = self.session.user() {
            debug!("Logging out '{}'", user.username);
        }
        self.session.clear(self.ledger.store_mut())
    }

    /// The theme is a display preference and needs no login.
    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.session.set_theme(self.ledger.store_mut(), theme)
    }

    // Projects

    pub fn add_project(&mut self, project: Project) -> Result<()> {
        self.require(Capability::AddProjects)?;
        self.ledger.add_project(project)
    }

    pub fn update_project(&mut self, project: Project) -> Result<bool> {
        self.require(Capability::EditProjects)?;
        self.ledger.update_project(project)
    }

    /// Deletes the project together with all of its transactions.
    pub fn delete_project(&mut self, id: &str) -> Result<Option<ProjectDeletion>> {
        self.require(Capability::DeleteProjects)?;
        self.ledger.delete_project(id)
    }

    // Transactions

    pub fn add_transaction(&mut self, transaction: Transaction) -> Result<()> {
        self.require(Capability::AddTransactions)?;
        self.ledger.add_transaction(transaction)
    }

    pub fn update_transaction(&mut self, transaction: Transaction) -> Result<bool> {
        self.require(Capability::EditTransactions)?;
        self.ledger.update_transaction(transaction)
    }

    pub fn delete_transaction(&mut self, id: &str) -> Result<Option<Transaction>> {
        self.require(Capability::DeleteTransactions)?;
        self.ledger.delete_transaction(id)
    }

    pub fn search_transactions(&self, query: &str) -> Result<Vec<&Transaction>> {
        self.require(Capability::ViewTransactions)?;
        Ok(self.ledger.search_transactions(query))
    }

    // Users

    pub fn add_user(&mut self, user: User) -> Result<()> {
        self.require(Capability::ManageUsers)?;
        self.ledger.add_user(user)
    }

    /// Replaces the stored user with the same id. When that is the logged-in user the session is
    /// updated too and keeps its token.
    pub fn update_user(&mut self, user: User) -> Result<bool> {
        self.require(Capability::ManageUsers)?;
        self.store_user(user)
    }

    /// Deletes another user's account. Projects and transactions are not affected.
    pub fn delete_user(&mut self, id: &str) -> Result<Option<User>> {
        self.require(Capability::ManageUsers)?;
        if self.logged_in()?.id == id {
            bail!("You cannot delete your own account");
        }
        self.ledger.delete_user(id)
    }

    // Profile

    /// Changes the logged-in user's full name and email. `None` leaves a field as it is and an
    /// empty string clears it.
    pub fn update_profile(
        &mut self,
        full_name: Option<String>,
        email: Option<String>,
    ) -> Result<User> {
        let mut user = self.own_record()?;
        if let Some(full_name) = full_name {
            user.full_name = Some(full_name).filter(|s| !s.is_empty());
        }
        if let Some(email) = email {
            user.email = Some(email).filter(|s| !s.is_empty());
        }
        self.save_own_record(user)
    }

    /// Changes the logged-in user's password. `confirm` must repeat `password`.
    pub fn change_password(&mut self, password: &str, confirm: &str) -> Result<User> {
        ensure!(password == confirm, "Passwords do not match.");
        ensure!(!password.is_empty(), "The new password must not be empty");
        let mut user = self.own_record()?;
        user.password = Some(password.to_string());
        self.save_own_record(user)
    }

    fn own_record(&self) -> Result<User> {
        let id = &self.logged_in()?.id;
        self.ledger
            .users()
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("Your account no longer exists"))
    }

    fn save_own_record(&mut self, user: User) -> Result<User> {
        let id = user.id.clone();
        if !self.store_user(user)? {
            bail!("Your account no longer exists");
        }
        self.session
            .user()
            .filter(|u| u.id == id)
            .cloned()
            .ok_or_else(|| anyhow!("You are not logged in"))
    }

    /// Writes `user` without a token to the users collection and, when it is the session user,
    /// refreshes the session with the session's token.
    fn store_user(&mut self, mut user: User) -> Result<bool> {
        let token = user.token.take();
        if !self.ledger.update_user(user.clone())? {
            return Ok(false);
        }
        let current_token = match self.session.user() {
            Some(current) if current.id == user.id => current.token.clone().or(token),
            _ => return Ok(true),
        };
        user.token = current_token;
        self.session.set_user(self.ledger.store_mut(), user)?;
        Ok(true)
    }

    // Reports

    /// The CSV backup of all transactions as of `date`.
    pub fn export_csv(&self, date: NaiveDate) -> Result<CsvExport> {
        self.require(Capability::ViewTransactions)?;
        export::export(self.transactions(), self.projects(), date)
    }

    pub fn dashboard(&self) -> Result<Dashboard> {
        self.require(Capability::ViewTransactions)?;
        Dashboard::build(self.projects(), self.transactions())
    }
}
