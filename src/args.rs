//! These structs provide the CLI interface for the hotelflow CLI.

use crate::model::{
    Amount, Category, PermissionPreset, ProjectStatus, Theme, TransactionType, UserRole,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// hotelflow: Track the finances of a portfolio of hotel projects.
///
/// Projects, their income and expense transactions, and the accounts that may see or change them
/// are kept locally in the hotelflow home directory. Start with `hotelflow init`, then log in with
/// `hotelflow login admin`. The first administrator's password is `password123`.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and the configuration file.
    ///
    /// This is the first command you should run. By default the data lives in $HOME/hotelflow;
    /// pass --hotelflow-home to put it somewhere else.
    Init,
    /// Log in. The session is kept until you log out.
    Login(LoginArgs),
    /// End the current session.
    Logout,
    /// Show who is logged in and what they may do.
    Whoami,
    /// Show or change the display theme.
    Theme(ThemeArgs),
    /// List, add, update or delete hotel projects.
    Project(ProjectArgs),
    /// List, search, add, update or delete income and expense transactions.
    Transaction(TransactionArgs),
    /// Manage user accounts. Requires the manageUsers permission.
    User(UserArgs),
    /// Change your own name, email or password.
    Profile(ProfileArgs),
    /// Write a CSV backup of all transactions.
    Export(ExportArgs),
    /// Show income, expense and balance overall, per project and per category.
    Dashboard,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where hotelflow data and configuration is held. Defaults to ~/hotelflow
    #[arg(long, env = "HOTELFLOW_HOME", default_value_t = default_hotelflow_home())]
    hotelflow_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, hotelflow_home: PathBuf) -> Self {
        Self {
            log_level,
            hotelflow_home: hotelflow_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn hotelflow_home(&self) -> &DisplayPath {
        &self.hotelflow_home
    }
}

/// (Not shown): Args for the `hotelflow login` command.
#[derive(Debug, Parser, Clone)]
pub struct LoginArgs {
    /// The username, in any letter case.
    username: String,

    /// The password.
    #[arg(long, env = "HOTELFLOW_PASSWORD", hide_env_values = true)]
    password: String,
}

impl LoginArgs {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// (Not shown): Args for the `hotelflow theme` command.
#[derive(Debug, Parser, Clone)]
pub struct ThemeArgs {
    #[command(subcommand)]
    action: ThemeSubcommand,
}

impl ThemeArgs {
    pub fn action(&self) -> &ThemeSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ThemeSubcommand {
    /// Show the current theme.
    Get,
    /// Change the theme.
    Set {
        #[arg(value_enum)]
        theme: Theme,
    },
}

/// (Not shown): Args for the `hotelflow project` command.
#[derive(Debug, Parser, Clone)]
pub struct ProjectArgs {
    #[command(subcommand)]
    action: ProjectSubcommand,
}

impl ProjectArgs {
    pub fn action(&self) -> &ProjectSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProjectSubcommand {
    /// List all projects.
    List,
    /// Add a project.
    Add(AddProjectArgs),
    /// Change fields of a project.
    Update(UpdateProjectArgs),
    /// Delete a project and every transaction recorded against it.
    Delete(DeleteArgs),
}

/// (Not shown): Args for the `hotelflow project add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddProjectArgs {
    /// The project name.
    #[arg(long)]
    name: String,

    /// Where the hotel is.
    #[arg(long, default_value = "")]
    location: String,

    /// The start date, YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// One of Planning, Construction, Operational, Renovating.
    #[arg(long, default_value_t = ProjectStatus::Planning)]
    status: ProjectStatus,

    /// The budget, e.g. 1500000 or 1,500,000.00
    #[arg(long, default_value_t = Amount::ZERO)]
    budget: Amount,
}

impl AddProjectArgs {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            start_date: None,
            status: ProjectStatus::default(),
            budget: Amount::ZERO,
        }
    }

    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_budget(mut self, budget: Amount) -> Self {
        self.budget = budget;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn status(&self) -> ProjectStatus {
        self.status
    }

    pub fn budget(&self) -> Amount {
        self.budget
    }
}

/// (Not shown): Args for the `hotelflow project update` command. Fields that are not given keep
/// their current value.
#[derive(Debug, Default, Parser, Clone)]
pub struct UpdateProjectArgs {
    /// The id of the project to change.
    id: String,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    location: Option<String>,

    #[arg(long)]
    start_date: Option<NaiveDate>,

    #[arg(long)]
    status: Option<ProjectStatus>,

    #[arg(long)]
    budget: Option<Amount>,
}

impl UpdateProjectArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_budget(mut self, budget: Amount) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn status(&self) -> Option<ProjectStatus> {
        self.status
    }

    pub fn budget(&self) -> Option<Amount> {
        self.budget
    }
}

/// (Not shown): Args for the `delete` commands.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The id of the record to delete.
    id: String,
}

impl DeleteArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// (Not shown): Args for the `hotelflow transaction` command.
#[derive(Debug, Parser, Clone)]
pub struct TransactionArgs {
    #[command(subcommand)]
    action: TransactionSubcommand,
}

impl TransactionArgs {
    pub fn action(&self) -> &TransactionSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum TransactionSubcommand {
    /// List transactions, newest first.
    List(ListTransactionsArgs),
    /// Record an income or expense.
    Add(AddTransactionArgs),
    /// Change fields of a transaction.
    Update(UpdateTransactionArgs),
    /// Delete a transaction.
    Delete(DeleteArgs),
}

/// (Not shown): Args for the `hotelflow transaction list` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ListTransactionsArgs {
    /// Only show transactions whose description, project name or category contains this text,
    /// ignoring case.
    #[arg(long)]
    search: Option<String>,

    /// Only show transactions of this project id.
    #[arg(long)]
    project: Option<String>,
}

impl ListTransactionsArgs {
    pub fn new(search: Option<String>, project: Option<String>) -> Self {
        Self { search, project }
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }
}

/// (Not shown): Args for the `hotelflow transaction add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddTransactionArgs {
    /// The id of the project the transaction belongs to.
    #[arg(long)]
    project: String,

    /// INCOME or EXPENSE.
    #[arg(long = "type")]
    transaction_type: TransactionType,

    /// The category label, e.g. "Room Revenue" or "Payroll & Salaries". It must belong to the
    /// transaction type.
    #[arg(long)]
    category: Option<Category>,

    /// The amount, e.g. 1200 or 1,200.50
    #[arg(long)]
    amount: Amount,

    /// The date, YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long, default_value = "")]
    description: String,
}

impl AddTransactionArgs {
    pub fn new(
        project: impl Into<String>,
        transaction_type: TransactionType,
        category: Option<Category>,
        amount: Amount,
    ) -> Self {
        Self {
            project: project.into(),
            transaction_type,
            category,
            amount,
            date: None,
            description: String::new(),
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// (Not shown): Args for the `hotelflow transaction update` command. Fields that are not given
/// keep their current value.
#[derive(Debug, Default, Parser, Clone)]
pub struct UpdateTransactionArgs {
    /// The id of the transaction to change.
    id: String,

    #[arg(long)]
    project: Option<String>,

    #[arg(long = "type")]
    transaction_type: Option<TransactionType>,

    #[arg(long)]
    category: Option<Category>,

    #[arg(long)]
    amount: Option<Amount>,

    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long)]
    description: Option<String>,
}

impl UpdateTransactionArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn transaction_type(&self) -> Option<TransactionType> {
        self.transaction_type
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn amount(&self) -> Option<Amount> {
        self.amount
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// (Not shown): Args for the `hotelflow user` command.
#[derive(Debug, Parser, Clone)]
pub struct UserArgs {
    #[command(subcommand)]
    action: UserSubcommand,
}

impl UserArgs {
    pub fn action(&self) -> &UserSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum UserSubcommand {
    /// List all accounts.
    List,
    /// Create an account from an access-level preset.
    Add(AddUserArgs),
    /// Change an account.
    Update(UpdateUserArgs),
    /// Delete an account. Your own account cannot be deleted.
    Delete(DeleteArgs),
}

/// (Not shown): Args for the `hotelflow user add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddUserArgs {
    /// The username. It must not be taken, in any letter case.
    username: String,

    /// The access level.
    #[arg(long, value_enum, default_value_t = PermissionPreset::Staff)]
    preset: PermissionPreset,

    /// The password. Without one, the account logs in with the default password.
    #[arg(long)]
    password: Option<String>,

    #[arg(long)]
    full_name: Option<String>,

    #[arg(long)]
    email: Option<String>,
}

impl AddUserArgs {
    pub fn new(username: impl Into<String>, preset: PermissionPreset) -> Self {
        Self {
            username: username.into(),
            preset,
            password: None,
            full_name: None,
            email: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn preset(&self) -> PermissionPreset {
        self.preset
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// (Not shown): Args for the `hotelflow user update` command. Fields that are not given keep
/// their current value.
#[derive(Debug, Default, Parser, Clone)]
pub struct UpdateUserArgs {
    /// The id of the account to change.
    id: String,

    #[arg(long)]
    username: Option<String>,

    /// Replaces all permission flags with those of this preset.
    #[arg(long, value_enum)]
    preset: Option<PermissionPreset>,

    /// ADMIN, STAFF or VIEWER.
    #[arg(long)]
    role: Option<UserRole>,

    #[arg(long)]
    password: Option<String>,

    #[arg(long)]
    full_name: Option<String>,

    #[arg(long)]
    email: Option<String>,
}

impl UpdateUserArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_preset(mut self, preset: PermissionPreset) -> Self {
        self.preset = Some(preset);
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn preset(&self) -> Option<PermissionPreset> {
        self.preset
    }

    pub fn role(&self) -> Option<UserRole> {
        self.role
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// (Not shown): Args for the `hotelflow profile` command.
#[derive(Debug, Parser, Clone)]
pub struct ProfileArgs {
    #[command(subcommand)]
    action: ProfileSubcommand,
}

impl ProfileArgs {
    pub fn action(&self) -> &ProfileSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProfileSubcommand {
    /// Change your full name or email. An empty value clears the field.
    Update(UpdateProfileArgs),
    /// Change your password.
    Password(PasswordArgs),
}

/// (Not shown): Args for the `hotelflow profile update` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct UpdateProfileArgs {
    #[arg(long)]
    full_name: Option<String>,

    #[arg(long)]
    email: Option<String>,
}

impl UpdateProfileArgs {
    pub fn new(full_name: Option<String>, email: Option<String>) -> Self {
        Self { full_name, email }
    }

    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// (Not shown): Args for the `hotelflow profile password` command.
#[derive(Debug, Parser, Clone)]
pub struct PasswordArgs {
    /// The new password.
    #[arg(long, env = "HOTELFLOW_NEW_PASSWORD", hide_env_values = true)]
    password: String,

    /// The new password again.
    #[arg(long, env = "HOTELFLOW_CONFIRM_PASSWORD", hide_env_values = true)]
    confirm: String,
}

impl PasswordArgs {
    pub fn new(password: impl Into<String>, confirm: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            confirm: confirm.into(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn confirm(&self) -> &str {
        &self.confirm
    }
}

/// (Not shown): Args for the `hotelflow export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// The directory to write the backup file to.
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// The date used in the file name, YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
}

impl ExportArgs {
    pub fn new(dir: impl Into<PathBuf>, date: Option<NaiveDate>) -> Self {
        Self {
            dir: dir.into(),
            date,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

fn default_hotelflow_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("hotelflow"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --hotelflow-home or HOTELFLOW_HOME instead of relying on the \
                default hotelflow home directory. If you continue using the program right now, \
                you may have problems!",
            );
            PathBuf::from("hotelflow")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transaction_add() {
        let args = Args::try_parse_from([
            "hotelflow",
            "--hotelflow-home",
            "/tmp/hf",
            "transaction",
            "add",
            "--project",
            "p1",
            "--type",
            "EXPENSE",
            "--category",
            "Payroll & Salaries",
            "--amount",
            "1,200.50",
            "--date",
            "2024-02-01",
        ])
        .unwrap();
        assert_eq!(args.common().hotelflow_home().path(), Path::new("/tmp/hf"));
        let Command::Transaction(t) = args.command() else {
            panic!("expected a transaction command");
        };
        let TransactionSubcommand::Add(add) = t.action() else {
            panic!("expected transaction add");
        };
        assert_eq!(add.project(), "p1");
        assert_eq!(add.transaction_type(), TransactionType::Expense);
        assert_eq!(add.amount().to_string(), "1200.5");
        assert_eq!(add.description(), "");
        assert!(add.category().is_some());
    }

    #[test]
    fn test_parse_theme_and_preset() {
        let args = Args::try_parse_from(["hotelflow", "theme", "set", "royal"]).unwrap();
        assert!(matches!(
            args.command(),
            Command::Theme(t) if matches!(t.action(), ThemeSubcommand::Set { theme: Theme::Royal })
        ));

        let args =
            Args::try_parse_from(["hotelflow", "user", "add", "maria", "--preset", "manager"])
                .unwrap();
        let Command::User(u) = args.command() else {
            panic!("expected a user command");
        };
        let UserSubcommand::Add(add) = u.action() else {
            panic!("expected user add");
        };
        assert_eq!(add.preset(), PermissionPreset::Manager);
    }

    #[test]
    fn test_parse_rejects_negative_amount() {
        let result = Args::try_parse_from([
            "hotelflow",
            "project",
            "add",
            "--name",
            "Grand",
            "--budget=-5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_level_default() {
        let args = Args::try_parse_from(["hotelflow", "whoami"]).unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::INFO);
    }
}
