//! Types that represent the core data model: projects, transactions, users and their
//! permissions, and the theme preference.
mod amount;
mod items;
pub mod permissions;
mod project;
mod theme;
mod transaction;
mod user;

pub use amount::{currency, Amount, AmountError};
pub use items::{Item, Items};
pub use permissions::{Capability, PermissionPreset, Permissions};
pub use project::{Project, ProjectStatus, Projects};
pub use theme::Theme;
pub use transaction::{
    Category, ExpenseCategory, IncomeCategory, Transaction, TransactionFields, TransactionType,
    Transactions,
};
pub(crate) use user::generate_id;
pub use user::{
    User, UserRole, Users, BOOTSTRAP_ADMIN_ID, BOOTSTRAP_ADMIN_USERNAME, DEFAULT_PASSWORD,
};
