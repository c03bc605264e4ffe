use crate::model::{Amount, Item, Items};
use crate::Result;
use anyhow::{bail, ensure};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The transactions collection.
pub type Transactions = Items<Transaction>;

/// Whether money came in or went out.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    #[default]
    Income,
    Expense,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// The categories an `INCOME` transaction may use.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum IncomeCategory {
    #[serde(rename = "Room Revenue")]
    RoomRevenue,
    #[serde(rename = "F&B Sales")]
    FoodBeverage,
    #[serde(rename = "Event Bookings")]
    Events,
    #[serde(rename = "Spa & Wellness")]
    SpaWellness,
    #[serde(rename = "Laundry Services")]
    Laundry,
    #[serde(rename = "Miscellaneous Income")]
    MiscIncome,
}

serde_plain::derive_display_from_serialize!(IncomeCategory);
serde_plain::derive_fromstr_from_deserialize!(IncomeCategory);

/// The categories an `EXPENSE` transaction may use.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    #[serde(rename = "Payroll & Salaries")]
    Payroll,
    #[serde(rename = "Utilities (Energy/Water)")]
    Utilities,
    #[serde(rename = "Property Maintenance")]
    Maintenance,
    #[serde(rename = "Supplies & Inventory")]
    Inventory,
    #[serde(rename = "Marketing & Ads")]
    Marketing,
    #[serde(rename = "Taxes & Insurance")]
    TaxInsurance,
    #[serde(rename = "Other Expenses")]
    OtherExpense,
}

serde_plain::derive_display_from_serialize!(ExpenseCategory);
serde_plain::derive_fromstr_from_deserialize!(ExpenseCategory);

/// A transaction category. The label strings of the two families never overlap, so a stored
/// label identifies its family on its own.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Category {
    Income(IncomeCategory),
    Expense(ExpenseCategory),
}

impl Category {
    /// The transaction type this category belongs to.
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Category::Income(_) => TransactionType::Income,
            Category::Expense(_) => TransactionType::Expense,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Income(c) => Display::fmt(c, f),
            Category::Expense(c) => Display::fmt(c, f),
        }
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(c) = IncomeCategory::from_str(s) {
            return Ok(Category::Income(c));
        }
        if let Ok(c) = ExpenseCategory::from_str(s) {
            return Ok(Category::Expense(c));
        }
        bail!("Unknown category '{s}'")
    }
}

/// The unvalidated fields of a transaction. This is what is read from storage and what callers
/// fill in to create or edit a transaction; converting it into a [`Transaction`] checks it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFields {
    pub id: String,
    pub project_id: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub category: Option<Category>,
    pub amount: Amount,
    #[serde(default)]
    pub description: String,
}

/// A dated income or expense tied to one project.
///
/// A present category always belongs to the family matching the transaction type. A missing
/// category is tolerated for older records and reported as `Uncategorized`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TransactionFields")]
pub struct Transaction {
    id: String,
    project_id: String,
    date: NaiveDate,
    #[serde(rename = "type")]
    transaction_type: TransactionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<Category>,
    amount: Amount,
    description: String,
}

impl TryFrom<TransactionFields> for Transaction {
    type Error = anyhow::Error;

    fn try_from(fields: TransactionFields) -> Result<Self> {
        ensure!(!fields.id.trim().is_empty(), "A transaction must have an id");
        ensure!(
            !fields.project_id.trim().is_empty(),
            "Transaction '{}' must reference a project",
            fields.id
        );
        if let Some(category) = fields.category {
            ensure!(
                category.transaction_type() == fields.transaction_type,
                "Category '{}' cannot be used for an {} transaction",
                category,
                fields.transaction_type
            );
        }
        Ok(Self {
            id: fields.id,
            project_id: fields.project_id,
            date: fields.date,
            transaction_type: fields.transaction_type,
            category: fields.category,
            amount: fields.amount,
            description: fields.description,
        })
    }
}

impl Transaction {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
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

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns a copy of the fields, e.g. as the starting point of an edit.
    pub fn fields(&self) -> TransactionFields {
        TransactionFields {
            id: self.id.clone(),
            project_id: self.project_id.clone(),
            date: self.date,
            transaction_type: self.transaction_type,
            category: self.category,
            amount: self.amount,
            description: self.description.clone(),
        }
    }
}

impl Item for Transaction {
    const KIND: &'static str = "transaction";

    fn id(&self) -> &str {
        &self.id
    }
}
