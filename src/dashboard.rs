//! Summaries of the ledger for the dashboard. Everything here is recomputed from the
//! collections on each call.

use crate::model::{Amount, Projects, Transaction, TransactionType, Transactions};
use crate::Result;
use anyhow::Context;
use rust_decimal::Decimal;
use serde::Serialize;

/// The label for transactions that have no category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Income and expense totals.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct Totals {
    pub income: Amount,
    pub expense: Amount,
}

impl Totals {
    /// Income minus expense. This is the net position and may be negative.
    pub fn balance(&self) -> Decimal {
        self.income.value() - self.expense.value()
    }
}

/// Totals for one project.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub project_id: String,
    pub name: String,
    pub income: Amount,
    pub expense: Amount,
    pub balance: Decimal,
}

/// The total amount recorded under one category label.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Amount,
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Dashboard {
    pub totals: Totals,
    pub balance: Decimal,
    pub projects: Vec<ProjectSummary>,
    pub categories: Vec<CategoryTotal>,
}

impl Dashboard {
    /// # Errors
    /// Returns an error if a sum is too large to represent.
    pub fn build(projects: &Projects, transactions: &Transactions) -> Result<Self> {
        let totals = totals(transactions.iter())?;
        Ok(Self {
            totals,
            balance: totals.balance(),
            projects: by_project(projects, transactions)?,
            categories: by_category(transactions.iter())?,
        })
    }
}

fn add(total: Amount, amount: Amount) -> Result<Amount> {
    total
        .checked_add(amount)
        .with_context(|| format!("The total of {total} and {amount} is too large to represent"))
}

/// Sums amounts by transaction type.
pub fn totals<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Result<Totals> {
    let mut acc = Totals::default();
    for t in transactions {
        match t.transaction_type() {
            TransactionType::Income => acc.income = add(acc.income, t.amount())?,
            TransactionType::Expense => acc.expense = add(acc.expense, t.amount())?,
        }
    }
    Ok(acc)
}

/// Income, expense and balance for each project, in project order.
pub fn by_project(projects: &Projects, transactions: &Transactions) -> Result<Vec<ProjectSummary>> {
    projects
        .iter()
        .map(|p| {
            let t = totals(transactions.iter().filter(|t| t.project_id() == p.id))?;
            Ok(ProjectSummary {
                project_id: p.id.clone(),
                name: p.name.clone(),
                income: t.income,
                expense: t.expense,
                balance: t.balance(),
            })
        })
        .collect()
}

/// Sums amounts per category label, in the order each label is first seen. Transactions without
/// a category are counted under `Uncategorized`.
pub fn by_category<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Result<Vec<CategoryTotal>> {
    let mut out: Vec<CategoryTotal> = Vec::new();
    for t in transactions {
        let label = t
            .category()
            .map(|c| c.to_string())
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        match out.iter_mut().find(|c| c.category == label) {
            Some(entry) => entry.amount = add(entry.amount, t.amount())?,
            None => out.push(CategoryTotal {
                category: label,
                amount: t.amount(),
            }),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Items;
    use crate::test::{expense, income, project};
    use std::str::FromStr;

    #[test]
    fn test_totals_and_balance() {
        let list = [income("a", "p1", "500"), expense("b", "p1", "200")];
        let t = totals(list.iter()).unwrap();
        assert_eq!(t.income.to_string(), "500");
        assert_eq!(t.expense.to_string(), "200");
        assert_eq!(t.balance(), Decimal::from(300));
    }

    #[test]
    fn test_negative_balance() {
        let list = [income("a", "p1", "50"), expense("b", "p1", "80.5")];
        assert_eq!(totals(list.iter()).unwrap().balance(), Decimal::from_str("-30.5").unwrap());
    }

    #[test]
    fn test_by_project() {
        let projects = Items::new(vec![project("p1", "Grand"), project("p2", "Seaside")]).unwrap();
        let transactions = Items::new(vec![
            income("a", "p1", "500"),
            expense("b", "p1", "200"),
            expense("c", "p2", "40"),
            income("d", "gone", "999"),
        ])
        .unwrap();
        let summaries = by_project(&projects, &transactions).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "Grand");
        assert_eq!(summaries[0].balance, Decimal::from(300));
        assert_eq!(summaries[1].income, Amount::ZERO);
        assert_eq!(summaries[1].balance, Decimal::from(-40));
    }

    #[test]
    fn test_by_category() {
        let mut fields = expense("c", "p1", "7").fields();
        fields.category = None;
        let uncategorized = Transaction::try_from(fields).unwrap();
        let list = [
            expense("a", "p1", "10"),
            income("b", "p1", "100"),
            expense("d", "p1", "5"),
            uncategorized,
        ];
        let cats = by_category(list.iter()).unwrap();
        let flat: Vec<(&str, String)> = cats
            .iter()
            .map(|c| (c.category.as_str(), c.amount.to_string()))
            .collect();
        assert_eq!(
            flat,
            vec![
                ("Payroll & Salaries", "15".to_string()),
                ("Room Revenue", "100".to_string()),
                (UNCATEGORIZED, "7".to_string()),
            ]
        );
    }

    #[test]
    fn test_dashboard_build_empty() {
        let d = Dashboard::build(&Items::default(), &Items::default()).unwrap();
        assert_eq!(d.totals, Totals::default());
        assert_eq!(d.balance, Decimal::ZERO);
        assert!(d.projects.is_empty());
        assert!(d.categories.is_empty());
    }

    #[test]
    fn test_dashboard_build_too_large() {
        let max = "79228162514264337593543950335";
        let projects = Items::new(vec![project("p1", "Grand")]).unwrap();
        let transactions =
            Items::new(vec![income("a", "p1", max), income("b", "p1", max)]).unwrap();
        let err = Dashboard::build(&projects, &transactions).unwrap_err();
        assert!(err.to_string().contains("too large to represent"));
        assert!(by_category(transactions.iter()).is_err());
    }
}
