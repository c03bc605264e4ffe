use crate::commands::Out;
use crate::dashboard::Dashboard;
use crate::model::currency;
use crate::{Config, Result};

/// Handles `hotelflow dashboard`. Requires `viewTransactions`.
pub async fn dashboard(config: Config) -> Result<Out<Dashboard>> {
    let app = config.open()?;
    let dashboard = app.dashboard()?;
    Ok(Out::new(render(&dashboard), dashboard))
}

fn render(d: &Dashboard) -> String {
    let mut s = format!(
        "Income {}  Expense {}  Balance {}",
        d.totals.income.currency(),
        d.totals.expense.currency(),
        currency(d.balance)
    );
    if !d.projects.is_empty() {
        s.push_str("\n\nBy project:");
        for p in &d.projects {
            s.push_str(&format!(
                "\n  {}  income {}  expense {}  balance {}",
                p.name,
                p.income.currency(),
                p.expense.currency(),
                currency(p.balance)
            ));
        }
    }
    if !d.categories.is_empty() {
        s.push_str("\n\nBy category:");
        for c in &d.categories {
            s.push_str(&format!("\n  {}  {}", c.category, c.amount.currency()));
        }
    }
    s
}
