//! Non-interactive CLI commands.

use anyhow::Result;
use colored::Colorize;
use kharcha_core::AppCore;
use kharcha_core::conversation::{SummaryPeriod, format_summary};

pub fn list_expenses(core: &AppCore, user: &str, limit: usize) -> Result<()> {
    let expenses = core.expenses.list_by_user(user)?;

    if expenses.is_empty() {
        println!("{}", "No expenses recorded.".dimmed());
        return Ok(());
    }

    for expense in expenses.iter().take(limit) {
        println!(
            "{}  {:>10}  {:<30}  {}",
            expense.occurred_at.format("%d/%m/%Y"),
            format!("₹{:.2}", expense.amount).bold(),
            expense.description,
            expense.category.dimmed(),
        );
    }
    if expenses.len() > limit {
        println!("{}", format!("... and {} more", expenses.len() - limit).dimmed());
    }
    Ok(())
}

pub fn summary(core: &AppCore, user: &str, period: SummaryPeriod) -> Result<()> {
    let since = period.start(chrono::Utc::now());
    let expenses = core.expenses.list_by_user_since(user, since)?;
    println!("{}", format_summary(period, &expenses));
    Ok(())
}

pub fn cleanup(core: &AppCore) -> Result<()> {
    let purged = core.sweep_now()?;
    println!("Purged {} expired session(s)", purged);
    Ok(())
}
