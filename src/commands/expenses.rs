use anyhow::Result;
use clap::{Args as ClapArgs, Subcommand};

use crate::cli::GlobalArgs;
use crate::commands::common;
use crate::models::{format_currency, Expense, ExpenseSummary};
use crate::sync::{ExpenseController, ExpenseSnapshot, Synced};

#[derive(ClapArgs)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List recorded expenses
    List,

    /// Record an expense
    Add {
        /// Category, e.g. food or transport
        category: String,

        /// Amount, e.g. 12.50
        amount: String,
    },

    /// Show totals per category
    Summary,
}

pub async fn execute(global: GlobalArgs, args: Args) -> Result<()> {
    let conn = common::connect(&global).await?;
    common::require_session(&conn).await?;
    let expenses = ExpenseController::new(conn.api.clone());

    let (synced, show_summary) = match args.command {
        Command::List => (expenses.refresh().await, false),
        Command::Add { category, amount } => (expenses.create(&category, &amount).await, true),
        Command::Summary => (expenses.refresh().await, true),
    };

    if let Synced::Applied(ExpenseSnapshot { expenses, summary }) =
        synced.map_err(common::failure)?
    {
        if show_summary {
            print_summary(&summary);
        } else {
            print_expenses(&expenses);
        }
    }
    Ok(())
}

fn print_expenses(expenses: &[Expense]) {
    if expenses.is_empty() {
        println!("No expenses recorded.");
        return;
    }

    println!("{:<17} {:<20} {:>12}", "DATE", "CATEGORY", "AMOUNT");
    println!("{}", "-".repeat(51));
    for expense in expenses {
        println!(
            "{:<17} {:<20} {:>12}",
            expense.created_at.format("%Y-%m-%d %H:%M"),
            expense.category,
            format_currency(expense.amount)
        );
    }
}

fn print_summary(summary: &ExpenseSummary) {
    println!("Total spending: {}", format_currency(summary.total_spending));
    for line in summary_lines(summary) {
        println!("  {}", line);
    }
    println!("\n{}", summary.budget_status().advice());
}

fn summary_lines(summary: &ExpenseSummary) -> Vec<String> {
    summary
        .shares()
        .iter()
        .map(|share| {
            format!(
                "{:<20} {:>12} {:>6.1}%",
                share.category,
                format_currency(share.amount),
                share.percent
            )
        })
        .collect()
}
