use anyhow::Result;
use clap::{Args as ClapArgs, Subcommand};

use crate::cli::GlobalArgs;
use crate::commands::common::{self, StdinConfirm};
use crate::models::{pending_count, Task};
use crate::sync::{Confirm, Confirmed, Synced, TaskController};

#[derive(ClapArgs)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List all tasks
    List,

    /// Add a task
    Add {
        /// Task title
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },

    /// Mark a task as completed
    Done { id: String },

    /// Mark a task as not completed
    Undo { id: String },

    /// Delete a task
    Rm {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn execute(global: GlobalArgs, args: Args) -> Result<()> {
    let conn = common::connect(&global).await?;
    common::require_session(&conn).await?;
    let tasks = TaskController::new(conn.api.clone());

    let synced = match args.command {
        Command::List => tasks.list().await,
        Command::Add { title } => tasks.create(&title.join(" ")).await,
        Command::Done { id } => tasks.toggle(&id, true).await,
        Command::Undo { id } => tasks.toggle(&id, false).await,
        Command::Rm { id, yes } => {
            let confirm: &dyn Confirm = if yes { &Confirmed } else { &StdinConfirm };
            match tasks.delete(&id, confirm).await.map_err(common::failure)? {
                Some(synced) => Ok(synced),
                None => {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
        }
    }
    .map_err(common::failure)?;

    if let Synced::Applied(list) = synced {
        print_tasks(&list);
    }
    Ok(())
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks yet.");
        return;
    }

    println!("{:<38} {:<4} TITLE", "ID", "");
    println!("{}", "-".repeat(60));
    for task in tasks {
        println!("{}", task_line(task));
    }
    println!("\n{} pending, {} total", pending_count(tasks), tasks.len());
}

fn task_line(task: &Task) -> String {
    format!("{:<38} {:<4} {}", task.id, task.checkbox(), task.title)
}
