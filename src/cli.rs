use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{ai, dash, expenses, login, register, tasks};

#[derive(Parser)]
#[command(name = "padash")]
#[command(about = "Personal Assistant Dashboard - tasks, expenses and AI advice from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Custom config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, e.g. http://127.0.0.1:3000/api
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Where the sign-in token is stored
    #[arg(long, global = true)]
    pub token_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session token
    Login(login::Args),

    /// Create an account
    Register(register::Args),

    /// Forget the stored session token
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Manage tasks
    Tasks(tasks::Args),

    /// Record and review expenses
    Expenses(expenses::Args),

    /// Ask the AI assistant
    Ai(ai::Args),

    /// Open the terminal dashboard
    Dash(dash::Args),
}
