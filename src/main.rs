use anyhow::Result;
use clap::Parser;

mod api;
mod cli;
mod commands;
mod config;
mod dashboard;
mod dispatch;
mod logging;
mod models;
mod session;
mod sync;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if !matches!(cli.command, Commands::Dash(_)) {
        logging::init_stderr();
    }

    let global = cli.global;
    match cli.command {
        Commands::Login(args) => commands::login::execute(global, args).await,
        Commands::Register(args) => commands::register::execute(global, args).await,
        Commands::Logout => commands::logout::execute(global).await,
        Commands::Whoami => commands::whoami::execute(global).await,
        Commands::Tasks(args) => commands::tasks::execute(global, args).await,
        Commands::Expenses(args) => commands::expenses::execute(global, args).await,
        Commands::Ai(args) => commands::ai::execute(global, args).await,
        Commands::Dash(args) => commands::dash::execute(global, args).await,
    }
}
