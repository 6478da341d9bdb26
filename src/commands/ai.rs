use anyhow::Result;
use clap::{Args as ClapArgs, Subcommand};

use crate::cli::GlobalArgs;
use crate::commands::common;
use crate::models::{ChatRole, ModalContent};
use crate::sync::AssistantController;

#[derive(ClapArgs)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Get a smart suggestion
    Suggest,

    /// Get advice on recorded spending
    Analyze,

    /// Send a message to the assistant
    Chat {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
}

pub async fn execute(global: GlobalArgs, args: Args) -> Result<()> {
    let conn = common::connect(&global).await?;
    common::require_session(&conn).await?;
    let assistant = AssistantController::new(conn.api.clone());

    match args.command {
        Command::Suggest => {
            let modal = assistant.suggest().await.map_err(common::failure)?;
            print_modal(&modal);
        }
        Command::Analyze => {
            let modal = assistant.analyze().await.map_err(common::failure)?;
            print_modal(&modal);
        }
        Command::Chat { message } => {
            let transcript = assistant
                .chat(&message.join(" "))
                .await
                .map_err(common::failure)?;
            if let Some(reply) = transcript.iter().rev().find(|m| m.role == ChatRole::Assistant) {
                println!("{}", reply.text);
            }
        }
    }
    Ok(())
}

fn print_modal(modal: &ModalContent) {
    println!("{}", modal.title);
    println!("{}", "=".repeat(modal.title.chars().count()));
    println!("{}", modal.body);
}
