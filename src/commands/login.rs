use anyhow::Result;
use clap::Args as ClapArgs;

use crate::cli::GlobalArgs;
use crate::commands::common;

#[derive(ClapArgs)]
pub struct Args {
    /// Account email
    #[arg(value_parser = common::parse_email)]
    pub email: String,

    /// Password (prompted for without echo when omitted)
    #[arg(short, long)]
    pub password: Option<String>,
}

pub async fn execute(global: GlobalArgs, args: Args) -> Result<()> {
    let conn = common::connect(&global).await?;
    let password = common::password_or_prompt(args.password)?;

    let user = conn
        .auth()
        .login(&args.email, &password)
        .await
        .map_err(common::failure)?;

    println!("Signed in as {}", user.email);
    println!("Token stored at {}", conn.session().token_store().path().display());
    Ok(())
}
