use anyhow::Result;

use crate::cli::GlobalArgs;
use crate::commands::common;

pub async fn execute(global: GlobalArgs) -> Result<()> {
    let conn = common::connect(&global).await?;
    let had_token = conn.session().token_store().exists();

    conn.auth().logout().await.map_err(common::failure)?;

    if had_token {
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}
