use anyhow::Result;

use crate::cli::GlobalArgs;
use crate::commands::common;

pub async fn execute(global: GlobalArgs) -> Result<()> {
    let conn = common::connect(&global).await?;
    common::require_session(&conn).await?;

    let session = conn.session().snapshot();
    let Some(user) = session.user else {
        println!("Not signed in.");
        return Ok(());
    };

    println!("Email:   {}", user.email);
    if !user.id.is_empty() {
        println!("User ID: {}", user.id);
    }
    if let Some(created_at) = user.created_at {
        println!("Since:   {}", created_at.format("%Y-%m-%d %H:%M"));
    }
    println!("Backend: {}", conn.config.api_base);
    Ok(())
}
