use anyhow::Result;
use clap::Args as ClapArgs;

use crate::cli::GlobalArgs;
use crate::commands::common;
use crate::dashboard::DashboardApp;
use crate::dispatch::Dispatcher;
use crate::logging;

#[derive(ClapArgs)]
pub struct Args {
    /// Start on the registration form instead of sign-in
    #[arg(long)]
    pub register: bool,
}

pub async fn execute(global: GlobalArgs, args: Args) -> Result<()> {
    let conn = common::connect(&global).await?;
    let _log_guard = logging::init_file(&conn.config.log_dir)?;
    tracing::info!("Dashboard starting against {}", conn.config.api_base);

    let (dispatcher, notifications) = Dispatcher::new(conn.api.clone());
    let mut app = DashboardApp::new(dispatcher, notifications, conn.config.api_base.clone());
    if args.register {
        app.start_in_register_mode();
    }
    app.run().await?;

    Ok(())
}
