//! authflow Server Entry Point

use authflow::cli::{Cli, Commands};
use authflow::logging;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init()?;

    match cli.command {
        Some(Commands::Deploy(args)) => {
            let roles = authflow::cli::deploy::execute(&args).await?;
            for role in roles {
                println!("{:<14} permissions={:#07b}", role.name, role.permissions);
            }
        }
        Some(Commands::Serve(args)) => authflow::cli::serve::execute(&args).await?,
        None => authflow::cli::serve::execute(&Default::default()).await?,
    }

    Ok(())
}
