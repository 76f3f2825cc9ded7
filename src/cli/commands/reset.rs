use anyhow::Result;
use clap::Args;
use std::io::Write;

use crate::data_paths::DataPaths;
use crate::portfolio::storage::PortfolioStorage;

#[derive(Args)]
pub struct ResetArgs {
    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

/// Clear the persisted previous snapshot and both history series
pub async fn execute(data_paths: DataPaths, args: ResetArgs) -> Result<()> {
    if !args.yes {
        print!("Clear all persisted portfolio history? [y/N] ");
        std::io::stdout().flush()?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted");
            return Ok(());
        }
    }

    let storage = PortfolioStorage::new(data_paths.root());
    storage.clear().await?;
    println!("Portfolio history cleared");
    Ok(())
}
