use anyhow::Result;
use colored::*;
use scout_core::workspace_manager::WorkspaceManager;

pub async fn execute(manager: &WorkspaceManager) -> Result<()> {
    println!("{}", "Workspace Summary".bold().underline());
    println!("{}", manager.summary().await);
    Ok(())
}
