use std::path::Path;

use anyhow::Result;
use scout_core::workspace_manager::WorkspaceManager;

pub async fn execute(manager: &WorkspaceManager, file: &Path) -> Result<()> {
    let context = manager
        .context_for_file(file)
        .await
        .ok_or_else(|| anyhow::anyhow!("No project owns {}", file.display()))?;

    println!("{}", context);
    Ok(())
}
