use std::path::Path;

use anyhow::Result;
use colored::*;
use scout_core::workspace_manager::WorkspaceManager;

pub async fn execute(manager: &WorkspaceManager, file: &Path) -> Result<()> {
    let Some(project) = manager.owner_of(file).await else {
        anyhow::bail!("No project owns {}", file.display());
    };

    println!(
        "{} {}",
        project.name.blue().bold(),
        format!("[{}]", project.project_type).green()
    );
    println!("  {}", project.root_path.display().to_string().dimmed());
    Ok(())
}
