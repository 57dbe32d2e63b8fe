use anyhow::Result;
use colored::*;
use scout_core::workspace_manager::WorkspaceManager;

pub async fn execute(manager: &WorkspaceManager, json: bool) -> Result<()> {
    let snapshot = manager.list_projects().await;

    if json {
        let output = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| anyhow::anyhow!("Failed to serialize projects: {}", e))?;
        println!("{}", output);
        return Ok(());
    }

    println!("{}", "Projects".bold().underline());

    if !snapshot.has_projects() {
        println!("  {}", "No projects found".dimmed());
        return Ok(());
    }

    for project in &snapshot.projects {
        let version = project.manifest.version.as_deref().unwrap_or("unknown");
        println!(
            "{} {} {}",
            project.name.blue().bold(),
            format!("v{}", version).dimmed(),
            format!("[{}]", project.project_type).green()
        );
        println!("  {}", project.relative_path.dimmed());
    }

    Ok(())
}
