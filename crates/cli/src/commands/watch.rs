use anyhow::Result;
use colored::*;
use scout_core::results::RegistryChange;
use scout_core::workspace_manager::WorkspaceManager;

pub async fn execute(manager: &WorkspaceManager) -> Result<()> {
    let mut session = manager
        .watch()
        .map_err(|e| anyhow::anyhow!("Failed to start watching: {}", e))?;

    println!(
        "{} {}",
        "Watching".bold(),
        format!("{} project(s), press Ctrl-C to stop", manager.registry().len().await).dimmed()
    );

    loop {
        tokio::select! {
            change = session.changes.recv() => match change {
                Some(change) => print_change(&change),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}

fn print_change(change: &RegistryChange) {
    match change {
        RegistryChange::Added(project) => println!(
            "{} {} {}",
            "+".green().bold(),
            project.name.blue().bold(),
            format!("[{}]", project.project_type).green()
        ),
        RegistryChange::Refreshed(project) => println!(
            "{} {} {}",
            "~".yellow().bold(),
            project.name.blue().bold(),
            format!("[{}]", project.project_type).green()
        ),
        RegistryChange::Removed(root) => {
            println!("{} {}", "-".red().bold(), root.display())
        }
        RegistryChange::Unchanged(_) => {}
    }
}
