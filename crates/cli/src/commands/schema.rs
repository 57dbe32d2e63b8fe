use anyhow::Result;
use scout_core::configs::workspace::workspace_config_schema;

pub fn execute() -> Result<()> {
    let schema = serde_json::to_string_pretty(&workspace_config_schema())
        .map_err(|e| anyhow::anyhow!("Failed to serialize config schema: {}", e))?;
    println!("{}", schema);
    Ok(())
}
