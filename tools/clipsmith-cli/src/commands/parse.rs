//! Interpret a saved rules file.

use std::path::PathBuf;

use clipsmith_edit_model::edit::RuleText;

pub fn run(path: PathBuf, json: bool) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let rules = RuleText::new(text);
    let operations = clipsmith_rule_engine::parse(&rules);

    if json {
        println!("{}", serde_json::to_string_pretty(&operations)?);
        return Ok(());
    }

    println!("Rules: {}", path.display());
    println!("  Lines: {}", rules.lines().count());
    println!("  Edits: {}", operations.len());
    if operations.is_empty() {
        println!();
        println!("No recognised edits; the video would render unchanged.");
        return Ok(());
    }

    println!();
    for (index, op) in operations.iter().enumerate() {
        println!("  {}. {op}", index + 1);
    }
    Ok(())
}
