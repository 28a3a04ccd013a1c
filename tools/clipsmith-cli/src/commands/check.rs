//! Check system capabilities.

use std::path::Path;

use clipsmith_common::config::AppConfig;
use clipsmith_media_engine::command_exists;

pub fn run(config: &AppConfig, config_path: &Path) -> anyhow::Result<()> {
    println!("Clipsmith System Check");
    println!("{}", "=".repeat(50));

    let mut ready = true;
    for tool in ["ffmpeg", "ffprobe"] {
        if command_exists(tool) {
            println!("[OK] {tool} found on PATH");
        } else {
            println!("[MISSING] {tool} not found on PATH");
            ready = false;
        }
    }

    let key_env = &config.rule_generator.api_key_env;
    let key_set = std::env::var(key_env)
        .map(|key| !key.trim().is_empty())
        .unwrap_or(false);
    if key_set {
        println!("[OK] {key_env} is set");
    } else {
        println!("[MISSING] {key_env} is not set (rule generation will fail)");
        ready = false;
    }

    println!();
    println!(
        "Rule generator: {} ({})",
        config.rule_generator.endpoint, config.rule_generator.model
    );
    if config_path.exists() {
        println!("Config file: {}", config_path.display());
    } else {
        println!("Config file: {} (not found, using defaults)", config_path.display());
    }

    println!();
    if ready {
        println!("All capabilities are available. Clipsmith is ready.");
    } else {
        println!("Some capabilities are missing. See above.");
    }

    Ok(())
}
