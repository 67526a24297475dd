//! Non-serving subcommands: configuration inspection and the agent roster.

use miq_core::config::Settings;
use std::sync::Arc;

pub fn show_config(settings: &Settings) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(settings)?;
    println!("{rendered}");
    Ok(())
}

pub fn list_agents(settings: &Settings) -> anyhow::Result<()> {
    let runtimes = miq_agents::build_agent_runtimes(Arc::new(settings.clone()));
    let mut keys: Vec<_> = runtimes.keys().map(|k| k.to_string()).collect();
    keys.sort();
    for key in keys {
        println!("{key}");
    }
    Ok(())
}
