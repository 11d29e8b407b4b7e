use anyhow::Result;

use crate::config::Config;
use crate::traits::SourceSet;

pub fn list_sources(config: &Config) -> Result<()> {
    let sources = SourceSet::from_config(config)?;

    println!("{:<12} {:<16} DESCRIPTION", "SOURCE", "STATUS");
    for status in sources.statuses() {
        let label = if status.configured {
            "OK"
        } else {
            "NO API KEY"
        };
        println!("{:<12} {:<16} {}", status.name, label, status.description);
    }

    Ok(())
}
