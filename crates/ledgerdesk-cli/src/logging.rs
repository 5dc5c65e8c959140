// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "LEDGERDESK_LOG";

/// Installs the global subscriber. Output goes to `file` because the
/// terminal belongs to the UI while it runs.
pub fn init(level: &str, file: &Path) -> Result<()> {
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let sink = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)
        .with_context(|| {
            format!(
                "open log file {} -- set [log].file to a writable path",
                file.display()
            )
        })?;

    let directives = filter_directives(level, env::var(LOG_ENV).ok());
    let filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("parse log filter {directives:?} from [log].level or {LOG_ENV}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(sink))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))?;

    tracing::info!(file = %file.display(), filter = %directives, "logging started");
    Ok(())
}

fn filter_directives(level: &str, env_value: Option<String>) -> String {
    match env_value {
        Some(value) if !value.trim().is_empty() => value.trim().to_owned(),
        _ => level.to_ascii_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::filter_directives;

    #[test]
    fn env_directives_override_config_level() {
        assert_eq!(
            filter_directives("info", Some("ledgerdesk_app=debug".to_owned())),
            "ledgerdesk_app=debug"
        );
    }

    #[test]
    fn blank_env_falls_back_to_config_level() {
        assert_eq!(filter_directives("WARN", Some("  ".to_owned())), "warn");
        assert_eq!(filter_directives("debug", None), "debug");
    }
}
