// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use ledgerdesk_app::UserId;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_PAGE_SIZE: u32 = 25;
const MAX_PAGE_SIZE: u32 = 500;
const DEFAULT_TIMEOUT: &str = "5s";
const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Sqlite,
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub session: Session,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            backend: Backend::default(),
            session: Session::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Backend {
    pub kind: Option<BackendKind>,
    pub db_path: Option<String>,
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            kind: Some(BackendKind::Sqlite),
            db_path: None,
            base_url: None,
            token: None,
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub user_id: Option<i64>,
}

impl Default for Session {
    fn default() -> Self {
        Self { user_id: Some(1) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub page_size: Option<u32>,
    pub show_inactive: Option<bool>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            page_size: Some(DEFAULT_PAGE_SIZE),
            show_inactive: Some(false),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("LEDGERDESK_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!(
                "cannot resolve config directory; set LEDGERDESK_CONFIG_PATH to the config file"
            )
        })?;

        let app_dir = config_root.join(ledgerdesk_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` at the top and keep values under [backend], [session], [ui], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Run `ledgerdesk --print-example-config` for the current layout",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(db_path) = &self.backend.db_path {
            ledgerdesk_db::validate_db_path(db_path)?;
        }

        if self.backend_kind() == BackendKind::Http
            && self
                .backend
                .base_url
                .as_deref()
                .is_none_or(|url| url.trim().is_empty())
        {
            bail!(
                "backend.kind = \"http\" in {} requires backend.base_url (for example \"http://localhost:8080/api\")",
                path.display()
            );
        }

        if let Some(timeout) = &self.backend.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "backend.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(user_id) = self.session.user_id
            && user_id <= 0
        {
            bail!(
                "session.user_id in {} must be positive, got {}",
                path.display(),
                user_id
            );
        }

        if let Some(page_size) = self.ui.page_size
            && !(1..=MAX_PAGE_SIZE).contains(&page_size)
        {
            bail!(
                "ui.page_size in {} must be between 1 and {}, got {}",
                path.display(),
                MAX_PAGE_SIZE,
                page_size
            );
        }

        if let Some(level) = &self.log.level
            && !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
        {
            bail!(
                "log.level in {} must be one of {}, got {:?}",
                path.display(),
                LOG_LEVELS.join(", "),
                level
            );
        }

        Ok(())
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind.unwrap_or_default()
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.backend.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => ledgerdesk_db::default_db_path(),
        }
    }

    pub fn base_url(&self) -> Result<&str> {
        self.backend
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| anyhow!("backend.base_url is not set; add it under [backend]"))
    }

    pub fn token(&self) -> Option<&str> {
        self.backend
            .token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.backend.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn user_id(&self) -> UserId {
        UserId::new(self.session.user_id.unwrap_or(1))
    }

    pub fn page_size(&self) -> u32 {
        self.ui.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn show_inactive(&self) -> bool {
        self.ui.show_inactive.unwrap_or(false)
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.log.file {
            return Ok(PathBuf::from(file));
        }
        let data_root = dirs::data_local_dir().ok_or_else(|| {
            anyhow!("cannot resolve local data directory; set [log].file to a writable path")
        })?;
        Ok(data_root
            .join(ledgerdesk_db::APP_NAME)
            .join(format!("{}.log", ledgerdesk_db::APP_NAME)))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# ledgerdesk config\n# Place this file at: {}\n\nversion = 1\n\n[backend]\n# \"sqlite\" keeps records in a local database; \"http\" talks to a REST API\nkind = \"sqlite\"\n# Optional. Default is platform data dir (for example ~/.local/share/ledgerdesk/ledgerdesk.db)\n# db_path = \"/absolute/path/to/ledgerdesk.db\"\n# base_url = \"http://localhost:8080/api\"\n# token = \"\"\ntimeout = \"{}\"\n\n[session]\nuser_id = 1\n\n[ui]\npage_size = {}\nshow_inactive = false\n\n[log]\nlevel = \"{}\"\n# file = \"/absolute/path/to/ledgerdesk.log\"\n",
            path.display(),
            DEFAULT_TIMEOUT,
            DEFAULT_PAGE_SIZE,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    let (amount, unit): (&str, fn(u64) -> Duration) = if let Some(value) = raw.strip_suffix("ms") {
        (value, Duration::from_millis)
    } else if let Some(value) = raw.strip_suffix('s') {
        (value, Duration::from_secs)
    } else if let Some(value) = raw.strip_suffix('m') {
        (value, |minutes| Duration::from_secs(minutes.saturating_mul(60)))
    } else {
        bail!("invalid duration {raw:?}; write <N>ms, <N>s or <N>m (for example 500ms or 5s)");
    };
    let amount: u64 = amount
        .parse()
        .with_context(|| format!("invalid duration {raw:?}; expected a whole number before the unit"))?;
    Ok(unit(amount))
}

#[cfg(test)]
mod tests {
    use super::{BackendKind, Config, parse_duration};
    use anyhow::Result;
    use ledgerdesk_app::UserId;
    use std::path::PathBuf;
    use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
    use std::time::Duration;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("ledgerdesk.toml");
        std::fs::write(&path, content)?;
        Ok((dir, path))
    }

    // Tests that touch process env vars hold this for their whole body.
    fn env_guard() -> MutexGuard<'static, ()> {
        static ENV: OnceLock<Mutex<()>> = OnceLock::new();
        ENV.get_or_init(Mutex::default)
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn with_env<T>(key: &str, value: Option<&str>, body: impl FnOnce() -> T) -> T {
        let _guard = env_guard();
        // SAFETY: env mutation is serialized by env_guard.
        unsafe {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
        let result = body();
        // SAFETY: as above.
        unsafe {
            std::env::remove_var(key);
        }
        result
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = Config::load(&dir.path().join("absent.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.backend_kind(), BackendKind::Sqlite);
        assert_eq!(config.page_size(), 25);
        assert_eq!(config.user_id(), UserId::new(1));
        assert_eq!(config.timeout()?, Duration::from_secs(5));
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[ui]\npage_size = 10\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[backend], [session], [ui], and [log]"));
        Ok(())
    }

    #[test]
    fn http_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[backend]\nkind = \"http\"\nbase_url = \" http://erp.local/api \"\ntoken = \"abc\"\ntimeout = \"750ms\"\n[session]\nuser_id = 42\n[ui]\npage_size = 50\nshow_inactive = true\n[log]\nlevel = \"debug\"\nfile = \"/tmp/ledgerdesk-test.log\"\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.backend_kind(), BackendKind::Http);
        assert_eq!(config.base_url()?, "http://erp.local/api");
        assert_eq!(config.token(), Some("abc"));
        assert_eq!(config.timeout()?, Duration::from_millis(750));
        assert_eq!(config.user_id(), UserId::new(42));
        assert_eq!(config.page_size(), 50);
        assert!(config.show_inactive());
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.log_file()?, PathBuf::from("/tmp/ledgerdesk-test.log"));
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 3\n")?;
        let error = Config::load(&path).expect_err("v3 config should fail");
        assert!(error.to_string().contains("unsupported config version 3"));
        Ok(())
    }

    #[test]
    fn unknown_backend_kind_fails_to_decode() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[backend]\nkind = \"mongo\"\n")?;
        let error = Config::load(&path).expect_err("unknown backend should fail");
        assert!(format!("{error:#}").contains("decode config"));
        Ok(())
    }

    #[test]
    fn http_backend_requires_base_url() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[backend]\nkind = \"http\"\n")?;
        let error = Config::load(&path).expect_err("missing base_url should fail");
        assert!(error.to_string().contains("requires backend.base_url"));
        Ok(())
    }

    #[test]
    fn invalid_values_are_rejected() -> Result<()> {
        for (body, needle) in [
            ("[backend]\ntimeout = \"0s\"\n", "must be positive"),
            ("[backend]\ntimeout = \"soon\"\n", "invalid duration"),
            ("[session]\nuser_id = 0\n", "session.user_id"),
            ("[ui]\npage_size = 0\n", "ui.page_size"),
            ("[ui]\npage_size = 1000\n", "between 1 and 500"),
            ("[log]\nlevel = \"loud\"\n", "log.level"),
        ] {
            let (_temp, path) = write_config(&format!("version = 1\n{body}"))?;
            let error = Config::load(&path).expect_err("invalid value should fail");
            let message = format!("{error:#}");
            assert!(message.contains(needle), "{body:?}: {message}");
        }
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let wanted = dir.path().join("elsewhere.toml");
        let resolved = with_env(
            "LEDGERDESK_CONFIG_PATH",
            wanted.to_str(),
            Config::default_path,
        )?;
        assert_eq!(resolved, wanted);
        Ok(())
    }

    #[test]
    fn db_path_resolution_order() -> Result<()> {
        let (_dir, explicit) =
            write_config("version = 1\n[backend]\ndb_path = \"/explicit/from-config.db\"\n")?;
        let (_other, bare) = write_config("version = 1\n")?;

        let from_config = with_env("LEDGERDESK_DB_PATH", Some("/from/env.db"), || {
            Config::load(&explicit)?.db_path()
        })?;
        assert_eq!(from_config, PathBuf::from("/explicit/from-config.db"));

        let from_env = with_env("LEDGERDESK_DB_PATH", Some("/from/env-only.db"), || {
            Config::load(&bare)?.db_path()
        })?;
        assert_eq!(from_env, PathBuf::from("/from/env-only.db"));

        let fallback = with_env("LEDGERDESK_DB_PATH", None, || Config::load(&bare)?.db_path())?;
        assert!(fallback.ends_with("ledgerdesk.db"), "got {}", fallback.display());
        Ok(())
    }

    #[test]
    fn db_path_rejects_uri_style_value() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[backend]\ndb_path = \"https://evil.example/ledger.db\"\n")?;
        assert!(Config::load(&path).is_err());
        Ok(())
    }

    #[test]
    fn duration_units() -> Result<()> {
        assert_eq!(parse_duration("250ms")?, Duration::from_millis(250));
        assert_eq!(parse_duration(" 30s ")?, Duration::from_secs(30));
        assert_eq!(parse_duration("3m")?, Duration::from_secs(180));
        assert!(parse_duration("5h").is_err());
        assert!(parse_duration("ms").is_err());
        Ok(())
    }

    #[test]
    fn example_config_round_trips() -> Result<()> {
        let (_dir, path) = write_config("")?;
        std::fs::write(&path, Config::example_config(&path))?;
        let config = Config::load(&path)?;
        assert_eq!(config.backend_kind(), BackendKind::Sqlite);
        assert_eq!(config.log_level(), "info");
        Ok(())
    }
}
