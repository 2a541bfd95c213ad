use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AideConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub calendar: CalendarConfig,
    pub media: MediaConfig,
    pub shortcuts: ShortcutsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
    pub state_file: String,
    pub profile_file: String,
    pub design_system_file: String,
    pub drawings_dir: String,
    pub notes_dir: String,
    pub backups_dir: String,
    pub audit_log: String,
    pub state_version: String,
    pub profile_version: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CalendarConfig {
    pub base_url: String,
    pub calendar_id: String,
    pub access_token: Option<String>,
    pub timezone: String,
    pub default_duration: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MediaConfig {
    pub downloader: String,
    pub output_dir: String,
    pub default_format: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ShortcutsConfig {
    pub runner: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            host: "127.0.0.1".into(),
            port: 8931,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_aide_dir().to_string_lossy().into_owned(),
            state_file: "state.yaml".into(),
            profile_file: "profile.yaml".into(),
            design_system_file: "design-system.yaml".into(),
            drawings_dir: "drawings".into(),
            notes_dir: "notes".into(),
            backups_dir: "backups".into(),
            audit_log: "audit.jsonl".into(),
            state_version: "1.0".into(),
            profile_version: "1.0".into(),
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/calendar/v3".into(),
            calendar_id: "primary".into(),
            access_token: None,
            timezone: "UTC".into(),
            default_duration: "1h".into(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            downloader: "yt-dlp".into(),
            output_dir: "downloads".into(),
            default_format: "video".into(),
        }
    }
}

impl Default for ShortcutsConfig {
    fn default() -> Self {
        Self {
            runner: "shortcuts".into(),
        }
    }
}

/// Returns `~/.aide/`, or `./.aide` when no home directory is known.
pub fn default_aide_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".aide")
}

/// Returns the default config file path: `~/.aide/config.toml`
pub fn default_config_path() -> PathBuf {
    default_aide_dir().join("config.toml")
}

impl AideConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            AideConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Config rooted at `data_dir` with every other setting at its default.
    /// Used by tests and the doctor command's `--data-dir`.
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        let mut config = Self::default();
        config.storage.data_dir = data_dir.as_ref().to_string_lossy().into_owned();
        config
    }

    /// Apply environment variable overrides
    /// (AIDE_HOME, AIDE_LOG_LEVEL, AIDE_CALENDAR_TOKEN, AIDE_NOTES_DIR).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("AIDE_HOME") {
            self.storage.data_dir = val;
        }
        if let Ok(val) = std::env::var("AIDE_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("AIDE_CALENDAR_TOKEN") {
            self.calendar.access_token = Some(val);
        }
        if let Ok(val) = std::env::var("AIDE_NOTES_DIR") {
            self.storage.notes_dir = val;
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.storage.data_dir)
    }

    /// Resolve a `[storage]` entry: `~/` is expanded, relative paths join `data_dir`.
    fn storage_path(&self, entry: &str) -> PathBuf {
        let path = expand_tilde(entry);
        if path.is_absolute() {
            path
        } else {
            self.data_dir().join(path)
        }
    }

    pub fn state_path(&self) -> PathBuf {
        self.storage_path(&self.storage.state_file)
    }

    pub fn profile_path(&self) -> PathBuf {
        self.storage_path(&self.storage.profile_file)
    }

    pub fn design_system_path(&self) -> PathBuf {
        self.storage_path(&self.storage.design_system_file)
    }

    pub fn drawings_dir(&self) -> PathBuf {
        self.storage_path(&self.storage.drawings_dir)
    }

    pub fn notes_dir(&self) -> PathBuf {
        self.storage_path(&self.storage.notes_dir)
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.storage_path(&self.storage.backups_dir)
    }

    pub fn audit_log_path(&self) -> PathBuf {
        self.storage_path(&self.storage.audit_log)
    }

    pub fn media_output_dir(&self) -> PathBuf {
        self.storage_path(&self.media.output_dir)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AideConfig::default();
        assert_eq!(config.server.transport, "stdio");
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.calendar.calendar_id, "primary");
        assert_eq!(config.calendar.default_duration, "1h");
        assert!(config.storage.data_dir.ends_with(".aide"));
        assert!(config.state_path().ends_with(".aide/state.yaml"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"
transport = "http"

[storage]
data_dir = "/tmp/aide"
notes_dir = "/srv/notes"

[calendar]
timezone = "Europe/Berlin"
"#;
        let config: AideConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.server.transport, "http");
        assert_eq!(config.state_path(), PathBuf::from("/tmp/aide/state.yaml"));
        assert_eq!(config.notes_dir(), PathBuf::from("/srv/notes"));
        assert_eq!(config.calendar.timezone, "Europe/Berlin");
        // defaults still apply for unset fields
        assert_eq!(config.server.port, 8931);
        assert_eq!(config.media.downloader, "yt-dlp");
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AideConfig::default();
        std::env::set_var("AIDE_HOME", "/tmp/aide-env");
        std::env::set_var("AIDE_LOG_LEVEL", "trace");
        std::env::set_var("AIDE_CALENDAR_TOKEN", "secret");
        std::env::set_var("AIDE_NOTES_DIR", "/tmp/notes-env");

        config.apply_env_overrides();

        assert_eq!(config.data_dir(), PathBuf::from("/tmp/aide-env"));
        assert_eq!(config.server.log_level, "trace");
        assert_eq!(config.calendar.access_token.as_deref(), Some("secret"));
        assert_eq!(config.notes_dir(), PathBuf::from("/tmp/notes-env"));

        // Clean up
        std::env::remove_var("AIDE_HOME");
        std::env::remove_var("AIDE_LOG_LEVEL");
        std::env::remove_var("AIDE_CALENDAR_TOKEN");
        std::env::remove_var("AIDE_NOTES_DIR");
    }
}
