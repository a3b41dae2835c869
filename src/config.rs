use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_instance")]
    pub instance_url: String,
    #[serde(default = "default_timeline_limit")]
    pub timeline_limit: u8,
    /// Show "显示前文" under replies to yourself.
    #[serde(default = "default_true")]
    pub show_thread_hint: bool,
    #[serde(default = "default_char_limit")]
    pub char_limit: usize,
}

fn default_instance() -> String {
    "https://mastodon.social".to_string()
}

fn default_timeline_limit() -> u8 {
    40
}

fn default_true() -> bool {
    true
}

fn default_char_limit() -> usize {
    500
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            instance_url: default_instance(),
            timeline_limit: default_timeline_limit(),
            show_thread_hint: true,
            char_limit: default_char_limit(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Self::parse(&content)
        } else {
            Ok(AppConfig::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

pub fn config_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".config").join("tootbox")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(AppConfig::parse("").unwrap(), AppConfig::default());
    }

    #[test]
    fn partial_file_overrides_fields() {
        let config = AppConfig::parse(
            "instance_url = \"https://example.social\"\nshow_thread_hint = false\n",
        )
        .unwrap();
        assert_eq!(config.instance_url, "https://example.social");
        assert!(!config.show_thread_hint);
        assert_eq!(config.timeline_limit, 40);
        assert_eq!(config.char_limit, 500);
    }

    #[test]
    fn round_trips_through_toml() {
        let config = AppConfig {
            timeline_limit: 20,
            ..Default::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(AppConfig::parse(&text).unwrap(), config);
    }
}
