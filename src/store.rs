//! Small JSON key-value cache kept next to the config file.

use anyhow::{bail, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::config_dir;
use crate::models::entity::CustomEmoji;

/// Shortcode to image URL map for the instance's custom emoji.
pub const EMOJI_KEY: &str = "emojiObj";

pub type EmojiMap = HashMap<String, String>;

pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn open() -> Self {
        Store::at(config_dir().join("store"))
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Store { root: root.into() }
    }

    fn path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            bail!("invalid store key: {:?}", key);
        }
        Ok(self.root.join(format!("{}.json", key)))
    }

    pub fn fetch<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.path(key)?;
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(&path, serde_json::to_string(value)?)?;
        Ok(())
    }
}

pub fn emoji_map(emojis: &[CustomEmoji]) -> EmojiMap {
    emojis
        .iter()
        .map(|e| (e.shortcode.clone(), e.url.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> Store {
        let root = std::env::temp_dir().join(format!("tootbox-store-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        Store::at(root)
    }

    #[test]
    fn missing_key_is_none() {
        let store = temp_store("missing");
        let value: Option<EmojiMap> = store.fetch(EMOJI_KEY).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn saved_value_is_fetched_back() {
        let store = temp_store("saved");
        let emojis = vec![CustomEmoji {
            shortcode: "blobcat".into(),
            url: "https://example.social/blobcat.png".into(),
            static_url: None,
        }];
        store.save(EMOJI_KEY, &emoji_map(&emojis)).unwrap();
        let loaded: EmojiMap = store.fetch(EMOJI_KEY).unwrap().unwrap();
        assert_eq!(
            loaded.get("blobcat").map(String::as_str),
            Some("https://example.social/blobcat.png")
        );
        let _ = std::fs::remove_dir_all(&store.root);
    }

    #[test]
    fn rejects_path_like_keys() {
        let store = temp_store("keys");
        assert!(store.fetch::<EmojiMap>("../session").is_err());
    }
}
