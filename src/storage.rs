use crate::constants::{CURRENCY_KEY, SCROLL_POSITION_KEY};
use crate::models::Session;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

const STATE_FILE: &str = "state.yaml";

/// On-disk layout of the state file
#[derive(Debug, Default, Serialize, Deserialize)]
struct Persisted {
    #[serde(default)]
    preferences: BTreeMap<String, String>,
    #[serde(default)]
    session: Option<Session>,
}

/// Local key-value preferences and the saved session
pub struct Storage {
    data: Persisted,
    config_dir: PathBuf,
}

impl Storage {
    /// Open the storage rooted at `config_dir`. A missing or unreadable file starts empty.
    pub fn open(config_dir: impl Into<PathBuf>) -> Self {
        let mut storage = Storage {
            data: Persisted::default(),
            config_dir: config_dir.into(),
        };

        if let Err(e) = storage.load() {
            tracing::warn!(error = %e, dir = %storage.config_dir.display(), "Ignoring unreadable state file");
            storage.data = Persisted::default();
        }
        storage
    }

    fn state_path(&self) -> PathBuf {
        self.config_dir.join(STATE_FILE)
    }

    fn load(&mut self) -> Result<()> {
        let path = self.state_path();
        if !path.exists() {
            return Ok(());
        }
        let content = fs::read_to_string(&path)?;
        self.data = serde_yaml::from_str(&content)?;
        Ok(())
    }

    /// Ensure config directory exists
    fn ensure_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    fn save(&self) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_yaml::to_string(&self.data)?;
        fs::write(self.state_path(), content)?;
        Ok(())
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.data.preferences.get(key).map(String::as_str)
    }

    pub fn set_item(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        self.data.preferences.insert(key.into(), value.into());
        self.save()
    }

    /// Preferred currency symbol, if the user picked one
    pub fn currency(&self) -> Option<&str> {
        self.get_item(CURRENCY_KEY)
    }

    pub fn set_currency(&mut self, symbol: &str) -> Result<()> {
        self.set_item(CURRENCY_KEY, symbol)
    }

    /// Saved expense list offset; unparseable values read as 0
    pub fn scroll_offset(&self) -> usize {
        self.get_item(SCROLL_POSITION_KEY)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    pub fn set_scroll_offset(&mut self, offset: usize) -> Result<()> {
        if self.scroll_offset() == offset && self.get_item(SCROLL_POSITION_KEY).is_some() {
            return Ok(());
        }
        self.set_item(SCROLL_POSITION_KEY, offset.to_string())
    }

    pub fn session(&self) -> Option<&Session> {
        self.data.session.as_ref()
    }

    pub fn set_session(&mut self, session: Option<Session>) -> Result<()> {
        self.data.session = session;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use tempfile::tempdir;

    fn session() -> Session {
        Session {
            token: "tok".to_string(),
            user: User {
                id: "u1".to_string(),
                username: "ann".to_string(),
                email: "ann@example.com".to_string(),
                wallet_balance: Some(100.0),
            },
        }
    }

    #[test]
    fn test_items_persist_across_open() {
        let dir = tempdir().unwrap();
        let mut storage = Storage::open(dir.path());
        storage.set_currency("€").unwrap();
        storage.set_scroll_offset(7).unwrap();
        storage.set_session(Some(session())).unwrap();

        let reopened = Storage::open(dir.path());
        assert_eq!(reopened.currency(), Some("€"));
        assert_eq!(reopened.scroll_offset(), 7);
        assert_eq!(reopened.session(), Some(&session()));
    }

    #[test]
    fn test_missing_dir_starts_empty() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path().join("nested"));
        assert_eq!(storage.currency(), None);
        assert_eq!(storage.scroll_offset(), 0);
        assert!(storage.session().is_none());
    }

    #[test]
    fn test_corrupt_file_is_ignored() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(STATE_FILE), "preferences: [unclosed").unwrap();
        let storage = Storage::open(dir.path());
        assert!(storage.session().is_none());
    }

    #[test]
    fn test_bad_offset_reads_zero() {
        let dir = tempdir().unwrap();
        let mut storage = Storage::open(dir.path());
        storage.set_item(SCROLL_POSITION_KEY, "not-a-number").unwrap();
        assert_eq!(storage.scroll_offset(), 0);
        assert_eq!(Storage::open(dir.path()).scroll_offset(), 0);
    }
}
