//! Conversation state persisted between invocations.
//!
//! Each process handles exactly one request, so freestyle mode threads the
//! server's opaque context token through files under `~/.zsh-llm-suggest/`
//! to make separate invocations read as one conversation.

use anyhow::Result;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

const STATE_DIR: &str = ".zsh-llm-suggest";
const CONTEXT_FILE: &str = "context.json";
const SYSTEM_FILE: &str = "system_message.txt";

/// Handle on the on-disk state directory.
///
/// When no home directory can be determined the store is inert: loads find
/// nothing and saves succeed without writing anything.
pub struct ContextStore {
    dir: Option<PathBuf>,
}

impl ContextStore {
    /// Opens the store under `~/.zsh-llm-suggest`, or an inert store when
    /// the home directory is unknown.
    pub fn open_default() -> Self {
        match dirs::home_dir() {
            Some(home) => Self::new(home.join(STATE_DIR)),
            None => {
                warn!("could not determine the home directory, conversation state is disabled");
                Self { dir: None }
            }
        }
    }

    /// Opens a store rooted at an explicit directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Returns the persisted context token, if a usable one exists.
    ///
    /// A missing or empty file yields `None`. A file that no longer parses
    /// as JSON is reported and treated as absent; the next successful save
    /// overwrites it.
    pub fn load(&self) -> Option<Value> {
        let path = self.dir.as_ref()?.join(CONTEXT_FILE);
        let content = fs::read_to_string(&path).ok()?;
        if content.trim().is_empty() {
            return None;
        }
        match serde_json::from_str(&content) {
            Ok(token) => Some(token),
            Err(e) => {
                warn!("ignoring unreadable context file {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Persists the context token carried by a reply.
    ///
    /// A reply without a token leaves the previous state untouched. The file
    /// is written under a temporary name and renamed into place so a crash
    /// mid-write cannot leave it half-written.
    pub fn save(&self, token: Option<&Value>) -> Result<()> {
        let (Some(dir), Some(token)) = (self.dir.as_ref(), token) else {
            return Ok(());
        };
        fs::create_dir_all(dir)?;
        let path = dir.join(CONTEXT_FILE);
        let tmp = dir.join(format!("{}.tmp", CONTEXT_FILE));
        fs::write(&tmp, serde_json::to_string(token)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Returns the pinned system message, if one has been written.
    pub fn pinned_system_message(&self) -> Option<String> {
        let path = self.dir.as_ref()?.join(SYSTEM_FILE);
        let content = fs::read_to_string(path).ok()?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Records the system message to reuse on later invocations.
    ///
    /// Writes only once: an existing file wins and the call reports `false`.
    pub fn pin_system_message(&self, message: &str) -> Result<bool> {
        let Some(dir) = self.dir.as_ref() else {
            return Ok(false);
        };
        let path = dir.join(SYSTEM_FILE);
        if path.exists() {
            return Ok(false);
        }
        fs::create_dir_all(dir)?;
        fs::write(path, message)?;
        Ok(true)
    }
}
