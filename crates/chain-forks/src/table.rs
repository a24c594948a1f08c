//! # Fork Table
//!
//! Two-phase fork registry: [`ForkTableBuilder`] collects entries,
//! [`ForkTable`] answers lookups.

use crate::error::ForkError;
use crate::system::SystemSchedule;
use crate::{DEFAULT_TITLE, FORK_NOT_ACTIVATED};
use std::collections::HashMap;
use tracing::{debug, info};

// =============================================================================
// KEY PARSING
// =============================================================================

/// A parsed `"title-fork"` lookup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkKey<'a> {
    /// `None` for a bare fork name.
    pub title: Option<&'a str>,
    pub fork: &'a str,
}

impl<'a> ForkKey<'a> {
    /// Split on the first hyphen.
    pub fn parse(key: &'a str) -> Result<Self, ForkError> {
        let key = key.trim();
        match key.split_once('-') {
            None if key.is_empty() => Err(ForkError::InvalidKey(key.to_string())),
            None => Ok(ForkKey {
                title: None,
                fork: key,
            }),
            Some((title, fork)) if title.is_empty() || fork.is_empty() => {
                Err(ForkError::InvalidKey(key.to_string()))
            }
            Some((title, fork)) => Ok(ForkKey {
                title: Some(title),
                fork,
            }),
        }
    }
}

fn validate_title(title: &str) -> Result<(), ForkError> {
    if title.is_empty() || title.contains('-') {
        return Err(ForkError::InvalidTitle(title.to_string()));
    }
    Ok(())
}

fn normalize_height(height: i64) -> i64 {
    // negative heights disable a fork
    if height < 0 {
        FORK_NOT_ACTIVATED
    } else {
        height
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Registration phase of a fork table.
#[derive(Debug, Clone)]
pub struct ForkTableBuilder {
    default_title: String,
    system: HashMap<String, i64>,
    titles: HashMap<String, HashMap<String, i64>>,
}

impl ForkTableBuilder {
    /// Start a table whose default title is `title`, seeded with that title's
    /// system schedule.
    pub fn new(title: &str) -> Result<Self, ForkError> {
        validate_title(title)?;
        let system = SystemSchedule::for_title(title)
            .forks()
            .map(|(name, height)| (name.to_string(), height))
            .collect();
        Ok(Self {
            default_title: title.to_string(),
            system,
            titles: HashMap::new(),
        })
    }

    /// Start a table for the development title.
    pub fn local() -> Self {
        Self {
            default_title: DEFAULT_TITLE.to_string(),
            system: SystemSchedule::Local
                .forks()
                .map(|(name, height)| (name.to_string(), height))
                .collect(),
            titles: HashMap::new(),
        }
    }

    /// Insert or overwrite one `(title, fork)` entry.
    pub fn register(&mut self, title: &str, fork: &str, height: i64) -> Result<&mut Self, ForkError> {
        validate_title(title)?;
        if fork.is_empty() {
            return Err(ForkError::EmptyForkName);
        }
        let previous = self
            .titles
            .entry(title.to_string())
            .or_default()
            .insert(fork.to_string(), normalize_height(height));
        if let Some(previous) = previous {
            debug!(title, fork, previous, height, "Fork entry overwritten");
        }
        Ok(self)
    }

    /// Override one entry of the system schedule.
    pub fn register_system(&mut self, fork: &str, height: i64) -> Result<&mut Self, ForkError> {
        if fork.is_empty() {
            return Err(ForkError::EmptyForkName);
        }
        self.system.insert(fork.to_string(), normalize_height(height));
        Ok(self)
    }

    /// End the registration phase.
    pub fn build(self) -> ForkTable {
        let entries: usize = self.titles.values().map(HashMap::len).sum();
        info!(
            default_title = %self.default_title,
            system_forks = self.system.len(),
            titled_forks = entries,
            "Fork table built"
        );
        ForkTable {
            default_title: self.default_title,
            system: self.system,
            titles: self.titles,
        }
    }
}

impl Default for ForkTableBuilder {
    fn default() -> Self {
        Self::local()
    }
}

// =============================================================================
// TABLE
// =============================================================================

/// Immutable fork table. Share it behind an `Arc`; lookups take `&self`.
#[derive(Debug, Clone)]
pub struct ForkTable {
    default_title: String,
    system: HashMap<String, i64>,
    titles: HashMap<String, HashMap<String, i64>>,
}

impl ForkTable {
    pub fn default_title(&self) -> &str {
        &self.default_title
    }

    /// Activation height of `fork` on `title`.
    ///
    /// Exact pairs win; the default title then falls back to the system
    /// schedule; anything else is [`FORK_NOT_ACTIVATED`].
    pub fn resolve(&self, title: &str, fork: &str) -> i64 {
        if let Some(height) = self.titles.get(title).and_then(|forks| forks.get(fork)) {
            return *height;
        }
        if title == self.default_title {
            if let Some(height) = self.system.get(fork) {
                return *height;
            }
        }
        FORK_NOT_ACTIVATED
    }

    /// Resolve a `"title-fork"` key, or a bare fork name on the default title.
    pub fn resolve_key(&self, key: &str) -> Result<i64, ForkError> {
        let parsed = ForkKey::parse(key)?;
        let title = parsed.title.unwrap_or(self.default_title.as_str());
        Ok(self.resolve(title, parsed.fork))
    }

    /// True once `height` has reached the fork's activation height.
    pub fn is_active(&self, title: &str, fork: &str, height: i64) -> bool {
        height >= self.resolve(title, fork)
    }

    /// Shorthand for [`ForkTable::is_active`] on the default title.
    pub fn is_system_active(&self, fork: &str, height: i64) -> bool {
        self.is_active(&self.default_title, fork, height)
    }

    /// System schedule entries, sorted by name.
    pub fn system_forks(&self) -> Vec<(&str, i64)> {
        let mut forks: Vec<_> = self
            .system
            .iter()
            .map(|(name, height)| (name.as_str(), *height))
            .collect();
        forks.sort_unstable();
        forks
    }

    /// Entries registered for `title`, sorted by name.
    pub fn title_forks(&self, title: &str) -> Vec<(&str, i64)> {
        let mut forks: Vec<_> = self
            .titles
            .get(title)
            .map(|forks| {
                forks
                    .iter()
                    .map(|(name, height)| (name.as_str(), *height))
                    .collect()
            })
            .unwrap_or_default();
        forks.sort_unstable();
        forks
    }
}

impl Default for ForkTable {
    fn default() -> Self {
        ForkTableBuilder::local().build()
    }
}
