//! Plugin requirement discovery from checked-out devstack plugins
//!
//! A checkout is any directory holding a `.git` directory. The walk does not
//! descend below a checkout. Each checkout with a `devstack/settings` file is
//! scanned for:
//!
//! ```text
//! define_plugin <name>
//! plugin_requires <name> <required-plugin>
//! ```
//!
//! A `plugin_requires` line only counts when its first argument is the name
//! most recently defined in the same file.

use regex_lite::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

static DEFINE_PLUGIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^define_plugin\s+(\S+)").expect("define_plugin pattern"));

static PLUGIN_REQUIRES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^plugin_requires\s+(\S+)\s+(\S+)").expect("plugin_requires pattern")
});

/// Errors raised while reading plugin descriptors
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to read plugin settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parse one `devstack/settings` file
///
/// Returns the defined plugin name and what it requires, or `None` when the
/// file defines nothing or declares no requirements for its own name.
pub fn parse_settings(text: &str) -> Option<(String, BTreeSet<String>)> {
    let mut name: Option<&str> = None;
    let mut requires = BTreeSet::new();

    for line in text.lines() {
        if let Some(caps) = DEFINE_PLUGIN.captures(line) {
            name = caps.get(1).map(|m| m.as_str());
        }
        if let Some(caps) = PLUGIN_REQUIRES.captures(line) {
            let dependent = caps.get(1).map(|m| m.as_str());
            if dependent.is_some() && dependent == name {
                if let Some(required) = caps.get(2) {
                    requires.insert(required.as_str().to_string());
                }
            }
        }
    }

    match name {
        Some(name) if !requires.is_empty() => Some((name.to_string(), requires)),
        _ => None,
    }
}

/// Declared `plugin -> required plugins` for every checkout found
///
/// This may cover more plugins than a given job enables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PluginRequirements {
    requirements: BTreeMap<String, BTreeSet<String>>,
}

impl PluginRequirements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk `base_dir` for plugin checkouts and collect their requirements
    ///
    /// Unreadable directories are skipped; an unreadable settings file is
    /// an error.
    pub fn discover(base_dir: &Path) -> Result<Self, DiscoveryError> {
        let mut found = Self::new();

        for settings in checkout_settings(base_dir) {
            let bytes = std::fs::read(&settings).map_err(|source| DiscoveryError::Read {
                path: settings.clone(),
                source,
            })?;
            let text = String::from_utf8_lossy(&bytes);
            if let Some((name, requires)) = parse_settings(&text) {
                debug!(plugin = %name, ?requires, path = %settings.display(), "plugin requirements");
                found.insert(name, requires);
            }
        }

        Ok(found)
    }

    /// Record requirements for `name`, replacing any earlier entry
    pub fn insert<I, S>(&mut self, name: impl Into<String>, requires: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requirements
            .insert(name.into(), requires.into_iter().map(Into::into).collect());
    }

    /// Plugins `name` declared as required, if any
    pub fn requirements_of(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.requirements.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.requirements.iter()
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

/// `devstack/settings` files of every checkout below `base_dir`
fn checkout_settings(base_dir: &Path) -> Vec<PathBuf> {
    let mut settings = Vec::new();
    let mut walker = WalkDir::new(base_dir).sort_by_file_name().into_iter();

    loop {
        let entry = match walker.next() {
            None => break,
            Some(Ok(entry)) => entry,
            Some(Err(e)) => {
                debug!(error = %e, "skipping unreadable path");
                continue;
            }
        };
        if !entry.file_type().is_dir() || !entry.path().join(".git").is_dir() {
            continue;
        }
        // Don't go deeper than checkout roots
        walker.skip_current_dir();

        let candidate = entry.path().join("devstack").join("settings");
        if candidate.is_file() {
            settings.push(candidate);
        }
    }

    settings
}
