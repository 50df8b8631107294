//! Parameter files describing a local.conf
//!
//! Parameters are YAML (JSON works too) with the same keys the devstack job
//! variables use:
//!
//! ```yaml
//! base_dir: /opt/stack
//! localrc:
//!   DEST: /opt/stack
//!   LOGFILE: $DEST/logs/stack.sh.log
//! base_services: [key, mysql, rabbit]
//! services:
//!   cinder: true
//!   tempest: false
//! plugins:
//!   neutron: https://opendev.org/openstack/neutron
//! local_conf:
//!   post-config:
//!     $NOVA_CONF:
//!       DEFAULT:
//!         debug: true
//! ```

use crate::value::ScalarValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// `phase -> config file -> section -> key -> value`
pub type MetaSections =
    IndexMap<String, IndexMap<String, IndexMap<String, IndexMap<String, ScalarValue>>>>;

/// Errors loading a parameter file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A project checked out for the job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// Whether the job requires this project from git
    #[serde(default)]
    pub required: bool,
    /// Short project name, e.g. `oslo.messaging`
    #[serde(default)]
    pub short_name: Option<String>,
}

/// Everything needed to render one local.conf
///
/// Maps keep input order; rendering follows it wherever the resolver
/// does not impose its own order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocalConfParams {
    /// Shell variables for the `[[local|localrc]]` section
    pub localrc: Option<IndexMap<String, ScalarValue>>,
    /// Post-processing meta sections
    pub local_conf: Option<MetaSections>,
    /// Services enabled unless `services.base` is false
    pub base_services: Option<Vec<String>>,
    /// Per-service toggles (`true` enables, `false` disables)
    pub services: Option<IndexMap<String, ScalarValue>>,
    /// Plugin name -> git location; a falsy location skips the plugin
    pub plugins: Option<IndexMap<String, ScalarValue>>,
    /// Directory holding plugin checkouts
    pub base_dir: Option<PathBuf>,
    /// Where to write the rendered file
    pub path: Option<PathBuf>,
    /// Projects checked out for the job, keyed by canonical name
    pub projects: Option<IndexMap<String, ProjectInfo>>,
    /// The project under test
    pub project: Option<ProjectInfo>,
    /// Tempest plugin checkouts (relative to `base_dir`)
    pub tempest_plugins: Option<Vec<String>>,
}

impl LocalConfParams {
    /// Load parameters from a YAML or JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse parameters from YAML or JSON text
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Replace `base_dir` when an override is given
    pub fn with_base_dir(mut self, base_dir: Option<PathBuf>) -> Self {
        if base_dir.is_some() {
            self.base_dir = base_dir;
        }
        self
    }

    /// Replace `path` when an override is given
    pub fn with_path(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.path = path;
        }
        self
    }
}
