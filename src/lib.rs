//! localconf: dependency-ordered devstack local.conf generation
//!
//! Shell variables and devstack plugins are emitted so that every item
//! follows the items it depends on, with ties broken alphabetically.
//!
//! # Core Concepts
//!
//! - **DependencyGraph**: acyclic `name -> depends-on` relation, checked at
//!   every insertion
//! - **VarGraph**: variables whose values reference `$NAME` / `${NAME}`
//! - **PluginGraph**: plugins whose checkouts declare `plugin_requires`
//! - **LocalConf**: the rendered `[[local|localrc]]` section plus meta sections
//!
//! # Example
//!
//! ```
//! use localconf::{LocalConf, LocalConfParams};
//!
//! let params = LocalConfParams::from_yaml_str(
//!     "localrc:\n  LOGDIR: $DEST/logs\n  DEST: /opt/stack\n",
//! )
//! .unwrap();
//! let conf = LocalConf::new(&params).unwrap();
//! assert_eq!(conf.localrc(), &["DEST=\"/opt/stack\"", "LOGDIR=\"$DEST/logs\""]);
//! ```

pub mod config;
pub mod graph;
pub mod order;
pub mod render;
mod value;

pub use config::{ConfigError, LocalConfParams, MetaSections, ProjectInfo};
pub use graph::{DependencyGraph, GraphError, GraphResult, Lookup};
pub use order::{
    parse_settings, plugin_sources, variable_references, DiscoveryError, PluginGraph, PluginGraphError,
    PluginRequirements, VarGraph,
};
pub use render::{LocalConf, LocalConfError, LocalConfResult};
pub use value::ScalarValue;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
