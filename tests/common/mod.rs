//! Shared helpers for local.conf integration tests
//!
//! Builds plugin checkouts on disk and reads rendered files back.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Create `<base>/<dir>` as a git checkout with `devstack/settings`
pub fn plugin_checkout(base: &Path, dir: &str, settings: &str) -> PathBuf {
    let root = base.join(dir);
    fs::create_dir_all(root.join(".git")).expect("create .git");
    fs::create_dir_all(root.join("devstack")).expect("create devstack");
    fs::write(root.join("devstack").join("settings"), settings).expect("write settings");
    root
}

/// Second word of every `enable_plugin` line
pub fn enabled_plugins(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| line.starts_with("enable_plugin"))
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
        .collect()
}

/// Right-hand side of the first `KEY=` line
pub fn localrc_value(text: &str, key: &str) -> Option<String> {
    let prefix = format!("{}=", key);
    text.lines()
        .find_map(|line| line.strip_prefix(prefix.as_str()))
        .map(str::to_string)
}
