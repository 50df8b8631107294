//! local.conf rendering
//!
//! Builds the `[[local|localrc]]` line list from plugins, services and
//! variables (in that order), followed by one meta section per
//! `phase|file` pair. Construction resolves both dependency graphs up
//! front, so a duplicate or circular declaration fails before anything is
//! written.

#[cfg(test)]
mod tests;

use crate::config::{LocalConfParams, MetaSections, ProjectInfo};
use crate::graph::GraphError;
use crate::order::{plugin_sources, PluginGraph, PluginGraphError, VarGraph};
use crate::value::ScalarValue;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

const LIBS_FROM_GIT: &str = "LIBS_FROM_GIT";
const TEMPEST_PLUGINS: &str = "TEMPEST_PLUGINS";

/// Errors that abort rendering
#[derive(Debug, Error)]
pub enum LocalConfError {
    #[error("Plugin ordering failed: {0}")]
    Plugins(#[from] PluginGraphError),

    #[error("Variable ordering failed: {0}")]
    Variables(#[from] GraphError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for rendering
pub type LocalConfResult<T> = Result<T, LocalConfError>;

/// A fully resolved local.conf, ready to serialize
#[derive(Debug, Clone, Default)]
pub struct LocalConf {
    localrc: Vec<String>,
    meta_sections: IndexMap<String, Vec<String>>,
    warnings: Vec<String>,
}

impl LocalConf {
    /// Resolve and lay out every section described by `params`
    pub fn new(params: &LocalConfParams) -> LocalConfResult<Self> {
        let mut conf = Self::default();

        if let Some(plugins) = params.plugins.as_ref().filter(|p| !p.is_empty()) {
            conf.handle_plugins(params.base_dir.as_deref(), plugins)?;
        }

        let base_services = params.base_services.as_deref().unwrap_or_default();
        let services = params.services.clone().unwrap_or_default();
        if !services.is_empty() || !base_services.is_empty() {
            conf.handle_services(base_services, services);
        }

        conf.handle_localrc(params)?;

        if let Some(local_conf) = &params.local_conf {
            conf.handle_local_conf(local_conf);
        }

        Ok(conf)
    }

    /// Lines of the `[[local|localrc]]` section, in output order
    pub fn localrc(&self) -> &[String] {
        &self.localrc
    }

    /// Meta section headers (`[[phase|file]]`) and their lines
    pub fn meta_sections(&self) -> &IndexMap<String, Vec<String>> {
        &self.meta_sections
    }

    /// Settings that were requested but not applied
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Serialize to local.conf text
    pub fn render(&self) -> String {
        let mut out = String::from("[[local|localrc]]\n");
        out.push_str(&self.localrc.join("\n"));
        out.push_str("\n\n");
        for (header, lines) in &self.meta_sections {
            out.push_str(header);
            out.push('\n');
            out.push_str(&lines.join("\n"));
        }
        out
    }

    /// Write the rendered file to `path`
    pub fn write(&self, path: impl AsRef<Path>) -> LocalConfResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.render()).map_err(|source| LocalConfError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            path = %path.display(),
            localrc_lines = self.localrc.len(),
            meta_sections = self.meta_sections.len(),
            "wrote local.conf"
        );
        Ok(())
    }

    fn handle_plugins(
        &mut self,
        base_dir: Option<&Path>,
        plugins: &IndexMap<String, ScalarValue>,
    ) -> LocalConfResult<()> {
        let graph = PluginGraph::discover(base_dir, &plugin_sources(plugins))?;
        for (name, source) in graph.ordered_plugins().map_err(PluginGraphError::from)? {
            match source {
                Some(source) if !source.is_empty() => {
                    self.localrc.push(format!("enable_plugin {} {}", name, source));
                }
                _ => debug!(plugin = %name, "plugin has no location, not enabling"),
            }
        }
        Ok(())
    }

    fn handle_services(&mut self, base_services: &[String], mut services: IndexMap<String, ScalarValue>) {
        let enable_base = services
            .shift_remove("base")
            .map(|base| base.as_switch().unwrap_or_else(|| base.is_truthy()))
            .unwrap_or(true);

        if enable_base && !base_services.is_empty() {
            self.localrc
                .push(format!("ENABLED_SERVICES={}", base_services.join(",")));
        } else {
            self.localrc.push("disable_all_services".to_string());
        }

        for (name, setting) in &services {
            match setting.as_switch() {
                Some(false) => self.localrc.push(format!("disable_service {}", name)),
                Some(true) => self.localrc.push(format!("enable_service {}", name)),
                None => warn!(service = %name, value = %setting, "ignoring non-boolean service setting"),
            }
        }
    }

    fn handle_localrc(&mut self, params: &LocalConfParams) -> LocalConfResult<()> {
        let mut libs_from_git = false;
        let mut tempest_plugins: Option<String> = None;

        if let Some(localrc) = params.localrc.as_ref().filter(|l| !l.is_empty()) {
            let graph = VarGraph::new(localrc)?;
            for (name, value) in graph.ordered_vars()? {
                self.localrc.push(format!("{}={}", name, shell_quote(&value)));
                if name == LIBS_FROM_GIT {
                    libs_from_git = true;
                } else if name == TEMPEST_PLUGINS {
                    tempest_plugins = Some(value);
                }
            }
        }

        if !libs_from_git {
            let libs = required_projects(params.projects.as_ref(), params.project.as_ref());
            if !libs.is_empty() {
                self.localrc
                    .push(format!("{}={}", LIBS_FROM_GIT, libs.join(",")));
            }
        }

        let requested = params.tempest_plugins.as_deref().unwrap_or_default();
        if !requested.is_empty() {
            match tempest_plugins {
                None => {
                    let dirs: Vec<String> = requested
                        .iter()
                        .map(|plugin| match &params.base_dir {
                            Some(base) => base.join(plugin).display().to_string(),
                            None => plugin.clone(),
                        })
                        .collect();
                    self.localrc
                        .push(format!("{}=\"{}\"", TEMPEST_PLUGINS, dirs.join(" ")));
                }
                Some(existing) => {
                    let message = format!(
                        "{} already defined ({}), requested value {:?} ignored",
                        TEMPEST_PLUGINS, existing, requested
                    );
                    warn!("{}", message);
                    self.warnings.push(message);
                }
            }
        }

        Ok(())
    }

    fn handle_local_conf(&mut self, local_conf: &MetaSections) {
        for (phase, files) in local_conf {
            for (file, sections) in files {
                let mut lines = Vec::new();
                for (section, pairs) in sections {
                    lines.push(format!("[{}]", section));
                    for (key, value) in pairs {
                        lines.push(format!("{} = {}", key, value));
                    }
                    lines.push(String::new());
                }
                self.meta_sections
                    .insert(format!("[[{}|{}]]", phase, file), lines);
            }
        }
    }
}

/// Wrap `value` in double quotes unless it is already quoted
fn shell_quote(value: &str) -> String {
    if value.starts_with('"') {
        value.to_string()
    } else {
        format!("\"{}\"", value)
    }
}

/// Short names of required projects, then the project under test
fn required_projects(
    projects: Option<&IndexMap<String, ProjectInfo>>,
    project: Option<&ProjectInfo>,
) -> Vec<String> {
    let mut names: Vec<String> = projects
        .into_iter()
        .flat_map(|projects| projects.values())
        .filter(|info| info.required)
        .filter_map(|info| info.short_name.clone())
        .collect();

    if let Some(short_name) = project.and_then(|p| p.short_name.as_ref()) {
        if !names.contains(short_name) {
            names.push(short_name.clone());
        }
    }
    names
}
