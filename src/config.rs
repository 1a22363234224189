//! Run configuration.
//!
//! An optional `structfix.yaml` next to the workspace selects the enabled
//! rules, overrides severities, and excludes paths from analysis.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::rules::{RuleId, Severity};

/// Default configuration file names to search for.
const DEFAULT_CONFIG_NAMES: &[&str] = &["structfix.yaml", ".structfix.yaml"];

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    /// Rule names to enable; absent means all rules.
    #[serde(default)]
    pub rules: Option<Vec<String>>,
    /// Per-rule severity overrides ("warning" or "error").
    #[serde(default)]
    pub severity: HashMap<String, String>,
    /// Glob patterns for paths to exclude from analysis
    /// (e.g., "**/Generated/**").
    #[serde(default)]
    pub excluded_paths: Vec<String>,
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Find a configuration file in or next to the workspace.
    pub fn discover(workspace: &Path) -> Option<PathBuf> {
        let dir = if workspace.is_dir() {
            workspace
        } else {
            workspace.parent()?
        };
        for name in DEFAULT_CONFIG_NAMES {
            let candidate = dir.join(name);
            if candidate.exists() {
                return Some(candidate);
            }
        }
        None
    }

    /// Reject unknown rule names and severities up front.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(rules) = &self.rules {
            for name in rules {
                if RuleId::parse(name).is_none() {
                    anyhow::bail!("unknown rule in config: {:?}", name);
                }
            }
        }
        for (name, severity) in &self.severity {
            if RuleId::parse(name).is_none() {
                anyhow::bail!("unknown rule in severity overrides: {:?}", name);
            }
            severity
                .parse::<Severity>()
                .map_err(|e| anyhow::anyhow!("invalid severity for {:?}: {}", name, e))?;
        }
        Ok(())
    }

    pub fn rule_enabled(&self, id: RuleId) -> bool {
        match &self.rules {
            Some(rules) => rules.iter().any(|name| RuleId::parse(name) == Some(id)),
            None => true,
        }
    }

    pub fn severity_for(&self, id: RuleId, default: Severity) -> Severity {
        self.severity
            .get(id.as_str())
            .and_then(|s| s.parse().ok())
            .unwrap_or(default)
    }

    /// Check a path against the excluded_paths patterns. Uses globset, which
    /// supports `**` for recursive directory matching.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }
        let path_str = path.to_string_lossy();
        for pattern in &self.excluded_paths {
            if let Ok(glob) = globset::Glob::new(pattern) {
                if glob.compile_matcher().is_match(&*path_str) {
                    return true;
                }
            }
        }
        false
    }
}
