//! Index versions and the targets (groups of tasks) each version indexes

use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use thiserror::Error;

const DEFAULT_TARGETS: &str = include_str!("../../indexer_targets.json");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read targets file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid targets file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("targets file declares no versions")]
    NoVersions,
    #[error("unknown target id {0}")]
    UnknownTarget(i64),
}

/// Heights a target needs to be recomputed at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetScope {
    #[default]
    All,
    LastInSession,
    LastInEra,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Version {
    pub id: i64,
    pub targets: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Target {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub desc: String,
    pub tasks: Vec<String>,
    #[serde(default)]
    pub scope: TargetScope,
}

/// Tasks to run for a set of targets, plus the whitelist their scopes allow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSelection {
    pub tasks: HashSet<String>,
    pub last_in_session: bool,
    pub last_in_era: bool,
}

impl TargetSelection {
    pub fn use_whitelist(&self) -> bool {
        self.last_in_session || self.last_in_era
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexTargets {
    versions: Vec<Version>,
    #[serde(default)]
    shared_tasks: Vec<String>,
    available_targets: Vec<Target>,
}

impl IndexTargets {
    /// Loads `path`, or the built-in targets when no path is given
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_string(),
                    source,
                })?;
                Self::from_json(&raw)
            }
            None => Self::from_json(DEFAULT_TARGETS),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let targets: IndexTargets = serde_json::from_str(raw)?;
        if targets.versions.is_empty() {
            return Err(ConfigError::NoVersions);
        }
        for version in &targets.versions {
            for id in &version.targets {
                targets.target(*id)?;
            }
        }
        Ok(targets)
    }

    /// Version stamped on every syncable indexed from now on
    pub fn current_version_id(&self) -> i64 {
        self.versions.iter().map(|v| v.id).max().unwrap_or_default()
    }

    pub fn target(&self, id: i64) -> Result<&Target, ConfigError> {
        self.available_targets
            .iter()
            .find(|t| t.id == id)
            .ok_or(ConfigError::UnknownTarget(id))
    }

    /// Every task of every target, shared tasks included
    pub fn all_tasks(&self) -> HashSet<String> {
        self.shared_tasks
            .iter()
            .chain(self.available_targets.iter().flat_map(|t| t.tasks.iter()))
            .cloned()
            .collect()
    }

    /// Resolves `target_ids` into tasks. No ids selects every task.
    pub fn select(&self, target_ids: &[i64]) -> Result<TargetSelection, ConfigError> {
        if target_ids.is_empty() {
            return Ok(TargetSelection {
                tasks: self.all_tasks(),
                last_in_session: false,
                last_in_era: false,
            });
        }

        let ids: BTreeSet<i64> = target_ids.iter().copied().collect();
        let mut selected = Vec::with_capacity(ids.len());
        for id in ids {
            selected.push(self.target(id)?);
        }

        let mut tasks: HashSet<String> = self.shared_tasks.iter().cloned().collect();
        tasks.extend(selected.iter().flat_map(|t| t.tasks.iter().cloned()));

        // A whitelist only applies when no selected target needs every height.
        let scoped = selected.iter().all(|t| t.scope != TargetScope::All);
        let last_in_session =
            scoped && selected.iter().any(|t| t.scope == TargetScope::LastInSession);
        let last_in_era = scoped && selected.iter().any(|t| t.scope == TargetScope::LastInEra);

        Ok(TargetSelection {
            tasks,
            last_in_session,
            last_in_era,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_targets_load() {
        let targets = IndexTargets::load(None).unwrap();
        assert_eq!(targets.current_version_id(), 1);
        assert!(targets.all_tasks().contains("MainSyncer"));
        assert!(targets.all_tasks().contains("RewardEraSeqPersistor"));
    }

    #[test]
    fn test_current_version_is_highest_id() {
        let targets = IndexTargets::from_json(
            r#"{
                "versions": [{"id": 1, "targets": [1]}, {"id": 3, "targets": [1]}, {"id": 2, "targets": []}],
                "available_targets": [{"id": 1, "name": "blocks", "tasks": ["BlockParser"]}]
            }"#,
        )
        .unwrap();
        assert_eq!(targets.current_version_id(), 3);
    }

    #[test]
    fn test_unknown_target_rejected() {
        let err = IndexTargets::from_json(
            r#"{"versions": [{"id": 1, "targets": [7]}], "available_targets": []}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTarget(7)));

        let targets = IndexTargets::load(None).unwrap();
        assert!(matches!(targets.select(&[99]), Err(ConfigError::UnknownTarget(99))));
    }

    #[test]
    fn test_empty_versions_rejected() {
        let err = IndexTargets::from_json(r#"{"versions": [], "available_targets": []}"#).unwrap_err();
        assert!(matches!(err, ConfigError::NoVersions));
    }

    #[test]
    fn test_select_scoped_targets_enables_whitelist() {
        let targets = IndexTargets::load(None).unwrap();

        let session = targets.select(&[2, 10]).unwrap();
        assert!(session.last_in_session);
        assert!(!session.last_in_era);
        assert!(session.tasks.contains("SyncerPersistor"));
        assert!(session.tasks.contains("SystemEventCreator"));
        assert!(!session.tasks.contains("BlockParser"));

        let mixed = targets.select(&[2, 3]).unwrap();
        assert!(mixed.last_in_session && mixed.last_in_era);
    }

    #[test]
    fn test_select_with_unscoped_target_disables_whitelist() {
        let targets = IndexTargets::load(None).unwrap();
        let selection = targets.select(&[1, 2]).unwrap();
        assert!(!selection.use_whitelist());
    }

    #[test]
    fn test_select_without_ids_runs_everything() {
        let targets = IndexTargets::load(None).unwrap();
        let selection = targets.select(&[]).unwrap();
        assert_eq!(selection.tasks, targets.all_tasks());
        assert!(!selection.use_whitelist());
    }
}
