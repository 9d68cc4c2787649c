//! Action planning
//!
//! Turns each entry's classification into a concrete action. Planning only
//! reads the filesystem, so a plan can be shown (the `check` command) without
//! executing it.

use std::collections::HashMap;

use serde::Serialize;

use modsync_fs::{LOCK_FILE_NAME, NormalizedPath};

use crate::classify::{self, Classification, Inspection};
use crate::manifest::SkippedEntry;
use crate::{Error, Manifest, ManifestEntry, Mode, Result};

/// What to do about one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum PlannedAction {
    /// Download the entry and atomically replace its target
    FetchAndReplace { entry: ManifestEntry },
    /// Remove a target that is no longer applicable
    Delete { path: NormalizedPath },
    None,
}

impl PlannedAction {
    pub fn is_none(&self) -> bool {
        matches!(self, PlannedAction::None)
    }
}

/// Map a classification to its action.
///
/// The match is exhaustive, so adding a classification without deciding its
/// action does not compile.
pub fn plan(classification: Classification, entry: &ManifestEntry, target: &NormalizedPath) -> PlannedAction {
    match classification {
        Classification::Satisfied => PlannedAction::None,
        Classification::Missing | Classification::Stale => PlannedAction::FetchAndReplace {
            entry: entry.clone(),
        },
        Classification::ObsoletePresent => PlannedAction::Delete {
            path: target.clone(),
        },
    }
}

/// One entry's classification and planned action.
#[derive(Debug, Clone, Serialize)]
pub struct PlanItem {
    pub entry: ManifestEntry,
    pub target: NormalizedPath,
    pub inspection: Inspection,
    pub action: PlannedAction,
}

impl PlanItem {
    pub fn classification(&self) -> Classification {
        self.inspection.classification
    }
}

/// The planned actions for a whole manifest, in manifest order.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub root: NormalizedPath,
    pub mode: Mode,
    pub items: Vec<PlanItem>,
    /// Entries dropped while parsing the manifest
    pub skipped: Vec<SkippedEntry>,
}

impl Plan {
    /// Number of entries that need a fetch or a delete.
    pub fn pending(&self) -> usize {
        self.items.iter().filter(|item| !item.action.is_none()).count()
    }

    /// True when the filesystem already agrees with the manifest.
    pub fn is_noop(&self) -> bool {
        self.pending() == 0
    }
}

/// Classify and plan every entry of `manifest` under `root`.
///
/// # Errors
///
/// Returns [`Error::TargetCollision`] before inspecting anything if two
/// entries share a target path.
pub fn build_plan(manifest: &Manifest, root: &NormalizedPath, mode: Mode) -> Result<Plan> {
    detect_collisions(manifest.entries(), root)?;

    let items = manifest
        .entries()
        .iter()
        .map(|entry| {
            let target = entry.target_path(root);
            let inspection = classify::inspect(entry, mode, &target);
            let action = plan(inspection.classification, entry, &target);
            PlanItem {
                entry: entry.clone(),
                target,
                inspection,
                action,
            }
        })
        .collect();

    Ok(Plan {
        root: root.clone(),
        mode,
        items,
        skipped: manifest.skipped().to_vec(),
    })
}

/// Reject manifests where two entries would touch the same file.
///
/// Covers identical target paths, a target that coincides with another
/// entry's staging path, and any entry whose target or staging path is the
/// root's lock file. Paths are compared after normalization, so on a
/// case-insensitive filesystem names differing only in case are not caught.
pub fn detect_collisions(entries: &[ManifestEntry], root: &NormalizedPath) -> Result<()> {
    let lock = root.join(LOCK_FILE_NAME);
    let mut targets: HashMap<NormalizedPath, &ManifestEntry> = HashMap::new();

    for entry in entries {
        let target = entry.target_path(root);
        if target == lock || entry.staging_path(root) == lock {
            return Err(Error::ReservedTarget {
                path: lock,
                entry: entry.name.clone(),
            });
        }
        if let Some(first) = targets.get(&target) {
            return Err(Error::TargetCollision {
                path: target,
                first: first.name.clone(),
                second: entry.name.clone(),
            });
        }
        targets.insert(target, entry);
    }

    for entry in entries {
        let staging = entry.staging_path(root);
        if let Some(owner) = targets.get(&staging) {
            return Err(Error::TargetCollision {
                path: staging,
                first: entry.name.clone(),
                second: owner.name.clone(),
            });
        }
    }

    Ok(())
}
