// ---------------------------------------------------------------------------
// Migration registry: validated chain of persisted-selection upgrades
// ---------------------------------------------------------------------------
//
// Each step is a `fn(&mut Blob)` that rewrites a blob from version N to N+1.
// The registry checks at construction that the chain is contiguous.

use crate::save_error::SaveError;

/// A decoded selection blob: the top-level JSON object.
pub type Blob = serde_json::Map<String, serde_json::Value>;

/// Transforms a blob from `from_version` to `from_version + 1`.
pub(crate) struct MigrationStep {
    pub from_version: u32,
    pub description: &'static str,
    pub migrate_fn: fn(&mut Blob),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub original_version: u32,
    pub final_version: u32,
    pub step_descriptions: Vec<&'static str>,
}

impl MigrationReport {
    pub fn steps_applied(&self) -> usize {
        self.step_descriptions.len()
    }
}

pub(crate) struct MigrationRegistry {
    steps: Vec<MigrationStep>,
    current_version: u32,
}

impl MigrationRegistry {
    /// # Panics
    ///
    /// If a source version is registered twice or any step between v0 and
    /// `current_version - 1` is missing.
    pub fn new(mut steps: Vec<MigrationStep>, current_version: u32) -> Self {
        let mut seen = std::collections::HashSet::new();
        for step in &steps {
            assert!(
                seen.insert(step.from_version),
                "Duplicate migration step for version {}",
                step.from_version
            );
        }
        for v in 0..current_version {
            assert!(
                seen.contains(&v),
                "Missing migration step from v{} to v{}",
                v,
                v + 1
            );
        }
        steps.sort_by_key(|s| s.from_version);
        Self {
            steps,
            current_version,
        }
    }

    #[cfg(test)]
    pub fn current_version(&self) -> u32 {
        self.current_version
    }

    /// Brings `blob` from `version` up to the current version.
    ///
    /// # Errors
    ///
    /// `SaveError::VersionMismatch` if the blob is from a newer build.
    pub fn migrate(&self, blob: &mut Blob, version: u32) -> Result<MigrationReport, SaveError> {
        if version > self.current_version {
            return Err(SaveError::VersionMismatch {
                expected_max: self.current_version,
                found: version,
            });
        }

        let mut current = version;
        let mut step_descriptions = Vec::new();
        for step in &self.steps {
            if step.from_version == current && current < self.current_version {
                (step.migrate_fn)(blob);
                current += 1;
                step_descriptions.push(step.description);
            }
        }

        Ok(MigrationReport {
            original_version: version,
            final_version: current,
            step_descriptions,
        })
    }
}
