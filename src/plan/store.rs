use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    foundation::{
        error::{MashupError, MashupResult},
        json::{read_json, write_json_new},
    },
    plan::model::{Plan, PlanName},
};

/// Directory of `<name>.json` plan documents.
///
/// Names are weak references: every [`PlanStore::load`] re-reads the file, nothing is cached.
#[derive(Clone, Debug)]
pub struct PlanStore {
    dir: PathBuf,
}

impl PlanStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Like [`PlanStore::new`], creating the directory if needed.
    pub fn create_dir(dir: impl Into<PathBuf>) -> MashupResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create plan directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, name: &PlanName) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    pub fn exists(&self, name: &PlanName) -> bool {
        self.path(name).is_file()
    }

    pub fn load(&self, name: &PlanName) -> MashupResult<Plan> {
        let plan: Plan = read_json(&self.path(name)).map_err(|e| match e {
            MashupError::NotFound(_) => MashupError::not_found(format!("plan '{name}'")),
            other => other,
        })?;
        if &plan.name != name {
            return Err(MashupError::validation(format!(
                "plan file '{name}' declares name '{}'",
                plan.name
            )));
        }
        Ok(plan)
    }

    /// Persist a new plan. An existing file with the same name is [`MashupError::AlreadyExists`].
    pub fn create(&self, plan: &Plan) -> MashupResult<()> {
        write_json_new(&self.path(&plan.name), plan)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/plan/store.rs"]
mod tests;
