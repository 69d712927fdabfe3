use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    foundation::{
        error::{MashupError, MashupResult},
        json::read_json,
    },
    generate::params::GeneratorParameters,
    media::model::Format,
    plan::{Plan, PlanName, PlanStore},
};

pub const FORMAT_FILE: &str = "format.json";
pub const GENERATOR_FILE: &str = "generator.json";
pub const ROOT_PLAN_LINK: &str = "plan.json";
pub const PLAN_DIR: &str = "plan";
pub const RENDER_DIR: &str = "render";

/// A project directory: an immutable output [`Format`], the generator parameters, the plan
/// graph and the renders it has produced so far.
#[derive(Clone, Debug)]
pub struct Project {
    root: PathBuf,
    format: Format,
    plans: PlanStore,
}

impl Project {
    /// Open the project at `path`, creating `plan/` and `render/` when missing.
    pub fn open(path: impl Into<PathBuf>) -> MashupResult<Self> {
        let root = path.into();
        match std::fs::metadata(&root) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(MashupError::validation(format!(
                    "project must be a directory ('{}')",
                    root.display()
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MashupError::not_found(format!(
                    "project directory '{}'",
                    root.display()
                )));
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("unable to stat project '{}'", root.display()))
                    .into());
            }
        }

        let format_path = root.join(FORMAT_FILE);
        let format: Format = read_json(&format_path)?;
        format.validate().map_err(|e| {
            MashupError::validation(format!("invalid format '{}': {e}", format_path.display()))
        })?;

        let plans = PlanStore::create_dir(root.join(PLAN_DIR))?;
        let render_dir = root.join(RENDER_DIR);
        std::fs::create_dir_all(&render_dir).with_context(|| {
            format!("failed to create render directory '{}'", render_dir.display())
        })?;

        Ok(Self {
            root,
            format,
            plans,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    pub fn plans(&self) -> &PlanStore {
        &self.plans
    }

    /// Where the output of plan `name` lives once rendered.
    pub fn render_path(&self, name: &PlanName) -> PathBuf {
        self.root
            .join(RENDER_DIR)
            .join(format!("{name}.{}", self.format.extension()))
    }

    /// Name of the published root output symlink (`output.<ext>`).
    pub fn output_link(&self) -> PathBuf {
        self.root.join(format!("output.{}", self.format.extension()))
    }

    pub fn generator_params(&self) -> MashupResult<GeneratorParameters> {
        let params: GeneratorParameters = read_json(&self.root.join(GENERATOR_FILE))?;
        params.validate()?;
        Ok(params)
    }

    /// The plan published through `plan.json`.
    pub fn root_plan(&self) -> MashupResult<Plan> {
        read_json(&self.root.join(ROOT_PLAN_LINK))
    }

    /// Point `plan.json` and `output.<ext>` at `root`, replacing any earlier publication.
    pub fn publish(&self, root: &PlanName) -> MashupResult<()> {
        let plan_target = Path::new(PLAN_DIR).join(format!("{root}.json"));
        let output_target = Path::new(RENDER_DIR).join(format!("{root}.{}", self.format.extension()));

        replace_symlink(&plan_target, &self.root.join(ROOT_PLAN_LINK))?;
        replace_symlink(&output_target, &self.output_link())?;
        tracing::info!(root = %root, project = %self.root.display(), "published root plan");
        Ok(())
    }
}

/// Create `link -> target` (relative to the link's directory) through a temporary name so an
/// existing link is swapped rather than left missing.
fn replace_symlink(target: &Path, link: &Path) -> MashupResult<()> {
    let file_name = link
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| MashupError::validation(format!("bad link path '{}'", link.display())))?;
    let tmp = link.with_file_name(format!(".{file_name}.tmp"));
    if std::fs::symlink_metadata(&tmp).is_ok() {
        std::fs::remove_file(&tmp)
            .with_context(|| format!("failed to remove stale '{}'", tmp.display()))?;
    }

    symlink(target, &tmp)
        .with_context(|| format!("failed to link '{}' -> '{}'", tmp.display(), target.display()))?;
    std::fs::rename(&tmp, link)
        .with_context(|| format!("failed to publish '{}'", link.display()))?;
    Ok(())
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(test)]
#[path = "../tests/unit/project.rs"]
mod tests;
