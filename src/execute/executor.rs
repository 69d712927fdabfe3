use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{
    catalog::Catalog,
    foundation::{
        cancel::CancelToken,
        error::{MashupError, MashupResult},
    },
    media::model::{check_input, check_output, discard_partial_output},
    plan::{ClipSource, Plan, PlanName, PlanOp, validate_stack_count},
    project::Project,
    render::backend::Renderer,
};

/// Counts of one execution run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecuteStats {
    /// Plans handed to the renderer.
    pub rendered: usize,
    /// Plans whose output already existed.
    pub skipped: usize,
}

/// Walks a plan graph and renders every plan whose output is missing.
///
/// An existing `render/<name>.<ext>` is the only completion marker: it is trusted without
/// inspection, so a run interrupted part way resumes where it stopped. When a render fails or
/// is cancelled its output is removed; only a file left behind by a killed process is trusted
/// without having finished.
pub struct PlanExecutor<'a> {
    project: &'a Project,
    catalog: &'a Catalog,
    renderer: &'a mut dyn Renderer,
    cancel: CancelToken,
    stats: ExecuteStats,
}

impl<'a> PlanExecutor<'a> {
    pub fn new(
        project: &'a Project,
        catalog: &'a Catalog,
        renderer: &'a mut dyn Renderer,
        cancel: CancelToken,
    ) -> Self {
        Self {
            project,
            catalog,
            renderer,
            cancel,
            stats: ExecuteStats::default(),
        }
    }

    pub fn stats(&self) -> ExecuteStats {
        self.stats
    }

    /// Materialize the plan published through `plan.json`.
    pub fn execute_root(&mut self) -> MashupResult<ExecuteStats> {
        let plan = self.project.root_plan()?;
        self.execute(&plan)?;
        Ok(self.stats)
    }

    /// Load `plan/<name>.json` afresh and materialize it.
    pub fn execute_by_name(&mut self, name: &PlanName) -> MashupResult<()> {
        let plan = self.project.plans().load(name)?;
        self.execute(&plan)
    }

    #[tracing::instrument(skip(self, plan), fields(plan = %plan.name, op = plan.op.kind()))]
    pub fn execute(&mut self, plan: &Plan) -> MashupResult<()> {
        let output = self.project.render_path(&plan.name);
        match check_output(&output) {
            Ok(()) => {}
            Err(MashupError::AlreadyExists(_)) => {
                tracing::debug!("output exists; skipping");
                self.stats.skipped += 1;
                return Ok(());
            }
            Err(e) => return Err(e),
        }
        self.cancel.check(&format!("execution of plan '{}'", plan.name))?;

        if let Err(e) = self.dispatch(plan, &output) {
            discard_partial_output(&output);
            return Err(e);
        }

        self.stats.rendered += 1;
        tracing::debug!(output = %output.display(), "rendered");
        Ok(())
    }

    /// Render the children of `plan`, then `plan` itself into `output`.
    fn dispatch(&mut self, plan: &Plan, output: &Path) -> MashupResult<()> {
        let project = self.project;
        let format = project.format();
        match &plan.op {
            PlanOp::Clip { region, source } => {
                region.validate()?;
                let source = match source {
                    ClipSource::Inline(source) => (**source).clone(),
                    ClipSource::Key(key) => self.catalog.lookup(key)?,
                };
                source.validate()?;
                self.renderer
                    .clip(format, &source, *region, output, &self.cancel)?;
            }
            PlanOp::Concat(children) => {
                if children.is_empty() {
                    return Err(MashupError::config(format!(
                        "concat plan '{}' has no inputs",
                        plan.name
                    )));
                }
                let inputs = self.execute_children(children)?;
                self.renderer
                    .concat(format, output, &inputs, &self.cancel)?;
            }
            PlanOp::Stack { duration, children } => {
                validate_stack_count(children.len()).map_err(|e| {
                    MashupError::config(format!("stack plan '{}': {e}", plan.name))
                })?;
                let inputs = self.execute_children(children)?;
                self.renderer
                    .stack(format, output, *duration, &inputs, &self.cancel)?;
            }
            PlanOp::Blend {
                template,
                attachments,
            } => {
                if attachments.is_empty() {
                    return Err(MashupError::config(format!(
                        "blend plan '{}' has no attachments",
                        plan.name
                    )));
                }
                let mut inputs = BTreeMap::new();
                for (slot, child) in attachments {
                    inputs.insert(slot.clone(), self.execute_child(child)?);
                }
                self.renderer
                    .blend(template, format, output, &inputs, &self.cancel)?;
            }
        }
        Ok(())
    }

    fn execute_children(&mut self, children: &[PlanName]) -> MashupResult<Vec<PathBuf>> {
        children.iter().map(|c| self.execute_child(c)).collect()
    }

    /// Materialize `name` and return its output, which must now exist.
    fn execute_child(&mut self, name: &PlanName) -> MashupResult<PathBuf> {
        self.execute_by_name(name)?;
        let path = self.project.render_path(name);
        check_input(&path)?;
        Ok(path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/execute/executor.rs"]
mod tests;
