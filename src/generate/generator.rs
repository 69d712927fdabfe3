use std::collections::BTreeMap;

use rand::{Rng, seq::IndexedRandom as _};

use crate::{
    catalog::Catalog,
    foundation::{
        core::{Duration, Region},
        error::{MashupError, MashupResult},
    },
    generate::{
        blend::BlendCatalog,
        layers::LayerStack,
        params::{DurationRange, GeneratorParameters, SegmentTemplate},
        pool::SourcePool,
        sampler::TicketSampler,
    },
    plan::{ClipSource, Plan, PlanName, PlanOp},
    project::Project,
};

/// Fresh names drawn before a persist collision is treated as a broken random source.
const NAME_ATTEMPTS: usize = 16;

/// Summary of one generator run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateReport {
    pub root: PlanName,
    pub segments: usize,
    pub plans: usize,
    pub total: Duration,
}

/// Builds a random plan graph for a project and publishes its root.
///
/// All randomness, plan names included, comes from the injected `rng`, so a fixed seed over a
/// fixed catalog reproduces the same graph.
pub struct PlanGenerator<'a, R> {
    project: &'a Project,
    catalog: &'a Catalog,
    params: GeneratorParameters,
    blends: BlendCatalog,
    rng: R,
    plans: usize,
}

impl<'a, R: Rng> PlanGenerator<'a, R> {
    pub fn new(
        project: &'a Project,
        catalog: &'a Catalog,
        params: GeneratorParameters,
        rng: R,
    ) -> MashupResult<Self> {
        params.validate()?;
        let blends = params.blend_catalog()?;
        Ok(Self {
            project,
            catalog,
            params,
            blends,
            rng,
            plans: 0,
        })
    }

    /// Use the project's `generator.json`.
    pub fn from_project(project: &'a Project, catalog: &'a Catalog, rng: R) -> MashupResult<Self> {
        let params = project.generator_params()?;
        Self::new(project, catalog, params, rng)
    }

    pub fn params(&self) -> &GeneratorParameters {
        &self.params
    }

    #[tracing::instrument(skip(self), fields(project = %self.project.root().display()))]
    pub fn generate(&mut self) -> MashupResult<GenerateReport> {
        let sampler = TicketSampler::new(
            self.params
                .segments
                .iter()
                .map(|s| (s.tickets(), s.clone())),
        )?;
        let mut pool = SourcePool::scan(
            self.catalog,
            &self.params.tag_filter(),
            self.params.alignment,
            &mut self.rng,
        )?;
        let mut layers = LayerStack::new(self.params.max_concat)?;

        let mut total = Duration::ZERO;
        let mut segments = 0usize;
        while total < self.params.target {
            layers.settle(|children| self.persist(PlanOp::Concat(children)))?;

            let segment = sampler.draw(&mut self.rng);
            let (name, achieved) = self.materialize(segment, &mut pool)?;
            layers.push(name);
            total += achieved;
            segments += 1;
            tracing::debug!(segment = segments, %achieved, %total, "segment added");
        }

        let root = layers
            .collapse(|children| self.persist(PlanOp::Concat(children)))?
            .ok_or_else(|| MashupError::config("generator produced no segments"))?;
        self.project.publish(&root)?;

        tracing::info!(%root, segments, plans = self.plans, %total, "plan generated");
        Ok(GenerateReport {
            root,
            segments,
            plans: self.plans,
            total,
        })
    }

    fn materialize(
        &mut self,
        segment: &SegmentTemplate,
        pool: &mut SourcePool,
    ) -> MashupResult<(PlanName, Duration)> {
        match segment {
            SegmentTemplate::Clip { duration, .. } => {
                let target = self.draw_duration(duration);
                self.clip(pool, target)
            }
            SegmentTemplate::Stack {
                duration, count, ..
            } => {
                let target = self.draw_duration(duration);
                let children = (0..*count)
                    .map(|_| self.clip(pool, target).map(|(name, _)| name))
                    .collect::<MashupResult<Vec<_>>>()?;
                let name = self.persist(PlanOp::Stack {
                    duration: target,
                    children,
                })?;
                Ok((name, target))
            }
            SegmentTemplate::Blend { template, .. } => {
                let recipe = self.blends.get(template)?.clone();
                let mut attachments = BTreeMap::new();
                for slot in &recipe.slots {
                    let (name, _) = self.clip(pool, slot.duration)?;
                    attachments.insert(slot.name.clone(), name);
                }
                let name = self.persist(PlanOp::Blend {
                    template: template.clone(),
                    attachments,
                })?;
                Ok((name, recipe.duration))
            }
        }
    }

    /// Persist one clip of (at most) `target` from the next pooled source.
    fn clip(&mut self, pool: &mut SourcePool, target: Duration) -> MashupResult<(PlanName, Duration)> {
        let entry = pool.next(&mut self.rng);
        let region = entry
            .usable
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| MashupError::not_found(format!("source '{}' has no region", entry.source.key)))?;
        let source = if self.params.inline_sources {
            ClipSource::Inline(Box::new(entry.source.clone()))
        } else {
            ClipSource::Key(entry.source.key.clone())
        };

        let (region, achieved) = cut(region, target, self.params.alignment, &mut self.rng);
        let name = self.persist(PlanOp::Clip { region, source })?;
        Ok((name, achieved))
    }

    fn draw_duration(&mut self, range: &DurationRange) -> Duration {
        let micros = self
            .rng
            .random_range(range.min.as_micros()..=range.max.as_micros());
        quantize(Duration::from_micros(micros), self.params.alignment)
    }

    fn persist(&mut self, op: PlanOp) -> MashupResult<PlanName> {
        for _ in 0..NAME_ATTEMPTS {
            let plan = Plan::new(PlanName::random(&mut self.rng), op.clone());
            match self.project.plans().create(&plan) {
                Ok(()) => {
                    self.plans += 1;
                    tracing::debug!(plan = %plan.name, op = plan.op.kind(), "plan persisted");
                    return Ok(plan.name);
                }
                Err(MashupError::AlreadyExists(_)) => {
                    tracing::debug!(plan = %plan.name, "plan name taken; drawing another");
                }
                Err(e) => return Err(e),
            }
        }
        Err(MashupError::already_exists(format!(
            "no free plan name after {NAME_ATTEMPTS} attempts"
        )))
    }
}

/// Truncate `d` to a multiple of `alignment`, never below one `alignment`.
pub fn quantize(d: Duration, alignment: Duration) -> Duration {
    d.truncate_to(alignment).max(alignment)
}

/// Cut a clip of `target` out of `region` at a random offset.
///
/// When the region is not longer than `target` the whole region is used, truncated down to a
/// multiple of `alignment`. Returns the clip region and its achieved duration.
pub fn cut<R: Rng + ?Sized>(
    region: Region,
    target: Duration,
    alignment: Duration,
    rng: &mut R,
) -> (Region, Duration) {
    let available = region.duration();
    if available > target {
        let slack = available.saturating_sub(target).as_micros();
        let start = region.start + Duration::from_micros(rng.random_range(0..=slack));
        return (Region::new(start, start + target), target);
    }
    let achieved = available.truncate_to(alignment);
    (Region::new(region.start, region.start + achieved), achieved)
}

#[cfg(test)]
#[path = "../../tests/unit/generate/generator.rs"]
mod tests;
