use std::collections::{BTreeMap, BTreeSet};

use crate::{
    foundation::{
        core::Duration,
        error::{MashupError, MashupResult},
    },
    generate::{
        blend::{BlendCatalog, BlendTemplate},
        filter::TagFilter,
    },
    plan::model::validate_stack_count,
};

/// Inclusive range a segment's target duration is drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DurationRange {
    pub min: Duration,
    pub max: Duration,
}

impl DurationRange {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub fn validate(&self) -> MashupResult<()> {
        if self.max.is_zero() || self.min > self.max {
            return Err(MashupError::config(format!(
                "duration range must be non-empty with min <= max (not {} to {})",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// One kind of segment the generator may emit, weighted by `tickets`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentTemplate {
    Clip {
        duration: DurationRange,
        tickets: u64,
    },
    Stack {
        duration: DurationRange,
        count: usize,
        tickets: u64,
    },
    Blend {
        template: String,
        tickets: u64,
    },
}

impl SegmentTemplate {
    pub fn tickets(&self) -> u64 {
        match self {
            Self::Clip { tickets, .. } | Self::Stack { tickets, .. } | Self::Blend { tickets, .. } => {
                *tickets
            }
        }
    }
}

/// Contents of a project's `generator.json`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GeneratorParameters {
    /// Minimum total duration of the compilation.
    pub target: Duration,
    /// Granularity every clip duration is truncated to.
    pub alignment: Duration,
    /// Maximum children of one concat or stack.
    pub max_concat: usize,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub required_tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub disallowed_tags: BTreeSet<String>,
    pub segments: Vec<SegmentTemplate>,
    /// Embed a snapshot of each source in its clip plan instead of the catalog key.
    #[serde(default)]
    pub inline_sources: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub blend_templates: BTreeMap<String, BlendTemplate>,
}

impl GeneratorParameters {
    pub fn tag_filter(&self) -> TagFilter {
        TagFilter {
            required: self.required_tags.clone(),
            disallowed: self.disallowed_tags.clone(),
        }
    }

    pub fn blend_catalog(&self) -> MashupResult<BlendCatalog> {
        BlendCatalog::with_overrides(&self.blend_templates)
    }

    pub fn validate(&self) -> MashupResult<()> {
        if self.target.is_zero() {
            return Err(MashupError::config("target duration must be greater than zero"));
        }
        if self.alignment.is_zero() {
            return Err(MashupError::config("alignment must be greater than zero"));
        }
        if self.max_concat < 2 {
            return Err(MashupError::config(format!(
                "max_concat must be at least 2 (not {})",
                self.max_concat
            )));
        }
        if self.segments.is_empty() {
            return Err(MashupError::config("at least one segment must be configured"));
        }
        if self.segments.iter().all(|s| s.tickets() == 0) {
            return Err(MashupError::config("segment tickets must not all be zero"));
        }
        self.tag_filter().validate()?;

        let blends = self.blend_catalog()?;
        for (i, segment) in self.segments.iter().enumerate() {
            self.validate_segment(segment, &blends)
                .map_err(|e| MashupError::config(format!("segment {i}: {e}")))?;
        }
        Ok(())
    }

    fn validate_segment(&self, segment: &SegmentTemplate, blends: &BlendCatalog) -> MashupResult<()> {
        match segment {
            SegmentTemplate::Clip { duration, .. } => duration.validate(),
            SegmentTemplate::Stack {
                duration, count, ..
            } => {
                duration.validate()?;
                validate_stack_count(*count)?;
                if *count > self.max_concat {
                    return Err(MashupError::config(format!(
                        "stack count {count} exceeds max_concat {}",
                        self.max_concat
                    )));
                }
                Ok(())
            }
            SegmentTemplate::Blend { template, .. } => blends.get(template).map(|_| ()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/params.rs"]
mod tests;
