use std::collections::BTreeSet;

use crate::foundation::{
    core::{Duration, TaggedRegion},
    error::{MashupError, MashupResult},
};

/// Tag constraints applied to every region a clip may be cut from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagFilter {
    pub required: BTreeSet<String>,
    pub disallowed: BTreeSet<String>,
}

impl TagFilter {
    pub fn new<I, J, S, T>(required: I, disallowed: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            required: required.into_iter().map(Into::into).collect(),
            disallowed: disallowed.into_iter().map(Into::into).collect(),
        }
    }

    pub fn validate(&self) -> MashupResult<()> {
        if let Some(tag) = self.required.intersection(&self.disallowed).next() {
            return Err(MashupError::config(format!(
                "tag '{tag}' is both required and disallowed"
            )));
        }
        Ok(())
    }

    pub fn allows(&self, tags: &BTreeSet<String>) -> bool {
        self.required.is_subset(tags) && self.disallowed.is_disjoint(tags)
    }

    /// Whether a clip may be cut from `region`: tags pass, the region is valid, and it is at
    /// least one `alignment` long.
    pub fn usable(&self, region: &TaggedRegion, alignment: Duration) -> bool {
        self.allows(&region.tags) && region.region.is_valid() && region.duration() >= alignment
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/filter.rs"]
mod tests;
