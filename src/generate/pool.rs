use rand::{Rng, seq::SliceRandom as _};

use crate::{
    catalog::Catalog,
    foundation::{
        core::{Duration, Region},
        error::{MashupError, MashupResult},
    },
    generate::filter::TagFilter,
    media::model::Source,
};

/// A catalog source together with the regions clips may be cut from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EligibleSource {
    pub source: Source,
    pub usable: Vec<Region>,
}

impl EligibleSource {
    /// `None` when no region of `source` is usable.
    pub fn new(source: Source, filter: &TagFilter, alignment: Duration) -> Option<Self> {
        let usable: Vec<Region> = source
            .regions
            .iter()
            .filter(|r| filter.usable(r, alignment))
            .map(|r| r.region)
            .collect();
        (!usable.is_empty()).then_some(Self { source, usable })
    }
}

/// Shuffle-and-cycle cursor over eligible sources.
///
/// Sources are handed out in shuffled order; once all have been used the order is reshuffled.
#[derive(Clone, Debug)]
pub struct SourcePool {
    sources: Vec<EligibleSource>,
    cursor: usize,
}

impl SourcePool {
    /// Keep the eligible entries of `sources` in their given order.
    pub fn new(
        sources: impl IntoIterator<Item = Source>,
        filter: &TagFilter,
        alignment: Duration,
    ) -> MashupResult<Self> {
        let sources: Vec<EligibleSource> = sources
            .into_iter()
            .filter_map(|s| {
                let key = s.key.clone();
                let eligible = EligibleSource::new(s, filter, alignment);
                if eligible.is_none() {
                    tracing::debug!(%key, "source has no usable region");
                }
                eligible
            })
            .collect();
        if sources.is_empty() {
            return Err(MashupError::not_found(
                "no catalog source has a region matching the tag filter",
            ));
        }
        Ok(Self { sources, cursor: 0 })
    }

    /// Scan the whole catalog in shuffled order. Entries that fail to load are skipped.
    pub fn scan<R: Rng + ?Sized>(
        catalog: &Catalog,
        filter: &TagFilter,
        alignment: Duration,
        rng: &mut R,
    ) -> MashupResult<Self> {
        let keys = catalog.keys(rng)?;
        let total = keys.len();
        let sources = keys.into_iter().filter_map(|key| match catalog.lookup(&key) {
            Ok(source) => Some(source),
            Err(e) => {
                tracing::warn!(%key, error = %e, "skipping catalog entry");
                None
            }
        });
        let pool = Self::new(sources, filter, alignment)?;
        tracing::info!(eligible = pool.len(), scanned = total, "source pool ready");
        Ok(pool)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &EligibleSource {
        if self.cursor >= self.sources.len() {
            self.sources.shuffle(rng);
            self.cursor = 0;
        }
        let idx = self.cursor;
        self.cursor += 1;
        &self.sources[idx]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/pool.rs"]
mod tests;
