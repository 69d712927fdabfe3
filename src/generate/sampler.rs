use rand::Rng;

use crate::foundation::error::{MashupError, MashupResult};

/// Weighted random choice over a fixed set of items.
///
/// Each item owns `tickets` consecutive numbers in `1..=total`; a draw picks a number uniformly
/// and returns the item whose range contains it.
#[derive(Clone, Debug)]
pub struct TicketSampler<T> {
    borders: Vec<(u64, T)>,
    total: u64,
}

impl<T> TicketSampler<T> {
    pub fn new(entries: impl IntoIterator<Item = (u64, T)>) -> MashupResult<Self> {
        let mut total: u64 = 0;
        let mut borders = Vec::new();
        for (tickets, item) in entries {
            total = total
                .checked_add(tickets)
                .ok_or_else(|| MashupError::config("ticket total overflows"))?;
            borders.push((total, item));
        }
        if borders.is_empty() {
            return Err(MashupError::config("at least one segment must be configured"));
        }
        if total == 0 {
            return Err(MashupError::config("segment tickets must not all be zero"));
        }
        Ok(Self { borders, total })
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.borders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.borders.is_empty()
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> &T {
        let n = rng.random_range(1..=self.total);
        // First border >= n. n <= total == last border, so the index is always in range.
        let idx = self.borders.partition_point(|(border, _)| *border < n);
        &self.borders[idx.min(self.borders.len() - 1)].1
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/sampler.rs"]
mod tests;
