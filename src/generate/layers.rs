use crate::foundation::error::{MashupError, MashupResult};

/// Bounded fan-out accumulator that turns a sequence of segment names into a concat tree.
///
/// Layer 0 holds segments; layer `k + 1` holds concats of `max_concat` names from layer `k`.
/// `flush` callbacks persist one concat of the given children and return its name. Chronological
/// order of the pushed segments is preserved by every flush.
#[derive(Clone, Debug)]
pub struct LayerStack<T> {
    layers: Vec<Vec<T>>,
    max_concat: usize,
}

impl<T> LayerStack<T> {
    pub fn new(max_concat: usize) -> MashupResult<Self> {
        if max_concat < 2 {
            return Err(MashupError::config(format!(
                "max_concat must be at least 2 (not {max_concat})"
            )));
        }
        Ok(Self {
            layers: vec![Vec::new()],
            max_concat,
        })
    }

    pub fn push(&mut self, name: T) {
        self.layers[0].push(name);
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(Vec::is_empty)
    }

    /// Names currently held per layer, lowest first.
    pub fn depths(&self) -> Vec<usize> {
        self.layers.iter().map(Vec::len).collect()
    }

    /// Flush every layer that holds exactly `max_concat` names, lowest first.
    pub fn settle<F>(&mut self, mut flush: F) -> MashupResult<()>
    where
        F: FnMut(Vec<T>) -> MashupResult<T>,
    {
        let mut i = 0;
        while i < self.layers.len() {
            if self.layers[i].len() == self.max_concat {
                self.flush_layer(i, &mut flush)?;
            }
            i += 1;
        }
        Ok(())
    }

    /// Reduce all layers to a single root name. `None` when nothing was ever pushed.
    pub fn collapse<F>(mut self, mut flush: F) -> MashupResult<Option<T>>
    where
        F: FnMut(Vec<T>) -> MashupResult<T>,
    {
        loop {
            let Some(low) = self.layers.iter().position(|l| !l.is_empty()) else {
                return Ok(None);
            };
            if self.layers[low].len() == self.max_concat {
                self.flush_layer(low, &mut flush)?;
                continue;
            }

            let high = (low + 1..self.layers.len()).find(|&j| !self.layers[j].is_empty());
            let Some(high) = high else {
                let mut names = std::mem::take(&mut self.layers[low]);
                if names.len() == 1 {
                    return Ok(names.pop());
                }
                return flush(names).map(Some);
            };

            // The higher layer holds older material, so it stays in front.
            let lower = std::mem::take(&mut self.layers[low]);
            if lower.len() + self.layers[high].len() <= self.max_concat {
                self.layers[high].extend(lower);
                continue;
            }
            let room = self.max_concat - self.layers[high].len();
            let mut lower = lower.into_iter();
            self.layers[high].extend(lower.by_ref().take(room));
            self.layers[low] = lower.collect();
            self.flush_layer(high, &mut flush)?;
        }
    }

    fn flush_layer<F>(&mut self, i: usize, flush: &mut F) -> MashupResult<()>
    where
        F: FnMut(Vec<T>) -> MashupResult<T>,
    {
        let children = std::mem::take(&mut self.layers[i]);
        let name = flush(children)?;
        if self.layers.len() == i + 1 {
            self.layers.push(Vec::new());
        }
        self.layers[i + 1].push(name);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/layers.rs"]
mod tests;
