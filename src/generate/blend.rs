use std::collections::{BTreeMap, BTreeSet};

use crate::foundation::{
    core::Duration,
    error::{MashupError, MashupResult},
};

/// One input of a blend template.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BlendSlot {
    pub name: String,
    pub duration: Duration,
}

/// Named recipe of slot durations composited into one output of fixed `duration`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BlendTemplate {
    pub slots: Vec<BlendSlot>,
    pub duration: Duration,
}

impl BlendTemplate {
    pub fn uniform(prefix: &str, count: usize, slot: Duration, duration: Duration) -> Self {
        Self {
            slots: (0..count)
                .map(|i| BlendSlot {
                    name: format!("{prefix}{i:02}"),
                    duration: slot,
                })
                .collect(),
            duration,
        }
    }

    pub fn validate(&self, name: &str) -> MashupResult<()> {
        if self.slots.is_empty() {
            return Err(MashupError::config(format!(
                "blend template '{name}' has no slots"
            )));
        }
        if self.duration.is_zero() {
            return Err(MashupError::config(format!(
                "blend template '{name}' must have a non-zero duration"
            )));
        }
        let mut seen = BTreeSet::new();
        for slot in &self.slots {
            if slot.name.is_empty() || !seen.insert(slot.name.as_str()) {
                return Err(MashupError::config(format!(
                    "blend template '{name}' has an empty or duplicate slot '{}'",
                    slot.name
                )));
            }
            if slot.duration.is_zero() {
                return Err(MashupError::config(format!(
                    "blend template '{name}' slot '{}' must have a non-zero duration",
                    slot.name
                )));
            }
        }
        Ok(())
    }
}

/// Templates the renderer ships `.blend` files for.
pub fn builtin_templates() -> BTreeMap<String, BlendTemplate> {
    let mut templates = BTreeMap::new();
    templates.insert(
        "mosaic-scroll".to_string(),
        BlendTemplate::uniform("tile", 16, Duration::from_secs(3), Duration::from_secs(10)),
    );
    templates.insert(
        "triptych".to_string(),
        BlendTemplate {
            slots: ["left", "center", "right"]
                .into_iter()
                .map(|name| BlendSlot {
                    name: name.to_string(),
                    duration: Duration::from_secs(6),
                })
                .collect(),
            duration: Duration::from_secs(6),
        },
    );
    templates
}

/// Built-in templates overlaid with project-specific ones.
#[derive(Clone, Debug)]
pub struct BlendCatalog {
    templates: BTreeMap<String, BlendTemplate>,
}

impl Default for BlendCatalog {
    fn default() -> Self {
        Self {
            templates: builtin_templates(),
        }
    }
}

impl BlendCatalog {
    /// Built-ins plus `extra`; an entry in `extra` replaces a built-in of the same name.
    pub fn with_overrides(extra: &BTreeMap<String, BlendTemplate>) -> MashupResult<Self> {
        let mut catalog = Self::default();
        for (name, template) in extra {
            template.validate(name)?;
            catalog.templates.insert(name.clone(), template.clone());
        }
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> MashupResult<&BlendTemplate> {
        self.templates
            .get(name)
            .ok_or_else(|| MashupError::config(format!("unknown blend template '{name}'")))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/blend.rs"]
mod tests;
