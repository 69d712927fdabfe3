use std::{collections::BTreeMap, fmt, str::FromStr};

use rand::Rng;

use crate::{
    foundation::{
        core::{Duration, Region},
        error::{MashupError, MashupResult},
    },
    media::model::Source,
};

/// Identifier of a persisted [`Plan`]; the UUID text form of 128 random bits.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlanName(String);

impl PlanName {
    /// Draw a fresh name from `rng`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        Self(
            uuid::Builder::from_random_bytes(bytes)
                .into_uuid()
                .hyphenated()
                .to_string(),
        )
    }

    pub fn parse(s: &str) -> MashupResult<Self> {
        if s.is_empty() {
            return Err(MashupError::validation("plan name must not be empty"));
        }
        if s.contains(['/', '\\']) || s == "." || s == ".." {
            return Err(MashupError::validation(format!(
                "plan name '{s}' must not contain path separators"
            )));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlanName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for PlanName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlanName({})", self.0)
    }
}

impl FromStr for PlanName {
    type Err = MashupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PlanName {
    type Error = MashupError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PlanName> for String {
    fn from(value: PlanName) -> Self {
        value.0
    }
}

/// Where a clip takes its media from.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipSource {
    /// Resolved through the catalog at execution time.
    Key(String),
    /// Snapshot taken at generation time.
    Inline(Box<Source>),
}

/// One composition operation. Child references are plan names, never embedded plans.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanOp {
    Clip {
        region: Region,
        source: ClipSource,
    },
    Concat(Vec<PlanName>),
    Stack {
        duration: Duration,
        children: Vec<PlanName>,
    },
    Blend {
        template: String,
        attachments: BTreeMap<String, PlanName>,
    },
}

impl PlanOp {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Clip { .. } => "clip",
            Self::Concat(_) => "concat",
            Self::Stack { .. } => "stack",
            Self::Blend { .. } => "blend",
        }
    }

    /// Plan names this operation depends on, in execution order.
    pub fn children(&self) -> Vec<&PlanName> {
        match self {
            Self::Clip { .. } => Vec::new(),
            Self::Concat(names) => names.iter().collect(),
            Self::Stack { children, .. } => children.iter().collect(),
            Self::Blend { attachments, .. } => attachments.values().collect(),
        }
    }
}

/// A named, persisted composition operation.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Plan {
    pub name: PlanName,
    pub op: PlanOp,
}

impl Plan {
    pub fn new(name: PlanName, op: PlanOp) -> Self {
        Self { name, op }
    }

    /// Structural checks that need no catalog or filesystem access.
    pub fn validate(&self) -> MashupResult<()> {
        match &self.op {
            PlanOp::Clip { region, .. } => region.validate(),
            PlanOp::Concat(children) => {
                if children.is_empty() {
                    return Err(MashupError::config(format!(
                        "concat plan '{}' has no inputs",
                        self.name
                    )));
                }
                Ok(())
            }
            PlanOp::Stack { children, .. } => validate_stack_count(children.len()).map_err(|e| {
                MashupError::config(format!("stack plan '{}': {e}", self.name))
            }),
            PlanOp::Blend { attachments, .. } => {
                if attachments.is_empty() {
                    return Err(MashupError::config(format!(
                        "blend plan '{}' has no attachments",
                        self.name
                    )));
                }
                Ok(())
            }
        }
    }
}

/// `true` when `n` is `k * k` for some integer `k`.
pub fn is_perfect_square(n: usize) -> bool {
    let root = n.isqrt();
    root * root == n
}

/// A stack needs a square grid of at least 2×2.
pub fn validate_stack_count(n: usize) -> MashupResult<()> {
    if n < 4 || !is_perfect_square(n) {
        return Err(MashupError::config(format!(
            "stack requires a perfect square of at least 4 inputs (not {n})"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/plan/model.rs"]
mod tests;
