use std::{collections::BTreeSet, fmt, ops::Add, ops::AddAssign, str::FromStr};

use crate::foundation::error::{MashupError, MashupResult};

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Non-negative time span with nanosecond resolution.
///
/// Serialized as a duration string such as `"1.5s"`, `"250ms"` or `"1m30s"`. The display form is
/// always whole or fractional seconds (`"4s"`, `"0.25s"`), which parses back to the same value.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Duration(u64);

impl Duration {
    pub const ZERO: Self = Self(0);

    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    pub const fn from_micros(micros: u64) -> Self {
        Self(micros * NANOS_PER_MICRO)
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis * NANOS_PER_MILLI)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * NANOS_PER_SEC)
    }

    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    pub const fn as_micros(self) -> u64 {
        self.0 / NANOS_PER_MICRO
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / NANOS_PER_SEC as f64
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Round down to a multiple of `alignment`. A zero alignment leaves the value untouched.
    pub fn truncate_to(self, alignment: Self) -> Self {
        if alignment.is_zero() {
            return self;
        }
        Self(self.0 - self.0 % alignment.0)
    }

    pub fn to_std(self) -> std::time::Duration {
        std::time::Duration::from_nanos(self.0)
    }

    /// Parse a duration string made of one or more `<number><unit>` terms.
    ///
    /// Units: `h`, `m`, `s`, `ms`, `us` (or `µs`), `ns`. Numbers may carry a fractional part.
    /// A bare `"0"` is accepted.
    pub fn parse(s: &str) -> MashupResult<Self> {
        let text = s.trim();
        if text.is_empty() {
            return Err(MashupError::validation("duration must be non-empty"));
        }
        if text == "0" {
            return Ok(Self::ZERO);
        }

        let mut rest = text;
        let mut total: u128 = 0;
        while !rest.is_empty() {
            let num_end = rest
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .unwrap_or(rest.len());
            if num_end == 0 {
                return Err(MashupError::validation(format!(
                    "duration '{text}' has a unit without a number"
                )));
            }
            let (num, tail) = rest.split_at(num_end);
            let unit_end = tail
                .find(|c: char| c.is_ascii_digit() || c == '.')
                .unwrap_or(tail.len());
            let (unit, tail) = tail.split_at(unit_end);

            let scale: u128 = match unit {
                "h" => 3_600 * u128::from(NANOS_PER_SEC),
                "m" => 60 * u128::from(NANOS_PER_SEC),
                "s" => u128::from(NANOS_PER_SEC),
                "ms" => u128::from(NANOS_PER_MILLI),
                "us" | "µs" => u128::from(NANOS_PER_MICRO),
                "ns" => 1,
                "" => {
                    return Err(MashupError::validation(format!(
                        "duration '{text}' is missing a unit"
                    )));
                }
                other => {
                    return Err(MashupError::validation(format!(
                        "duration '{text}' has unknown unit '{other}'"
                    )));
                }
            };

            total = total
                .checked_add(parse_scaled(text, num, scale)?)
                .ok_or_else(|| MashupError::validation(format!("duration '{text}' overflows")))?;
            rest = tail;
        }

        u64::try_from(total)
            .map(Self)
            .map_err(|_| MashupError::validation(format!("duration '{text}' overflows")))
    }
}

fn parse_scaled(text: &str, num: &str, scale: u128) -> MashupResult<u128> {
    let bad = || MashupError::validation(format!("duration '{text}' has malformed number '{num}'"));

    let (int, frac) = num.split_once('.').unwrap_or((num, ""));
    if (int.is_empty() && frac.is_empty()) || frac.contains('.') {
        return Err(bad());
    }

    let int_value: u128 = if int.is_empty() {
        0
    } else {
        int.parse().map_err(|_| bad())?
    };

    // Digits beyond nanosecond precision of the largest unit are dropped.
    let mut frac_value: u128 = 0;
    let mut denom: u128 = 1;
    for c in frac.chars() {
        let digit = c.to_digit(10).ok_or_else(bad)?;
        if denom < 1_000_000_000_000_000 {
            frac_value = frac_value * 10 + u128::from(digit);
            denom *= 10;
        }
    }

    int_value
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac_value * scale / denom))
        .ok_or_else(|| MashupError::validation(format!("duration '{text}' overflows")))
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0 / NANOS_PER_SEC;
        let frac = self.0 % NANOS_PER_SEC;
        if frac == 0 {
            return write!(f, "{secs}s");
        }
        let digits = format!("{frac:09}");
        write!(f, "{secs}.{}s", digits.trim_end_matches('0'))
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Duration {
    type Err = MashupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Duration {
    type Error = MashupError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Duration> for String {
    fn from(value: Duration) -> Self {
        value.to_string()
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Half-open time interval `[start, end)` within a source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Region {
    pub start: Duration,
    pub end: Duration,
}

impl Region {
    pub fn new(start: Duration, end: Duration) -> Self {
        Self { start, end }
    }

    pub fn duration(self) -> Duration {
        self.end.saturating_sub(self.start)
    }

    pub fn is_valid(self) -> bool {
        self.start != self.end && self.start < self.end
    }

    pub fn validate(self) -> MashupResult<()> {
        if !self.is_valid() {
            return Err(MashupError::validation(format!(
                "region start and end must differ and end must be after start (not {} to {})",
                self.start, self.end
            )));
        }
        Ok(())
    }
}

/// A [`Region`] annotated with free-form tags.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TaggedRegion {
    #[serde(flatten)]
    pub region: Region,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

impl TaggedRegion {
    pub fn new(region: Region) -> Self {
        Self {
            region,
            tags: BTreeSet::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn duration(&self) -> Duration {
        self.region.duration()
    }

    pub fn validate(&self) -> MashupResult<()> {
        self.region.validate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
