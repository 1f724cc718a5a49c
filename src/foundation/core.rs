use std::sync::atomic::{AtomicU64, Ordering};

use crate::foundation::error::{DyndashError, DyndashResult};

/// Process-unique identity of a scene node.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct NodeId(pub u64);

impl NodeId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Milliseconds since the Unix epoch.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Current wall-clock time.
    pub fn now() -> Self {
        let ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        Self(ms)
    }
}

/// Textual form of a time range as the user entered it (`"now-6h"`, `"now"`, or epoch millis).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RawTimeRange {
    pub from: String,
    pub to: String,
}

impl RawTimeRange {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Resolved time range shared by a subtree of panels.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimeRange {
    pub from: Timestamp,
    pub to: Timestamp, // inclusive
    pub raw: RawTimeRange,
}

impl TimeRange {
    /// Absolute range; `raw` mirrors the bounds as epoch millis.
    pub fn new(from: Timestamp, to: Timestamp) -> DyndashResult<Self> {
        if from > to {
            return Err(DyndashError::validation("TimeRange from must be <= to"));
        }
        Ok(Self {
            from,
            to,
            raw: RawTimeRange::new(from.0.to_string(), to.0.to_string()),
        })
    }

    /// Evaluate a raw (possibly relative) range against `now`.
    pub fn from_raw(raw: RawTimeRange, now: Timestamp) -> DyndashResult<Self> {
        let from = parse_time_expr(&raw.from, now)?;
        let to = parse_time_expr(&raw.to, now)?;
        if from > to {
            return Err(DyndashError::validation(format!(
                "time range '{}' to '{}' ends before it starts",
                raw.from, raw.to
            )));
        }
        Ok(Self { from, to, raw })
    }

    /// Re-evaluate the raw expressions, e.g. on refresh.
    pub fn reevaluate(&self, now: Timestamp) -> DyndashResult<Self> {
        Self::from_raw(self.raw.clone(), now)
    }

    pub fn duration_ms(&self) -> i64 {
        self.to.0.saturating_sub(self.from.0)
    }

    pub fn contains(&self, t: Timestamp) -> bool {
        self.from <= t && t <= self.to
    }
}

fn unit_ms(unit: char) -> Option<i64> {
    match unit {
        's' => Some(1_000),
        'm' => Some(60_000),
        'h' => Some(3_600_000),
        'd' => Some(86_400_000),
        'w' => Some(7 * 86_400_000),
        _ => None,
    }
}

/// `now`, `now-<n><unit>`, `now+<n><unit>` or an integer epoch-millis literal.
fn parse_time_expr(expr: &str, now: Timestamp) -> DyndashResult<Timestamp> {
    let s = expr.trim();
    if let Ok(ms) = s.parse::<i64>() {
        return Ok(Timestamp(ms));
    }

    let Some(rest) = s.strip_prefix("now") else {
        return Err(DyndashError::validation(format!(
            "unsupported time expression '{expr}'"
        )));
    };
    if rest.is_empty() {
        return Ok(now);
    }

    let (sign, offset) = if let Some(o) = rest.strip_prefix('-') {
        (-1i64, o)
    } else if let Some(o) = rest.strip_prefix('+') {
        (1i64, o)
    } else {
        return Err(DyndashError::validation(format!(
            "expected '+' or '-' after 'now' in '{expr}'"
        )));
    };

    if !offset.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(DyndashError::validation(format!(
            "offset in '{expr}' must start with a digit"
        )));
    }
    let unit = offset
        .chars()
        .last()
        .ok_or_else(|| DyndashError::validation(format!("missing offset in '{expr}'")))?;
    let factor = unit_ms(unit).ok_or_else(|| {
        DyndashError::validation(format!("unknown time unit '{unit}' in '{expr}'"))
    })?;
    let amount: i64 = offset[..offset.len() - unit.len_utf8()]
        .parse()
        .map_err(|_| DyndashError::validation(format!("invalid offset amount in '{expr}'")))?;

    let delta = amount
        .checked_mul(factor)
        .and_then(|d| d.checked_mul(sign))
        .ok_or_else(|| DyndashError::validation(format!("offset overflows in '{expr}'")))?;
    Ok(Timestamp(now.0.saturating_add(delta)))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
