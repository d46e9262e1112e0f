//! Positional join between a service-name index and per-team score rows.
//!
//! Upstream names services only once (per document) and lists every team's
//! scores in the same order.  The join is only meaningful when both sides
//! describe the same number of services, so any length difference is
//! reported instead of indexing past the shorter side.

use std::collections::HashSet;

use super::{MetricKind, Observation, Value};
use crate::error::{ExporterError, JoinError, Result};

/// Per-service score that can be projected onto a gauge.
pub trait ServiceValues {
    /// `None` when this protocol does not carry `kind`.
    fn value(&self, kind: MetricKind) -> Option<Value>;
}

/// Pair each of `team`'s service scores with its name.
pub fn join_services<'n, 's, S>(
    team: &str,
    names: &[&'n str],
    scores: &'s [S],
) -> Result<Vec<(&'n str, &'s S)>, JoinError> {
    if names.len() != scores.len() {
        return Err(JoinError::ServiceCountMismatch {
            team: team.to_string(),
            scores: scores.len(),
            names: names.len(),
        });
    }
    Ok(names.iter().copied().zip(scores.iter()).collect())
}

/// Display label for a team, falling back to `team-<id>` when upstream has
/// no usable name for it.
pub fn team_label(name: Option<&str>, id: i64) -> String {
    match name {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => format!("team-{}", id),
    }
}

/// Flatten labelled team rows into one observation per (team, service).
///
/// Fails on the first row that cannot be joined, and when two observations
/// would carry the same (team, service) labels; nothing partial is returned.
pub fn observe_rows<'a, S, I>(
    protocol: &'static str,
    kind: MetricKind,
    names: &[&str],
    rows: I,
) -> Result<Vec<Observation>>
where
    S: ServiceValues + 'a,
    I: IntoIterator<Item = (String, &'a [S])>,
{
    let mut observations = Vec::new();
    let mut seen = HashSet::new();
    for (team, scores) in rows {
        for (service, score) in join_services(&team, names, scores)? {
            if !seen.insert((team.clone(), service)) {
                return Err(JoinError::DuplicateSeries {
                    team,
                    service: service.to_string(),
                }
                .into());
            }
            let value = score.value(kind).ok_or(ExporterError::Unsupported {
                protocol,
                metric: kind.metric_name(),
            })?;
            observations.push(Observation::faceted(&team, service, value));
        }
    }
    Ok(observations)
}
