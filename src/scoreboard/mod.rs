//! Protocol-independent scoreboard types and the join that turns team rows
//! into per-(team, service) observations.

pub mod join;

pub use join::{observe_rows, team_label, ServiceValues};

use async_trait::async_trait;

use crate::error::Result;

/// Every gauge an exporter can publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Offense,
    Defense,
    Sla,
    Captures,
    Stolen,
    Tick,
}

impl MetricKind {
    pub fn metric_name(self) -> &'static str {
        match self {
            MetricKind::Offense => "scoreboard_offense",
            MetricKind::Defense => "scoreboard_defense",
            MetricKind::Sla => "scoreboard_sla",
            MetricKind::Captures => "scoreboard_captures",
            MetricKind::Stolen => "scoreboard_stolen",
            MetricKind::Tick => "scoreboard_tick",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            MetricKind::Offense => "Offense points. Faceted by service and team.",
            MetricKind::Defense => "Defense points. Faceted by service and team.",
            MetricKind::Sla => "SLA points. Faceted by service and team.",
            MetricKind::Captures => "Flags gained. Faceted by service and team.",
            MetricKind::Stolen => "Flags lost. Faceted by service and team.",
            MetricKind::Tick => "Current tick.",
        }
    }

    /// Integer gauges carry counts; the rest carry points.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            MetricKind::Captures | MetricKind::Stolen | MetricKind::Tick
        )
    }

    /// Whether observations carry team/service labels.
    pub fn is_faceted(self) -> bool {
        self != MetricKind::Tick
    }
}

/// A gauge reading, passed through from upstream untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Float(f64),
    Int(i64),
}

impl Value {
    pub fn as_f64(self) -> f64 {
        match self {
            Value::Float(v) => v,
            Value::Int(v) => v as f64,
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            Value::Float(v) => v as i64,
            Value::Int(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Attributes {
    pub team: String,
    pub service: String,
}

/// One observation handed to the metrics backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// `None` for unfaceted gauges such as the tick.
    pub attributes: Option<Attributes>,
    pub value: Value,
}

impl Observation {
    pub fn faceted(team: &str, service: &str, value: Value) -> Self {
        Observation {
            attributes: Some(Attributes {
                team: team.to_string(),
                service: service.to_string(),
            }),
            value,
        }
    }

    pub fn tick(tick: i64) -> Self {
        Observation {
            attributes: None,
            value: Value::Int(tick),
        }
    }
}

/// A scoreboard protocol pipeline: owns its cache slots and transport and
/// answers one gauge at a time.
#[async_trait]
pub trait Exporter: Send + Sync {
    /// Short protocol name for logging, e.g. "faustv2".
    fn name(&self) -> &'static str;

    /// Gauges this protocol publishes, in exposition order.
    fn gauges(&self) -> &'static [MetricKind];

    /// Produce every observation for `kind` from the freshest snapshot.
    async fn observe(&self, kind: MetricKind) -> Result<Vec<Observation>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_tick_is_unfaceted() {
        let unfaceted: Vec<_> = [
            MetricKind::Offense,
            MetricKind::Defense,
            MetricKind::Sla,
            MetricKind::Captures,
            MetricKind::Stolen,
            MetricKind::Tick,
        ]
        .into_iter()
        .filter(|k| !k.is_faceted())
        .collect();
        assert_eq!(unfaceted, vec![MetricKind::Tick]);
    }

    #[test]
    fn test_counts_are_integer_gauges() {
        assert!(MetricKind::Captures.is_integer());
        assert!(MetricKind::Tick.is_integer());
        assert!(!MetricKind::Sla.is_integer());
    }
}
