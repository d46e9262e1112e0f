use serde::Deserialize;
use std::collections::HashMap;

use crate::scoreboard::{MetricKind, ServiceValues, Value};
use crate::upstream::nullable;

/// `competition/scoreboard.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreboardJson {
    pub tick: i64,
    #[serde(deserialize_with = "nullable")]
    pub teams: Vec<ScoreboardTeam>,
    /// status code → status meaning
    #[serde(rename = "status-descriptions", default, deserialize_with = "nullable")]
    pub status_descriptions: HashMap<i64, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreboardTeam {
    #[serde(default, deserialize_with = "nullable")]
    pub rank: i64,
    pub id: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub services: Vec<ServiceScore>,
    #[serde(default, deserialize_with = "nullable")]
    pub offense: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub defense: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub sla: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub total: f64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceScore {
    #[serde(default, deserialize_with = "nullable")]
    pub status: i64,
    pub offense: f64,
    pub defense: f64,
    pub sla: f64,
}

impl ServiceValues for ServiceScore {
    fn value(&self, kind: MetricKind) -> Option<Value> {
        match kind {
            MetricKind::Offense => Some(Value::Float(self.offense)),
            MetricKind::Defense => Some(Value::Float(self.defense)),
            MetricKind::Sla => Some(Value::Float(self.sla)),
            MetricKind::Captures | MetricKind::Stolen | MetricKind::Tick => None,
        }
    }
}

/// `competition/status.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusJson {
    /// array index → tick number
    #[serde(default, deserialize_with = "nullable")]
    pub ticks: Vec<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub teams: Vec<StatusTeam>,
    #[serde(rename = "status-descriptions", default, deserialize_with = "nullable")]
    pub status_descriptions: HashMap<i64, String>,
    /// service index → service name
    #[serde(deserialize_with = "nullable")]
    pub services: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusTeam {
    #[serde(deserialize_with = "nullable")]
    pub id: i64,
    #[serde(deserialize_with = "nullable")]
    pub nop: bool,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    /// service index → last few status codes
    #[serde(deserialize_with = "nullable")]
    pub ticks: Vec<Vec<i64>>,
}
