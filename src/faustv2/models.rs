use serde::Deserialize;
use std::collections::HashMap;

use crate::scoreboard::{MetricKind, ServiceValues, Value};
use crate::upstream::nullable;

/// `scoreboard_current.json`, the tick pointer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentJson {
    #[serde(default, deserialize_with = "nullable")]
    pub state: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub current_tick: i64,
    /// Unix timestamp at which the current tick ends
    #[serde(default, deserialize_with = "nullable")]
    pub current_tick_until: f64,
    /// Latest tick for which a round document has been published
    pub scoreboard_tick: i64,
}

/// `scoreboard_round_<tick>.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoundJson {
    pub tick: i64,
    #[serde(deserialize_with = "nullable")]
    pub scoreboard: Vec<TeamRow>,
    #[serde(rename = "status-descriptions", default, deserialize_with = "nullable")]
    pub status_descriptions: HashMap<i64, String>,
    /// Service descriptors, positionally matching every row's `services`
    #[serde(deserialize_with = "nullable")]
    pub services: Vec<ServiceInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamRow {
    #[serde(default, deserialize_with = "nullable")]
    pub rank: i64,
    pub team_id: i64,
    #[serde(deserialize_with = "nullable")]
    pub services: Vec<ServiceScore>,
    #[serde(default, deserialize_with = "nullable")]
    pub points: f64,
    #[serde(rename = "o", default, deserialize_with = "nullable")]
    pub offense: f64,
    #[serde(rename = "do", default, deserialize_with = "nullable")]
    pub offense_delta: f64,
    #[serde(rename = "d", default, deserialize_with = "nullable")]
    pub defense: f64,
    #[serde(rename = "dd", default, deserialize_with = "nullable")]
    pub defense_delta: f64,
    #[serde(rename = "s", default, deserialize_with = "nullable")]
    pub sla: f64,
    #[serde(rename = "ds", default, deserialize_with = "nullable")]
    pub sla_delta: f64,
}

/// One team's standing on one service.  The exported values are required;
/// the checker message and deltas are optional and may be `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceScore {
    #[serde(rename = "m", default, deserialize_with = "nullable")]
    pub message: String,
    #[serde(rename = "c", default, deserialize_with = "nullable")]
    pub status: i64,
    #[serde(rename = "dc", default, deserialize_with = "nullable")]
    pub status_delta: Vec<i64>,
    #[serde(rename = "o")]
    pub offense: f64,
    #[serde(rename = "do", default, deserialize_with = "nullable")]
    pub offense_delta: f64,
    #[serde(rename = "d")]
    pub defense: f64,
    #[serde(rename = "dd", default, deserialize_with = "nullable")]
    pub defense_delta: f64,
    #[serde(rename = "s")]
    pub sla: f64,
    #[serde(rename = "ds", default, deserialize_with = "nullable")]
    pub sla_delta: f64,
    #[serde(rename = "cap")]
    pub captures: i64,
    #[serde(rename = "dcap", default, deserialize_with = "nullable")]
    pub captures_delta: i64,
    #[serde(rename = "st")]
    pub stolen: i64,
    #[serde(rename = "dst", default, deserialize_with = "nullable")]
    pub stolen_delta: i64,
}

impl ServiceValues for ServiceScore {
    fn value(&self, kind: MetricKind) -> Option<Value> {
        match kind {
            MetricKind::Offense => Some(Value::Float(self.offense)),
            MetricKind::Defense => Some(Value::Float(self.defense)),
            MetricKind::Sla => Some(Value::Float(self.sla)),
            MetricKind::Captures => Some(Value::Int(self.captures)),
            MetricKind::Stolen => Some(Value::Int(self.stolen)),
            MetricKind::Tick => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub attackers: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub victims: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub first_blood: Vec<i64>,
}

/// `scoreboard_teams.json`: team id → team metadata.
pub type TeamsJson = HashMap<i64, TeamInfo>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TeamInfo {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(rename = "aff", deserialize_with = "nullable")]
    pub affiliation: String,
    #[serde(deserialize_with = "nullable")]
    pub vulnbox: String,
    #[serde(deserialize_with = "nullable")]
    pub logo: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_decode_current_json() {
        let raw = r#"{"state": 2, "current_tick": 6, "current_tick_until": 1700000180.5, "scoreboard_tick": 5}"#;
        let doc: CurrentJson = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.scoreboard_tick, 5);
        assert_eq!(doc.current_tick, 6);
    }

    #[test]
    fn test_decode_round_json_short_field_names() {
        let raw = r#"{
            "tick": 5,
            "scoreboard": [{
                "rank": 1, "team_id": 7, "points": 40.0,
                "o": 12.5, "do": 1.0, "d": -3.0, "dd": 0.0, "s": 30.5, "ds": 0.5,
                "services": [{
                    "m": "", "c": 0, "dc": [0, 0],
                    "o": 12.5, "do": 1.0, "d": -3.0, "dd": 0.0, "s": 30.5, "ds": 0.5,
                    "cap": 4, "dcap": 1, "st": 2, "dst": 0
                }]
            }],
            "status-descriptions": {"0": "up"},
            "services": [{"name": "auth", "attackers": 3, "victims": 2, "first_blood": [7]}]
        }"#;

        let doc: RoundJson = serde_json::from_str(raw).unwrap();
        let score = &doc.scoreboard[0].services[0];
        assert_eq!(doc.scoreboard[0].team_id, 7);
        assert_relative_eq!(score.offense, 12.5);
        assert_eq!(score.captures, 4);
        assert_eq!(score.stolen, 2);
        assert_eq!(doc.services[0].name, "auth");
        assert_eq!(score.value(MetricKind::Stolen), Some(Value::Int(2)));
    }

    #[test]
    fn test_decode_round_json_with_null_decorations() {
        let raw = r#"{
            "tick": 5,
            "scoreboard": [{
                "rank": null, "team_id": 7,
                "services": [{"m": null, "c": 0, "dc": null, "o": 1.0, "d": 0.0, "s": 2.0, "cap": 0, "st": 0}]
            }],
            "status-descriptions": null,
            "services": [{"name": "auth", "first_blood": null}]
        }"#;

        let doc: RoundJson = serde_json::from_str(raw).unwrap();
        let score = &doc.scoreboard[0].services[0];
        assert_eq!(score.message, "");
        assert!(score.status_delta.is_empty());
        assert!(doc.services[0].first_blood.is_empty());
        assert_relative_eq!(score.sla, 2.0);
    }

    #[test]
    fn test_keyless_object_is_not_a_current_pointer() {
        assert!(serde_json::from_str::<CurrentJson>(r#"{"detail": "Not found."}"#).is_err());
    }

    #[test]
    fn test_round_without_scores_or_services_is_rejected() {
        assert!(serde_json::from_str::<RoundJson>(r#"{"tick": 5}"#).is_err());
        assert!(serde_json::from_str::<RoundJson>(
            r#"{"tick": 5, "scoreboard": [{"team_id": 7, "services": [{"o": 1.0}]}], "services": []}"#
        )
        .is_err());
    }

    #[test]
    fn test_decode_teams_json_with_string_keys() {
        let raw = r#"{"7": {"name": "TeamX", "aff": "Uni", "vulnbox": "fd66::7", "logo": ""}}"#;
        let teams: TeamsJson = serde_json::from_str(raw).unwrap();
        assert_eq!(teams[&7].name, "TeamX");
        assert_eq!(teams[&7].affiliation, "Uni");

        let teams: TeamsJson = serde_json::from_str(r#"{"9": {"name": null}}"#).unwrap();
        assert_eq!(teams[&9].name, "");
    }
}
