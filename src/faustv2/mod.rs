//! FAUST ctf-gameserver scoreboard v2.
//!
//! The tick pointer (`scoreboard_current.json`) names the latest published
//! round; the round document for that tick carries scores and service names;
//! team names live in a separate directory (`scoreboard_teams.json`).  Each
//! has its own cache slot, the round slot additionally keyed by tick so a
//! new tick always fetches the matching round.

pub mod models;

pub use models::{CurrentJson, RoundJson, TeamsJson};

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::cache::{CacheEntry, CacheSlot, Clock};
use crate::error::Result;
use crate::scoreboard::{observe_rows, team_label, Exporter, MetricKind, Observation};
use crate::upstream::{fetch_document, round_url, Transport};

pub const PROTOCOL: &str = "faustv2";

const GAUGES: &[MetricKind] = &[
    MetricKind::Offense,
    MetricKind::Defense,
    MetricKind::Sla,
    MetricKind::Captures,
    MetricKind::Stolen,
    MetricKind::Tick,
];

/// Resolved upstream document URLs; `round_url` is a `%d` template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub current_url: String,
    pub round_url: String,
    pub teams_url: String,
}

pub struct FaustV2Exporter {
    endpoints: Endpoints,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    current: CacheSlot<CurrentJson>,
    round: CacheSlot<RoundJson, i64>,
    teams: CacheSlot<TeamsJson>,
}

impl FaustV2Exporter {
    pub fn new(endpoints: Endpoints, transport: Arc<dyn Transport>, clock: Arc<dyn Clock>) -> Self {
        FaustV2Exporter {
            endpoints,
            transport,
            clock,
            current: CacheSlot::new("scoreboard_current.json"),
            round: CacheSlot::new("scoreboard round"),
            teams: CacheSlot::new("scoreboard_teams.json"),
        }
    }

    pub async fn tick(&self) -> Result<i64> {
        let url = self.endpoints.current_url.as_str();
        let current = self
            .current
            .get_or_refresh(self.clock.now(), (), || {
                fetch_document::<CurrentJson>(self.transport.as_ref(), url)
            })
            .await?;
        Ok(current.value.scoreboard_tick)
    }

    pub async fn round(&self, tick: i64) -> Result<CacheEntry<RoundJson>> {
        let url = round_url(&self.endpoints.round_url, tick);
        let round = self
            .round
            .get_or_refresh(self.clock.now(), tick, || {
                fetch_document(self.transport.as_ref(), &url)
            })
            .await?;
        if round.value.tick != tick {
            warn!(
                "{} reports tick {} but tick {} was requested",
                url, round.value.tick, tick
            );
        }
        Ok(round)
    }

    pub async fn teams(&self) -> Result<CacheEntry<TeamsJson>> {
        let url = self.endpoints.teams_url.as_str();
        self.teams
            .get_or_refresh(self.clock.now(), (), || {
                fetch_document(self.transport.as_ref(), url)
            })
            .await
    }
}

#[async_trait]
impl Exporter for FaustV2Exporter {
    fn name(&self) -> &'static str {
        PROTOCOL
    }

    fn gauges(&self) -> &'static [MetricKind] {
        GAUGES
    }

    async fn observe(&self, kind: MetricKind) -> Result<Vec<Observation>> {
        let tick = self.tick().await?;
        if kind == MetricKind::Tick {
            return Ok(vec![Observation::tick(tick)]);
        }

        let round = self.round(tick).await?;
        let teams = self.teams().await?;

        let names: Vec<&str> = round.value.services.iter().map(|s| s.name.as_str()).collect();
        let rows = round.value.scoreboard.iter().map(|row| {
            let name = teams.value.get(&row.team_id).map(|t| t.name.as_str());
            (team_label(name, row.team_id), row.services.as_slice())
        });
        observe_rows(PROTOCOL, kind, &names, rows)
    }
}
